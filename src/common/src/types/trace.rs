use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::job::Job;
use super::machine::Machine;
use crate::constants::{SCHEMA_VERSION, UNDEFINED, WMS_NAME};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wms {
    pub name: String,
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(rename = "executedAt")]
    pub executed_at: String,
    pub machines: Vec<Machine>,
    pub jobs: Vec<Job>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub makespan: Option<f64>,
}

/// Top-level trace document handed to the writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    pub wms: Wms,
    pub author: Author,
    pub workflow: Workflow,
}

/// Provenance known before any workflow file is read.
#[derive(Debug, Clone)]
pub struct TraceHeader {
    pub description: String,
    pub author: Author,
    pub wms_url: String,
}

/// Provenance recovered from the planner's braindump file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerInfo {
    pub version: Option<String>,
    pub workflow_name: Option<String>,
    pub timestamp: Option<String>,
}

impl Trace {
    pub fn new(header: TraceHeader, planner: PlannerInfo) -> Self {
        Self {
            name: planner.workflow_name.unwrap_or_else(|| UNDEFINED.to_string()),
            description: header.description,
            created_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            wms: Wms {
                name: WMS_NAME.to_string(),
                version: planner.version.unwrap_or_else(|| UNDEFINED.to_string()),
                url: header.wms_url,
            },
            author: header.author,
            workflow: Workflow {
                executed_at: planner.timestamp.unwrap_or_else(|| UNDEFINED.to_string()),
                machines: Vec::new(),
                jobs: Vec::new(),
                makespan: None,
            },
        }
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.workflow.jobs.iter().find(|j| j.name == name)
    }

    /// Number of dependency edges across all jobs.
    pub fn edge_count(&self) -> usize {
        self.workflow.jobs.iter().map(|j| j.parents.len()).sum()
    }
}
