use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    AUXILIARY_PREFIXES, CHMOD_PREFIX, RESERVED_TRANSFORMATION_PREFIX, TRANSFER_PREFIXES,
};
use crate::utils::starts_with_any;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    #[default]
    Compute,
    Transfer,
    Auxiliary,
}

impl JobType {
    /// Classification of a job whose kickstart record was parsed.
    ///
    /// Returns `None` when the record says nothing beyond the current type.
    pub fn from_invocation(job_name: &str, transformation: Option<&str>) -> Option<JobType> {
        if starts_with_any(job_name, TRANSFER_PREFIXES) {
            return Some(JobType::Transfer);
        }
        let reserved = transformation
            .map(|t| t.starts_with(RESERVED_TRANSFORMATION_PREFIX))
            .unwrap_or(false);
        if reserved || job_name.starts_with(CHMOD_PREFIX) {
            return Some(JobType::Auxiliary);
        }
        None
    }

    /// Classification of a job that has no kickstart record at all.
    ///
    /// The stage-in/stage-out rule is checked before the auxiliary fallback so
    /// `stage_in_*` jobs stay transfers.
    pub fn without_record(job_name: &str) -> Option<JobType> {
        if starts_with_any(job_name, TRANSFER_PREFIXES) {
            Some(JobType::Transfer)
        } else if starts_with_any(job_name, AUXILIARY_PREFIXES) {
            Some(JobType::Auxiliary)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileLink {
    Input,
    Output,
}

impl From<&str> for FileLink {
    fn from(link: &str) -> Self {
        if link.eq_ignore_ascii_case("output") {
            FileLink::Output
        } else {
            FileLink::Input
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUse {
    pub link: FileLink,
    pub name: String,
    /// `None` until a metadata record or the DAX declares it.
    #[serde(serialize_with = "size_or_zero", default)]
    pub size: Option<u64>,
}

fn size_or_zero<S: Serializer>(size: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(size.unwrap_or(0))
}

/// Accepts whole quantities written as floats, e.g. a peak RSS of `3072.0`.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Integer(u64),
        Float(f64),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Integer(value)) => Ok(Some(value)),
        Some(Number::Float(value)) if value.is_finite() && value >= 0.0 => {
            Ok(Some(value.round() as u64))
        }
        Some(Number::Float(value)) => Err(D::Error::custom(format!(
            "expected a non-negative quantity, got {}",
            value
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub runtime: f64,
    pub parents: Vec<String>,
    pub files: Vec<FileUse>,
    #[serde(rename = "avgCPU", skip_serializing_if = "Option::is_none", default)]
    pub avg_cpu: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "whole_number",
        default
    )]
    pub memory: Option<u64>,
    #[serde(
        rename = "bytesRead",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "whole_number",
        default
    )]
    pub bytes_read: Option<u64>,
    #[serde(
        rename = "bytesWritten",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "whole_number",
        default
    )]
    pub bytes_written: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub arguments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub machine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub priority: Option<i64>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_type: JobType::Compute,
            runtime: 0.0,
            parents: Vec::new(),
            files: Vec::new(),
            avg_cpu: None,
            memory: None,
            bytes_read: None,
            bytes_written: None,
            arguments: None,
            machine: None,
            priority: None,
        }
    }

    /// Adds a dependency edge. Returns `false` if the edge was already present.
    pub fn add_parent(&mut self, parent: &str) -> bool {
        if self.parents.iter().any(|p| p == parent) {
            return false;
        }
        self.parents.push(parent.to_string());
        true
    }
}
