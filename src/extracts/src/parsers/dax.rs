//! Abstract workflow (DAX) declarations.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::Document;
use tracing::{debug, warn};
use wftrace_common::constants::{DAX_CLOSING_TAG, DAX_NAMESPACE};
use wftrace_common::error::TraceError;
use wftrace_common::types::job::{FileLink, FileUse, Job};

use super::embedded_xml::EmbeddedXml;
use super::xml_ext::NodeExt;

/// Parses the jobs declared in a DAX document.
///
/// Job names are `<name>_<id>`, matching the node names the planner writes to
/// the DAG. `<child>`/`<parent>` references are resolved through the job ids
/// and stored on the child's parents.
pub fn parse_dax(content: &str, path: &Path) -> Result<Vec<Job>, TraceError> {
    let xml = EmbeddedXml::extract(content, DAX_CLOSING_TAG);
    if xml.is_extracted() {
        debug!("Extracted embedded DAX document from {}", path.display());
    }
    let doc = Document::parse(xml.as_str()).map_err(|e| TraceError::Xml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let root = doc.root_element();

    let mut jobs: Vec<Job> = Vec::new();
    let mut names_by_id: HashMap<&str, usize> = HashMap::new();

    for node in root.children_named(DAX_NAMESPACE, "job") {
        let (name, id) = match (node.attribute("name"), node.attribute("id")) {
            (Some(name), Some(id)) => (name, id),
            _ => {
                warn!("Skipping DAX job without name or id in {}", path.display());
                continue;
            }
        };

        let mut job = Job::new(format!("{}_{}", name, id));
        match node.optional_f64("runtime") {
            Ok(Some(runtime)) => job.runtime = runtime,
            Ok(None) => {}
            Err(e) => debug!("{}: {}", job.name, e),
        }

        for uses in node.children_named(DAX_NAMESPACE, "uses") {
            let Some(file_name) = uses.attribute("name").or_else(|| uses.attribute("file")) else {
                debug!("{}: <uses> without a file name", job.name);
                continue;
            };
            let size = uses.optional_u64("size").unwrap_or_else(|e| {
                debug!("{}: {}", job.name, e);
                None
            });
            job.files.push(FileUse {
                link: FileLink::from(uses.attribute("link").unwrap_or("input")),
                name: file_name.to_string(),
                size,
            });
        }

        names_by_id.insert(id, jobs.len());
        jobs.push(job);
    }

    for child in root.children_named(DAX_NAMESPACE, "child") {
        let Some(&child_idx) = child.attribute("ref").and_then(|r| names_by_id.get(r)) else {
            debug!("Ignoring <child> with unknown ref in {}", path.display());
            continue;
        };
        for parent in child.children_named(DAX_NAMESPACE, "parent") {
            match parent.attribute("ref").and_then(|r| names_by_id.get(r)) {
                Some(&parent_idx) => {
                    let parent_name = jobs[parent_idx].name.clone();
                    jobs[child_idx].add_parent(&parent_name);
                }
                None => debug!("Ignoring <parent> with unknown ref in {}", path.display()),
            }
        }
    }

    debug!("Found {} jobs in DAX file", jobs.len());
    Ok(jobs)
}
