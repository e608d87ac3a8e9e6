//! Per-job metadata files (`<job>.meta`) and the file size catalog built
//! from them.

use std::path::Path;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;
use wftrace_common::error::TraceError;
use wftrace_common::types::job::FileUse;

#[derive(Debug, Deserialize)]
struct MetaRecord {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_attributes", default)]
    attributes: MetaAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct MetaAttributes {
    size: Option<MetaSize>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetaSize {
    Number(f64),
    Text(String),
}

impl MetaSize {
    fn bytes(&self) -> Option<u64> {
        let value = match self {
            MetaSize::Number(n) => *n,
            MetaSize::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0).then(|| value as u64)
    }
}

/// File identifier to size in bytes. The first size recorded for an
/// identifier is kept; later records for it are ignored.
#[derive(Debug, Default)]
pub struct FileSizeCatalog {
    sizes: DashMap<String, u64>,
}

impl FileSizeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `size` for `id` unless the identifier is already known.
    /// Returns `true` if the size was stored.
    pub fn insert(&self, id: &str, size: u64) -> bool {
        let mut inserted = false;
        self.sizes.entry(id.to_string()).or_insert_with(|| {
            inserted = true;
            size
        });
        inserted
    }

    pub fn size_of(&self, id: &str) -> Option<u64> {
        self.sizes.get(id).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Loads one metadata document. Returns how many new identifiers it added.
    pub fn load(&self, content: &str, path: &Path) -> Result<usize, TraceError> {
        let records: Vec<MetaRecord> =
            serde_json::from_str(content).map_err(|source| TraceError::Meta {
                path: path.to_path_buf(),
                source,
            })?;

        let mut added = 0;
        for record in records {
            let size = record.attributes.size.as_ref().and_then(MetaSize::bytes);
            match (record.id, size) {
                (Some(id), Some(size)) => {
                    if self.insert(&id, size) {
                        added += 1;
                    }
                }
                (id, _) => debug!("Skipping metadata record {:?} without a usable size", id),
            }
        }
        Ok(added)
    }

    /// Replaces each file's size with the catalogued one, if any.
    pub fn backfill(&self, files: &mut [FileUse]) {
        for file in files {
            if let Some(size) = self.size_of(&file.name) {
                file.size = Some(size);
            }
        }
    }
}
