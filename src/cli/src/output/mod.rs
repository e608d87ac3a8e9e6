//! Writers for everything the CLI emits.

mod dax;
mod tasks;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

pub use dax::write_dax;
pub use tasks::write_tasks_csv;

/// Buffered writer to `path`, or to stdout when no path is given. Missing
/// parent directories are created.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory for file: {}", path.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

pub fn write_json<T: Serialize>(value: &T, mut out: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value).context("Failed to serialize JSON")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/trace.json");
        let out = open_output(Some(&path)).unwrap();
        write_json(&serde_json::json!({"b": 1, "a": 2}), out).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.find("\"b\"").unwrap() < written.find("\"a\"").unwrap());
        assert!(written.ends_with("}\n"));
    }
}
