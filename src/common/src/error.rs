use std::path::PathBuf;

/// Failures raised while reading a submit directory.
///
/// `MissingDirectory`, `MissingInput` and `Timestamp` abort the whole run.
/// The remaining variants are per-job and only ever logged by the assembler.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("the provided path does not exist or is not a directory: {0}")]
    MissingDirectory(PathBuf),

    #[error("the directory contains no {what} file: {dir}")]
    MissingInput { what: &'static str, dir: PathBuf },

    #[error("unable to parse timestamp {value:?}")]
    Timestamp { value: String },

    #[error("unable to parse log line timestamp {value:?}")]
    LogLine { value: String },

    #[error("malformed XML in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    #[error("{element} element is missing attribute {attribute}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("attribute {attribute} has a non-numeric value {value:?}")]
    InvalidNumber { attribute: String, value: String },

    #[error("malformed metadata file {path}: {source}")]
    Meta {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
