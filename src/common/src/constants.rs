pub const SCHEMA_VERSION: &str = "1.0";
pub const UNDEFINED: &str = "Undefined";

pub const WMS_NAME: &str = "Pegasus";
pub const DEFAULT_WMS_URL: &str = "http://pegasus.isi.edu";
pub const DEFAULT_AUTHOR_EMAIL: &str = "support@wrench-project.org";
pub const DEFAULT_DESCRIPTION: &str = "Trace generated with wftrace from http://wrench-project.org";

pub const DAX_NAMESPACE: &str = "http://pegasus.isi.edu/schema/DAX";
pub const INVOCATION_NAMESPACE: &str = "http://pegasus.isi.edu/schema/invocation";

pub const DAX_CLOSING_TAG: &str = "</adag>";
pub const INVOCATION_CLOSING_TAG: &str = "</invocation>";

pub const BRAINDUMP_FILE: &str = "braindump.txt";
pub const DAGMAN_OUT_SUFFIX: &str = ".dagman.out";

// file extensions handed to the locator
pub const DAX_EXTENSION: &str = "dax";
pub const XML_EXTENSION: &str = "xml";
pub const DAG_EXTENSION: &str = "dag";
pub const DAGMAN_OUT_EXTENSION: &str = "dag.dagman.out";
pub const KICKSTART_EXTENSION: &str = "out.*";
pub const META_EXTENSION: &str = "meta";
pub const SUB_EXTENSION: &str = "sub";

/// Transformations run by the planner itself rather than the user.
pub const RESERVED_TRANSFORMATION_PREFIX: &str = "pegasus:";
pub const CHMOD_PREFIX: &str = "chmod_";
pub const TRANSFER_PREFIXES: &[&str] = &["stage_in_", "stage_out"];
pub const AUXILIARY_PREFIXES: &[&str] = &["stage_", "create_dir", "cleanup", "clean_up", "register_"];
/// Jobs whose output may be plain timestamped text instead of a kickstart record.
pub const PLAIN_OUTPUT_PREFIXES: &[&str] = &["stage_", "create_dir"];
