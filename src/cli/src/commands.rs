use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "wftrace",
    about = "Extracts workflow execution traces from Pegasus submit directories",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Configuration file, defaults to ~/.config/wftrace/wftrace.toml
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug messages to stderr
    #[clap(long, short, global = true)]
    pub debug: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build a JSON trace from a Pegasus submit directory
    Trace {
        /// Pegasus submit directory
        #[clap(value_name = "PEGASUS_DIR")]
        pegasus_dir: PathBuf,
        /// Author's name
        #[clap(short = 'a', long = "author")]
        author_name: Option<String>,
        /// Author's email
        #[clap(short = 'e', long = "email")]
        author_email: Option<String>,
        /// Trace description
        #[clap(short = 'n', long)]
        description: Option<String>,
        /// Output file, stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Ignore auxiliary jobs
        #[clap(short = 'x', long)]
        ignore_auxiliary: bool,
    },

    /// Per-task timeline from the DAGMan log, joined with a JSON trace
    Tasks {
        /// Pegasus submit directory
        #[clap(value_name = "PEGASUS_DIR")]
        pegasus_dir: PathBuf,
        /// JSON trace generated from the same directory
        #[clap(value_name = "WORKFLOW_JSON")]
        workflow_json: PathBuf,
        /// Output file, stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// CSV instead of JSON
        #[clap(short, long)]
        csv: bool,
    },

    /// Convert a JSON trace to Pegasus DAX3 XML
    ToDax {
        /// JSON trace
        #[clap(value_name = "WORKFLOW_JSON")]
        workflow_json: PathBuf,
        /// Output file, stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}
