use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use wftrace_common::constants::DAGMAN_OUT_EXTENSION;
use wftrace_common::types::trace::Trace;
use wftrace_extracts::fs::FileLocator;
use wftrace_extracts::{AssemblerOptions, TaskTimeline, TraceAssembler};

use crate::commands::{Cli, Commands};
use crate::config::{HeaderOverrides, Settings};
use crate::logging::setup_logging;
use crate::output::{open_output, write_dax, write_json, write_tasks_csv};

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug)?;

    match cli.command {
        Commands::Trace {
            pegasus_dir,
            author_name,
            author_email,
            description,
            output,
            ignore_auxiliary,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let header = settings.header(HeaderOverrides {
                author_name,
                author_email,
                description,
            });
            if ignore_auxiliary {
                warn!("Ignoring Pegasus auxiliary jobs.");
            }

            let trace = TraceAssembler::new(&pegasus_dir, AssemblerOptions { ignore_auxiliary })
                .assemble(header)?;

            write_json(&trace, open_output(output.as_deref())?)?;
            if let Some(path) = output {
                info!("JSON trace file written to {}", path.display());
            }
            Ok(())
        }
        Commands::Tasks {
            pegasus_dir,
            workflow_json,
            output,
            csv,
        } => {
            let mut timeline = read_timeline(&pegasus_dir)?;
            let trace = read_trace(&workflow_json)?;
            timeline.attach_runtimes(&trace);

            let out = open_output(output.as_deref())?;
            if csv {
                write_tasks_csv(timeline.tasks(), out)?;
            } else {
                write_json(&timeline, out)?;
            }
            if let Some(path) = output {
                info!("Task timeline written to {}", path.display());
            }
            Ok(())
        }
        Commands::ToDax {
            workflow_json,
            output,
        } => {
            let trace = read_trace(&workflow_json)?;
            write_dax(&trace, open_output(output.as_deref())?)?;
            if let Some(path) = output {
                info!("DAX3 XML file written to {}", path.display());
            }
            Ok(())
        }
    }
}

fn read_trace(path: &Path) -> Result<Trace> {
    if !path.is_file() {
        error!("The provided path does not exist or is not a file: {}", path.display());
        bail!("{} is not a file", path.display());
    }
    info!("Reading JSON file: {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a workflow trace", path.display()))
}

fn read_timeline(pegasus_dir: &Path) -> Result<TaskTimeline> {
    if !pegasus_dir.is_dir() {
        error!(
            "The provided path does not exist or is not a directory: {}",
            pegasus_dir.display()
        );
        bail!("{} is not a directory", pegasus_dir.display());
    }
    let Some(log) = FileLocator::new(pegasus_dir).find_first(DAGMAN_OUT_EXTENSION) else {
        error!("The directory contains no \".dag.dagman.out\" file");
        bail!("no DAGMan log below {}", pegasus_dir.display());
    };
    info!("DAGMan file: {}", log.display());

    let content =
        fs::read_to_string(&log).with_context(|| format!("Failed to read {}", log.display()))?;
    Ok(TaskTimeline::from_dagman(&content)?)
}
