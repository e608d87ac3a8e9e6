//! Correlates the files of a Pegasus submit directory into one [`Trace`].

mod registry;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use wftrace_common::constants::{
    BRAINDUMP_FILE, DAGMAN_OUT_SUFFIX, DAG_EXTENSION, DAX_EXTENSION, KICKSTART_EXTENSION,
    META_EXTENSION, PLAIN_OUTPUT_PREFIXES, SUB_EXTENSION, XML_EXTENSION,
};
use wftrace_common::error::TraceError;
use wftrace_common::types::job::{Job, JobType};
use wftrace_common::types::machine::MachineRegistry;
use wftrace_common::types::trace::{PlannerInfo, Trace, TraceHeader};
use wftrace_common::utils::starts_with_any;

use crate::fs::FileLocator;
use crate::parsers::braindump::parse_braindump;
use crate::parsers::dag::{parse_dag, DagStatement};
use crate::parsers::dagman;
use crate::parsers::dax::parse_dax;
use crate::parsers::kickstart::{parse_invocation, parse_plain_runtime};
use crate::parsers::meta::FileSizeCatalog;
use crate::parsers::submit::parse_priority;

pub use registry::JobRegistry;

#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblerOptions {
    /// Only keep DAG jobs that were declared in the DAX.
    pub ignore_auxiliary: bool,
}

/// Files every run needs; any of them missing aborts the run.
#[derive(Debug, Clone)]
struct Inputs {
    dag: PathBuf,
    dagman_out: PathBuf,
    dax: PathBuf,
}

pub struct TraceAssembler {
    locator: FileLocator,
    options: AssemblerOptions,
    catalog: FileSizeCatalog,
    machines: MachineRegistry,
}

impl TraceAssembler {
    pub fn new(submit_dir: impl Into<PathBuf>, options: AssemblerOptions) -> Self {
        Self {
            locator: FileLocator::new(submit_dir),
            options,
            catalog: FileSizeCatalog::new(),
            machines: MachineRegistry::new(),
        }
    }

    /// Runs the whole pipeline. Fails only when a required input is missing
    /// or the DAGMan log cannot be read; every per-job problem is logged and
    /// the job keeps whatever was gathered for it.
    pub fn assemble(mut self, header: TraceHeader) -> Result<Trace> {
        let inputs = self.locate_inputs()?;

        let planner = self.read_braindump();
        let mut trace = Trace::new(header, planner);

        let mut registry = JobRegistry::new();
        self.load_dax(&inputs.dax, &mut registry);
        self.load_dag(&inputs.dag, &mut registry)?;

        for job in registry.iter_mut() {
            self.catalog.backfill(&mut job.files);
        }

        let log = read_lossy(&inputs.dagman_out)?;
        let makespan = dagman::makespan(&log)?;
        debug!("Workflow makespan: {}s", makespan);

        trace.workflow.jobs = registry.into_jobs();
        trace.workflow.machines = self.machines.into_vec();
        trace.workflow.makespan = Some(makespan);

        info!(
            "Assembled trace with {} jobs, {} edges and {} machines",
            trace.workflow.jobs.len(),
            trace.edge_count(),
            trace.workflow.machines.len()
        );
        Ok(trace)
    }

    fn locate_inputs(&self) -> Result<Inputs, TraceError> {
        let root = self.locator.root();
        if !root.is_dir() {
            error!("The provided path does not exist or is not a folder: {}", root.display());
            return Err(TraceError::MissingDirectory(root.to_path_buf()));
        }

        let missing = |what: &'static str| {
            error!("Unable to find a {} file in {}", what, root.display());
            TraceError::MissingInput {
                what,
                dir: root.to_path_buf(),
            }
        };

        let dag = self
            .locator
            .find_first(DAG_EXTENSION)
            .ok_or_else(|| missing("\".dag\""))?;
        info!("Using DAG file {}", dag.display());

        let mut dagman_out = dag.clone().into_os_string();
        dagman_out.push(DAGMAN_OUT_SUFFIX);
        let dagman_out = PathBuf::from(dagman_out);
        if !dagman_out.is_file() {
            return Err(missing("\".dagman.out\""));
        }
        info!("Using DAGMan log {}", dagman_out.display());

        let dax = self
            .locator
            .find_first(DAX_EXTENSION)
            .or_else(|| self.locator.find_first(XML_EXTENSION))
            .ok_or_else(|| missing("\".dax\" or \".xml\""))?;
        info!("Using DAX file {}", dax.display());

        Ok(Inputs {
            dag,
            dagman_out,
            dax,
        })
    }

    fn read_braindump(&self) -> PlannerInfo {
        let path = self.locator.root().join(BRAINDUMP_FILE);
        match read_lossy(&path) {
            Ok(content) => parse_braindump(&content),
            Err(e) => {
                error!("Unable to read {}: {:#}", BRAINDUMP_FILE, e);
                PlannerInfo::default()
            }
        }
    }

    fn load_dax(&self, path: &Path, registry: &mut JobRegistry) {
        let jobs = read_lossy(path).and_then(|content| Ok(parse_dax(&content, path)?));
        match jobs {
            Ok(jobs) => {
                for job in jobs {
                    registry.insert(job);
                }
            }
            Err(e) => warn!("No jobs recovered from DAX file: {:#}", e),
        }
    }

    fn load_dag(&mut self, path: &Path, registry: &mut JobRegistry) -> Result<()> {
        let content = read_lossy(path)?;
        let mut declared: HashSet<usize> = HashSet::new();

        for statement in parse_dag(&content) {
            match statement {
                DagStatement::Job { name } => {
                    let (idx, in_dax) = match registry.index_of(&name) {
                        Some(idx) => (idx, true),
                        None if self.options.ignore_auxiliary => {
                            debug!("Ignoring job {} not declared in the DAX", name);
                            self.load_meta(&name);
                            continue;
                        }
                        None => (registry.insert(Job::new(name)), false),
                    };
                    declared.insert(idx);
                    if let Some(job) = registry.get_mut(idx) {
                        // DAX jobs contribute file sizes even without a record
                        if in_dax {
                            self.load_meta(&job.name);
                        }
                        self.process_job(job, !in_dax);
                    }
                }
                DagStatement::Parent { parent, child } => {
                    let parent_idx = registry
                        .index_of(&parent)
                        .filter(|idx| declared.contains(idx));
                    match (parent_idx, registry.index_of(&child)) {
                        (Some(parent_idx), Some(child_idx)) => {
                            registry.link(parent_idx, child_idx);
                        }
                        _ => debug!("Skipping edge {} -> {}", parent, child),
                    }
                }
            }
        }

        debug!("Registered {} jobs", registry.len());
        Ok(())
    }

    /// Invocation record, then metadata when `with_meta` is set, then submit
    /// file.
    fn process_job(&mut self, job: &mut Job, with_meta: bool) {
        let Some(record) = self
            .locator
            .find_for_job(KICKSTART_EXTENSION, &job.name)
            .pop()
        else {
            warn!("No kickstart record for job {}", job.name);
            if let Some(job_type) = JobType::without_record(&job.name) {
                job.job_type = job_type;
            }
            return;
        };

        self.apply_invocation(job, &record);
        if with_meta {
            self.load_meta(&job.name);
        }

        match self.locator.find_for_job(SUB_EXTENSION, &job.name).first() {
            Some(sub) => match read_lossy(sub) {
                Ok(content) => job.priority = parse_priority(&content),
                Err(e) => warn!("{:#}", e),
            },
            None => warn!("Job {} has no .sub record", job.name),
        }
    }

    fn apply_invocation(&mut self, job: &mut Job, record: &Path) {
        let content = match read_lossy(record) {
            Ok(content) => content,
            Err(e) => {
                warn!("{:#}", e);
                return;
            }
        };

        match parse_invocation(&content, record) {
            Ok(invocation) => {
                invocation.apply_to(job);
                if let Some(machine) = invocation.machine {
                    if self.machines.insert_if_absent(machine) {
                        debug!("Registered machine used by {}", job.name);
                    }
                }
            }
            Err(e) if starts_with_any(&job.name, PLAIN_OUTPUT_PREFIXES) => {
                debug!("{}: {}; reading it as plain output", job.name, e);
                job.job_type = JobType::Auxiliary;
                match parse_plain_runtime(&content) {
                    Ok(Some(runtime)) => job.runtime = runtime,
                    Ok(None) => warn!("Empty output for job {}", job.name),
                    Err(e) => warn!("Unable to read runtime of job {}: {}", job.name, e),
                }
            }
            Err(e) => warn!("Unable to parse kickstart record of job {}: {}", job.name, e),
        }
    }

    fn load_meta(&self, job_name: &str) {
        let Some(path) = self
            .locator
            .find_for_job(META_EXTENSION, job_name)
            .into_iter()
            .next()
        else {
            warn!("Job {} has no meta record", job_name);
            return;
        };
        let loaded = read_lossy(&path).and_then(|content| Ok(self.catalog.load(&content, &path)?));
        match loaded {
            Ok(added) => debug!("{} new file sizes from {}", added, path.display()),
            Err(e) => warn!("{:#}", e),
        }
    }
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
