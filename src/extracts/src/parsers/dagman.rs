//! DAGMan event log (`*.dag.dagman.out`).
//!
//! Every line starts with a timestamp made of its first two whitespace
//! separated tokens, either `MM/DD HH:MM:SS` or `MM/DD/YY HH:MM:SS`. Two
//! events are read:
//!
//! ```text
//! <date> <time> Submitting HTCondor Node <job> job(s) ...      job = token 5
//! <date> <time> Node <job> job completed                       job = token 3
//! ```

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, error};
use wftrace_common::error::TraceError;
use wftrace_common::types::task::TaskRecord;
use wftrace_common::utils::seconds_between;

const SHORT_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const LONG_FORMAT: &str = "%m/%d/%y %H:%M:%S";
/// Year given to timestamps written without one.
const DEFAULT_YEAR: &str = "1900";

static SUBMIT_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+\s+\S+\s+Submitting HTCondor Node\s+(\S+)").expect("valid submit regex")
});
static COMPLETED_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+\s+\S+\s+\S+\s+(\S+)\s.*job completed").expect("valid completion regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DagmanEvent {
    Submitted { job: String },
    Completed { job: String },
}

/// Timestamp at the start of a DAGMan log line.
pub fn parse_timestamp(line: &str) -> Result<NaiveDateTime, TraceError> {
    let stamp = line.split_whitespace().take(2).join(" ");
    NaiveDateTime::parse_from_str(&format!("{}/{}", DEFAULT_YEAR, stamp), SHORT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&stamp, LONG_FORMAT))
        .map_err(|_| {
            error!("Unable to parse DAGMan timestamp {:?}", stamp);
            TraceError::Timestamp { value: stamp }
        })
}

pub fn parse_event(line: &str) -> Option<DagmanEvent> {
    if let Some(captures) = SUBMIT_EVENT.captures(line) {
        return Some(DagmanEvent::Submitted {
            job: captures[1].to_string(),
        });
    }
    COMPLETED_EVENT
        .captures(line)
        .map(|captures| DagmanEvent::Completed {
            job: captures[1].to_string(),
        })
}

/// Type label of a DAGMan node: the name up to its first `_`, except for
/// cleanup (`clean_up`), directory creation (`create_dir`) and staging jobs,
/// which keep their second segment (`stage_in`, `stage_out`).
pub fn task_type_label(job: &str) -> String {
    let first = job.split('_').next().unwrap_or(job);
    if first.starts_with("clean") {
        "clean_up".to_string()
    } else if first.starts_with("create") {
        "create_dir".to_string()
    } else if first.starts_with("stage") {
        match job.match_indices('_').nth(1) {
            Some((idx, _)) => job[..idx].to_string(),
            None => job.to_string(),
        }
    } else {
        first.to_string()
    }
}

fn event_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|line| !line.trim().is_empty())
}

/// Seconds between the first and the last line of the log.
pub fn makespan(content: &str) -> Result<f64, TraceError> {
    let mut lines = event_lines(content);
    let Some(first) = lines.next() else {
        return Ok(0.0);
    };
    let last = lines.last().unwrap_or(first);
    let start = parse_timestamp(first)?;
    let end = parse_timestamp(last)?;
    Ok(seconds_between(&start, &end))
}

/// Per-node submission/completion timeline, relative to the first line.
pub fn parse_tasks(content: &str) -> Result<Vec<TaskRecord>, TraceError> {
    let mut tasks: Vec<TaskRecord> = Vec::new();
    let mut time_zero: Option<NaiveDateTime> = None;

    for line in event_lines(content) {
        let stamp = parse_timestamp(line)?;
        let zero = *time_zero.get_or_insert(stamp);
        let elapsed = seconds_between(&zero, &stamp);

        match parse_event(line) {
            Some(DagmanEvent::Submitted { job }) => {
                let label = task_type_label(&job);
                tasks.push(TaskRecord::new(job, label, elapsed));
            }
            Some(DagmanEvent::Completed { job }) => {
                match tasks.iter_mut().find(|task| task.id == job) {
                    Some(task) => task.complete(elapsed),
                    None => debug!("Completion for unknown node {}", job),
                }
            }
            None => {}
        }
    }

    debug!("Found {} DAGMan tasks", tasks.len());
    Ok(tasks)
}
