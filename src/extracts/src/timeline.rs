use serde::Serialize;
use tracing::debug;
use wftrace_common::error::TraceError;
use wftrace_common::types::task::TaskRecord;
use wftrace_common::types::trace::Trace;

use crate::parsers::dagman::parse_tasks;

/// DAGMan node timeline, optionally joined with the runtimes of a trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskTimeline {
    tasks: Vec<TaskRecord>,
}

impl TaskTimeline {
    pub fn from_dagman(content: &str) -> Result<Self, TraceError> {
        Ok(Self {
            tasks: parse_tasks(content)?,
        })
    }

    /// Copies each job's runtime onto the first task with the job's name, as
    /// `duration`. Returns the number of tasks that matched a job.
    pub fn attach_runtimes(&mut self, trace: &Trace) -> usize {
        let mut matched = 0;
        for job in &trace.workflow.jobs {
            if let Some(task) = self.tasks.iter_mut().find(|task| task.id == job.name) {
                task.duration = Some(job.runtime);
                task.level = Some(0);
                matched += 1;
            }
        }
        debug!("{} of {} tasks matched a trace job", matched, self.tasks.len());
        matched
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wftrace_common::types::job::Job;
    use wftrace_common::types::trace::{Author, PlannerInfo, TraceHeader};

    const LOG: &str = "\
01/02 10:00:00 Submitting HTCondor Node mProject_ID1 job(s)...
01/02 10:00:05 Submitting HTCondor Node stage_in_local_0 job(s)...
01/02 10:00:30 Node mProject_ID1 job completed
";

    #[test]
    fn joins_runtimes_by_job_name() {
        let mut trace = Trace::new(
            TraceHeader {
                description: String::new(),
                author: Author {
                    name: "a".into(),
                    email: "a@b".into(),
                },
                wms_url: String::new(),
            },
            PlannerInfo::default(),
        );
        let mut job = Job::new("mProject_ID1");
        job.runtime = 27.5;
        trace.workflow.jobs.push(job);

        let mut timeline = TaskTimeline::from_dagman(LOG).unwrap();
        assert_eq!(timeline.attach_runtimes(&trace), 1);

        let tasks = timeline.tasks();
        assert_eq!(tasks[0].duration, Some(27.5));
        assert_eq!(tasks[0].level, Some(0));
        assert_eq!(tasks[0].walltime, Some(30.0));
        assert_eq!(tasks[1].duration, None);
        assert_eq!(tasks[1].task_type, "stage_in");
    }

    #[test]
    fn serializes_under_tasks_key() {
        let timeline = TaskTimeline::from_dagman(LOG).unwrap();
        let value = serde_json::to_value(&timeline).unwrap();
        assert_eq!(value["tasks"][0]["id"], "mProject_ID1");
        assert_eq!(value["tasks"][0]["type"], "mProject");
    }
}
