use serde::{Deserialize, Serialize};

/// One DAGMan node execution, with times relative to the start of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub start_time: f64,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub walltime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub level: Option<u32>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, task_type: impl Into<String>, start_time: f64) -> Self {
        Self {
            id: id.into(),
            start_time,
            task_type: task_type.into(),
            end_time: None,
            walltime: None,
            duration: None,
            level: None,
        }
    }

    pub fn complete(&mut self, end_time: f64) {
        self.end_time = Some(end_time);
        self.walltime = Some(end_time - self.start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_sets_walltime() {
        let mut task = TaskRecord::new("merge_1", "merge", 12.0);
        task.complete(42.5);
        assert_eq!(task.end_time, Some(42.5));
        assert_eq!(task.walltime, Some(30.5));
    }
}
