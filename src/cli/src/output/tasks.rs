use std::io::Write;

use anyhow::Result;
use wftrace_common::types::task::TaskRecord;

const ENGINE: &str = "pegasus";
const HEADER: [&str; 8] = [
    "engine", "task", "start", "end", "walltime", "duration", "level", "type",
];

/// Seconds keep their decimal point, so `5.0` is not written as `5`.
fn seconds(value: f64) -> String {
    format!("{:?}", value)
}

fn seconds_cell(value: Option<f64>) -> String {
    value.map(seconds).unwrap_or_default()
}

/// One row per task; unknown values are empty cells.
pub fn write_tasks_csv(tasks: &[TaskRecord], out: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for task in tasks {
        writer.write_record([
            ENGINE.to_string(),
            task.id.clone(),
            seconds(task.start_time),
            seconds_cell(task.end_time),
            seconds_cell(task.walltime),
            seconds_cell(task.duration),
            task.level.map(|level| level.to_string()).unwrap_or_default(),
            task.task_type.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_empty_cells() {
        let mut done = TaskRecord::new("mAdd_ID1", "mAdd", 5.0);
        done.complete(35.5);
        done.duration = Some(28.25);
        done.level = Some(0);
        let pending = TaskRecord::new("stage_out_local_0", "stage_out", 40.0);

        let mut buffer = Vec::new();
        write_tasks_csv(&[done, pending], &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "engine,task,start,end,walltime,duration,level,type");
        assert_eq!(lines[1], "pegasus,mAdd_ID1,5.0,35.5,30.5,28.25,0,mAdd");
        assert_eq!(lines[2], "pegasus,stage_out_local_0,40.0,,,,,stage_out");
    }
}
