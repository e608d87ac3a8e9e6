//! Planner metadata from `braindump.txt` (`key value` lines).

use tracing::warn;
use wftrace_common::types::trace::PlannerInfo;

pub fn parse_braindump(content: &str) -> PlannerInfo {
    let mut info = PlannerInfo::default();

    for line in content.lines() {
        let Some((key, value)) = line.trim().split_once(char::is_whitespace) else {
            continue;
        };
        let value = Some(value.trim().to_string());
        match key {
            "planner_version" => info.version = value,
            "pegasus_wf_name" => info.workflow_name = value,
            "timestamp" => info.timestamp = value,
            _ => {}
        }
    }

    if info.version.is_none() {
        warn!("Unable to determine Pegasus version");
    }
    if info.workflow_name.is_none() {
        warn!("Unable to determine workflow name");
    }
    if info.timestamp.is_none() {
        warn!("Unable to determine execution timestamp");
    }
    info
}
