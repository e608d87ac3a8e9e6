//! HTCondor submit files (`<job>.sub`).

use tracing::warn;

const PRIORITY_KEY: &str = "priority";

/// Value of the first `priority` line, written as `priority = N` or
/// `priority N`. An unparsable value is logged and treated as absent.
pub fn parse_priority(content: &str) -> Option<i64> {
    let line = content
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with(PRIORITY_KEY))?;

    let value = line[PRIORITY_KEY.len()..].trim_start();
    let value = value.strip_prefix('=').unwrap_or(value);
    let token = value.split_whitespace().next().unwrap_or_default();

    match token.parse::<i64>() {
        Ok(priority) => Some(priority),
        Err(_) => {
            warn!("Unable to parse submit priority from {:?}", line);
            None
        }
    }
}
