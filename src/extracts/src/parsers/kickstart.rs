//! Kickstart invocation records (`<job>.out.NNN`).

use std::path::Path;

use chrono::NaiveDateTime;
use itertools::Itertools;
use roxmltree::{Document, Node};
use wftrace_common::constants::{INVOCATION_CLOSING_TAG, INVOCATION_NAMESPACE as NS};
use wftrace_common::error::TraceError;
use wftrace_common::types::job::{Job, JobType};
use wftrace_common::types::machine::{Cpu, Machine};
use wftrace_common::utils::{round_to, seconds_between};

use super::embedded_xml::EmbeddedXml;
use super::xml_ext::NodeExt;

const PLAIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Resource usage aggregated over every `mainjob` of one invocation record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub transformation: Option<String>,
    /// Sum of the `mainjob` durations; retries accumulate.
    pub runtime: f64,
    /// User plus system time over all `usage` records.
    pub cpu_time: f64,
    pub memory: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub arguments: Vec<String>,
    pub machine: Option<Machine>,
}

impl Invocation {
    /// CPU utilisation in percent, rounded to four decimals.
    pub fn avg_cpu(&self) -> Option<f64> {
        if self.cpu_time > 0.0 && self.runtime > 0.0 {
            Some(round_to(100.0 * self.cpu_time / self.runtime, 4))
        } else {
            None
        }
    }

    /// Copies the record onto `job`. The record is authoritative for type,
    /// runtime and resource usage; zero or empty aggregates stay unset.
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(job_type) = JobType::from_invocation(&job.name, self.transformation.as_deref())
        {
            job.job_type = job_type;
        }
        job.runtime = self.runtime;
        job.avg_cpu = self.avg_cpu();
        job.memory = (self.memory > 0).then_some(self.memory);
        job.bytes_read = (self.bytes_read > 0).then_some(self.bytes_read);
        job.bytes_written = (self.bytes_written > 0).then_some(self.bytes_written);
        job.arguments = (!self.arguments.is_empty()).then(|| self.arguments.clone());
        if let Some(machine) = &self.machine {
            job.machine = Some(machine.node_name.clone());
        }
    }
}

pub fn parse_invocation(content: &str, path: &Path) -> Result<Invocation, TraceError> {
    let xml = EmbeddedXml::extract(content, INVOCATION_CLOSING_TAG);
    let doc = Document::parse(xml.as_str()).map_err(|e| TraceError::Xml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let root = doc.root_element();

    let mut invocation = Invocation {
        transformation: root.attribute("transformation").map(str::to_string),
        ..Default::default()
    };

    for mainjob in root.children_named(NS, "mainjob") {
        invocation.runtime += mainjob.required_f64("duration")?;

        for usage in mainjob.children_named(NS, "usage") {
            invocation.cpu_time += usage.required_f64("utime")? + usage.required_f64("stime")?;
        }

        for vector in mainjob.children_named(NS, "argument-vector") {
            invocation.arguments.extend(
                vector
                    .children_named(NS, "arg")
                    .map(|arg| arg.text().unwrap_or_default().to_string()),
            );
        }

        for process in mainjob.children_named(NS, "proc") {
            invocation.memory += process.required_u64("rsspeak")?;
            invocation.bytes_read +=
                process.required_u64("rbytes")?.max(process.required_u64("rchar")?);
            invocation.bytes_written +=
                process.required_u64("wbytes")?.max(process.required_u64("wchar")?);
        }
    }

    for machine in root.children_named(NS, "machine") {
        if let Some(parsed) = parse_machine(machine)? {
            invocation.machine = Some(parsed);
        }
    }

    Ok(invocation)
}

fn parse_machine(machine: Node) -> Result<Option<Machine>, TraceError> {
    let Some(uname) = machine.children_named(NS, "uname").last() else {
        return Ok(None);
    };
    let mut parsed = Machine {
        system: uname.attribute("system").map(str::to_string),
        architecture: uname.attribute("machine").map(str::to_string),
        release: uname.attribute("release").map(str::to_string),
        node_name: uname.required_attr("nodename")?.to_string(),
        memory: None,
        cpu: None,
    };

    for linux in machine.children_named(NS, "linux") {
        for ram in linux.children_named(NS, "ram") {
            parsed.memory = Some(ram.required_u64("total")?);
        }
        for cpu in linux.children_named(NS, "cpu") {
            let count = cpu.required_u64("count")?;
            let count = u32::try_from(count).map_err(|_| TraceError::InvalidNumber {
                attribute: "count".to_string(),
                value: count.to_string(),
            })?;
            parsed.cpu = Some(Cpu {
                count,
                speed: cpu.required_u64("speed")?,
                vendor: cpu.attribute("vendor").map(str::to_string),
            });
        }
    }

    Ok(Some(parsed))
}

/// Runtime of a job whose output is plain log text: every non-blank line
/// starts with `YYYY-MM-DD HH:MM:SS,ffffff` and the runtime is the distance
/// between the first and the last of them.
pub fn parse_plain_runtime(content: &str) -> Result<Option<f64>, TraceError> {
    let mut first: Option<NaiveDateTime> = None;
    let mut last: Option<NaiveDateTime> = None;

    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        let stamp = line
            .split_whitespace()
            .take(2)
            .join(" ")
            .replace(',', ".");
        let parsed = NaiveDateTime::parse_from_str(&stamp, PLAIN_TIMESTAMP_FORMAT)
            .map_err(|_| TraceError::LogLine { value: stamp })?;
        first.get_or_insert(parsed);
        last = Some(parsed);
    }

    Ok(first.zip(last).map(|(start, end)| seconds_between(&start, &end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(node: &str, speed: u32) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<invocation xmlns="http://pegasus.isi.edu/schema/invocation" version="2.3" transformation="montage::mProject:1.0">
  <mainjob start="2020-06-05T17:11:01.000-07:00" duration="10.0" pid="1">
    <usage utime="6.0" stime="2.0" maxrss="100"/>
    <status raw="0"><regular exitcode="0"/></status>
    <argument-vector>
      <arg nr="1">-X</arg>
      <arg nr="2">region.hdr</arg>
    </argument-vector>
    <proc ppid="1" pid="2" rsspeak="2048" rbytes="100" rchar="300" wbytes="500" wchar="0"/>
    <proc ppid="2" pid="3" rsspeak="1024" rbytes="50" rchar="10" wbytes="0" wchar="20"/>
  </mainjob>
  <machine page-size="4096">
    <uname system="linux" nodename="{node}" release="3.10.0" machine="x86_64"/>
    <linux>
      <ram total="65536000" free="1"/>
      <cpu count="16" speed="{speed}" vendor="GenuineIntel"/>
    </linux>
  </machine>
</invocation>
"#
        )
    }

    #[test]
    fn aggregates_usage_and_io() {
        let inv = parse_invocation(&record("node-1", 2400), Path::new("a.out.000")).unwrap();
        assert_eq!(inv.transformation.as_deref(), Some("montage::mProject:1.0"));
        assert_eq!(inv.runtime, 10.0);
        assert_eq!(inv.cpu_time, 8.0);
        assert_eq!(inv.memory, 3072);
        assert_eq!(inv.bytes_read, 300 + 50);
        assert_eq!(inv.bytes_written, 500 + 20);
        assert_eq!(inv.arguments, vec!["-X", "region.hdr"]);
        assert_eq!(inv.avg_cpu(), Some(80.0));

        let machine = inv.machine.unwrap();
        assert_eq!(machine.node_name, "node-1");
        assert_eq!(machine.architecture.as_deref(), Some("x86_64"));
        assert_eq!(machine.memory, Some(65_536_000));
        assert_eq!(machine.cpu.unwrap().speed, 2400);
    }

    #[test]
    fn multiple_attempts_accumulate_runtime() {
        let content = r#"<?xml version="1.0"?>
<invocation xmlns="http://pegasus.isi.edu/schema/invocation" transformation="t">
  <mainjob duration="3.0"><usage utime="1.0" stime="0.0"/></mainjob>
  <mainjob duration="1.5"><usage utime="0.5" stime="0.5"/></mainjob>
</invocation>
"#;
        let inv = parse_invocation(content, Path::new("x.out.001")).unwrap();
        assert_eq!(inv.runtime, 4.5);
        assert_eq!(inv.cpu_time, 2.0);
        assert_eq!(inv.avg_cpu(), Some(44.4444));
        assert!(inv.machine.is_none());
    }

    #[test]
    fn zero_cpu_time_omits_average() {
        let content = r#"<?xml version="1.0"?>
<invocation xmlns="http://pegasus.isi.edu/schema/invocation" transformation="pegasus::dirmanager">
  <mainjob duration="2.0"><usage utime="0.0" stime="0.0"/></mainjob>
</invocation>
"#;
        let inv = parse_invocation(content, Path::new("x.out.000")).unwrap();
        assert_eq!(inv.avg_cpu(), None);

        let mut job = Job::new("create_dir_blast_0_local");
        inv.apply_to(&mut job);
        assert_eq!(job.job_type, JobType::Auxiliary);
        assert_eq!(job.runtime, 2.0);
        assert_eq!(job.avg_cpu, None);
        assert_eq!(job.memory, None);
        assert_eq!(job.arguments, None);
    }

    #[test]
    fn apply_sets_resources_and_machine_reference() {
        let inv = parse_invocation(&record("node-7", 2400), Path::new("a.out.000")).unwrap();
        let mut job = Job::new("mProject_ID0000001");
        job.runtime = 99.0;
        inv.apply_to(&mut job);
        assert_eq!(job.job_type, JobType::Compute);
        assert_eq!(job.runtime, 10.0);
        assert_eq!(job.avg_cpu, Some(80.0));
        assert_eq!(job.memory, Some(3072));
        assert_eq!(job.machine.as_deref(), Some("node-7"));
    }

    #[test]
    fn wrapped_record_is_extracted_before_parsing() {
        let wrapped = format!("PBS banner\n{}PBS epilogue\n", record("node-1", 2400));
        let inv = parse_invocation(&wrapped, Path::new("a.out.000")).unwrap();
        assert_eq!(inv.runtime, 10.0);
    }

    #[test]
    fn missing_required_attribute_is_an_error() {
        let content = r#"<?xml version="1.0"?>
<invocation xmlns="http://pegasus.isi.edu/schema/invocation" transformation="t">
  <mainjob><usage utime="0.0" stime="0.0"/></mainjob>
</invocation>
"#;
        let err = parse_invocation(content, Path::new("x.out.000")).unwrap_err();
        assert!(matches!(
            err,
            TraceError::MissingAttribute {
                attribute: "duration",
                ..
            }
        ));
    }

    #[test]
    fn oversized_cpu_count_is_rejected() {
        let content = record("node-1", 2400).replace("count=\"16\"", "count=\"4294967296\"");
        let err = parse_invocation(&content, Path::new("a.out.000")).unwrap_err();
        assert!(matches!(err, TraceError::InvalidNumber { ref value, .. } if value == "4294967296"));
    }

    #[test]
    fn plain_text_output_yields_runtime() {
        let content = "\
2020-06-05 17:11:01,250000 INFO  Starting directory creation
2020-06-05 17:11:02,000000 INFO  mkdir -p /scratch/run0001
2020-06-05 17:11:04,750000 INFO  Directory created
";
        assert_eq!(parse_plain_runtime(content).unwrap(), Some(3.5));
        assert_eq!(parse_plain_runtime("").unwrap(), None);
        assert!(parse_plain_runtime("garbage line\n").is_err());
    }
}
