//! Lossy trace to DAX3 conversion. Only compute jobs are kept, and edges from
//! auxiliary-named parents are dropped.

use std::io::Write;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use wftrace_common::constants::{AUXILIARY_PREFIXES, DAX_NAMESPACE};
use wftrace_common::types::job::{FileLink, JobType};
use wftrace_common::types::trace::Trace;
use wftrace_common::utils::starts_with_any;

const DAX_VERSION: &str = "3.6";
const JOB_NAMESPACE: &str = "Montage";
const JOB_VERSION: &str = "1.0";

/// DAX id of a job: the last `_` segment of its name.
fn job_id(name: &str) -> &str {
    name.rsplit('_').next().unwrap_or(name)
}

/// Transformation of a job: the first `_` segment of its name.
fn transformation(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

fn link_name(link: FileLink) -> &'static str {
    match link {
        FileLink::Input => "input",
        FileLink::Output => "output",
    }
}

pub fn write_dax(trace: &Trace, out: impl Write) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut adag = BytesStart::new("adag");
    adag.push_attribute(("xmlns", DAX_NAMESPACE));
    adag.push_attribute(("version", DAX_VERSION));
    adag.push_attribute(("name", trace.name.as_str()));
    writer.write_event(Event::Start(adag))?;

    for job in trace
        .workflow
        .jobs
        .iter()
        .filter(|job| job.job_type == JobType::Compute)
    {
        let id = job_id(&job.name);
        let runtime = format!("{:?}", job.runtime);

        let mut element = BytesStart::new("job");
        element.push_attribute(("id", id));
        element.push_attribute(("namespace", JOB_NAMESPACE));
        element.push_attribute(("name", transformation(&job.name)));
        element.push_attribute(("version", JOB_VERSION));
        element.push_attribute(("runtime", runtime.as_str()));
        writer.write_event(Event::Start(element))?;

        for file in &job.files {
            let size = file.size.unwrap_or(0).to_string();
            let mut uses = BytesStart::new("uses");
            uses.push_attribute(("file", file.name.as_str()));
            uses.push_attribute(("link", link_name(file.link)));
            uses.push_attribute(("register", "true"));
            uses.push_attribute(("transfer", "true"));
            uses.push_attribute(("optional", "false"));
            uses.push_attribute(("type", "data"));
            uses.push_attribute(("size", size.as_str()));
            writer.write_event(Event::Empty(uses))?;
        }
        writer.write_event(Event::End(BytesEnd::new("job")))?;

        if job.parents.is_empty() {
            continue;
        }
        let mut child = BytesStart::new("child");
        child.push_attribute(("ref", id));
        writer.write_event(Event::Start(child))?;
        for parent in job
            .parents
            .iter()
            .filter(|parent| !starts_with_any(parent, AUXILIARY_PREFIXES))
        {
            let mut element = BytesStart::new("parent");
            element.push_attribute(("ref", job_id(parent)));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("child")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("adag")))?;
    let mut out = writer.into_inner();
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wftrace_common::types::job::{FileUse, Job};
    use wftrace_common::types::trace::{Author, PlannerInfo, TraceHeader};

    fn trace() -> Trace {
        let mut trace = Trace::new(
            TraceHeader {
                description: String::new(),
                author: Author {
                    name: "a".into(),
                    email: "a@b".into(),
                },
                wms_url: String::new(),
            },
            PlannerInfo {
                workflow_name: Some("montage".into()),
                ..Default::default()
            },
        );

        let mut stage_in = Job::new("stage_in_local_0");
        stage_in.job_type = JobType::Transfer;

        let mut project = Job::new("mProject_ID0000001");
        project.runtime = 13.5;
        project.add_parent("stage_in_local_0");
        project.files.push(FileUse {
            link: FileLink::Output,
            name: "p1.fits".into(),
            size: None,
        });

        let mut add = Job::new("mAdd_ID0000002");
        add.runtime = 2.0;
        add.add_parent("mProject_ID0000001");
        add.add_parent("create_dir_montage_0");

        trace.workflow.jobs = vec![stage_in, project, add];
        trace
    }

    fn render(trace: &Trace) -> String {
        let mut buffer = Vec::new();
        write_dax(trace, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn keeps_compute_jobs_only() {
        let xml = render(&trace());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            r#"<job id="ID0000001" namespace="Montage" name="mProject" version="1.0" runtime="13.5">"#
        ));
        assert!(xml.contains(r#"runtime="2.0""#));
        assert!(!xml.contains("stage_in"));
        assert!(xml.contains(
            r#"<uses file="p1.fits" link="output" register="true" transfer="true" optional="false" type="data" size="0"/>"#
        ));
    }

    #[test]
    fn auxiliary_parents_are_dropped_from_edges() {
        let xml = render(&trace());
        assert_eq!(xml.matches("<parent ").count(), 1);
        assert!(xml.contains(r#"<parent ref="ID0000001"/>"#));
        // the child element stays even when every parent was auxiliary
        assert!(xml.contains(r#"<child ref="ID0000001">"#));
    }
}
