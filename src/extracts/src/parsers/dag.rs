//! HTCondor DAG declarations.
//!
//! Only two statements matter for the trace:
//!
//! ```text
//! JOB <name> <submit-file> ...
//! PARENT <parent> CHILD <child> ...
//! ```
//!
//! For `PARENT` only the tokens at positions 1 and 3 are significant; further
//! children on the same line are not read. Every other statement (`RETRY`,
//! `VARS`, `JOBSTATE_LOG`, ...) is ignored.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DagStatement {
    Job { name: String },
    Parent { parent: String, child: String },
}

pub fn parse_dag_line(line: &str) -> Option<DagStatement> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["JOB", name, ..] => Some(DagStatement::Job {
            name: name.to_string(),
        }),
        ["PARENT", parent, _, child, ..] => Some(DagStatement::Parent {
            parent: parent.to_string(),
            child: child.to_string(),
        }),
        _ => None,
    }
}

pub fn parse_dag(content: &str) -> Vec<DagStatement> {
    content.lines().filter_map(parse_dag_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("JOB merge_1 merge_1.sub", Some(DagStatement::Job { name: "merge_1".into() }))]
    #[case("JOB create_dir_blast_0_local 00/00/create_dir.sub DIR .", Some(DagStatement::Job { name: "create_dir_blast_0_local".into() }))]
    #[case("PARENT a CHILD b", Some(DagStatement::Parent { parent: "a".into(), child: "b".into() }))]
    #[case("PARENT a CHILD b c d", Some(DagStatement::Parent { parent: "a".into(), child: "b".into() }))]
    #[case("JOBSTATE_LOG blast-0.jobstate.log", None)]
    #[case("RETRY merge_1 3", None)]
    #[case("PARENT a CHILD", None)]
    #[case("# JOB commented", None)]
    #[case("", None)]
    fn line_grammar(#[case] line: &str, #[case] expected: Option<DagStatement>) {
        assert_eq!(parse_dag_line(line), expected);
    }

    #[test]
    fn keeps_statement_order() {
        let statements = parse_dag("JOB a a.sub\nJOB b b.sub\nVARS a x=\"1\"\nPARENT a CHILD b\n");
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[2], DagStatement::Parent { .. }));
    }
}
