//! Importer: MSPDI document to flat project records
//!
//! Parsing is strict about structure (well-formed XML with a `Project`
//! root) and tolerant about everything else: absent or unparseable fields
//! degrade to defaults, references that resolve to nothing are dropped, and
//! hierarchy is rebuilt from outline levels with an ancestor stack that
//! accepts whatever nesting the producer emitted.

use std::collections::HashSet;

use chrono::Days;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::domain::{
    ImportedAssignment, ImportedDependency, ImportedProject, ImportedResource, ImportedTask,
    LinkType,
};

use super::schema::{
    extended_attribute_value, XmlProject, XmlTask, ASSIGNMENT_EXTERNAL_ID_FIELD,
    RESOURCE_TYPE_WORK, TASK_EXTERNAL_ID_FIELD,
};
use super::time;

/// Placeholder for tasks the document left unnamed
const UNNAMED_TASK: &str = "Untitled";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("document is not well-formed XML: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("document has no Project root element")]
    MissingRoot,

    #[error("failed to decode project document: {0}")]
    Decode(quick_xml::DeError),
}

impl From<quick_xml::DeError> for ImportError {
    fn from(err: quick_xml::DeError) -> Self {
        // Ill-formedness after the root surfaces from the deserializer;
        // report it as malformed XML rather than a decoding problem.
        match err {
            quick_xml::DeError::InvalidXml(e) => ImportError::Malformed(e),
            other => ImportError::Decode(other),
        }
    }
}

/// Parses an MSPDI document into flat project records
///
/// The result is deliberately flat: tasks carry outline levels and parent
/// UIDs, and the caller remaps document UIDs onto durable ids (keyed by the
/// recovered external ids) before resolving references.
pub fn import_project(xml: &str) -> Result<ImportedProject, ImportError> {
    require_project_root(xml)?;
    let doc: XmlProject = quick_xml::de::from_str(xml)?;

    let wire_tasks = doc.tasks.map(|t| t.tasks).unwrap_or_default();
    let wire_resources = doc.resources.map(|r| r.resources).unwrap_or_default();
    let wire_assignments = doc.assignments.map(|a| a.assignments).unwrap_or_default();

    let mut tasks = Vec::with_capacity(wire_tasks.len());
    let mut pending_links = Vec::new();

    // Ancestor stack for hierarchy reconstruction: tasks still in scope as
    // potential parents, shallowest first.
    let mut ancestors: Vec<(i64, u32)> = Vec::new();

    for row in &wire_tasks {
        // Rows without an identity cannot be referenced; the UID-0 row is
        // the synthetic project summary, not a task.
        let Some(uid) = row.uid else { continue };
        if uid == 0 {
            continue;
        }

        let outline_level = row
            .outline_level
            .filter(|level| *level >= 1)
            .unwrap_or(1) as u32;

        while ancestors
            .last()
            .is_some_and(|(_, level)| *level >= outline_level)
        {
            ancestors.pop();
        }
        let parent_uid = ancestors.last().map(|(uid, _)| *uid);
        ancestors.push((uid, outline_level));

        for link in &row.predecessor_links {
            pending_links.push((uid, link.clone()));
        }

        tasks.push(task_record(row, uid, outline_level, parent_uid));
    }

    let task_uids: HashSet<i64> = tasks.iter().map(|t| t.uid).collect();

    let dependencies = pending_links
        .into_iter()
        .filter_map(|(successor_uid, link)| {
            let predecessor_uid = link.predecessor_uid.filter(|uid| *uid != 0)?;
            if !task_uids.contains(&predecessor_uid) {
                return None;
            }
            Some(ImportedDependency {
                predecessor_uid,
                successor_uid,
                link_type: LinkType::from_wire_code(link.link_type.unwrap_or(1)),
                // A wire lag of zero is indistinguishable from no lag
                lag_days: link
                    .link_lag
                    .filter(|lag| *lag != 0)
                    .map(time::decode_lag_days),
            })
        })
        .collect();

    let resources: Vec<ImportedResource> = wire_resources
        .iter()
        .filter_map(|row| {
            // UID 0 is the reserved unassigned resource; material and cost
            // resources are out of scope.
            let uid = row.uid.filter(|uid| *uid != 0)?;
            if row.resource_type.is_some_and(|t| t != RESOURCE_TYPE_WORK) {
                return None;
            }
            Some(ImportedResource {
                uid,
                name: row.name.clone().unwrap_or_default(),
                email: row.email_address.clone().filter(|e| !e.is_empty()),
            })
        })
        .collect();

    let resource_uids: HashSet<i64> = resources.iter().map(|r| r.uid).collect();

    let assignments = wire_assignments
        .iter()
        .filter_map(|row| {
            let task_uid = row.task_uid.filter(|uid| *uid != 0)?;
            let resource_uid = row.resource_uid.filter(|uid| *uid != 0)?;
            if !task_uids.contains(&task_uid) || !resource_uids.contains(&resource_uid) {
                return None;
            }
            Some(ImportedAssignment {
                task_uid,
                resource_uid,
                units_percent: row.units.unwrap_or(1.0) * 100.0,
                external_id: extended_attribute_value(
                    &row.extended_attributes,
                    ASSIGNMENT_EXTERNAL_ID_FIELD,
                ),
            })
        })
        .collect();

    Ok(ImportedProject {
        name: doc.name.or(doc.title).filter(|n| !n.is_empty()),
        start: doc.start_date.as_deref().and_then(time::parse_date),
        tasks,
        resources,
        assignments,
        dependencies,
    })
}

fn task_record(row: &XmlTask, uid: i64, outline_level: u32, parent_uid: Option<i64>) -> ImportedTask {
    let start = row.start.as_deref().and_then(time::parse_date);
    let finish = row.finish.as_deref().and_then(time::parse_date);

    ImportedTask {
        uid,
        row: row.id,
        name: row
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_TASK.to_string()),
        start,
        // The document's finish is the inclusive last working day; the
        // application convention is an exclusive day-after end.
        end: finish.and_then(|f| f.checked_add_days(Days::new(1))),
        duration_days: row
            .duration
            .as_deref()
            .and_then(time::decode_days)
            .unwrap_or(0.0),
        percent_complete: row.percent_complete.unwrap_or(0.0).clamp(0.0, 100.0),
        work_hours: row.work.as_deref().and_then(time::decode_hours).unwrap_or(0.0),
        outline_level,
        parent_uid,
        summary: row.summary.unwrap_or(0) != 0,
        milestone: row.milestone.unwrap_or(0) != 0,
        notes: row.notes.clone().filter(|n| !n.is_empty()),
        external_id: extended_attribute_value(&row.extended_attributes, TASK_EXTERNAL_ID_FIELD),
    }
}

/// Verifies the document opens with a `Project` element (any namespace
/// prefix) before handing it to the deserializer
fn require_project_root(xml: &str) -> Result<(), ImportError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() == b"Project" {
                    return Ok(());
                }
                return Err(ImportError::MissingRoot);
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Text(t) if t.unescape().map(|s| s.trim().is_empty()).unwrap_or(true) => {}
            _ => return Err(ImportError::MissingRoot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doc(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><Project xmlns=\"http://schemas.microsoft.com/project\">{}</Project>",
            body
        )
    }

    fn task_xml(uid: i64, name: &str, level: u32) -> String {
        format!(
            "<Task><UID>{uid}</UID><ID>{uid}</ID><Name>{name}</Name>\
             <Duration>PT8H0M0S</Duration><OutlineLevel>{level}</OutlineLevel>\
             <Summary>0</Summary><Milestone>0</Milestone></Task>"
        )
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(matches!(
            import_project("<Project><Tasks>"),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn ill_formedness_after_root_is_still_malformed() {
        // The root check passes; the deserializer finds the damage. Both
        // paths must report the same malformed-document error.
        assert!(matches!(
            import_project("<Project><Tasks><Task></Tasks></Project>"),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_wrong_root_element() {
        assert!(matches!(
            import_project("<NotAProject/>"),
            Err(ImportError::MissingRoot)
        ));
    }

    #[test]
    fn accepts_empty_project() {
        let result = import_project(&doc("")).unwrap();
        assert!(result.tasks.is_empty());
        assert!(result.resources.is_empty());
    }

    #[test]
    fn single_task_parses_as_singleton_list() {
        // One Task element, not a list: the repeatable-element handling
        // must not care.
        let xml = doc(&format!("<Tasks>{}</Tasks>", task_xml(1, "Only", 1)));
        let result = import_project(&xml).unwrap();
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].name, "Only");
        assert_eq!(result.tasks[0].duration_days, 1.0);
    }

    #[test]
    fn skips_synthetic_root_and_uidless_rows() {
        let xml = doc(&format!(
            "<Tasks>{}{}<Task><Name>No identity</Name></Task></Tasks>",
            task_xml(0, "Summary row", 1),
            task_xml(3, "Real", 1),
        ));
        let result = import_project(&xml).unwrap();
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].uid, 3);
    }

    #[test]
    fn unnamed_task_gets_placeholder() {
        let xml = doc("<Tasks><Task><UID>1</UID><Name></Name></Task></Tasks>");
        let result = import_project(&xml).unwrap();
        assert_eq!(result.tasks[0].name, UNNAMED_TASK);
        assert_eq!(result.tasks[0].outline_level, 1);
    }

    #[test]
    fn finish_converts_to_exclusive_end() {
        let xml = doc(
            "<Tasks><Task><UID>1</UID><Name>T</Name>\
             <Start>2024-01-01T08:00:00</Start><Finish>2024-01-03T17:00:00</Finish>\
             </Task></Tasks>",
        );
        let result = import_project(&xml).unwrap();
        assert_eq!(result.tasks[0].start, Some(date(2024, 1, 1)));
        assert_eq!(result.tasks[0].end, Some(date(2024, 1, 4)));
    }

    #[test]
    fn reconstructs_hierarchy_from_outline_levels() {
        let xml = doc(&format!(
            "<Tasks>{}{}{}{}{}</Tasks>",
            task_xml(1, "Root", 1),
            task_xml(2, "Child", 2),
            task_xml(3, "Grandchild", 3),
            task_xml(4, "Sibling of child", 2),
            task_xml(5, "Second root", 1),
        ));
        let result = import_project(&xml).unwrap();

        let parents: Vec<Option<i64>> = result.tasks.iter().map(|t| t.parent_uid).collect();
        assert_eq!(parents, vec![None, Some(1), Some(2), Some(1), None]);
    }

    #[test]
    fn outline_jump_attaches_to_nearest_shallower_task() {
        // Level 2 missing entirely: the level-3 task hangs off the level-1
        // task rather than failing.
        let xml = doc(&format!(
            "<Tasks>{}{}</Tasks>",
            task_xml(1, "Root", 1),
            task_xml(2, "Deep", 3),
        ));
        let result = import_project(&xml).unwrap();
        assert_eq!(result.tasks[1].parent_uid, Some(1));
        assert_eq!(result.tasks[1].outline_level, 3);
    }

    #[test]
    fn extracts_dependencies_with_wire_type_translation() {
        let xml = doc(&format!(
            "<Tasks>{}<Task><UID>2</UID><Name>B</Name><OutlineLevel>1</OutlineLevel>\
             <PredecessorLink><PredecessorUID>1</PredecessorUID><Type>1</Type>\
             <LinkLag>9600</LinkLag></PredecessorLink></Task></Tasks>",
            task_xml(1, "A", 1),
        ));
        let result = import_project(&xml).unwrap();

        let dep = &result.dependencies[0];
        assert_eq!(dep.predecessor_uid, 1);
        assert_eq!(dep.successor_uid, 2);
        assert_eq!(dep.link_type, LinkType::FinishToStart);
        assert!((dep.lag_days.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_lag_imports_as_absent() {
        let xml = doc(&format!(
            "<Tasks>{}<Task><UID>2</UID><Name>B</Name>\
             <PredecessorLink><PredecessorUID>1</PredecessorUID><Type>1</Type>\
             <LinkLag>0</LinkLag></PredecessorLink></Task></Tasks>",
            task_xml(1, "A", 1),
        ));
        let result = import_project(&xml).unwrap();
        assert_eq!(result.dependencies[0].lag_days, None);
    }

    #[test]
    fn dependency_on_unknown_task_is_dropped() {
        let xml = doc(
            "<Tasks><Task><UID>1</UID><Name>A</Name>\
             <PredecessorLink><PredecessorUID>99</PredecessorUID><Type>1</Type>\
             </PredecessorLink></Task></Tasks>",
        );
        let result = import_project(&xml).unwrap();
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn skips_non_work_and_reserved_resources() {
        let xml = doc(
            "<Resources>\
             <Resource><UID>0</UID><Name>Unassigned</Name></Resource>\
             <Resource><UID>1</UID><Name>Ada</Name><Type>1</Type>\
             <EmailAddress>ada@example.com</EmailAddress></Resource>\
             <Resource><UID>2</UID><Name>Cement</Name><Type>0</Type></Resource>\
             </Resources>",
        );
        let result = import_project(&xml).unwrap();
        assert_eq!(result.resources.len(), 1);
        assert_eq!(result.resources[0].name, "Ada");
        assert_eq!(result.resources[0].email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn assignment_units_decode_to_percent() {
        let xml = doc(&format!(
            "<Tasks>{}</Tasks>\
             <Resources><Resource><UID>1</UID><Name>Ada</Name></Resource></Resources>\
             <Assignments><Assignment><UID>1</UID><TaskUID>1</TaskUID>\
             <ResourceUID>1</ResourceUID><Units>0.5</Units></Assignment></Assignments>",
            task_xml(1, "A", 1),
        ));
        let result = import_project(&xml).unwrap();
        assert_eq!(result.assignments.len(), 1);
        assert!((result.assignments[0].units_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn assignment_with_unresolvable_reference_is_dropped() {
        let xml = doc(&format!(
            "<Tasks>{}</Tasks>\
             <Assignments><Assignment><UID>1</UID><TaskUID>1</TaskUID>\
             <ResourceUID>9</ResourceUID><Units>1</Units></Assignment>\
             <Assignment><UID>2</UID><TaskUID>0</TaskUID>\
             <ResourceUID>0</ResourceUID></Assignment></Assignments>",
            task_xml(1, "A", 1),
        ));
        let result = import_project(&xml).unwrap();
        assert!(result.assignments.is_empty());
    }

    #[test]
    fn external_id_is_found_by_numeric_key_only() {
        let xml = doc(
            "<Tasks><Task><UID>1</UID><Name>A</Name>\
             <ExtendedAttribute><FieldID>12345</FieldID><Value>decoy</Value></ExtendedAttribute>\
             <ExtendedAttribute><FieldID>188743731</FieldID><Value>abc-123</Value></ExtendedAttribute>\
             </Task><Task><UID>2</UID><Name>B</Name>\
             <ExtendedAttribute><FieldID>188743731</FieldID><Value></Value></ExtendedAttribute>\
             </Task></Tasks>",
        );
        let result = import_project(&xml).unwrap();
        assert_eq!(result.tasks[0].external_id.as_deref(), Some("abc-123"));
        // Empty value means "no external id", not an empty id
        assert_eq!(result.tasks[1].external_id, None);
    }

    #[test]
    fn reads_project_name_and_start() {
        let xml = doc("<Name>Apollo</Name><StartDate>2024-02-01T08:00:00</StartDate>");
        let result = import_project(&xml).unwrap();
        assert_eq!(result.name.as_deref(), Some("Apollo"));
        assert_eq!(result.start, Some(date(2024, 2, 1)));
    }

    #[test]
    fn document_flags_are_trusted_not_recomputed() {
        let xml = doc(
            "<Tasks><Task><UID>1</UID><Name>Odd</Name><Duration>PT8H0M0S</Duration>\
             <Summary>1</Summary><Milestone>1</Milestone></Task></Tasks>",
        );
        let result = import_project(&xml).unwrap();
        assert!(result.tasks[0].summary);
        assert!(result.tasks[0].milestone);
    }
}
