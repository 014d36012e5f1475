//! Exporter: project snapshot to MSPDI document
//!
//! A single pass over the snapshot: build the forest, number tasks in
//! document order (UID 1..), compute outline levels and summary/milestone
//! flags from structure, resolve the project date window, then emit the
//! document around a synthetic UID-0 project summary row and the fixed
//! standard calendar. Missing optional data never fails an export; every
//! field has a defined fallback.

use std::collections::HashMap;

use chrono::{Days, Local, NaiveDate};
use quick_xml::se::Serializer;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{DependencyLink, ProjectSnapshot, Task, TaskForest};

use super::schema::{
    self, XmlAssignment, XmlAssignments, XmlExtendedAttribute, XmlPredecessorLink, XmlProject,
    XmlResource, XmlResources, XmlTask, XmlTasks, ASSIGNMENT_EXTERNAL_ID_FIELD, PROJECT_XMLNS,
    RESOURCE_TYPE_WORK, TASK_EXTERNAL_ID_FIELD,
};
use super::time;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize project document: {0}")]
    Serialize(#[from] quick_xml::SeError),
}

/// Serializes a project snapshot to a complete MSPDI document
pub fn export_project(snapshot: &ProjectSnapshot) -> Result<String, ExportError> {
    let forest = TaskForest::build(&snapshot.tasks);
    let entries = forest.ordered();

    // Sequential document identities, assigned in document order. UID 0 is
    // the synthetic project summary row.
    let mut uid_of_entry: Vec<i64> = Vec::with_capacity(entries.len());
    let mut uid_by_task_id: HashMap<&str, i64> = HashMap::new();
    for (pos, entry) in entries.iter().enumerate() {
        let uid = pos as i64 + 1;
        uid_of_entry.push(uid);
        uid_by_task_id
            .entry(snapshot.tasks[entry.index].id.as_str())
            .or_insert(uid);
    }

    let (project_start, project_finish) = project_window(snapshot);

    let mut links_by_successor: HashMap<&str, Vec<&DependencyLink>> = HashMap::new();
    for dep in &snapshot.dependencies {
        links_by_successor
            .entry(dep.successor.as_str())
            .or_default()
            .push(dep);
    }

    let mut xml_tasks = Vec::with_capacity(entries.len() + 1);
    xml_tasks.push(project_summary_row(snapshot, project_start, project_finish));
    for (pos, entry) in entries.iter().enumerate() {
        let task = &snapshot.tasks[entry.index];
        xml_tasks.push(task_row(
            task,
            uid_of_entry[pos],
            entry.outline_level,
            forest.is_summary(entry.index),
            links_by_successor.get(task.id.as_str()),
            &uid_by_task_id,
        ));
    }

    let mut resource_uid_by_id: HashMap<&str, i64> = HashMap::new();
    let mut xml_resources = Vec::with_capacity(snapshot.resources.len());
    for (pos, resource) in snapshot.resources.iter().enumerate() {
        let uid = pos as i64 + 1;
        resource_uid_by_id.entry(resource.id.as_str()).or_insert(uid);
        xml_resources.push(XmlResource {
            uid: Some(uid),
            id: Some(uid),
            name: Some(resource.name.clone()),
            resource_type: Some(RESOURCE_TYPE_WORK),
            email_address: resource.email.clone(),
        });
    }

    let mut xml_assignments = Vec::with_capacity(snapshot.assignments.len());
    for assignment in &snapshot.assignments {
        // References outside the document are dropped, same as dependency
        // links.
        let (Some(&task_uid), Some(&resource_uid)) = (
            uid_by_task_id.get(assignment.task.as_str()),
            resource_uid_by_id.get(assignment.resource.as_str()),
        ) else {
            continue;
        };
        let external = assignment
            .external_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| vec![XmlExtendedAttribute::new(ASSIGNMENT_EXTERNAL_ID_FIELD, v)])
            .unwrap_or_default();
        xml_assignments.push(XmlAssignment {
            uid: Some(xml_assignments.len() as i64 + 1),
            task_uid: Some(task_uid),
            resource_uid: Some(resource_uid),
            units: Some(assignment.units_percent / 100.0),
            extended_attributes: external,
        });
    }

    let document = XmlProject {
        xmlns: PROJECT_XMLNS.to_string(),
        name: snapshot.name.clone(),
        title: snapshot.name.clone(),
        start_date: Some(time::encode_date(project_start)),
        finish_date: Some(time::encode_date(project_finish)),
        calendar_uid: Some(1),
        extended_attributes: Some(schema::external_id_definitions()),
        calendars: Some(schema::standard_calendar()),
        tasks: Some(XmlTasks { tasks: xml_tasks }),
        resources: Some(XmlResources {
            resources: xml_resources,
        }),
        assignments: Some(XmlAssignments {
            assignments: xml_assignments,
        }),
    };

    let mut body = String::new();
    let mut serializer = Serializer::with_root(&mut body, Some("Project"))?;
    serializer.indent(' ', 2);
    document.serialize(serializer)?;

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n{}",
        body
    ))
}

/// Resolves the project start/finish window from explicit dates, task
/// dates, or the current date as last resort
fn project_window(snapshot: &ProjectSnapshot) -> (NaiveDate, NaiveDate) {
    let start = snapshot
        .start
        .or_else(|| snapshot.tasks.iter().filter_map(|t| t.start).min())
        .unwrap_or_else(|| Local::now().date_naive());

    let finish = snapshot
        .tasks
        .iter()
        .filter_map(|t| inclusive_finish(t.start, t.end))
        .max()
        .or_else(|| snapshot.tasks.iter().filter_map(|t| t.start).max())
        .unwrap_or(start)
        .max(start);

    (start, finish)
}

/// Converts an exclusive end date to the inclusive last working day,
/// clamped so the finish never precedes the start
fn inclusive_finish(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<NaiveDate> {
    let end = end?;
    let finish = end.checked_sub_days(Days::new(1)).unwrap_or(end);
    Some(match start {
        Some(start) if finish < start => start,
        _ => finish,
    })
}

fn project_summary_row(
    snapshot: &ProjectSnapshot,
    start: NaiveDate,
    finish: NaiveDate,
) -> XmlTask {
    let span_days = (finish - start).num_days() + 1;
    XmlTask {
        uid: Some(0),
        id: Some(0),
        name: snapshot.name.clone(),
        start: Some(time::encode_date(start)),
        finish: Some(time::encode_date(finish)),
        duration: Some(time::encode_days(span_days as f64)),
        work: Some(time::encode_hours(0.0)),
        percent_complete: Some(0.0),
        outline_level: Some(0),
        summary: Some(1),
        milestone: Some(0),
        notes: None,
        predecessor_links: Vec::new(),
        extended_attributes: Vec::new(),
    }
}

/// Builds one task row
///
/// Percent complete is rounded to a whole number on the wire; the format
/// carries integer percentages, so fractional progress does not round-trip
/// exactly.
fn task_row(
    task: &Task,
    uid: i64,
    outline_level: u32,
    is_summary: bool,
    links: Option<&Vec<&DependencyLink>>,
    uid_by_task_id: &HashMap<&str, i64>,
) -> XmlTask {
    let duration_days = task.effective_duration_days();
    // A summary row is never a milestone, even at zero duration
    let is_milestone = !is_summary && duration_days.unwrap_or(0.0) == 0.0;

    let predecessor_links = links
        .into_iter()
        .flatten()
        .filter_map(|dep| {
            // Links pointing outside the document are dropped
            let predecessor_uid = *uid_by_task_id.get(dep.predecessor.as_str())?;
            Some(XmlPredecessorLink {
                predecessor_uid: Some(predecessor_uid),
                link_type: Some(dep.link_type.wire_code() as i64),
                link_lag: dep
                    .lag_days
                    .filter(|lag| *lag != 0.0)
                    .map(time::encode_lag_days),
            })
        })
        .collect();

    let external = task
        .external_id
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| vec![XmlExtendedAttribute::new(TASK_EXTERNAL_ID_FIELD, v)])
        .unwrap_or_default();

    XmlTask {
        uid: Some(uid),
        id: Some(uid),
        name: Some(task.name.clone()),
        start: task.start.map(time::encode_date),
        finish: inclusive_finish(task.start, task.end).map(time::encode_date),
        duration: Some(time::encode_days(duration_days.unwrap_or(0.0))),
        work: Some(time::encode_hours(task.work_hours.unwrap_or(0.0))),
        percent_complete: Some(task.percent_complete.clamp(0.0, 100.0).round()),
        outline_level: Some(outline_level as i64),
        summary: Some(i64::from(is_summary)),
        milestone: Some(i64::from(is_milestone)),
        notes: task.notes.clone(),
        predecessor_links,
        extended_attributes: external,
    }
}
