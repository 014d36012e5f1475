//! Serde wire model for the MSPDI document tree
//!
//! Field order inside each struct is emission order. Every repeatable
//! element is a `#[serde(default)]` `Vec`, which uniformly normalizes the
//! wire's absent / single / list shapes to a list. Scalar fields go through
//! the `lenient` deserializers so a malformed number degrades to "absent"
//! instead of failing the whole parse; only structural XML problems abort an
//! import.

use serde::{Deserialize, Serialize};

/// Default namespace of MSPDI documents
pub const PROJECT_XMLNS: &str = "http://schemas.microsoft.com/project";

/// Reserved custom-field key (task Text1) carrying a task's durable
/// external id across round-trips
pub const TASK_EXTERNAL_ID_FIELD: i64 = 188_743_731;

/// Reserved custom-field key (assignment Text1) carrying an assignment's
/// durable external id across round-trips
pub const ASSIGNMENT_EXTERNAL_ID_FIELD: i64 = 255_852_546;

/// Resource type code for work resources; material and cost resources are
/// ignored on import
pub const RESOURCE_TYPE_WORK: i64 = 1;

/// Tolerant scalar deserializers: element content that fails to parse is
/// treated as absent, per the codec's never-fail-on-a-field contract.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    pub fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.trim().parse().ok()))
    }

    pub fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.trim().parse().ok()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlProject {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "String::is_empty")]
    pub xmlns: String,

    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "StartDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(rename = "FinishDate", default, skip_serializing_if = "Option::is_none")]
    pub finish_date: Option<String>,

    #[serde(
        rename = "CalendarUID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub calendar_uid: Option<i64>,

    // Header sections are write-only: importers identify custom fields by
    // numeric key, not by these declarations.
    #[serde(
        rename = "ExtendedAttributes",
        default,
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    pub extended_attributes: Option<XmlExtendedAttributeDefs>,

    #[serde(
        rename = "Calendars",
        default,
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    pub calendars: Option<XmlCalendars>,

    #[serde(rename = "Tasks", default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<XmlTasks>,

    #[serde(rename = "Resources", default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<XmlResources>,

    #[serde(rename = "Assignments", default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<XmlAssignments>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlTasks {
    #[serde(rename = "Task", default)]
    pub tasks: Vec<XmlTask>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlTask {
    #[serde(
        rename = "UID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub uid: Option<i64>,

    #[serde(
        rename = "ID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,

    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Start", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(rename = "Finish", default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,

    #[serde(rename = "Duration", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "Work", default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,

    #[serde(
        rename = "PercentComplete",
        default,
        deserialize_with = "lenient::float",
        skip_serializing_if = "Option::is_none"
    )]
    pub percent_complete: Option<f64>,

    #[serde(
        rename = "OutlineLevel",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub outline_level: Option<i64>,

    #[serde(
        rename = "Summary",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<i64>,

    #[serde(
        rename = "Milestone",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub milestone: Option<i64>,

    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        rename = "PredecessorLink",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub predecessor_links: Vec<XmlPredecessorLink>,

    #[serde(
        rename = "ExtendedAttribute",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub extended_attributes: Vec<XmlExtendedAttribute>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlPredecessorLink {
    #[serde(
        rename = "PredecessorUID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub predecessor_uid: Option<i64>,

    #[serde(
        rename = "Type",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_type: Option<i64>,

    #[serde(
        rename = "LinkLag",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_lag: Option<i64>,
}

/// A custom-field value attached to a task or assignment row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlExtendedAttribute {
    #[serde(
        rename = "FieldID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_id: Option<i64>,

    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl XmlExtendedAttribute {
    pub fn new(field_id: i64, value: impl Into<String>) -> Self {
        Self {
            field_id: Some(field_id),
            value: Some(value.into()),
        }
    }
}

/// Finds a non-empty custom-field value by its reserved numeric key
///
/// Lookup is by `FieldID` only; field-name aliasing is not reliable across
/// producers. An empty value counts as absent so "no external id" never
/// turns into an empty-string id.
pub fn extended_attribute_value(attrs: &[XmlExtendedAttribute], field_id: i64) -> Option<String> {
    attrs
        .iter()
        .find(|a| a.field_id == Some(field_id))
        .and_then(|a| a.value.clone())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlResources {
    #[serde(rename = "Resource", default)]
    pub resources: Vec<XmlResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlResource {
    #[serde(
        rename = "UID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub uid: Option<i64>,

    #[serde(
        rename = "ID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,

    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        rename = "Type",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<i64>,

    #[serde(rename = "EmailAddress", default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlAssignments {
    #[serde(rename = "Assignment", default)]
    pub assignments: Vec<XmlAssignment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlAssignment {
    #[serde(
        rename = "UID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub uid: Option<i64>,

    #[serde(
        rename = "TaskUID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_uid: Option<i64>,

    #[serde(
        rename = "ResourceUID",
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_uid: Option<i64>,

    #[serde(
        rename = "Units",
        default,
        deserialize_with = "lenient::float",
        skip_serializing_if = "Option::is_none"
    )]
    pub units: Option<f64>,

    #[serde(
        rename = "ExtendedAttribute",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub extended_attributes: Vec<XmlExtendedAttribute>,
}

/// Header declaration of the reserved custom fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlExtendedAttributeDefs {
    #[serde(rename = "ExtendedAttribute", default)]
    pub definitions: Vec<XmlExtendedAttributeDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlExtendedAttributeDef {
    #[serde(rename = "FieldID", default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,

    #[serde(rename = "FieldName", default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    #[serde(rename = "Alias", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Declares the two identity-bridge fields in the document header
pub fn external_id_definitions() -> XmlExtendedAttributeDefs {
    XmlExtendedAttributeDefs {
        definitions: vec![
            XmlExtendedAttributeDef {
                field_id: Some(TASK_EXTERNAL_ID_FIELD),
                field_name: Some("Text1".to_string()),
                alias: Some("External Task ID".to_string()),
            },
            XmlExtendedAttributeDef {
                field_id: Some(ASSIGNMENT_EXTERNAL_ID_FIELD),
                field_name: Some("Text1".to_string()),
                alias: Some("External Assignment ID".to_string()),
            },
        ],
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlCalendars {
    #[serde(rename = "Calendar", default)]
    pub calendars: Vec<XmlCalendar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlCalendar {
    #[serde(rename = "UID")]
    pub uid: i64,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "IsBaseCalendar")]
    pub is_base_calendar: i64,

    #[serde(rename = "WeekDays")]
    pub week_days: XmlWeekDays,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlWeekDays {
    #[serde(rename = "WeekDay", default)]
    pub week_days: Vec<XmlWeekDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlWeekDay {
    #[serde(rename = "DayType")]
    pub day_type: i64,

    #[serde(rename = "DayWorking")]
    pub day_working: i64,

    #[serde(rename = "WorkingTimes", skip_serializing_if = "Option::is_none")]
    pub working_times: Option<XmlWorkingTimes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlWorkingTimes {
    #[serde(rename = "WorkingTime", default)]
    pub working_times: Vec<XmlWorkingTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XmlWorkingTime {
    #[serde(rename = "FromTime")]
    pub from_time: String,

    #[serde(rename = "ToTime")]
    pub to_time: String,
}

/// The fixed standard calendar: five 8-hour days, weekends off
///
/// MSPDI day types run 1 (Sunday) through 7 (Saturday).
pub fn standard_calendar() -> XmlCalendars {
    let working_times = XmlWorkingTimes {
        working_times: vec![
            XmlWorkingTime {
                from_time: "08:00:00".to_string(),
                to_time: "12:00:00".to_string(),
            },
            XmlWorkingTime {
                from_time: "13:00:00".to_string(),
                to_time: "17:00:00".to_string(),
            },
        ],
    };

    let week_days = (1..=7)
        .map(|day_type| {
            let working = day_type != 1 && day_type != 7;
            XmlWeekDay {
                day_type,
                day_working: i64::from(working),
                working_times: working.then(|| working_times.clone()),
            }
        })
        .collect();

    XmlCalendars {
        calendars: vec![XmlCalendar {
            uid: 1,
            name: "Standard".to_string(),
            is_base_calendar: 1,
            week_days: XmlWeekDays {
                week_days,
            },
        }],
    }
}
