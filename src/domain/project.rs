//! Project record types
//!
//! Two families live here. The `ProjectSnapshot` side is what the exporter
//! consumes: flat records with caller-assigned string ids and the Gantt
//! convention that `end` is exclusive (the day after the last working day).
//! The `Imported*` side is what the importer produces: flat records keyed by
//! document-scoped integer UIDs, which have no meaning outside a single
//! document. The optional `external_id` tag is the only identity that
//! survives across documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dependency relationship between two tasks
///
/// The application and the wire format number these differently, so the
/// codes are kept as two explicit lookup tables rather than a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Predecessor must finish before successor starts
    #[default]
    FinishToStart,
    /// Both tasks start together
    StartToStart,
    /// Both tasks finish together
    FinishToFinish,
    /// Predecessor must start before successor finishes
    StartToFinish,
}

impl LinkType {
    /// Application-level integer code (0=SS, 1=SF, 2=FS, 3=FF)
    pub fn app_code(self) -> u8 {
        match self {
            LinkType::StartToStart => 0,
            LinkType::StartToFinish => 1,
            LinkType::FinishToStart => 2,
            LinkType::FinishToFinish => 3,
        }
    }

    /// Parses an application-level integer code
    pub fn from_app_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LinkType::StartToStart),
            1 => Some(LinkType::StartToFinish),
            2 => Some(LinkType::FinishToStart),
            3 => Some(LinkType::FinishToFinish),
            _ => None,
        }
    }

    /// MSPDI wire integer code (0=FF, 1=FS, 2=SF, 3=SS)
    pub fn wire_code(self) -> u8 {
        match self {
            LinkType::FinishToFinish => 0,
            LinkType::FinishToStart => 1,
            LinkType::StartToFinish => 2,
            LinkType::StartToStart => 3,
        }
    }

    /// Parses an MSPDI wire code, falling back to the format's own default
    /// link type (finish-to-start) for out-of-range values
    pub fn from_wire_code(code: i64) -> Self {
        match code {
            0 => LinkType::FinishToFinish,
            2 => LinkType::StartToFinish,
            3 => LinkType::StartToStart,
            _ => LinkType::FinishToStart,
        }
    }

    /// Returns a display label for the link type
    pub fn label(&self) -> &'static str {
        match self {
            LinkType::FinishToStart => "FS",
            LinkType::StartToStart => "SS",
            LinkType::FinishToFinish => "FF",
            LinkType::StartToFinish => "SF",
        }
    }
}

/// A task as supplied by the caller
///
/// Hierarchy is kept as parent pointers scattered across flat records; the
/// exporter builds a tree from them on demand (see [`super::TaskForest`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Caller-assigned id, referenced by assignments, dependencies and
    /// other tasks' parent pointers. Scoped to one snapshot.
    pub id: String,

    /// Display name
    pub name: String,

    /// First working day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    /// Exclusive end: the day after the last working day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,

    /// Duration in working days (8 hours each); may be fractional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<f64>,

    /// Percent complete, 0-100
    #[serde(default)]
    pub percent_complete: f64,

    /// Effort in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<f64>,

    /// Parent task id; a dangling reference promotes the task to root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Durable id in the originating store, carried through the document
    /// in a reserved custom field for round-trip reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl Task {
    /// Creates a task with the given id and name and all optional fields
    /// empty
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start: None,
            end: None,
            duration_days: None,
            percent_complete: 0.0,
            work_hours: None,
            parent: None,
            notes: None,
            external_id: None,
        }
    }

    /// Duration in days, falling back to the inclusive span between the
    /// start and exclusive end dates when no explicit duration is set
    pub fn effective_duration_days(&self) -> Option<f64> {
        if self.duration_days.is_some() {
            return self.duration_days;
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) if end > start => {
                Some((end - start).num_days() as f64)
            }
            _ => None,
        }
    }
}

/// A work resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Caller-assigned id, scoped to one snapshot
    pub id: String,

    /// Display name
    pub name: String,

    /// Contact address, doubling as a natural external key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Allocation of a resource to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub task: String,
    pub resource: String,

    /// Allocation percentage, 0-100
    #[serde(default = "default_units")]
    pub units_percent: f64,

    /// Durable id for round-trip reconciliation, as on [`Task`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

fn default_units() -> f64 {
    100.0
}

/// A dependency between two tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyLink {
    pub predecessor: String,
    pub successor: String,

    #[serde(rename = "type", default)]
    pub link_type: LinkType,

    /// Lag in working days, signed. By long-standing convention a lag of
    /// exactly zero is treated the same as no lag and omitted from the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag_days: Option<f64>,
}

/// Everything the exporter needs: a read-only snapshot of the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Explicit project start; derived from task dates when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    /// Flat task records in document order (parents before children is not
    /// required; the forest pass orders them)
    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default)]
    pub assignments: Vec<Assignment>,

    #[serde(default)]
    pub dependencies: Vec<DependencyLink>,
}

/// A task parsed out of an interchange document
///
/// Still flat: `parent_uid` and `outline_level` describe the hierarchy, but
/// no tree is materialized. The caller remaps `uid` to durable storage ids
/// (keyed by `external_id` where present) before resolving references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedTask {
    /// Document-scoped UID
    pub uid: i64,

    /// Row number in the document, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i64>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    /// Exclusive end, converted from the document's inclusive finish date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,

    pub duration_days: f64,
    pub percent_complete: f64,
    pub work_hours: f64,

    /// Depth in the hierarchy, root = 1
    pub outline_level: u32,

    /// UID of the parent task, reconstructed from outline levels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<i64>,

    /// The document's own summary flag, trusted as-is
    pub summary: bool,

    /// The document's own milestone flag, trusted as-is
    pub milestone: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Durable id recovered from the reserved custom field; `None` means
    /// this row has no counterpart in the originating store yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// A work resource parsed out of an interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub uid: i64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An assignment parsed out of an interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedAssignment {
    pub task_uid: i64,
    pub resource_uid: i64,

    /// Allocation percentage, 0-100 (the wire carries a 0-1 fraction)
    pub units_percent: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// A dependency parsed out of an interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedDependency {
    pub predecessor_uid: i64,
    pub successor_uid: i64,

    #[serde(rename = "type")]
    pub link_type: LinkType,

    /// Lag in working days; absent when the wire omitted the lag or carried
    /// an explicit zero (the two are indistinguishable on the wire)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag_days: Option<f64>,
}

/// Result of importing an interchange document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportedProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default)]
    pub tasks: Vec<ImportedTask>,

    #[serde(default)]
    pub resources: Vec<ImportedResource>,

    #[serde(default)]
    pub assignments: Vec<ImportedAssignment>,

    #[serde(default)]
    pub dependencies: Vec<ImportedDependency>,
}
