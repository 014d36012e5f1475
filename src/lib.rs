//! mspx - Gantt project data to MS Project XML and back
//!
//! mspx translates between a flat-record project model (tasks with parent
//! pointers, resources, assignments, dependency links) and the MSPDI XML
//! interchange format understood by desktop project-management tools.
//! Round-trips are identity-preserving: exported documents carry the
//! originating system's durable ids in reserved custom fields, so a
//! re-imported document updates existing records instead of duplicating them.

pub mod domain;
pub mod mspdi;
pub mod cli;

pub use domain::{
    Assignment, DependencyLink, ImportedProject, LinkType, ProjectSnapshot, Resource, Task,
};
pub use mspdi::{export_project, import_project, ExportError, ImportError};
