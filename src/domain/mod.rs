//! Domain models for mspx
//!
//! Contains the project record types on both sides of the codec, without any
//! I/O concerns. Application-side records use caller-assigned string ids;
//! wire-side records use document-scoped integer UIDs.

mod forest;
mod project;

pub use forest::{ForestEntry, TaskForest};
pub use project::{
    Assignment, DependencyLink, ImportedAssignment, ImportedDependency, ImportedProject,
    ImportedResource, ImportedTask, LinkType, ProjectSnapshot, Resource, Task,
};
