//! MSPDI interchange codec
//!
//! Translates between the domain records and the MS Project XML interchange
//! schema (MSPDI). `export_project` serializes a snapshot to a complete
//! document; `import_project` parses a document back into flat records.
//! Both are synchronous single-pass transformations over call-scoped data.

mod export;
mod import;
pub mod schema;
pub mod time;

pub use export::{export_project, ExportError};
pub use import::{import_project, ImportError};
