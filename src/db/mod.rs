//! Report persistence.
//!
//! - **Turso/libsql**: local SQLite file or in-memory database
//! - **In-memory map**: tests and one-shot CLI runs

pub mod traits;
pub mod turso;

pub use traits::{InMemoryReportStore, ReportStore};
pub use turso::TursoClient;
