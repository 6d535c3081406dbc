//! `envforge-repository`: property source providers.
//!
//! Provides a table-backed [`PropertySourceProvider`](envforge_core::PropertySourceProvider)
//! whose rows can be loaded from YAML data files.

pub mod error;
pub mod io;
pub mod table;

pub use error::RepositoryError;
pub use io::{load_table, parse_table, SourceEntry, TableFile};
pub use table::{PropertyRow, PropertyTable, TableSettings};
