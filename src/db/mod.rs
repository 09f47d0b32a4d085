//! SQLite persistence for raw sales rows.
//!
//! Rows are stored as received and normalized when read back.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{compute_row_key, Repository};
