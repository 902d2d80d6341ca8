//! Create, read, update and delete for each kind.
//!
//! Services orchestrate the repository and the converters. Every call takes
//! the caller's [`Session`](crate::db::Session); mutating calls run as exactly
//! one unit of work inside it.

mod minion;
mod parent;

pub use minion::MinionService;
pub use parent::ParentService;

use rusqlite::Connection;

use crate::db::{Record, Repository};
use crate::error::{Error, Result};

/// Refuse a create when the kind already has a record with this name.
fn ensure_name_free<K: Record>(repo: &Repository<K>, conn: &Connection, name: &str) -> Result<()> {
    let existing = repo.find_by_name(conn, Some(name))?;
    if existing.is_empty() {
        Ok(())
    } else {
        Err(Error::Conflict(format!(
            "{} with name {} already exists",
            K::KIND,
            name
        )))
    }
}
