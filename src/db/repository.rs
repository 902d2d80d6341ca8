//! Name-based lookups and generic CRUD, shared by both kinds.
//!
//! Names are expected to be unique within a kind but the store does not
//! enforce it. Wherever an operation needs exactly one record, more than one
//! match is reported as a conflict; the repository never picks one.

use std::fmt;
use std::marker::PhantomData;

use rusqlite::Connection;

use super::entity::{EntityKind, MinionEntity, ParentEntity, Record};
use super::session::{OnFailure, Session};
use crate::error::{Error, Result};

pub type ParentRepository = Repository<ParentEntity>;
pub type MinionRepository = Repository<MinionEntity>;

pub struct Repository<K> {
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for Repository<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Repository<K> {}

impl<K: Record> fmt::Debug for Repository<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").field("kind", &K::KIND).finish()
    }
}

impl<K: Record> Default for Repository<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Record> Repository<K> {
    pub const fn new() -> Self {
        Self { _kind: PhantomData }
    }

    /// Every record of this kind, or only those whose name matches exactly.
    ///
    /// Returns an empty list when nothing matches.
    pub fn find_by_name(&self, conn: &Connection, name: Option<&str>) -> Result<Vec<K>> {
        let records = match name {
            Some(name) => {
                let mut stmt =
                    conn.prepare(&format!("{} WHERE x.name = ?1 ORDER BY x.id", K::SELECT))?;
                let records = stmt
                    .query_map([name], K::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                records
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY x.id", K::SELECT))?;
                let records = stmt
                    .query_map([], K::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                records
            }
        };

        tracing::debug!(
            kind = %K::KIND,
            name = ?name,
            matches = records.len(),
            "Looked up records"
        );
        Ok(records)
    }

    /// The single record with this name.
    ///
    /// Fails with `NotFound` when there is none and `Conflict` when the name
    /// is shared by several records.
    pub fn find_unique(&self, conn: &Connection, name: &str) -> Result<K> {
        let mut records = self.find_by_name(conn, Some(name))?;
        match records.len() {
            0 => Err(Error::NotFound(format!(
                "No {} found with name {}",
                K::KIND,
                name
            ))),
            1 => Ok(records.remove(0)),
            n => Err(Error::Conflict(format!(
                "More than one {} found with name {} ({} matches)",
                K::KIND,
                name,
                n
            ))),
        }
    }

    /// Insert inside the caller's unit of work.
    pub fn insert(&self, conn: &Connection, record: &mut K) -> Result<i64> {
        record.insert(conn)
    }

    /// Insert as its own unit of work.
    ///
    /// The transaction is committed on every path, so a failed insert still
    /// releases it; the error is reported to the caller.
    pub fn persist(&self, session: &mut Session<'_>, record: &mut K) -> Result<i64> {
        let uow = session.begin(OnFailure::Commit, "persist")?;

        match record.insert(&uow) {
            Ok(id) => {
                uow.commit()?;
                tracing::info!("Persisted {} {} (id {})", K::KIND, record.name(), id);
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Failed to persist {} {}: {}", K::KIND, record.name(), e);
                Err(e)
            }
        }
    }

    /// Delete every record of this kind, or the one with this name.
    ///
    /// The batch is committed once. A delete that fails partway still commits
    /// what was removed before it. Returns the number of records removed.
    pub fn remove(&self, session: &mut Session<'_>, name: Option<&str>) -> Result<usize> {
        let uow = session.begin(OnFailure::Commit, "remove")?;
        let records = self.find_by_name(&uow, name)?;

        if records.is_empty() {
            tracing::warn!("No {} matches in store with name {:?}", K::KIND, name);
            uow.commit()?;
            return Ok(0);
        }

        if let Some(name) = name {
            if records.len() > 1 {
                return Err(Error::Conflict(format!(
                    "More than one {} found with name {} ({} matches), refusing to delete",
                    K::KIND,
                    name,
                    records.len()
                )));
            }
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1", K::TABLE);
        let mut removed = 0;
        for id in records.iter().filter_map(|record| record.id()) {
            match uow.execute(&sql, [id]) {
                Ok(rows) => removed += rows,
                Err(e) => {
                    tracing::error!("Failed to remove {} {}: {}", K::KIND, id, e);
                    return Err(e.into());
                }
            }
        }

        uow.commit()?;
        tracing::info!("Removed {} {} record(s)", removed, K::KIND);
        Ok(removed)
    }

    /// Find the record by name, apply the fields present in `changes`, merge.
    ///
    /// Runs as one unit of work; any failure leaves the stored record as it was.
    pub fn update(&self, session: &mut Session<'_>, name: &str, changes: K::Changes) -> Result<K> {
        let uow = session.begin(OnFailure::Rollback, "update")?;
        let mut record = self.find_unique(&uow, name)?;

        if let Some(new_name) = K::renamed_to(&changes) {
            if new_name != record.name() && !self.find_by_name(&uow, Some(new_name))?.is_empty() {
                return Err(Error::Conflict(format!(
                    "{} with name {} already exists",
                    K::KIND,
                    new_name
                )));
            }
        }

        record.apply(&uow, changes)?;
        record.merge(&uow)?;
        uow.commit()?;

        tracing::info!("Updated {} {}", K::KIND, name);
        Ok(record)
    }
}

/// Remove by kind and name.
///
/// With no kind this deletes every record in the store, parents and minions
/// alike. A name without a kind is rejected.
pub fn remove(
    session: &mut Session<'_>,
    kind: Option<EntityKind>,
    name: Option<&str>,
) -> Result<usize> {
    match (kind, name) {
        (Some(EntityKind::Parent), name) => ParentRepository::new().remove(session, name),
        (Some(EntityKind::Minion), name) => MinionRepository::new().remove(session, name),
        (None, Some(name)) => Err(Error::InvalidInput(format!(
            "A kind is required to remove records named {}",
            name
        ))),
        (None, None) => remove_everything(session),
    }
}

fn remove_everything(session: &mut Session<'_>) -> Result<usize> {
    tracing::warn!("Deleting ALL records in the store");

    let uow = session.begin(OnFailure::Commit, "remove everything")?;
    let minions = uow.execute(&format!("DELETE FROM {}", MinionEntity::TABLE), [])?;
    let parents = uow.execute(&format!("DELETE FROM {}", ParentEntity::TABLE), [])?;
    uow.commit()?;

    tracing::info!("Removed {} parent(s) and {} minion(s)", parents, minions);
    Ok(parents + minions)
}
