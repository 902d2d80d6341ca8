use crate::convert::{require_name, Convert};
use crate::db::{EntityKind, OnFailure, ParentRepository, Session};
use crate::error::Result;
use crate::models::Parent;

use super::ensure_name_free;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParentService {
    repo: ParentRepository,
}

impl ParentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// All parents, or the ones with this name.
    pub fn get(&self, session: &Session<'_>, name: Option<&str>) -> Result<Vec<Parent>> {
        let entities = self.repo.find_by_name(session.conn(), name)?;
        Ok(entities.iter().map(Parent::from_entity).collect())
    }

    /// Store a new parent and return the element as given.
    ///
    /// The duplicate check and the insert share one unit of work.
    pub fn create(&self, session: &mut Session<'_>, parent: Parent) -> Result<Parent> {
        let name = require_name(parent.name.as_deref(), EntityKind::Parent)?;

        let uow = session.begin(OnFailure::Rollback, "create parent")?;
        ensure_name_free(&self.repo, &uow, name)?;

        let mut entity = parent.to_entity()?;
        self.repo.insert(&uow, &mut entity)?;
        uow.commit()?;

        tracing::info!("Created parent {}", name);
        Ok(parent)
    }

    pub fn update(&self, session: &mut Session<'_>, name: &str, changes: Parent) -> Result<Parent> {
        let entity = self.repo.update(session, name, changes)?;
        Ok(Parent::from_entity(&entity))
    }

    /// Delete parents, and with them every minion they own.
    pub fn delete(&self, session: &mut Session<'_>, name: Option<&str>) -> Result<usize> {
        self.repo.remove(session, name)
    }
}
