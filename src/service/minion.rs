use crate::convert::{require_name, Convert};
use crate::db::{EntityKind, MinionRepository, OnFailure, ParentRepository, Session};
use crate::error::{Error, Result};
use crate::models::Minion;

use super::ensure_name_free;

#[derive(Debug, Clone, Copy, Default)]
pub struct MinionService {
    repo: MinionRepository,
    parents: ParentRepository,
}

impl MinionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// All minions, or the ones with this name.
    pub fn get(&self, session: &Session<'_>, name: Option<&str>) -> Result<Vec<Minion>> {
        let entities = self.repo.find_by_name(session.conn(), name)?;
        Ok(entities.iter().map(Minion::from_entity).collect())
    }

    /// Store a new minion under the parent named by `parentName`.
    ///
    /// The duplicate check, the parent lookup and the insert share one unit
    /// of work, so the minion is never visible without its parent.
    pub fn create(&self, session: &mut Session<'_>, minion: Minion) -> Result<Minion> {
        let name = require_name(minion.name.as_deref(), EntityKind::Minion)?;

        let uow = session.begin(OnFailure::Rollback, "create minion")?;
        ensure_name_free(&self.repo, &uow, name)?;

        let mut entity = minion.to_entity()?;
        let parent_name = minion.parent_name.as_deref().ok_or_else(|| {
            Error::InvalidInput(
                "The parentName parameter is mandatory when creating a Minion".to_string(),
            )
        })?;
        let parent = self.parents.find_unique(&uow, parent_name)?;
        entity.attach(&parent)?;

        self.repo.insert(&uow, &mut entity)?;
        uow.commit()?;

        tracing::info!("Created minion {} under parent {}", name, parent_name);
        Ok(minion)
    }

    /// Partial update; a new `parentName` moves the minion to that parent.
    pub fn update(&self, session: &mut Session<'_>, name: &str, changes: Minion) -> Result<Minion> {
        let entity = self.repo.update(session, name, changes)?;
        Ok(Minion::from_entity(&entity))
    }

    pub fn delete(&self, session: &mut Session<'_>, name: Option<&str>) -> Result<usize> {
        self.repo.remove(session, name)
    }
}
