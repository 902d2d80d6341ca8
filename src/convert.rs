//! Conversion between wire elements and stored entities.
//!
//! Only the inbound direction validates. Store contents are trusted on the way
//! out. Relationships are never resolved here: attaching a minion to its
//! parent needs a lookup inside the caller's unit of work.

use crate::db::{EntityKind, MinionEntity, ParentEntity};
use crate::error::{Error, Result};
use crate::models::{Minion, Parent};

pub trait Convert: Sized {
    type Entity;

    /// Build a new, unsaved entity. Fails if the element has no name.
    fn to_entity(&self) -> Result<Self::Entity>;

    fn from_entity(entity: &Self::Entity) -> Self;
}

pub(crate) fn require_name(name: Option<&str>, kind: EntityKind) -> Result<&str> {
    name.ok_or_else(|| {
        Error::InvalidInput(format!(
            "The name parameter is mandatory when creating a {}",
            kind
        ))
    })
}

impl Convert for Parent {
    type Entity = ParentEntity;

    fn to_entity(&self) -> Result<ParentEntity> {
        let mut entity = ParentEntity::new(require_name(self.name.as_deref(), EntityKind::Parent)?);
        entity.description = self.description.clone();
        Ok(entity)
    }

    fn from_entity(entity: &ParentEntity) -> Self {
        Self {
            name: Some(entity.name.clone()),
            description: entity.description.clone(),
            minion_names: entity.minion_names().iter().cloned().collect(),
        }
    }
}

impl Convert for Minion {
    type Entity = MinionEntity;

    fn to_entity(&self) -> Result<MinionEntity> {
        let mut entity = MinionEntity::new(require_name(self.name.as_deref(), EntityKind::Minion)?);
        entity.description = self.description.clone();
        entity.contents = self.contents.clone().unwrap_or_default();
        Ok(entity)
    }

    fn from_entity(entity: &MinionEntity) -> Self {
        Self {
            name: Some(entity.name.clone()),
            description: entity.description.clone(),
            contents: Some(entity.contents.clone()),
            parent_name: entity.parent().map(|p| p.name.clone()),
        }
    }
}
