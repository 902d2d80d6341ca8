//! Stored form of parents and minions.
//!
//! # Core Concepts
//!
//! - [`Record`]: what the generic [`Repository`](super::Repository) needs from
//!   a kind: its projection, how to read a row, insert, merge, and how to
//!   apply a partial update.
//! - [`ParentEntity`]: carries the names of its minions, computed by the store
//!   from the reverse foreign key on every read and never written.
//! - [`MinionEntity`]: carries a reference to exactly one parent.

use std::fmt;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::repository::Repository;
use crate::error::{Error, Result};
use crate::models::{Minion, Parent};

/// The closed set of stored kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Parent,
    Minion,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "Parent",
            Self::Minion => "Minion",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored kind the repository can query and mutate.
pub trait Record: Sized {
    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Projection of one record with its table aliased as `x`.
    const SELECT: &'static str;

    /// Partial update accepted by [`Record::apply`].
    type Changes;

    fn id(&self) -> Option<i64>;
    fn name(&self) -> &str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Insert as a new row and take the store-assigned id.
    fn insert(&mut self, conn: &Connection) -> Result<i64>;

    /// Write the current field values over the row with this record's id.
    fn merge(&self, conn: &Connection) -> Result<()>;

    /// The new name requested by `changes`, if any.
    fn renamed_to(changes: &Self::Changes) -> Option<&str>;

    /// Copy the fields present in `changes`; omitted fields stay untouched.
    fn apply(&mut self, conn: &Connection, changes: Self::Changes) -> Result<()>;
}

fn not_persisted(kind: EntityKind, name: &str) -> Error {
    Error::InvalidInput(format!("{} {} has not been persisted", kind, name))
}

fn decode_names(idx: usize, raw: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================
// Parent
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentEntity {
    id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    minion_names: Vec<String>,
}

impl ParentEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            minion_names: Vec::new(),
        }
    }

    /// Names of the minions referencing this parent, as of the last read.
    pub fn minion_names(&self) -> &[String] {
        &self.minion_names
    }
}

impl Record for ParentEntity {
    const KIND: EntityKind = EntityKind::Parent;
    const TABLE: &'static str = "parents";
    const SELECT: &'static str = "SELECT x.id, x.name, x.description,
            (SELECT json_group_array(m.name) FROM minions m WHERE m.parent_id = x.id)
         FROM parents x";

    type Changes = Parent;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            minion_names: decode_names(3, row.get(3)?)?,
        })
    }

    fn insert(&mut self, conn: &Connection) -> Result<i64> {
        if self.id.is_some() {
            return Err(Error::Conflict(format!(
                "Parent {} is already persisted",
                self.name
            )));
        }

        conn.execute(
            "INSERT INTO parents (name, description) VALUES (?1, ?2)",
            params![self.name, self.description],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    fn merge(&self, conn: &Connection) -> Result<()> {
        let id = self.id.ok_or_else(|| not_persisted(Self::KIND, &self.name))?;
        conn.execute(
            "UPDATE parents SET name = ?1, description = ?2 WHERE id = ?3",
            params![self.name, self.description, id],
        )?;
        Ok(())
    }

    fn renamed_to(changes: &Parent) -> Option<&str> {
        changes.name.as_deref()
    }

    fn apply(&mut self, _conn: &Connection, changes: Parent) -> Result<()> {
        // minion_names is derived, so it is never taken from input
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        Ok(())
    }
}

// ============================================================
// Minion
// ============================================================

/// The parent a minion belongs to, as stored on the minion side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinionEntity {
    id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub contents: Vec<String>,
    parent: Option<ParentRef>,
}

impl MinionEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            contents: Vec::new(),
            parent: None,
        }
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// Bind this minion to a stored parent, replacing any previous one.
    pub fn attach(&mut self, parent: &ParentEntity) -> Result<()> {
        let id = parent
            .id()
            .ok_or_else(|| not_persisted(EntityKind::Parent, &parent.name))?;
        self.parent = Some(ParentRef {
            id,
            name: parent.name.clone(),
        });
        Ok(())
    }

    fn encoded_contents(&self) -> Result<String> {
        serde_json::to_string(&self.contents)
            .map_err(|e| Error::Store(rusqlite::Error::ToSqlConversionFailure(Box::new(e))))
    }

    fn parent_id(&self) -> Result<i64> {
        self.parent
            .as_ref()
            .map(|p| p.id)
            .ok_or_else(|| Error::InvalidInput(format!("Minion {} has no parent", self.name)))
    }
}

impl Record for MinionEntity {
    const KIND: EntityKind = EntityKind::Minion;
    const TABLE: &'static str = "minions";
    const SELECT: &'static str = "SELECT x.id, x.name, x.description, x.contents, p.id, p.name
         FROM minions x LEFT JOIN parents p ON p.id = x.parent_id";

    type Changes = Minion;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let parent_id: Option<i64> = row.get(4)?;
        let parent_name: Option<String> = row.get(5)?;

        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            contents: decode_names(3, row.get(3)?)?,
            parent: parent_id
                .zip(parent_name)
                .map(|(id, name)| ParentRef { id, name }),
        })
    }

    fn insert(&mut self, conn: &Connection) -> Result<i64> {
        if self.id.is_some() {
            return Err(Error::Conflict(format!(
                "Minion {} is already persisted",
                self.name
            )));
        }
        let parent_id = self.parent_id()?;

        conn.execute(
            "INSERT INTO minions (name, description, contents, parent_id) VALUES (?1, ?2, ?3, ?4)",
            params![self.name, self.description, self.encoded_contents()?, parent_id],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    fn merge(&self, conn: &Connection) -> Result<()> {
        let id = self.id.ok_or_else(|| not_persisted(Self::KIND, &self.name))?;
        conn.execute(
            "UPDATE minions SET name = ?1, description = ?2, contents = ?3, parent_id = ?4
             WHERE id = ?5",
            params![
                self.name,
                self.description,
                self.encoded_contents()?,
                self.parent_id()?,
                id
            ],
        )?;
        Ok(())
    }

    fn renamed_to(changes: &Minion) -> Option<&str> {
        changes.name.as_deref()
    }

    fn apply(&mut self, conn: &Connection, changes: Minion) -> Result<()> {
        // Resolve the new parent first so a bad name leaves the record untouched.
        if let Some(parent_name) = changes.parent_name.as_deref() {
            let parent = Repository::<ParentEntity>::new().find_unique(conn, parent_name)?;
            self.attach(&parent)?;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(contents) = changes.contents {
            self.contents = contents;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_displays_wire_name() {
        assert_eq!(EntityKind::Parent.to_string(), "Parent");
        assert_eq!(EntityKind::Minion.to_string(), "Minion");
    }

    #[test]
    fn test_attach_requires_persisted_parent() {
        let mut minion = MinionEntity::new("M1");
        let err = minion.attach(&ParentEntity::new("P1")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(minion.parent().is_none());
    }

    #[test]
    fn test_insert_requires_parent() {
        let conn = Connection::open_in_memory().unwrap();
        let err = MinionEntity::new("M1").insert(&conn).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parent_apply_ignores_minion_names() {
        let conn = Connection::open_in_memory().unwrap();
        let mut parent = ParentEntity::new("P1");
        let changes = Parent {
            name: None,
            description: Some("updated".to_string()),
            minion_names: ["ghost".to_string()].into_iter().collect(),
        };

        parent.apply(&conn, changes).unwrap();

        assert_eq!(parent.name, "P1");
        assert_eq!(parent.description.as_deref(), Some("updated"));
        assert!(parent.minion_names().is_empty());
    }
}
