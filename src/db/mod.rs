pub mod entity;
pub mod repository;
mod schema;
mod session;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

pub use entity::{EntityKind, MinionEntity, ParentEntity, ParentRef, Record};
pub use repository::{MinionRepository, ParentRepository, Repository};
pub use session::{OnFailure, Session, UnitOfWork};

use crate::error::Error;

/// Shared handle to the store.
///
/// Cloning is cheap; all clones share one connection. A handle whose store
/// could not be opened stays usable as a value but refuses every session.
#[derive(Clone)]
pub struct Database {
    state: Arc<std::result::Result<Mutex<Connection>, String>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Open the store and create its schema, degrading instead of failing.
    ///
    /// Any error is logged and yields an unavailable handle, so a server can
    /// keep running and answer every request with a failure.
    pub fn open_or_unavailable(path: PathBuf) -> Self {
        let location = path.display().to_string();
        let opened = Self::open(path).and_then(|db| {
            db.init_schema()?;
            Ok(db)
        });

        match opened {
            Ok(db) => {
                tracing::info!("Opened store at {}", location);
                db
            }
            Err(e) => {
                tracing::error!("Failed to initialize store at {}: {:#}", location, e);
                Self::unavailable(format!("{:#}", e))
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Err(reason.into())),
        }
    }

    pub fn is_available(&self) -> bool {
        self.state.is_ok()
    }

    pub fn init_schema(&self) -> Result<()> {
        let session = self.session()?;
        schema::ensure_schema(session.conn())
    }

    /// Take the connection for one request scope.
    ///
    /// Sessions are exclusive: a second call blocks until the first session
    /// is dropped.
    pub fn session(&self) -> crate::error::Result<Session<'_>> {
        match self.state.as_ref() {
            Ok(conn) => conn
                .lock()
                .map(Session::new)
                .map_err(|_| Error::Unavailable("database lock poisoned".to_string())),
            Err(reason) => Err(Error::Unavailable(reason.clone())),
        }
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            state: Arc::new(Ok(Mutex::new(conn))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_unavailable_database_refuses_sessions() {
        let db = Database::unavailable("no disk");
        assert!(!db.is_available());

        let err = db.session().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(err.to_string().contains("no disk"));
    }

    #[test]
    fn test_unopenable_path_degrades_to_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // The parent of this path is a regular file, so no directory can be made.
        let db = Database::open_or_unavailable(file.path().join("store.db"));

        assert!(!db.is_available());
        assert!(db.init_schema().is_err());
    }

    #[test]
    fn test_file_database_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");

        let db = Database::open_or_unavailable(path.clone());
        assert!(db.is_available());
        drop(db);

        let reopened = Database::open(path).unwrap();
        let session = reopened.session().unwrap();
        let tables: i32 = session
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='minions'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }
}
