//! Record store module
//!
//! Durable CRUD over user records, backed by a single SQLite table.
//! The store exclusively owns the persisted rows; callers only ever receive
//! owned copies.

mod error;
mod schema;

pub use error::StoreError;
pub use schema::SAMPLE_USERS;

use crate::logger;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Default busy timeout applied when the caller does not configure one
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A persisted user row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// SQLite-backed user store
///
/// The connection is not `Sync`, so it lives behind a mutex that is held for
/// one statement batch at a time. `None` means the store has been closed.
pub struct Store {
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
}

impl Store {
    /// Open (or create) the database file and ensure the users table exists.
    ///
    /// Existing data is never removed here; see [`Store::remove_backing_file`].
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::File {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
        conn.execute(schema::CREATE_USERS_TABLE, [])
            .map_err(StoreError::Schema)?;

        logger::log_store_event(&format!("Database ready at {}", path.display()));

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: path.to_path_buf(),
        })
    }

    /// Delete the database file and its WAL/SHM side files.
    ///
    /// Returns whether the main file existed. Only called when a destructive
    /// reset was explicitly requested.
    pub fn remove_backing_file(path: impl AsRef<Path>) -> Result<bool, StoreError> {
        let path = path.as_ref();
        let mut existed = false;

        for suffix in ["", "-wal", "-shm"] {
            let mut candidate = path.as_os_str().to_owned();
            candidate.push(suffix);
            let candidate = PathBuf::from(candidate);

            match std::fs::remove_file(&candidate) {
                Ok(()) => existed |= suffix.is_empty(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(StoreError::File {
                        path: candidate,
                        source,
                    })
                }
            }
        }

        if existed {
            logger::log_warning(&format!("Removed existing database {}", path.display()));
        }
        Ok(existed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new user and return the id assigned by the database
    pub fn insert(&self, name: &str, email: &str) -> Result<i64, StoreError> {
        let id = self.with_conn(|conn| {
            conn.execute(schema::INSERT_USER, params![name, email])
                .map_err(|e| StoreError::from_write(e, email))?;
            Ok(conn.last_insert_rowid())
        })?;

        logger::log_store_event(&format!("User inserted: id={id} {name} ({email})"));
        Ok(id)
    }

    /// All users in insertion order
    pub fn get_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(schema::SELECT_ALL_USERS)?;
            let users = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }

    pub fn get_by_id(&self, id: i64) -> Result<UserRecord, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(schema::SELECT_USER_BY_ID, params![id], user_from_row)
                .optional()?
                .ok_or(StoreError::NotFound(id))
        })
    }

    /// Overwrite name and email of an existing user
    pub fn update(&self, id: i64, name: &str, email: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(schema::UPDATE_USER, params![name, email, id])
                .map_err(|e| StoreError::from_write(e, email))?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })?;

        logger::log_store_event(&format!("User updated: id={id} -> {name} ({email})"));
        Ok(())
    }

    /// Delete a user, returning whether a row was removed.
    ///
    /// A missing id is not an error.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed =
            self.with_conn(|conn| Ok(conn.execute(schema::DELETE_USER, params![id])? > 0))?;

        if removed {
            logger::log_store_event(&format!("User deleted: id={id}"));
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| Ok(conn.query_row(schema::COUNT_USERS, [], |row| row.get(0))?))
    }

    /// Cheap round trip used by the readiness probe
    pub fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT 1", [], |_| Ok(()))?))
    }

    /// Insert `samples` only when the table is empty; returns rows inserted
    pub fn seed_if_empty(&self, samples: &[(&str, &str)]) -> Result<usize, StoreError> {
        let inserted = self.with_conn(|conn| {
            let count: i64 = conn.query_row(schema::COUNT_USERS, [], |row| row.get(0))?;
            if count > 0 {
                return Ok(0);
            }

            let tx = conn.transaction()?;
            insert_samples(&tx, samples)?;
            tx.commit()?;
            Ok(samples.len())
        })?;

        if inserted > 0 {
            logger::log_store_event(&format!("Seeded {inserted} sample users"));
        }
        Ok(inserted)
    }

    /// Remove every user, restart id assignment and re-insert `samples`
    pub fn reset(&self, samples: &[(&str, &str)]) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(schema::DELETE_ALL_USERS, [])?;
            tx.execute(schema::RESET_USER_SEQUENCE, [])?;
            insert_samples(&tx, samples)?;
            tx.commit()?;
            Ok(())
        })?;

        logger::log_store_event(&format!("Store reset with {} sample users", samples.len()));
        Ok(())
    }

    /// Release the connection. Subsequent calls fail with [`StoreError::Closed`].
    pub fn close(&self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match conn {
            Some(conn) => {
                conn.close().map_err(|(_, e)| StoreError::Database(e))?;
                logger::log_store_event(&format!("Database closed: {}", self.path.display()));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        f(conn)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

fn insert_samples(conn: &Connection, samples: &[(&str, &str)]) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(schema::INSERT_USER)?;
    for (name, email) in samples {
        stmt.execute(params![name, email])
            .map_err(|e| StoreError::from_write(e, email))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("users.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_then_get_by_id() {
        let (_dir, store) = open_temp();
        let id = store.insert("Alice", "alice@x.com").unwrap();
        let user = store.get_by_id(id).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@x.com");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, store) = open_temp();
        let id = store.insert("A", "a@x.com").unwrap();

        let err = store.insert("Other", "a@x.com").unwrap_err();
        assert!(err.is_constraint(), "unexpected error: {err}");

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], UserRecord { id, name: "A".into(), email: "a@x.com".into() });
    }

    #[test]
    fn test_get_all_returns_distinct_positive_ids() {
        let (_dir, store) = open_temp();
        store.insert("A", "a@x.com").unwrap();
        store.insert("B", "b@x.com").unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "A");
        assert_eq!(all[1].name, "B");
        assert!(all.iter().all(|u| u.id > 0));
        assert_ne!(all[0].id, all[1].id);
    }

    #[test]
    fn test_get_by_id_missing() {
        let (_dir, store) = open_temp();
        assert!(store.get_by_id(42).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_overwrites_fields() {
        let (_dir, store) = open_temp();
        let id = store.insert("A", "a@x.com").unwrap();
        store.update(id, "Renamed", "renamed@x.com").unwrap();

        let user = store.get_by_id(id).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Renamed");
        assert_eq!(user.email, "renamed@x.com");
    }

    #[test]
    fn test_update_missing_id_creates_nothing() {
        let (_dir, store) = open_temp();
        let err = store.update(7, "Ghost", "ghost@x.com").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update_to_taken_email_leaves_record_unchanged() {
        let (_dir, store) = open_temp();
        store.insert("A", "a@x.com").unwrap();
        let b = store.insert("B", "b@x.com").unwrap();

        assert!(store.update(b, "B2", "a@x.com").unwrap_err().is_constraint());
        assert_eq!(store.get_by_id(b).unwrap().email, "b@x.com");
        assert_eq!(store.get_by_id(b).unwrap().name, "B");
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let (_dir, store) = open_temp();
        store.insert("A", "a@x.com").unwrap();
        let before = store.get_all().unwrap();

        assert!(!store.delete(999).unwrap());
        assert_eq!(store.get_all().unwrap(), before);
    }

    #[test]
    fn test_delete_removes_record() {
        let (_dir, store) = open_temp();
        let id = store.insert("A", "a@x.com").unwrap();
        assert!(store.delete(id).unwrap());
        assert!(store.get_by_id(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (_dir, store) = open_temp();
        let first = store.insert("A", "a@x.com").unwrap();
        store.delete(first).unwrap();
        let second = store.insert("A", "a@x.com").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.db");

        let store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        let id = store.insert("A", "a@x.com").unwrap();
        store.close().unwrap();

        let reopened = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        assert_eq!(reopened.get_by_id(id).unwrap().name, "A");
    }

    #[test]
    fn test_closed_store_rejects_calls() {
        let (_dir, store) = open_temp();
        store.close().unwrap();
        assert!(matches!(store.get_all(), Err(StoreError::Closed)));
        assert!(matches!(store.insert("A", "a@x.com"), Err(StoreError::Closed)));
        // closing twice is harmless
        store.close().unwrap();
    }

    #[test]
    fn test_seed_only_when_empty() {
        let (_dir, store) = open_temp();
        assert_eq!(store.seed_if_empty(SAMPLE_USERS).unwrap(), SAMPLE_USERS.len());
        assert_eq!(store.seed_if_empty(SAMPLE_USERS).unwrap(), 0);
        assert_eq!(store.count().unwrap(), i64::try_from(SAMPLE_USERS.len()).unwrap());
    }

    #[test]
    fn test_reset_restarts_ids() {
        let (_dir, store) = open_temp();
        store.insert("A", "a@x.com").unwrap();
        store.insert("B", "b@x.com").unwrap();

        store.reset(SAMPLE_USERS).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), SAMPLE_USERS.len());
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].email, SAMPLE_USERS[0].1);
    }

    #[test]
    fn test_remove_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        assert!(!Store::remove_backing_file(&path).unwrap());

        let store = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        store.insert("A", "a@x.com").unwrap();
        store.close().unwrap();

        assert!(Store::remove_backing_file(&path).unwrap());
        let reopened = Store::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        assert_eq!(reopened.count().unwrap(), 0);
    }

    #[test]
    fn test_ping() {
        let (_dir, store) = open_temp();
        store.ping().unwrap();
        store.close().unwrap();
        assert!(store.ping().is_err());
    }
}
