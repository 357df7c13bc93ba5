//! Persistent sort state
//!
//! Saved state uses physical column indices so it survives column reordering.
//! Stores treat the state as an opaque JSON blob keyed by grid.

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use crate::criteria::SortCriterion;
use crate::options::{ColumnSortOptions, ColumnSortOverrides};

/// Everything needed to restore a grid's sorting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSortState {
    /// Criteria queue on physical columns
    pub criteria: Vec<SortCriterion>,
    pub defaults: ColumnSortOptions,
    /// Per-column overrides keyed by physical column
    pub columns: BTreeMap<usize, ColumnSortOverrides>,
}

/// Load/save backend for [`PersistedSortState`]
pub trait SortStateStore {
    fn load(&self, key: &str) -> Result<Option<PersistedSortState>>;

    fn save(&self, key: &str, state: &PersistedSortState) -> Result<()>;

    /// Returns true if something was removed
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Store that keeps serialized state in memory
#[derive(Debug, Default)]
pub struct MemorySortStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySortStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON saved under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl SortStateStore for MemorySortStateStore {
    fn load(&self, key: &str) -> Result<Option<PersistedSortState>> {
        match self.entries.lock().get(key) {
            Some(json) => Ok(Some(
                serde_json::from_str(json).context("Failed to decode saved sort state")?,
            )),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, state: &PersistedSortState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.entries.lock().insert(key.to_string(), json);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}

/// Handle for database connections - either owned or shared
enum ConnectionHandle {
    Owned(Connection),
    Shared(Arc<Mutex<Connection>>),
}

impl ConnectionHandle {
    fn with_conn<T, F: FnOnce(&Connection) -> Result<T>>(&self, f: F) -> Result<T> {
        match self {
            ConnectionHandle::Owned(conn) => f(conn),
            ConnectionHandle::Shared(arc) => f(&arc.lock()),
        }
    }
}

/// Store for sort state using SQLite
pub struct SqliteSortStateStore {
    db_path: PathBuf,
    /// Holds the connection for in-memory databases (where each open creates a new db)
    memory_conn: Option<Arc<Mutex<Connection>>>,
}

impl SqliteSortStateStore {
    /// Open or create storage at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            db_path,
            memory_conn: None,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store for testing
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().with_context(|| "Failed to create in-memory database")?;
        let store = Self {
            db_path: PathBuf::from(":memory:"),
            memory_conn: Some(Arc::new(Mutex::new(conn))),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<ConnectionHandle> {
        if let Some(ref conn) = self.memory_conn {
            Ok(ConnectionHandle::Shared(conn.clone()))
        } else {
            let conn = Connection::open(&self.db_path)
                .with_context(|| format!("Failed to open database at {:?}", self.db_path))?;
            Ok(ConnectionHandle::Owned(conn))
        }
    }

    fn initialize_schema(&self) -> Result<()> {
        let handle = self.connect()?;
        handle.with_conn(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS column_sort_state (
                    grid_key TEXT PRIMARY KEY,
                    state_json TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                [],
            )?;
            Ok(())
        })
    }
}

impl SortStateStore for SqliteSortStateStore {
    fn load(&self, key: &str) -> Result<Option<PersistedSortState>> {
        let handle = self.connect()?;
        let json: Option<String> = handle.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT state_json FROM column_sort_state WHERE grid_key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        json.map(|json| {
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to decode sort state for {}", key))
        })
        .transpose()
    }

    fn save(&self, key: &str, state: &PersistedSortState) -> Result<()> {
        let handle = self.connect()?;
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();
        handle.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO column_sort_state (grid_key, state_json, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key, json, now],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let handle = self.connect()?;
        handle.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM column_sort_state WHERE grid_key = ?1",
                params![key],
            )?;
            Ok(removed > 0)
        })
    }
}
