//! Named recipes stored as snapshot JSON in SQLite.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS recipes (
    name     TEXT PRIMARY KEY NOT NULL,
    snapshot TEXT NOT NULL
)";

/// Outcome of [`RecipeStore::rename`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rename {
    Renamed,
    /// No recipe under the old name.
    Missing,
    /// Another recipe already holds the new name.
    Taken,
}

pub struct RecipeStore {
    conn: Mutex<Connection>,
}

impl RecipeStore {
    /// Open (and create if needed) a recipe database file.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute(SCHEMA, [])?;
        Ok(RecipeStore { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recipe names in alphabetical order.
    pub fn list(&self) -> Result<Vec<String>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name FROM recipes ORDER BY name")?;
        let names = stmt.query_map([], |row| row.get(0))?;
        names.collect()
    }

    /// Insert or overwrite.
    pub fn save(&self, name: &str, snapshot: &str) -> Result<(), rusqlite::Error> {
        self.conn().execute(
            "INSERT INTO recipes (name, snapshot) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET snapshot = excluded.snapshot",
            params![name, snapshot],
        )?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn()
            .query_row(
                "SELECT snapshot FROM recipes WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()
    }

    /// The existence check and the update run under one lock.
    pub fn rename(&self, from: &str, to: &str) -> Result<Rename, rusqlite::Error> {
        let conn = self.conn();
        if from != to {
            let taken = conn
                .query_row("SELECT 1 FROM recipes WHERE name = ?1", [to], |_| Ok(()))
                .optional()?
                .is_some();
            if taken {
                return Ok(Rename::Taken);
            }
        }
        let changed = conn.execute(
            "UPDATE recipes SET name = ?2 WHERE name = ?1",
            params![from, to],
        )?;
        Ok(if changed > 0 { Rename::Renamed } else { Rename::Missing })
    }

    /// Returns false if nothing was deleted.
    pub fn delete(&self, name: &str) -> Result<bool, rusqlite::Error> {
        let changed = self
            .conn()
            .execute("DELETE FROM recipes WHERE name = ?1", [name])?;
        Ok(changed > 0)
    }
}
