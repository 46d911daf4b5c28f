//! Registry node handle.
//!
//! # Invariants
//! - A handle addresses exactly one `registry_nodes` row.
//! - Child names are unique per parent; `child` is create-if-missing.
//! - `children_names` is ordered by creation.

use super::{RegistryError, RegistryResult};
use crate::db::migrations::ROOT_NODE_ID;
use crate::visitor::PATH_SEPARATOR;
use rusqlite::{params, Connection, OptionalExtension};

/// Handle to one node of the SQLite-backed registry.
#[derive(Clone)]
pub struct RegistryNode<'conn> {
    conn: &'conn Connection,
    id: i64,
    path: String,
}

impl std::fmt::Debug for RegistryNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryNode")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

impl<'conn> RegistryNode<'conn> {
    /// Returns the registry root. The connection must be migrated.
    pub fn root(conn: &'conn Connection) -> Self {
        Self {
            conn,
            id: ROOT_NODE_ID,
            path: PATH_SEPARATOR.to_string(),
        }
    }

    /// Absolute path of this node, for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the direct child `name`, creating it when missing.
    ///
    /// `name` is taken literally, separators included.
    pub fn child(&self, name: &str) -> RegistryResult<RegistryNode<'conn>> {
        if name.is_empty() {
            return Err(RegistryError::InvalidPath(self.child_path(name)));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO registry_nodes (parent_id, name) VALUES (?1, ?2);",
            params![self.id, name],
        )?;
        match self.find_child(name)? {
            Some(child) => Ok(child),
            None => Err(RegistryError::InvalidPath(self.child_path(name))),
        }
    }

    /// Returns the direct child `name` without creating it.
    pub fn find_child(&self, name: &str) -> RegistryResult<Option<RegistryNode<'conn>>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM registry_nodes WHERE parent_id = ?1 AND name = ?2;",
                params![self.id, name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| Self {
            conn: self.conn,
            id,
            path: self.child_path(name),
        }))
    }

    /// Walks a `/`-separated relative path, creating missing nodes.
    pub fn node(&self, path: &str) -> RegistryResult<RegistryNode<'conn>> {
        let mut current = self.clone();
        for segment in split_path(path)? {
            current = current.child(segment)?;
        }
        Ok(current)
    }

    /// Walks a `/`-separated relative path without creating anything.
    pub fn find_node(&self, path: &str) -> RegistryResult<Option<RegistryNode<'conn>>> {
        let mut current = self.clone();
        for segment in split_path(path)? {
            match current.find_child(segment)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn node_exists(&self, path: &str) -> RegistryResult<bool> {
        Ok(self.find_node(path)?.is_some())
    }

    /// Lists direct child names in creation order.
    pub fn children_names(&self) -> RegistryResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM registry_nodes WHERE parent_id = ?1 ORDER BY id ASC;")?;
        let names = stmt
            .query_map([self.id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Lists entry keys of this node, sorted.
    pub fn keys(&self) -> RegistryResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM registry_entries WHERE node_id = ?1 ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([self.id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    pub fn get_bytes(&self, key: &str) -> RegistryResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM registry_entries WHERE node_id = ?1 AND key = ?2;",
                params![self.id, key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn put_bytes(&self, key: &str, value: &[u8]) -> RegistryResult<()> {
        self.conn.execute(
            "INSERT INTO registry_entries (node_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (node_id, key) DO UPDATE SET value = excluded.value;",
            params![self.id, key, value],
        )?;
        Ok(())
    }

    /// Removes entry `key`; returns whether it existed.
    pub fn remove(&self, key: &str) -> RegistryResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM registry_entries WHERE node_id = ?1 AND key = ?2;",
            params![self.id, key],
        )?;
        Ok(changed > 0)
    }

    /// Removes child `name` with its whole subtree; returns whether it existed.
    pub fn remove_child(&self, name: &str) -> RegistryResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM registry_nodes WHERE parent_id = ?1 AND name = ?2;",
            params![self.id, name],
        )?;
        Ok(changed > 0)
    }

    fn child_path(&self, name: &str) -> String {
        if self.id == ROOT_NODE_ID {
            format!("{PATH_SEPARATOR}{name}")
        } else {
            format!("{}{PATH_SEPARATOR}{name}", self.path)
        }
    }
}

fn split_path(path: &str) -> RegistryResult<Vec<&str>> {
    if path.is_empty() || path.starts_with(PATH_SEPARATOR) {
        return Err(RegistryError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(RegistryError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}
