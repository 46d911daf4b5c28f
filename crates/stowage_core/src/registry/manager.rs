//! Registry persistence manager.
//!
//! # Invariants
//! - The manager owns the registry connection; visitors borrow it per call.
//! - One `save` is one SQLite transaction.
//! - Restoring from a namespace that was never saved is a no-op.

use super::node::RegistryNode;
use super::visitor::{RegistryLoadVisitor, RegistrySaveVisitor};
use crate::db::{open_db, open_db_in_memory};
use crate::error::PersistResult;
use crate::manager::{absorb_medium_failure, PersistenceManager};
use crate::visitor::{Loadable, Saveable, PATH_SEPARATOR};
use log::{debug, info};
use rusqlite::Connection;
use std::path::Path;

const BACKEND: &str = "registry";

/// Registry location of one application's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryNamespace {
    /// Top-level node name.
    pub application: String,
    /// Optional node below the application node.
    pub sub_module: Option<String>,
}

impl RegistryNamespace {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            sub_module: None,
        }
    }

    pub fn with_sub_module(mut self, sub_module: impl Into<String>) -> Self {
        self.sub_module = Some(sub_module.into());
        self
    }

    /// Relative node path: `application` or `application/sub_module`.
    pub fn path(&self) -> String {
        match &self.sub_module {
            Some(sub_module) => format!("{}{PATH_SEPARATOR}{sub_module}", self.application),
            None => self.application.clone(),
        }
    }
}

/// Saves and restores objects below one registry namespace.
pub struct RegistryPersistenceManager {
    conn: Connection,
    namespace: RegistryNamespace,
}

impl RegistryPersistenceManager {
    /// Opens (or creates) the registry database at `db_path`.
    pub fn open(db_path: impl AsRef<Path>, namespace: RegistryNamespace) -> PersistResult<Self> {
        Ok(Self::from_connection(open_db(db_path)?, namespace))
    }

    /// Uses a private in-memory registry.
    pub fn in_memory(namespace: RegistryNamespace) -> PersistResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?, namespace))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection, namespace: RegistryNamespace) -> Self {
        Self { conn, namespace }
    }

    pub fn namespace(&self) -> &RegistryNamespace {
        &self.namespace
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Node the manager binds its root visitors to, if it exists.
    pub fn namespace_node(&self) -> PersistResult<Option<RegistryNode<'_>>> {
        Ok(RegistryNode::root(&self.conn).find_node(&self.namespace.path())?)
    }

    fn save_in_transaction(&self, persistable: &dyn Saveable) -> PersistResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let node = RegistryNode::root(&tx).node(&self.namespace.path())?;
            let mut visitor = RegistrySaveVisitor::new(node);
            persistable.save_with(&mut visitor)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn restore_existing(&self, persistable: &mut dyn Loadable) -> PersistResult<()> {
        let Some(node) = self.namespace_node()? else {
            debug!(
                "event=restore module=registry status=skip reason=namespace_missing namespace={}",
                self.namespace.path()
            );
            return Ok(());
        };
        let mut visitor = RegistryLoadVisitor::new(node);
        persistable.load_with(&mut visitor)
    }
}

impl PersistenceManager for RegistryPersistenceManager {
    fn save(&mut self, persistable: &dyn Saveable) -> PersistResult<()> {
        let result = self.save_in_transaction(persistable);
        if result.is_ok() {
            info!(
                "event=save module=registry status=ok namespace={}",
                self.namespace.path()
            );
        }
        absorb_medium_failure(BACKEND, "save", result)
    }

    fn restore(&mut self, persistable: &mut dyn Loadable) -> PersistResult<()> {
        let result = self.restore_existing(persistable);
        absorb_medium_failure(BACKEND, "restore", result)
    }
}
