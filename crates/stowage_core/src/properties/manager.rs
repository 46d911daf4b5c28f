//! Property-file persistence manager.
//!
//! # Invariants
//! - Every `save` writes a complete new file; entries not visited are gone.
//! - A missing file makes `restore` a no-op.
//! - File and parse failures are logged and absorbed.

use super::document::PropertyDocument;
use super::visitor::{PropertiesLoadVisitor, PropertiesSaveVisitor};
use crate::error::{PersistError, PersistResult};
use crate::manager::{absorb_medium_failure, PersistenceManager};
use crate::visitor::{Loadable, Saveable};
use crate::xml::document::write_file;
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File used when no path is configured, relative to the working directory.
pub const DEFAULT_PROPERTIES_PATH: &str = "persistedValues.xml";

const BACKEND: &str = "properties";

/// Saves and restores objects through one property file.
#[derive(Debug, Clone)]
pub struct PropertiesPersistenceManager {
    path: PathBuf,
}

impl Default for PropertiesPersistenceManager {
    fn default() -> Self {
        Self::with_path(DEFAULT_PROPERTIES_PATH)
    }
}

impl PropertiesPersistenceManager {
    /// Uses `DEFAULT_PROPERTIES_PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the property file, `None` when it does not exist.
    pub fn load_document(&self) -> PersistResult<Option<PropertyDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        let document = PropertyDocument::read_xml(BufReader::new(file))?;
        Ok(Some(document))
    }

    /// Replaces the property file with `document`.
    pub fn store_document(&self, document: &PropertyDocument) -> PersistResult<()> {
        write_file(&self.path, |writer| document.write_xml(writer)).map_err(PersistError::from)
    }

    fn save_document(&self, persistable: &dyn Saveable) -> PersistResult<()> {
        let mut document = PropertyDocument::new();
        persistable.save_with(&mut PropertiesSaveVisitor::new(&mut document))?;
        self.store_document(&document)?;
        info!(
            "event=save module=properties status=ok path={} entries={}",
            self.path.display(),
            document.len()
        );
        Ok(())
    }

    fn restore_document(&self, persistable: &mut dyn Loadable) -> PersistResult<()> {
        let Some(document) = self.load_document()? else {
            debug!(
                "event=restore module=properties status=skip reason=file_missing path={}",
                self.path.display()
            );
            return Ok(());
        };
        persistable.load_with(&mut PropertiesLoadVisitor::new(&document))
    }
}

impl PersistenceManager for PropertiesPersistenceManager {
    fn save(&mut self, persistable: &dyn Saveable) -> PersistResult<()> {
        let result = self.save_document(persistable);
        absorb_medium_failure(BACKEND, "save", result)
    }

    fn restore(&mut self, persistable: &mut dyn Loadable) -> PersistResult<()> {
        let result = self.restore_document(persistable);
        absorb_medium_failure(BACKEND, "restore", result)
    }
}
