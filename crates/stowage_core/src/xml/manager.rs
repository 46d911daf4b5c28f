//! XML persistence manager.
//!
//! The manager edits a caller-owned document in place. Serializing the
//! document to disk is a separate step (`DocumentIo::write`).

use super::document::XmlDocument;
use super::visitor::{XmlLoadVisitor, XmlSaveVisitor};
use crate::error::PersistResult;
use crate::manager::{absorb_medium_failure, PersistenceManager};
use crate::visitor::{Loadable, Saveable};
use log::debug;
use xmltree::Element;

/// Root element name used when the document has none.
pub const DEFAULT_ROOT_ELEMENT: &str = "persistedValues";

const BACKEND: &str = "xml";

/// Saves and restores objects below one element of a document tree.
pub struct XmlPersistenceManager<'doc> {
    root: &'doc mut Element,
}

impl<'doc> XmlPersistenceManager<'doc> {
    /// Binds to the document's root element, creating
    /// `DEFAULT_ROOT_ELEMENT` when the document is empty.
    pub fn new(document: &'doc mut XmlDocument) -> Self {
        Self {
            root: document.root_or_insert(DEFAULT_ROOT_ELEMENT),
        }
    }

    /// Binds to an explicit element.
    pub fn with_root(root: &'doc mut Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &*self.root
    }
}

impl PersistenceManager for XmlPersistenceManager<'_> {
    fn save(&mut self, persistable: &dyn Saveable) -> PersistResult<()> {
        let mut visitor = XmlSaveVisitor::new(self.root);
        let result = persistable.save_with(&mut visitor);
        debug!(
            "event=save module=xml status={} root={}",
            if result.is_ok() { "ok" } else { "error" },
            self.root.name
        );
        absorb_medium_failure(BACKEND, "save", result)
    }

    fn restore(&mut self, persistable: &mut dyn Loadable) -> PersistResult<()> {
        let mut visitor = XmlLoadVisitor::new(self.root);
        let result = persistable.load_with(&mut visitor);
        absorb_medium_failure(BACKEND, "restore", result)
    }
}
