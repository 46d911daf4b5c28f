//! Visitor adapters over a `PropertyDocument`.

use super::document::PropertyDocument;
use crate::error::{PersistError, PersistResult};
use crate::text_encoding::{decode_text, encode_text};
use crate::visitor::{validate_scalar_key, ItemWriter, LoadVisitor, NestedVisitors, SaveVisitor};

const BACKEND: &str = "properties";
const NESTED_GROUPS: &str = "nested groups";

fn nested_unsupported() -> PersistError {
    PersistError::Unsupported {
        backend: BACKEND,
        operation: NESTED_GROUPS,
    }
}

/// Writes base64 entries into a property document.
pub struct PropertiesSaveVisitor<'d> {
    document: &'d mut PropertyDocument,
}

impl<'d> PropertiesSaveVisitor<'d> {
    pub fn new(document: &'d mut PropertyDocument) -> Self {
        Self { document }
    }
}

impl SaveVisitor for PropertiesSaveVisitor<'_> {
    fn persist_bytes(&mut self, key: &str, value: Option<&[u8]>) -> PersistResult<()> {
        validate_scalar_key(key)?;
        match value {
            Some(bytes) => {
                self.document.set(key, encode_text(bytes));
            }
            None => {
                self.document.remove(key);
            }
        }
        Ok(())
    }

    fn persist_group(
        &mut self,
        _key: &str,
        _items: &mut dyn Iterator<Item = ItemWriter<'_>>,
    ) -> PersistResult<()> {
        Err(nested_unsupported())
    }
}

/// Reads base64 entries from a property document.
pub struct PropertiesLoadVisitor<'d> {
    document: &'d PropertyDocument,
}

impl<'d> PropertiesLoadVisitor<'d> {
    pub fn new(document: &'d PropertyDocument) -> Self {
        Self { document }
    }
}

impl LoadVisitor for PropertiesLoadVisitor<'_> {
    fn restore_bytes(&mut self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        validate_scalar_key(key)?;
        self.document
            .get(key)
            .map(|text| decode_text(key, text))
            .transpose()
    }

    fn restore_group(&mut self, _key: &str) -> PersistResult<NestedVisitors<'_>> {
        Err(nested_unsupported())
    }
}
