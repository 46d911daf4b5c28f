//! Save/load visitor protocol and the persistable contract.
//!
//! # Responsibility
//! - Define the two object-safe visitor traits every backend implements.
//! - Offer typed helpers (`persist_single`, `restore_nested`, ...) on top of
//!   the byte-level trait methods.
//! - Define `Saveable`/`Loadable`, the double-dispatch entry points of
//!   application objects.
//!
//! # Invariants
//! - A visitor is bound to exactly one store node and never writes outside it.
//! - Group keys are non-empty and never start with `PATH_SEPARATOR`.
//! - `restore_single` never touches the target field when nothing is stored.
//! - Nested items are restored in the order they were saved.

use crate::codec::CodecResult;
use crate::error::{PersistError, PersistResult};

/// Reserved separator of hierarchical store paths.
pub const PATH_SEPARATOR: char = '/';

/// Callback that populates one nested item through a fresh sub-visitor.
pub type ItemWriter<'w> = Box<dyn FnOnce(&mut dyn SaveVisitor) -> PersistResult<()> + 'w>;

/// Lazy sequence of child visitors, one per stored nested item.
pub type NestedVisitors<'v> = Box<dyn Iterator<Item = Box<dyn LoadVisitor + 'v>> + 'v>;

/// Write side of the protocol, implemented once per backend.
pub trait SaveVisitor {
    /// Stores `value` under `key`. `None` is a tombstone: backends that can
    /// delete remove the previous value.
    fn persist_bytes(&mut self, key: &str, value: Option<&[u8]>) -> PersistResult<()>;

    /// Replaces the nested group `key` with one item per writer, in order.
    fn persist_group(
        &mut self,
        key: &str,
        items: &mut dyn Iterator<Item = ItemWriter<'_>>,
    ) -> PersistResult<()>;
}

/// Read side of the protocol, implemented once per backend.
pub trait LoadVisitor {
    /// Returns the bytes stored under `key`, if any.
    fn restore_bytes(&mut self, key: &str) -> PersistResult<Option<Vec<u8>>>;

    /// Returns one child visitor per item stored in group `key`.
    /// A missing group yields an empty sequence.
    fn restore_group(&mut self, key: &str) -> PersistResult<NestedVisitors<'_>>;
}

/// Object that can describe its own fields to a `SaveVisitor`.
pub trait Saveable {
    fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()>;
}

/// Object that can receive its own fields from a `LoadVisitor`.
pub trait Loadable {
    fn load_with(&mut self, visitor: &mut dyn LoadVisitor) -> PersistResult<()>;
}

/// Object that supports both directions.
pub trait Persistable: Saveable + Loadable {}

impl<T: Saveable + Loadable + ?Sized> Persistable for T {}

/// Encoder output accepted by `persist_single`.
///
/// Plain `Vec<u8>` is always present; `Option<Vec<u8>>` lets the encoder
/// request a tombstone.
pub trait EncodedValue {
    fn into_bytes(self) -> Option<Vec<u8>>;
}

impl EncodedValue for Vec<u8> {
    fn into_bytes(self) -> Option<Vec<u8>> {
        Some(self)
    }
}

impl EncodedValue for Option<Vec<u8>> {
    fn into_bytes(self) -> Option<Vec<u8>> {
        self
    }
}

impl<'a> dyn SaveVisitor + 'a {
    /// Evaluates `value`, encodes it and stores the result under `key`.
    pub fn persist_single<T, B>(
        &mut self,
        key: &str,
        value: impl FnOnce() -> T,
        encode: impl FnOnce(T) -> B,
    ) -> PersistResult<()>
    where
        B: EncodedValue,
    {
        let bytes = encode(value()).into_bytes();
        self.persist_bytes(key, bytes.as_deref())
    }

    /// Replaces the nested group `key` with one item per writer.
    pub fn persist_nested<'w, I, F>(&mut self, key: &str, writers: I) -> PersistResult<()>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(&mut dyn SaveVisitor) -> PersistResult<()> + 'w,
    {
        let mut items = writers
            .into_iter()
            .map(|writer| -> ItemWriter<'w> { Box::new(writer) });
        self.persist_group(key, &mut items)
    }

    /// Stores every element of `items` as one nested item of group `key`.
    pub fn persist_all<'w, S>(
        &mut self,
        key: &str,
        items: impl IntoIterator<Item = &'w S>,
    ) -> PersistResult<()>
    where
        S: Saveable + 'w,
    {
        let mut writers = items
            .into_iter()
            .map(|item| -> ItemWriter<'w> { Box::new(move |visitor| item.save_with(visitor)) });
        self.persist_group(key, &mut writers)
    }
}

impl<'a> dyn LoadVisitor + 'a {
    /// Decodes the value under `key` and hands it to `setter`.
    ///
    /// `setter` is not called when nothing is stored. Decode failures are
    /// reported as `InvalidArgument`.
    pub fn restore_single<T>(
        &mut self,
        key: &str,
        setter: impl FnOnce(T),
        decode: impl FnOnce(&[u8]) -> CodecResult<T>,
    ) -> PersistResult<()> {
        if let Some(bytes) = self.restore_bytes(key)? {
            let value = decode(&bytes).map_err(|err| {
                PersistError::invalid_argument(format!("cannot restore `{key}`: {err}"))
            })?;
            setter(value);
        }
        Ok(())
    }

    /// Returns one child visitor per item stored in group `key`, in save
    /// order. A missing group yields an empty sequence; an empty or
    /// separator-prefixed key is an `InvalidArgument`.
    pub fn restore_nested(&mut self, key: &str) -> PersistResult<NestedVisitors<'_>> {
        self.restore_group(key)
    }

    /// Restores group `key` into freshly defaulted values, preserving order.
    pub fn restore_all<L>(&mut self, key: &str) -> PersistResult<Vec<L>>
    where
        L: Loadable + Default,
    {
        let mut restored = Vec::new();
        for mut child in self.restore_group(key)? {
            let mut item = L::default();
            item.load_with(child.as_mut())?;
            restored.push(item);
        }
        Ok(restored)
    }
}

/// Rejects empty scalar keys.
pub fn validate_scalar_key(key: &str) -> PersistResult<()> {
    if key.is_empty() {
        return Err(PersistError::invalid_argument("key cannot be empty"));
    }
    Ok(())
}

/// Rejects empty and separator-prefixed group keys.
pub fn validate_group_key(key: &str) -> PersistResult<()> {
    if key.is_empty() {
        return Err(PersistError::invalid_argument(
            "nested group key cannot be empty",
        ));
    }
    if key.starts_with(PATH_SEPARATOR) {
        return Err(PersistError::invalid_argument(format!(
            "nested group key `{key}` cannot start with `{PATH_SEPARATOR}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_i32, encode_i32};
    use std::collections::BTreeMap;

    /// Map-backed visitor pair used to exercise the typed helpers.
    #[derive(Default)]
    struct MapVisitor {
        values: BTreeMap<String, Vec<u8>>,
        groups: BTreeMap<String, Vec<MapVisitor>>,
    }

    impl SaveVisitor for MapVisitor {
        fn persist_bytes(&mut self, key: &str, value: Option<&[u8]>) -> PersistResult<()> {
            validate_scalar_key(key)?;
            match value {
                Some(bytes) => self.values.insert(key.to_string(), bytes.to_vec()),
                None => self.values.remove(key),
            };
            Ok(())
        }

        fn persist_group(
            &mut self,
            key: &str,
            items: &mut dyn Iterator<Item = ItemWriter<'_>>,
        ) -> PersistResult<()> {
            validate_group_key(key)?;
            let mut children = Vec::new();
            for writer in items {
                let mut child = MapVisitor::default();
                writer(&mut child)?;
                children.push(child);
            }
            self.groups.insert(key.to_string(), children);
            Ok(())
        }
    }

    impl LoadVisitor for MapVisitor {
        fn restore_bytes(&mut self, key: &str) -> PersistResult<Option<Vec<u8>>> {
            Ok(self.values.get(key).cloned())
        }

        fn restore_group(&mut self, key: &str) -> PersistResult<NestedVisitors<'_>> {
            validate_group_key(key)?;
            let children = self.groups.remove(key).unwrap_or_default();
            Ok(Box::new(
                children
                    .into_iter()
                    .map(|child| Box::new(child) as Box<dyn LoadVisitor + '_>),
            ))
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    impl Saveable for Counter {
        fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
            visitor.persist_single("value", || self.value, encode_i32)
        }
    }

    impl Loadable for Counter {
        fn load_with(&mut self, visitor: &mut dyn LoadVisitor) -> PersistResult<()> {
            visitor.restore_single("value", |value| self.value = value, decode_i32)
        }
    }

    #[test]
    fn group_key_rules() {
        assert!(validate_group_key("items").is_ok());
        assert!(matches!(
            validate_group_key(""),
            Err(PersistError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_group_key("/items"),
            Err(PersistError::InvalidArgument(_))
        ));
        assert!(validate_group_key("items/sub").is_ok());
    }

    #[test]
    fn optional_encoder_output_is_a_tombstone() {
        let mut map = MapVisitor::default();
        let visitor: &mut dyn SaveVisitor = &mut map;
        visitor
            .persist_single("name", || "x".to_string(), crate::codec::encode_string)
            .unwrap();
        visitor
            .persist_single("name", || None::<String>, |value| {
                value.map(crate::codec::encode_string)
            })
            .unwrap();
        assert!(map.values.is_empty());
    }

    #[test]
    fn restore_single_leaves_field_untouched_when_missing() {
        let mut map = MapVisitor::default();
        let mut counter = Counter { value: 7 };
        counter.load_with(&mut map).unwrap();
        assert_eq!(counter.value, 7);
    }

    #[test]
    fn restore_single_reports_decode_failure_as_invalid_argument() {
        let mut map = MapVisitor::default();
        map.values.insert("value".to_string(), vec![1, 2]);
        let err = Counter::default().load_with(&mut map).unwrap_err();
        assert!(matches!(err, PersistError::InvalidArgument(_)));
    }

    #[test]
    fn persist_all_and_restore_all_keep_order() {
        let counters = vec![Counter { value: 3 }, Counter { value: 1 }, Counter { value: 2 }];
        let mut map = MapVisitor::default();
        let visitor: &mut dyn SaveVisitor = &mut map;
        visitor.persist_all("counters", &counters).unwrap();

        let loader: &mut dyn LoadVisitor = &mut map;
        let restored: Vec<Counter> = loader.restore_all("counters").unwrap();
        assert_eq!(restored, counters);
    }

    #[test]
    fn restore_nested_on_missing_group_is_empty() {
        let mut map = MapVisitor::default();
        let loader: &mut dyn LoadVisitor = &mut map;
        assert_eq!(loader.restore_nested("absent").unwrap().count(), 0);
        assert!(matches!(
            loader.restore_nested("/absent"),
            Err(PersistError::InvalidArgument(_))
        ));
    }
}
