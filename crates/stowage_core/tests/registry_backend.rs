use stowage_core::codec::{
    decode_bool, decode_char, decode_f64, decode_i32, decode_i64, decode_string, encode_bool,
    encode_char, encode_f64, encode_i32, encode_i64, encode_string,
};
use stowage_core::visitor::ItemWriter;
use stowage_core::{
    LoadVisitor, Loadable, PersistError, PersistResult, PersistenceManager, RegistryNamespace,
    RegistryPersistenceManager, SaveVisitor, Saveable,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Entry {
    enabled: bool,
    weight: i64,
}

impl Saveable for Entry {
    fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
        visitor.persist_single("enabled", || self.enabled, encode_bool)?;
        visitor.persist_single("weight", || self.weight, encode_i64)
    }
}

impl Loadable for Entry {
    fn load_with(&mut self, visitor: &mut dyn LoadVisitor) -> PersistResult<()> {
        visitor.restore_single("enabled", |value| self.enabled = value, decode_bool)?;
        visitor.restore_single("weight", |value| self.weight = value, decode_i64)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Settings {
    count: i32,
    ratio: f64,
    initial: char,
    label: Option<String>,
    entries: Vec<Entry>,
}

impl Saveable for Settings {
    fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
        visitor.persist_single("count", || self.count, encode_i32)?;
        visitor.persist_single("ratio", || self.ratio, encode_f64)?;
        visitor.persist_single("initial", || self.initial, encode_char)?;
        visitor.persist_single("label", || self.label.clone(), |label| {
            label.map(encode_string)
        })?;
        visitor.persist_all("entries", &self.entries)
    }
}

impl Loadable for Settings {
    fn load_with(&mut self, visitor: &mut dyn LoadVisitor) -> PersistResult<()> {
        visitor.restore_single("count", |value| self.count = value, decode_i32)?;
        visitor.restore_single("ratio", |value| self.ratio = value, decode_f64)?;
        visitor.restore_single("initial", |value| self.initial = value, decode_char)?;
        visitor.restore_single("label", |value| self.label = Some(value), decode_string)?;
        self.entries = visitor.restore_all("entries")?;
        Ok(())
    }
}

fn entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|index| Entry {
            enabled: index % 2 == 0,
            weight: index as i64 * 10,
        })
        .collect()
}

fn sample() -> Settings {
    Settings {
        count: 42,
        ratio: 0.25,
        initial: 'é',
        label: Some("primary".to_string()),
        entries: entries(3),
    }
}

fn memory_manager(application: &str) -> RegistryPersistenceManager {
    RegistryPersistenceManager::in_memory(RegistryNamespace::new(application)).unwrap()
}

#[test]
fn save_and_restore_round_trip() {
    let mut manager = memory_manager("demo");
    let original = sample();
    manager.save(&original).unwrap();

    let mut restored = Settings::default();
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn values_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let original = sample();

    {
        let mut manager =
            RegistryPersistenceManager::open(&path, RegistryNamespace::new("demo")).unwrap();
        manager.save(&original).unwrap();
    }

    let mut manager =
        RegistryPersistenceManager::open(&path, RegistryNamespace::new("demo")).unwrap();
    let mut restored = Settings::default();
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn absent_value_removes_the_stored_scalar() {
    let mut manager = memory_manager("demo");
    manager.save(&sample()).unwrap();

    let cleared = Settings {
        label: None,
        ..sample()
    };
    manager.save(&cleared).unwrap();

    let node = manager.namespace_node().unwrap().unwrap();
    assert_eq!(node.get_bytes("label").unwrap(), None);
    assert!(node.get_bytes("count").unwrap().is_some());

    let mut restored = Settings {
        label: Some("untouched".to_string()),
        ..Settings::default()
    };
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored.label.as_deref(), Some("untouched"));
}

#[test]
fn nested_items_restore_in_numeric_order() {
    let mut manager = memory_manager("demo");
    let original = Settings {
        entries: entries(12),
        ..Settings::default()
    };
    manager.save(&original).unwrap();

    let node = manager.namespace_node().unwrap().unwrap();
    let group = node.find_child("entries").unwrap().unwrap();
    assert!(group.children_names().unwrap().contains(&"entries_11".to_string()));

    let mut restored = Settings::default();
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored.entries, original.entries);
}

#[test]
fn shorter_group_leaves_no_stale_items() {
    let mut manager = memory_manager("demo");
    manager
        .save(&Settings {
            entries: entries(5),
            ..Settings::default()
        })
        .unwrap();
    manager
        .save(&Settings {
            entries: entries(2),
            ..Settings::default()
        })
        .unwrap();

    let group = manager
        .namespace_node()
        .unwrap()
        .unwrap()
        .find_child("entries")
        .unwrap()
        .unwrap();
    assert_eq!(
        group.children_names().unwrap(),
        vec!["entries_0".to_string(), "entries_1".to_string()]
    );

    let mut restored = Settings::default();
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored.entries, entries(2));
}

#[test]
fn empty_group_round_trips_as_empty() {
    let mut manager = memory_manager("demo");
    manager.save(&sample()).unwrap();
    manager.save(&Settings::default()).unwrap();

    let node = manager.namespace_node().unwrap().unwrap();
    let group = node.find_child("entries").unwrap().unwrap();
    assert!(group.children_names().unwrap().is_empty());

    let mut restored = sample();
    manager.restore(&mut restored).unwrap();
    assert!(restored.entries.is_empty());
}

#[test]
fn restoring_unsaved_namespace_is_a_no_op() {
    let mut manager = memory_manager("never-saved");
    let mut restored = sample();
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored, sample());
    assert!(manager.namespace_node().unwrap().is_none());
}

#[test]
fn sub_modules_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let first = RegistryNamespace::new("demo").with_sub_module("first");
    let second = RegistryNamespace::new("demo").with_sub_module("second");
    assert_eq!(first.path(), "demo/first");

    let mut writer = RegistryPersistenceManager::open(&path, first).unwrap();
    writer.save(&sample()).unwrap();

    let mut reader = RegistryPersistenceManager::open(&path, second).unwrap();
    let mut restored = Settings::default();
    reader.restore(&mut restored).unwrap();
    assert_eq!(restored, Settings::default());
}

struct SeparatorGroup;

impl Saveable for SeparatorGroup {
    fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
        visitor.persist_group("/entries", &mut std::iter::empty::<ItemWriter<'_>>())
    }
}

impl Loadable for SeparatorGroup {
    fn load_with(&mut self, visitor: &mut dyn LoadVisitor) -> PersistResult<()> {
        visitor.restore_nested("/entries").map(|_| ())
    }
}

struct EmptyKey;

impl Saveable for EmptyKey {
    fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
        visitor.persist_single("", || 1, encode_i32)
    }
}

#[test]
fn invalid_keys_are_rejected_and_not_absorbed() {
    let mut manager = memory_manager("demo");
    manager.save(&sample()).unwrap();

    let err = manager.save(&SeparatorGroup).unwrap_err();
    assert!(matches!(err, PersistError::InvalidArgument(_)));
    let err = manager.restore(&mut SeparatorGroup).unwrap_err();
    assert!(matches!(err, PersistError::InvalidArgument(_)));
    let err = manager.save(&EmptyKey).unwrap_err();
    assert!(matches!(err, PersistError::InvalidArgument(_)));
}

#[test]
fn failed_save_rolls_back_partial_writes() {
    struct HalfWritten;

    impl Saveable for HalfWritten {
        fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
            visitor.persist_single("count", || 7, encode_i32)?;
            visitor.persist_single("", || 1, encode_i32)
        }
    }

    let mut manager = memory_manager("demo");
    manager.save(&sample()).unwrap();
    assert!(manager.save(&HalfWritten).is_err());

    let mut restored = Settings::default();
    manager.restore(&mut restored).unwrap();
    assert_eq!(restored.count, 42);
}

#[test]
fn undecodable_stored_bytes_are_reported() {
    let mut manager = memory_manager("demo");
    manager.save(&sample()).unwrap();
    manager
        .namespace_node()
        .unwrap()
        .unwrap()
        .put_bytes("count", &[1, 2])
        .unwrap();

    let err = manager.restore(&mut Settings::default()).unwrap_err();
    assert!(matches!(err, PersistError::InvalidArgument(_)));
}
