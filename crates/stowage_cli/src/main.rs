//! CLI probe for `stowage_core`.
//!
//! # Responsibility
//! - Verify core crate linkage and print its version.
//! - Inspect a flat-property file without decoding it into a type.
//! - Run a registry save/restore round trip against a file or memory.
//!
//! Set `STOWAGE_LOG_DIR` to an absolute directory to enable file logging.

use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use stowage_core::codec::{decode_i64, encode_i64};
use stowage_core::{
    core_version, default_log_level, init_logging, LoadVisitor, Loadable, LoggingConfig,
    PersistResult, PersistenceManager, PropertiesPersistenceManager, RegistryNamespace,
    RegistryPersistenceManager, SaveVisitor, Saveable,
};

const LOG_DIR_ENV: &str = "STOWAGE_LOG_DIR";
const PROBE_NAMESPACE: &str = "stowage_cli";
const USAGE: &str = "usage: stowage_cli [version | inspect <properties.xml> | registry-probe [db]]";

fn main() -> ExitCode {
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
        if let Err(err) = init_logging(&LoggingConfig::new(default_log_level(), dir)) {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["version"] => {
            println!("stowage_core version={}", core_version());
            Ok(())
        }
        ["inspect", path] => inspect(PathBuf::from(path)),
        ["registry-probe"] => registry_probe(None),
        ["registry-probe", path] => registry_probe(Some(PathBuf::from(path))),
        _ => Err(USAGE.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Prints each entry key with the length of its base64 text.
fn inspect(path: PathBuf) -> Result<(), String> {
    let manager = PropertiesPersistenceManager::with_path(&path);
    let document = manager
        .load_document()
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?
        .ok_or_else(|| format!("`{}` does not exist", path.display()))?;

    if let Some(comment) = document.comment() {
        println!("# {comment}");
    }
    for (key, value) in document.iter() {
        println!("{key}\t{} chars", value.len());
    }
    println!("entries={}", document.len());
    info!(
        "event=cli_inspect module=cli status=ok path={} entries={}",
        path.display(),
        document.len()
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct Probe {
    started_at: i64,
}

impl Saveable for Probe {
    fn save_with(&self, visitor: &mut dyn SaveVisitor) -> PersistResult<()> {
        visitor.persist_single("started_at", || self.started_at, encode_i64)
    }
}

impl Loadable for Probe {
    fn load_with(&mut self, visitor: &mut dyn LoadVisitor) -> PersistResult<()> {
        visitor.restore_single("started_at", |value| self.started_at = value, decode_i64)
    }
}

fn registry_probe(db_path: Option<PathBuf>) -> Result<(), String> {
    let namespace = RegistryNamespace::new(PROBE_NAMESPACE);
    let mut manager = match &db_path {
        Some(path) => RegistryPersistenceManager::open(path, namespace),
        None => RegistryPersistenceManager::in_memory(namespace),
    }
    .map_err(|err| format!("cannot open registry: {err}"))?;

    let started_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|err| err.to_string())?
        .as_secs() as i64;
    let saved = Probe { started_at };
    manager.save(&saved).map_err(|err| err.to_string())?;

    let mut restored = Probe::default();
    manager.restore(&mut restored).map_err(|err| err.to_string())?;
    if restored != saved {
        return Err(format!(
            "registry round trip mismatch: saved {saved:?}, restored {restored:?}"
        ));
    }

    println!("registry round trip ok started_at={}", restored.started_at);
    info!("event=cli_registry_probe module=cli status=ok");
    Ok(())
}
