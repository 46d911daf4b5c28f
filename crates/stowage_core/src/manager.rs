//! Uniform save/restore facade implemented by every backend.
//!
//! # Responsibility
//! - Give callers one entry point per backend.
//! - Apply the shared failure policy: medium failures are logged and
//!   absorbed, caller mistakes are returned.

use crate::error::PersistResult;
use crate::visitor::{Loadable, Saveable};
use log::error;

/// Per-backend save/restore entry point.
pub trait PersistenceManager {
    /// Drives `persistable` through a root save visitor, then flushes the
    /// backing medium where the backend has one.
    fn save(&mut self, persistable: &dyn Saveable) -> PersistResult<()>;

    /// Drives `persistable` through a root load visitor. Fields with no
    /// stored value keep their current value.
    fn restore(&mut self, persistable: &mut dyn Loadable) -> PersistResult<()>;
}

/// Logs and swallows medium failures; returns every other error unchanged.
pub(crate) fn absorb_medium_failure(
    backend: &str,
    operation: &str,
    result: PersistResult<()>,
) -> PersistResult<()> {
    match result {
        Err(err) if err.is_medium_failure() => {
            error!("event={operation} module={backend} status=error error={err}");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::absorb_medium_failure;
    use crate::error::PersistError;

    #[test]
    fn absorbs_only_medium_failures() {
        let io = PersistError::Io(std::io::Error::other("disk gone"));
        assert!(absorb_medium_failure("test", "save", Err(io)).is_ok());

        let unsupported = PersistError::Unsupported {
            backend: "test",
            operation: "nested groups",
        };
        assert!(matches!(
            absorb_medium_failure("test", "save", Err(unsupported)),
            Err(PersistError::Unsupported { .. })
        ));
    }
}
