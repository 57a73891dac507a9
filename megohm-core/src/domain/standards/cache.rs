// megohm-core/src/domain/standards/cache.rs

use super::StandardProfile;
use super::config::ValidationConfig;
use crate::domain::error::DomainError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Compute-once-per-profile table of `ValidationConfig`.
///
/// The first caller for a profile builds under the write lock, so concurrent
/// first callers never observe two different copies. Once an entry exists,
/// callers only take the read lock and walk away with an `Arc` they can read
/// without any further synchronisation.
pub struct ConfigCache {
    slots: RwLock<BTreeMap<StandardProfile, Arc<ValidationConfig>>>,
    builds: AtomicUsize,
}

impl ConfigCache {
    pub const fn new() -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, profile: StandardProfile) -> Result<Arc<ValidationConfig>, DomainError> {
        // Fast path
        {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cfg) = slots.get(&profile) {
                return Ok(Arc::clone(cfg));
            }
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have built it while we waited for the write lock.
        if let Some(cfg) = slots.get(&profile) {
            return Ok(Arc::clone(cfg));
        }

        let cfg = Arc::new(ValidationConfig::build(profile)?);
        self.builds.fetch_add(1, Ordering::SeqCst);
        debug!(%profile, "Validation config built");
        slots.insert(profile, Arc::clone(&cfg));
        Ok(cfg)
    }

    /// Drops the cached entry; the next `get` rebuilds it.
    /// Holders of the old `Arc` keep reading their (equal) copy.
    pub fn invalidate(&self, profile: StandardProfile) -> bool {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&profile)
            .is_some()
    }

    /// Number of builds performed so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CACHE: ConfigCache = ConfigCache::new();

/// Process-wide memoized config for `profile`.
pub fn get_config_for_standard(
    profile: StandardProfile,
) -> Result<Arc<ValidationConfig>, DomainError> {
    GLOBAL_CACHE.get(profile)
}

/// Backward-compatible entry point: NETA unless told otherwise.
pub fn get_validation_config() -> Result<Arc<ValidationConfig>, DomainError> {
    get_config_for_standard(StandardProfile::default())
}
