// Locator store - In-memory media addressed by revocable locators

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::domain::errors::DomainError;
use crate::domain::model::Locator;

#[derive(Debug)]
struct Blob {
    bytes: Arc<[u8]>,
    media_type: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    blobs: HashMap<Locator, Blob>,
}

/// Registry of live media blobs.
///
/// Clones share the same registry. A locator stays resolvable until it is
/// revoked; revoking drops the registry's reference to the bytes.
#[derive(Debug, Clone, Default)]
pub struct LocatorStore {
    inner: Arc<Mutex<Inner>>,
}

impl LocatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The map stays consistent across a panicking holder
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register bytes and hand out a new locator for them
    pub fn create(&self, bytes: Arc<[u8]>, media_type: &str) -> Locator {
        let mut inner = self.lock();
        inner.next_id += 1;
        let locator = Locator::new(inner.next_id);
        debug!(%locator, media_type, size = bytes.len(), "Created locator");
        inner.blobs.insert(
            locator.clone(),
            Blob {
                bytes,
                media_type: media_type.to_string(),
            },
        );
        locator
    }

    /// Bytes behind a live locator
    pub fn resolve(&self, locator: &Locator) -> Result<Arc<[u8]>, DomainError> {
        self.lock()
            .blobs
            .get(locator)
            .map(|blob| Arc::clone(&blob.bytes))
            .ok_or_else(|| DomainError::LocatorRevoked(locator.to_string()))
    }

    /// Media type recorded for a live locator
    pub fn media_type(&self, locator: &Locator) -> Result<String, DomainError> {
        self.lock()
            .blobs
            .get(locator)
            .map(|blob| blob.media_type.clone())
            .ok_or_else(|| DomainError::LocatorRevoked(locator.to_string()))
    }

    /// Release a locator. Returns false when it was already gone.
    pub fn revoke(&self, locator: &Locator) -> bool {
        let removed = self.lock().blobs.remove(locator).is_some();
        trace!(%locator, removed, "Revoked locator");
        removed
    }

    /// Number of locators still resolvable
    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }
}
