//! Generic keyed asset cache holding non-owning references
//!
//! One cache algorithm serves every asset type. Each type supplies an
//! [`AssetLoader`]; the [`AssetCache`] deduplicates live assets by key and
//! never keeps an asset alive on its own. Once the last [`Rc`] handed out for
//! a key is dropped, the entry is dead and the next [`AssetCache::cache`]
//! call loads the asset again.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Type-specific loading hook used by [`AssetCache`]
pub trait AssetLoader {
    /// The asset produced by this loader
    type Asset;
    /// Why a load failed. Reported through logging only.
    type Error: std::error::Error;

    /// Load the asset stored under `key`
    fn load(&self, key: &str) -> Result<Self::Asset, Self::Error>;
}

/// Keyed cache of weakly referenced assets
pub struct AssetCache<L: AssetLoader> {
    loader: L,
    entries: RefCell<HashMap<String, Weak<L::Asset>>>,
}

impl<L: AssetLoader> AssetCache<L> {
    /// Create an empty cache around a loader
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Return the live asset for `key`, loading it if necessary
    ///
    /// Returns `None` when the loader fails. A failed load never registers an
    /// entry, and any dead entry left over for `key` is dropped.
    pub fn cache(&self, key: &str) -> Option<Rc<L::Asset>> {
        if let Some(asset) = self.lookup(key) {
            trace!(key = %key, "Asset cache hit");
            return Some(asset);
        }

        // No borrow is held while loading: loaders may consult other caches.
        match self.loader.load(key) {
            Ok(asset) => {
                let asset = Rc::new(asset);
                self.entries
                    .borrow_mut()
                    .insert(key.to_string(), Rc::downgrade(&asset));
                debug!(key = %key, "Cached asset");
                Some(asset)
            }
            Err(e) => {
                self.entries.borrow_mut().remove(key);
                warn!(key = %key, error = %e, "Failed to load asset");
                None
            }
        }
    }

    /// Return the live asset for `key` without ever loading it
    pub fn lookup(&self, key: &str) -> Option<Rc<L::Asset>> {
        self.entries.borrow().get(key).and_then(Weak::upgrade)
    }

    /// Whether some owner still holds the asset cached under `key`
    pub fn is_live(&self, key: &str) -> bool {
        self.entries
            .borrow()
            .get(key)
            .is_some_and(|entry| entry.strong_count() > 0)
    }

    /// Number of keys whose asset is still alive
    pub fn live_count(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Drop entries whose asset has been freed, returning how many were removed
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, entry| entry.strong_count() > 0);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged dead asset cache entries");
        }
        removed
    }

    /// The loader backing this cache
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: AssetLoader> fmt::Debug for AssetCache<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        f.debug_struct("AssetCache")
            .field("entries", &entries.len())
            .field("live", &self.live_count())
            .finish()
    }
}
