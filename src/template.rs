//! Keyed cache of precomputed template features.
//!
//! Extracting features for a reference image once and reusing them across
//! many matching calls removes the most expensive stage from the hot path.
//! Entries live until the owning model is dropped or the key is registered
//! again; there is no eviction. Unbounded growth is an accepted property of
//! the design, not an oversight — callers registering open-ended key sets
//! must bound them on their side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::features::FeatureSet;
use crate::preprocess::PreprocessTransform;
use crate::util::{DeepMatchError, DeepMatchResult};

/// Features and preprocessing bookkeeping cached for one reference image.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    /// Extracted keypoints, descriptors and scores.
    pub features: FeatureSet,
    /// Transform mapping network coordinates back to the image's pixels.
    pub transform: PreprocessTransform,
}

/// Named storage of precomputed template features.
///
/// Reads and writes go through one mutex so a cache shared through `&self`
/// stays consistent when the owning model is used from multiple threads.
#[derive(Default)]
pub struct TemplateCache {
    entries: Mutex<HashMap<String, Arc<TemplateEntry>>>,
}

impl TemplateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entry` under `key`, replacing any previous registration.
    pub fn insert(&self, key: &str, entry: TemplateEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), Arc::new(entry));
    }

    /// Returns the entry registered under `key`.
    ///
    /// An unregistered key is an error, never a silent empty entry; callers
    /// fall back to full two-image inference or surface the usage mistake.
    pub fn lookup(&self, key: &str) -> DeepMatchResult<Arc<TemplateEntry>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| DeepMatchError::TemplateNotFound {
                key: key.to_string(),
            })
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no template has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
