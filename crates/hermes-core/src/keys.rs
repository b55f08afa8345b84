//! Collision-free storage key allocation.
//!
//! The existence probe and the later write are two separate requests, so two
//! concurrent uploads of the same name in the same month can both observe a
//! free key and the second write wins. This is accepted; callers that need a
//! stronger guarantee must use a conditional write in the store.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use crate::{classify::split_extension, errors::Error, ports::ObjectStore, Result};

/// Upper bound on existence probes for a single allocation.
pub const MAX_KEY_PROBES: u32 = 10_000;

/// `{category}/{year}/{month}/{filename}`, month without zero padding.
pub fn base_key(category: &str, filename: &str, now: DateTime<Utc>) -> String {
    format!("{category}/{}/{}/{filename}", now.year(), now.month())
}

/// `{stem}-{n}{ext}` derived from the base key.
pub fn suffixed_key(base: &str, n: u32) -> String {
    let (stem, ext) = split_extension(base);
    format!("{stem}-{n}{ext}")
}

#[derive(Clone)]
pub struct KeyAllocator {
    store: Arc<dyn ObjectStore>,
    max_probes: u32,
}

impl KeyAllocator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            max_probes: MAX_KEY_PROBES,
        }
    }

    pub fn with_max_probes(mut self, max_probes: u32) -> Self {
        self.max_probes = max_probes.max(1);
        self
    }

    /// First key in `base, base-1, base-2, ...` that does not exist yet.
    pub async fn allocate(
        &self,
        category: &str,
        filename: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let base = base_key(category, filename, now);
        let mut candidate = base.clone();

        for n in 1..=self.max_probes {
            if !self.store.exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(key = %candidate, "storage key taken");
            candidate = suffixed_key(&base, n);
        }

        Err(Error::KeysExhausted {
            base,
            attempts: self.max_probes,
        })
    }
}
