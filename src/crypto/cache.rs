use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rsa::RsaPublicKey;

use super::pem::parse_public_key;
use super::DEFAULT_CACHE_CAPACITY;
use crate::error::CryptoResult;

/// Bounded cache of parsed public keys, keyed by the raw PEM string.
///
/// Eviction is FIFO by insertion order: a hit does not refresh an entry's
/// position. Only public keys are ever stored here.
///
/// Parsing happens outside the lock, so two threads missing on the same PEM
/// may both parse it. The second insert is skipped and both get a valid key.
pub struct PublicKeyCache {
    capacity: usize,
    state: Mutex<CacheState>,
    parses: AtomicUsize,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Arc<RsaPublicKey>>,
    order: VecDeque<String>,
}

impl PublicKeyCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// A cache holding at most `capacity` keys (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
            parses: AtomicUsize::new(0),
        }
    }

    /// Return the parsed key for `pem`, parsing and inserting it on a miss.
    ///
    /// Fails with `InvalidKeyFormat` if the PEM is not an RSA public key;
    /// nothing is inserted in that case.
    pub fn get_or_parse(&self, pem: &str) -> CryptoResult<Arc<RsaPublicKey>> {
        if let Some(key) = self.lock().entries.get(pem) {
            tracing::trace!("public key cache hit");
            return Ok(Arc::clone(key));
        }

        self.parses.fetch_add(1, Ordering::Relaxed);
        let parsed = Arc::new(parse_public_key(pem)?);

        let mut state = self.lock();
        if let Some(existing) = state.entries.get(pem) {
            return Ok(Arc::clone(existing));
        }
        if state.entries.len() >= self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
                tracing::debug!(capacity = self.capacity, "evicted oldest public key");
            }
        }
        state.order.push_back(pem.to_owned());
        state.entries.insert(pem.to_owned(), Arc::clone(&parsed));
        tracing::debug!(size = state.entries.len(), "cached public key");
        Ok(parsed)
    }

    pub fn contains(&self, pem: &str) -> bool {
        self.lock().entries.contains_key(pem)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of PEM parses performed so far (hits do not count).
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    /// Drop every entry. Intended for test isolation.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    // A panic while holding the lock cannot leave the map and queue out of
    // step (each mutation is a single push/remove pair), so poison is ignored.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PublicKeyCache {
    fn default() -> Self {
        Self::new()
    }
}
