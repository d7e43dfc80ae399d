//! Result cache for concentration lookups
//!
//! A concentration costs `O(doses)` and a curve needs hundreds of them, so
//! interactive redraws go through [`ConcentrationCache`]. Point and curve
//! results share one least-recently-used order capped at
//! [`CacheOptions::max_size`]; entries also expire after
//! [`CacheOptions::ttl_ms`].
//!
//! Keys include a formula version. Bumping it with
//! [`ConcentrationCache::bump_formula_version`] makes every existing entry
//! unreachable without a sweep.
//!
//! ```rust
//! use moodkinetics::prelude::*;
//!
//! let cache = ConcentrationCache::new(CacheOptions::default());
//! let med = Medication::new("m1", "Sertraline", DrugClass::Ssri, 26.0, 20.0, 0.44);
//! let doses = vec![Dose::new("d1", "m1", 0, 50.0)];
//!
//! let first = cache.get_concentration(&med, &doses, 3_600_000, DEFAULT_BODY_WEIGHT);
//! let again = cache.get_concentration(&med, &doses, 3_600_000, DEFAULT_BODY_WEIGHT);
//! assert_eq!(first, again);
//! assert_eq!(cache.get_stats().hits, 1);
//! ```

mod clock;
mod key;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cached::{Cached, SizedCache};
use serde::{Deserialize, Serialize};

use crate::data::{Dose, Medication};
use crate::pk::{self, ConcentrationSample};
use key::CacheKey;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::TIME_BUCKET_MS;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    /// Maximum number of point and curve entries together (default: 1000)
    pub max_size: usize,
    /// Entry lifetime in ms (default: 5 minutes); an entry is stale once it
    /// is older than this
    pub ttl_ms: i64,
    /// Version of the concentration formulas the entries were computed with
    pub formula_version: u32,
    /// Period of the background expiry sweep in ms (default: 1 minute)
    pub sweep_interval_ms: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl_ms: 5 * 60 * 1000,
            formula_version: 1,
            sweep_interval_ms: 60 * 1000,
        }
    }
}

impl CacheOptions {
    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_formula_version(mut self, formula_version: u32) -> Self {
        self.formula_version = formula_version;
        self
    }

    pub fn with_sweep_interval_ms(mut self, sweep_interval_ms: u64) -> Self {
        self.sweep_interval_ms = sweep_interval_ms;
        self
    }
}

/// The computation behind the cache
pub trait ConcentrationModel: Send + Sync {
    fn concentration(
        &self,
        medication: &Medication,
        doses: &[Dose],
        time: i64,
        body_weight: f64,
    ) -> f64;

    fn curve(
        &self,
        medication: &Medication,
        doses: &[Dose],
        start: i64,
        end: i64,
        points: usize,
        body_weight: f64,
    ) -> Vec<ConcentrationSample>;
}

/// The closed-form engine in [`crate::pk`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PkEngine;

impl ConcentrationModel for PkEngine {
    fn concentration(
        &self,
        medication: &Medication,
        doses: &[Dose],
        time: i64,
        body_weight: f64,
    ) -> f64 {
        pk::calculate_concentration(medication, doses, time, body_weight)
    }

    fn curve(
        &self,
        medication: &Medication,
        doses: &[Dose],
        start: i64,
        end: i64,
        points: usize,
        body_weight: f64,
    ) -> Vec<ConcentrationSample> {
        pk::generate_concentration_curve(medication, doses, start, end, points, body_weight)
    }
}

/// Cache occupancy and counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub point_cache_size: usize,
    pub curve_cache_size: usize,
    pub total_cache_size: usize,
    pub max_size: usize,
    pub ttl_ms: i64,
    pub formula_version: u32,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Clone, Debug)]
enum CachedValue {
    Point(f64),
    Curve(Vec<ConcentrationSample>),
}

#[derive(Clone, Debug)]
struct CacheEntry {
    value: CachedValue,
    inserted_at: i64,
}

struct CacheState {
    entries: SizedCache<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Memoizing wrapper around a [`ConcentrationModel`].
///
/// All mutation goes through one lock; the model runs outside it, so two
/// threads missing on the same key may both compute it. The result is the
/// same either way.
pub struct ConcentrationCache<M: ConcentrationModel = PkEngine> {
    model: M,
    max_size: usize,
    ttl_ms: i64,
    sweep_interval: Duration,
    formula_version: AtomicU32,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl ConcentrationCache<PkEngine> {
    /// Cache over the closed-form engine with the system clock
    pub fn new(options: CacheOptions) -> Self {
        Self::with_model(PkEngine, options, SystemClock)
    }
}

impl<M: ConcentrationModel> ConcentrationCache<M> {
    pub fn with_model(model: M, options: CacheOptions, clock: impl Clock + 'static) -> Self {
        let max_size = options.max_size.max(1);
        Self {
            model,
            max_size,
            ttl_ms: options.ttl_ms,
            sweep_interval: Duration::from_millis(options.sweep_interval_ms.max(1)),
            formula_version: AtomicU32::new(options.formula_version),
            clock: Arc::new(clock),
            state: Mutex::new(CacheState {
                entries: SizedCache::with_size(max_size),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn formula_version(&self) -> u32 {
        self.formula_version.load(Ordering::SeqCst)
    }

    /// Move to the next formula version; entries from earlier versions are
    /// never matched again and age out through LRU or TTL
    pub fn bump_formula_version(&self) -> u32 {
        let version = self.formula_version.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(version, "formula version bumped");
        version
    }

    /// Cached [`pk::calculate_concentration`]. Times within the same minute
    /// share an entry.
    pub fn get_concentration(
        &self,
        medication: &Medication,
        doses: &[Dose],
        time: i64,
        body_weight: f64,
    ) -> f64 {
        let key = CacheKey::point(self.formula_version(), medication, doses, time, body_weight);
        if let Some(CachedValue::Point(value)) = self.lookup(&key) {
            return value;
        }

        let value = self.model.concentration(medication, doses, time, body_weight);
        self.store(key, CachedValue::Point(value));
        value
    }

    /// Cached [`pk::generate_concentration_curve`]
    pub fn get_curve(
        &self,
        medication: &Medication,
        doses: &[Dose],
        start: i64,
        end: i64,
        points: usize,
        body_weight: f64,
    ) -> Vec<ConcentrationSample> {
        let key = CacheKey::curve(
            self.formula_version(),
            medication,
            doses,
            start,
            end,
            points,
            body_weight,
        );
        if let Some(CachedValue::Curve(curve)) = self.lookup(&key) {
            return curve;
        }

        let curve = self
            .model
            .curve(medication, doses, start, end, points, body_weight);
        self.store(key, CachedValue::Curve(curve.clone()));
        curve
    }

    /// Drop every entry, or only those computed for `medication_id`
    pub fn invalidate(&self, medication_id: Option<&str>) {
        let mut state = self.lock();
        match medication_id {
            None => {
                let removed = state.entries.cache_size();
                state.entries.cache_clear();
                tracing::debug!(removed, "cache cleared");
            }
            Some(id) => {
                let stale: Vec<CacheKey> = state
                    .entries
                    .key_order()
                    .filter(|key| key.base().medication_id == id)
                    .cloned()
                    .collect();
                for key in &stale {
                    state.entries.cache_remove(key);
                }
                tracing::debug!(medication = id, removed = stale.len(), "cache invalidated");
            }
        }
    }

    /// Remove expired entries now; returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.lock();
        let expired: Vec<CacheKey> = state
            .entries
            .key_order()
            .zip(state.entries.value_order())
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            state.entries.cache_remove(key);
        }
        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "expired cache entries swept");
        }
        expired.len()
    }

    pub fn get_stats(&self) -> CacheStats {
        let state = self.lock();
        let curve_cache_size = state.entries.key_order().filter(|k| k.is_curve()).count();
        let total_cache_size = state.entries.cache_size();
        CacheStats {
            point_cache_size: total_cache_size - curve_cache_size,
            curve_cache_size,
            total_cache_size,
            max_size: self.max_size,
            ttl_ms: self.ttl_ms,
            formula_version: self.formula_version(),
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Entries are plain values, a panic elsewhere cannot leave them torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &CacheEntry, now: i64) -> bool {
        now - entry.inserted_at > self.ttl_ms
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let now = self.clock.now_ms();
        let mut state = self.lock();

        let found = state
            .entries
            .cache_get(key)
            .map(|entry| (self.is_expired(entry, now), entry.value.clone()));

        match found {
            Some((false, value)) => {
                state.hits += 1;
                tracing::trace!("concentration cache hit");
                Some(value)
            }
            Some((true, _)) => {
                state.entries.cache_remove(key);
                state.misses += 1;
                tracing::trace!("concentration cache entry expired");
                None
            }
            None => {
                state.misses += 1;
                tracing::trace!("concentration cache miss");
                None
            }
        }
    }

    fn store(&self, key: CacheKey, value: CachedValue) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now_ms(),
        };
        let mut state = self.lock();
        let before = state.entries.cache_size();
        let replaced = state.entries.cache_set(key, entry).is_some();
        if !replaced && state.entries.cache_size() == before {
            state.evictions += 1;
            tracing::debug!(max_size = self.max_size, "evicted least recently used entry");
        }
    }
}

impl<M: ConcentrationModel + 'static> ConcentrationCache<M> {
    /// Run [`sweep_expired`](Self::sweep_expired) on a background thread
    /// every `sweep_interval_ms`.
    ///
    /// The thread stops when the returned handle is dropped or when the last
    /// `Arc` to the cache goes away.
    pub fn spawn_sweeper(cache: &Arc<Self>) -> SweeperHandle {
        let weak = Arc::downgrade(cache);
        let interval = cache.sweep_interval;
        let (stop, stopped) = mpsc::channel::<()>();

        let spawned = thread::Builder::new()
            .name("concentration-cache-sweep".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => match weak.upgrade() {
                        Some(cache) => {
                            cache.sweep_expired();
                        }
                        None => break,
                    },
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("could not start cache sweeper: {}", e);
                None
            }
        };

        SweeperHandle {
            stop: Some(stop),
            thread,
        }
    }
}

/// Owner of the background sweep thread
#[derive(Debug)]
pub struct SweeperHandle {
    stop: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the sweeper and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The thread may already have exited
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("cache sweeper panicked");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
