//! LRU + TTL cache for transform results
//!
//! Entries are keyed by transform kind, the bit pattern of the input point and
//! the fingerprint of the configuration the result was computed against.
//! Expiry is absolute from creation; a hit refreshes LRU recency only.
//!
//! Every invalidation bumps the cache generation. Inserts carry the generation
//! observed before computing, so a result computed before an invalidation is
//! dropped instead of stored.

use crate::kind::TransformKind;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tessera_core::{CanvasPoint, GridPoint, Rect, ScreenPoint, Vec2, WorkspacePoint};

/// Hashable form of a transform input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointKey {
    Screen(u64, u64),
    Canvas(u64, u64),
    Workspace(u64, u64),
    Vector(u64, u64),
    Grid(i32, i32),
    Scalar(u64),
}

/// Bit pattern with `-0.0` folded into `0.0`
fn bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

/// A value that can identify a cache entry
pub trait CacheInput: Copy {
    fn point_key(&self) -> PointKey;
}

impl CacheInput for ScreenPoint {
    fn point_key(&self) -> PointKey {
        PointKey::Screen(bits(self.x), bits(self.y))
    }
}

impl CacheInput for CanvasPoint {
    fn point_key(&self) -> PointKey {
        PointKey::Canvas(bits(self.x), bits(self.y))
    }
}

impl CacheInput for WorkspacePoint {
    fn point_key(&self) -> PointKey {
        PointKey::Workspace(bits(self.x), bits(self.y))
    }
}

impl CacheInput for Vec2 {
    fn point_key(&self) -> PointKey {
        PointKey::Vector(bits(self.x), bits(self.y))
    }
}

impl CacheInput for GridPoint {
    fn point_key(&self) -> PointKey {
        PointKey::Grid(self.col, self.row)
    }
}

impl CacheInput for f64 {
    fn point_key(&self) -> PointKey {
        PointKey::Scalar(bits(*self))
    }
}

/// Stored form of a transform result
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CachedValue {
    Screen(ScreenPoint),
    Canvas(CanvasPoint),
    Workspace(WorkspacePoint),
    Vector(Vec2),
    Grid(Option<GridPoint>),
    Rect(Rect),
    Scalar(f64),
}

/// A value that can be stored in the cache
pub trait CacheOutput: Clone {
    fn into_cached(self) -> CachedValue;
    fn from_cached(value: &CachedValue) -> Option<Self>;
}

macro_rules! cache_output {
    ($ty:ty, $variant:ident) => {
        impl CacheOutput for $ty {
            fn into_cached(self) -> CachedValue {
                CachedValue::$variant(self)
            }

            fn from_cached(value: &CachedValue) -> Option<Self> {
                match value {
                    CachedValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

cache_output!(ScreenPoint, Screen);
cache_output!(CanvasPoint, Canvas);
cache_output!(WorkspacePoint, Workspace);
cache_output!(Vec2, Vector);
cache_output!(Option<GridPoint>, Grid);
cache_output!(Rect, Rect);
cache_output!(f64, Scalar);

/// Full cache key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: TransformKind,
    pub point: PointKey,
    /// Fingerprint of the configuration the value was computed against
    pub fingerprint: u64,
}

impl CacheKey {
    pub fn new(kind: TransformKind, input: &impl CacheInput, fingerprint: u64) -> Self {
        Self {
            kind,
            point: input.point_key(),
            fingerprint,
        }
    }
}

/// One cached result with its bookkeeping
#[derive(Clone, Debug)]
pub struct CacheEntry {
    value: CachedValue,
    created_at: Instant,
    last_access: Instant,
    hits: u64,
}

impl CacheEntry {
    pub fn value(&self) -> &CachedValue {
        &self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_access(&self) -> Instant {
        self.last_access
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

/// Counters accumulated since construction or the last reset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries pushed out by capacity pressure
    pub evictions: u64,
    /// Entries dropped because their TTL ran out
    pub expirations: u64,
    /// Entries removed by explicit or configuration-driven invalidation
    pub invalidations: u64,
    /// Results discarded because the cache was invalidated while computing
    pub stale_inserts: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache, 0 before the first lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded transform result cache
pub struct TransformCache {
    entries: LruCache<CacheKey, CacheEntry, FxBuildHasher>,
    ttl: Duration,
    generation: u64,
    stats: CacheStats,
}

impl TransformCache {
    /// A capacity of zero is raised to one
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::with_hasher(capacity, FxBuildHasher),
            ttl,
            generation: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Look up a live entry, refreshing its recency.
    ///
    /// Expired entries are removed and reported as a miss, as are entries
    /// holding a different value type than requested.
    pub fn get<O: CacheOutput>(&mut self, key: &CacheKey, now: Instant) -> Option<O> {
        let expired = match self.entries.peek(key) {
            Some(entry) => entry.is_expired(self.ttl, now),
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if expired {
            self.entries.pop(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            return None;
        }

        let value = self.entries.get_mut(key).and_then(|entry| {
            entry.last_access = now;
            entry.hits += 1;
            O::from_cached(&entry.value)
        });
        match value {
            Some(_) => self.stats.hits += 1,
            None => self.stats.misses += 1,
        }
        value
    }

    /// Entry for `key` without touching recency or statistics
    pub fn peek(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.peek(key)
    }

    /// Store a result computed while the cache was at `generation`.
    ///
    /// Returns false, storing nothing, if the cache was invalidated since.
    pub fn insert<O: CacheOutput>(
        &mut self,
        key: CacheKey,
        value: O,
        generation: u64,
        now: Instant,
    ) -> bool {
        if generation != self.generation {
            self.stats.stale_inserts += 1;
            tracing::trace!(kind = %key.kind, "discarded result computed before invalidation");
            return false;
        }

        let entry = CacheEntry {
            value: value.into_cached(),
            created_at: now,
            last_access: now,
            hits: 0,
        };
        if let Some((evicted, _)) = self.entries.push(key.clone(), entry) {
            if evicted != key {
                self.stats.evictions += 1;
            }
        }
        true
    }

    /// Drop every entry. Returns how many were removed.
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.bump_generation(removed);
        removed
    }

    /// Drop entries whose transform name contains `pattern`
    pub fn invalidate_matching(&mut self, pattern: &str) -> usize {
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.kind.as_str().contains(pattern))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            self.entries.pop(key);
        }
        self.bump_generation(keys.len());
        keys.len()
    }

    /// Drop entries whose TTL has run out
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            self.entries.pop(key);
        }
        self.stats.expirations += keys.len() as u64;
        keys.len()
    }

    fn bump_generation(&mut self, removed: usize) {
        self.generation = self.generation.wrapping_add(1);
        self.stats.invalidations += removed as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: TransformKind, x: f64) -> CacheKey {
        CacheKey::new(kind, &CanvasPoint::new(x, 0.0), 7)
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = TransformCache::new(8, Duration::from_secs(60));
        let now = Instant::now();
        let k = key(TransformKind::CanvasToGrid, 125.0);

        assert_eq!(cache.get::<Option<GridPoint>>(&k, now), None);
        assert!(cache.insert(k.clone(), Some(GridPoint::new(2, 1)), 0, now));
        assert_eq!(
            cache.get::<Option<GridPoint>>(&k, now),
            Some(Some(GridPoint::new(2, 1)))
        );

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
        assert_eq!(cache.peek(&k).map(CacheEntry::hits), Some(1));
    }

    #[test]
    fn test_out_of_grid_result_is_cached() {
        let mut cache = TransformCache::new(8, Duration::from_secs(60));
        let now = Instant::now();
        let k = key(TransformKind::CanvasToGrid, -5.0);

        cache.insert(k.clone(), None::<GridPoint>, 0, now);
        assert_eq!(cache.get::<Option<GridPoint>>(&k, now), Some(None));
    }

    #[test]
    fn test_negative_zero_shares_entry() {
        let a = CacheKey::new(TransformKind::ScreenToCanvas, &ScreenPoint::new(0.0, 1.0), 0);
        let b = CacheKey::new(TransformKind::ScreenToCanvas, &ScreenPoint::new(-0.0, 1.0), 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_coordinates_in_different_spaces_differ() {
        let screen = CacheKey::new(TransformKind::custom("probe"), &ScreenPoint::new(1.0, 2.0), 0);
        let canvas = CacheKey::new(TransformKind::custom("probe"), &CanvasPoint::new(1.0, 2.0), 0);
        assert_ne!(screen, canvas);
    }

    #[test]
    fn test_strict_lru_eviction() {
        let mut cache = TransformCache::new(2, Duration::from_secs(60));
        let now = Instant::now();
        let (a, b, c) = (
            key(TransformKind::ScreenToCanvas, 1.0),
            key(TransformKind::ScreenToCanvas, 2.0),
            key(TransformKind::ScreenToCanvas, 3.0),
        );

        cache.insert(a.clone(), CanvasPoint::new(1.0, 0.0), 0, now);
        cache.insert(b.clone(), CanvasPoint::new(2.0, 0.0), 0, now);
        // Touch `a` so `b` is least recently used
        assert!(cache.get::<CanvasPoint>(&a, now).is_some());
        cache.insert(c.clone(), CanvasPoint::new(3.0, 0.0), 0, now);

        assert!(cache.peek(&a).is_some());
        assert!(cache.peek(&b).is_none());
        assert!(cache.peek(&c).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_ttl_is_absolute_from_creation() {
        let ttl = Duration::from_millis(100);
        let mut cache = TransformCache::new(8, ttl);
        let start = Instant::now();
        let k = key(TransformKind::ScreenToCanvas, 1.0);
        cache.insert(k.clone(), CanvasPoint::new(1.0, 0.0), 0, start);

        // Hits do not extend the lifetime
        let mid = start + Duration::from_millis(90);
        assert!(cache.get::<CanvasPoint>(&k, mid).is_some());
        assert_eq!(cache.peek(&k).map(CacheEntry::last_access), Some(mid));

        let late = start + ttl;
        assert!(cache.get::<CanvasPoint>(&k, late).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_purge_expired() {
        let mut cache = TransformCache::new(8, Duration::from_millis(50));
        let start = Instant::now();
        cache.insert(key(TransformKind::ScreenToCanvas, 1.0), CanvasPoint::ZERO, 0, start);
        cache.insert(
            key(TransformKind::ScreenToCanvas, 2.0),
            CanvasPoint::ZERO,
            0,
            start + Duration::from_millis(40),
        );

        assert_eq!(cache.purge_expired(start + Duration::from_millis(60)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_insert_is_dropped() {
        let mut cache = TransformCache::new(8, Duration::from_secs(60));
        let now = Instant::now();
        let generation = cache.generation();

        cache.invalidate_all();
        let k = key(TransformKind::CanvasToGrid, 1.0);
        assert!(!cache.insert(k.clone(), Some(GridPoint::new(0, 0)), generation, now));
        assert!(cache.peek(&k).is_none());
        assert_eq!(cache.stats().stale_inserts, 1);
    }

    #[test]
    fn test_invalidate_matching() {
        let mut cache = TransformCache::new(8, Duration::from_secs(60));
        let now = Instant::now();
        cache.insert(key(TransformKind::CanvasToGrid, 1.0), None::<GridPoint>, 0, now);
        cache.insert(key(TransformKind::ScreenToGrid, 1.0), None::<GridPoint>, 0, now);
        cache.insert(key(TransformKind::ScreenToCanvas, 1.0), CanvasPoint::ZERO, 0, now);

        assert_eq!(cache.invalidate_matching("to_grid"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().invalidations, 2);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let mut cache = TransformCache::new(8, Duration::from_secs(60));
        let now = Instant::now();
        let k = key(TransformKind::custom("probe"), 1.0);
        cache.insert(k.clone(), 3.0_f64, 0, now);

        assert_eq!(cache.get::<CanvasPoint>(&k, now), None);
        assert_eq!(cache.get::<f64>(&k, now), Some(3.0));
        assert_eq!(cache.stats().misses, 1);
    }
}
