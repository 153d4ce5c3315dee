//! Transform manager
//!
//! Wraps the pure [`CoordinateSystem`] transforms with caching, batching,
//! interpolation bookkeeping and performance recording. The coordinate system
//! is held as an immutable snapshot that configuration changes replace
//! wholesale; every replacement invalidates the whole cache while holding the
//! snapshot lock, so no transform issued after an update returns can observe
//! results computed against the previous configuration.
//!
//! Concurrent misses for the same key may compute the value twice. Both
//! computations see a consistent snapshot, and a result computed before an
//! invalidation is never stored after it.

use crate::cache::{CacheInput, CacheKey, CacheOutput, TransformCache};
use crate::config::ManagerConfig;
use crate::error::{Result, TransformError};
use crate::kind::TransformKind;
use crate::metrics::Metrics;
use crate::result::{BatchResult, TransformResult};
use parking_lot::{Mutex, RwLock};
use slotmap::{new_key_type, SlotMap};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tessera_animation::{CancelToken, Easing, Frames, Interpolation};
use tessera_core::{
    CanvasPoint, CanvasRect, CoordinateSystem, CoordinateSystemConfig, GridPoint, GridRect,
    ScreenPoint, Vec2, ViewState, WorkspacePoint,
};
use tessera_recorder::{RecordingConfig, RecordingExport, SharedRecordingSession};

new_key_type! {
    /// Handle to an interpolation created by the manager
    pub struct InterpolationId;
}

type Registry = Arc<Mutex<SlotMap<InterpolationId, CancelToken>>>;

/// Coordinate system paired with the fingerprint used in cache keys
#[derive(Clone)]
struct Snapshot {
    system: Arc<CoordinateSystem>,
    fingerprint: u64,
}

impl Snapshot {
    fn new(system: CoordinateSystem) -> Self {
        let fingerprint = system.config().fingerprint();
        Self {
            system: Arc::new(system),
            fingerprint,
        }
    }
}

/// Caching middleware over a [`CoordinateSystem`]
pub struct TransformManager {
    config: ManagerConfig,
    snapshot: RwLock<Snapshot>,
    cache: Mutex<TransformCache>,
    recorder: SharedRecordingSession,
    interpolations: Registry,
    disposed: AtomicBool,
}

impl TransformManager {
    /// Create a manager over a freshly validated coordinate system
    pub fn new(config: ManagerConfig, system_config: CoordinateSystemConfig) -> Result<Self> {
        let system = CoordinateSystem::new(system_config)?;
        Ok(Self::with_system(config, system))
    }

    pub fn with_system(config: ManagerConfig, system: CoordinateSystem) -> Self {
        let cache = TransformCache::new(config.max_entries, config.ttl);
        let recorder = SharedRecordingSession::new(
            RecordingConfig::standard().with_max_records(config.record_capacity),
        );
        tracing::debug!(
            max_entries = config.max_entries,
            ttl_ms = config.ttl.as_millis() as u64,
            "transform manager created"
        );
        Self {
            config,
            snapshot: RwLock::new(Snapshot::new(system)),
            cache: Mutex::new(cache),
            recorder,
            interpolations: Arc::new(Mutex::new(SlotMap::with_key())),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(TransformError::Disposed)
        } else {
            Ok(())
        }
    }

    /// The coordinate system currently in effect
    pub fn coordinate_system(&self) -> Result<Arc<CoordinateSystem>> {
        self.ensure_live()?;
        Ok(Arc::clone(&self.snapshot.read().system))
    }

    // =========================================================================
    // Cached transforms
    // =========================================================================

    /// Transform `from` through `compute`, caching the result under `kind`.
    ///
    /// `compute` receives the coordinate system snapshot the result will be
    /// keyed against, so any `CoordinateSystem` method can be passed directly:
    ///
    /// ```rust
    /// use tessera_core::{CanvasPoint, CoordinateSystem, CoordinateSystemConfig, GridPoint};
    /// use tessera_transform::{ManagerConfig, TransformKind, TransformManager};
    ///
    /// let manager =
    ///     TransformManager::new(ManagerConfig::testing(), CoordinateSystemConfig::default()).unwrap();
    /// let point = CanvasPoint::new(125.0, 75.0);
    ///
    /// let first = manager
    ///     .transform(point, TransformKind::CanvasToGrid, CoordinateSystem::canvas_to_grid)
    ///     .unwrap();
    /// let second = manager
    ///     .transform(point, TransformKind::CanvasToGrid, CoordinateSystem::canvas_to_grid)
    ///     .unwrap();
    ///
    /// assert_eq!(first.value, Some(GridPoint::new(2, 1)));
    /// assert!(!first.was_from_cache);
    /// assert!(second.was_from_cache);
    /// ```
    pub fn transform<I, O, F>(
        &self,
        from: I,
        kind: impl Into<TransformKind>,
        compute: F,
    ) -> Result<TransformResult<O>>
    where
        I: CacheInput,
        O: CacheOutput,
        F: FnOnce(&CoordinateSystem, I) -> O,
    {
        self.ensure_live()?;
        Ok(self.run(from, kind.into(), compute))
    }

    fn run<I, O, F>(&self, from: I, kind: TransformKind, compute: F) -> TransformResult<O>
    where
        I: CacheInput,
        O: CacheOutput,
        F: FnOnce(&CoordinateSystem, I) -> O,
    {
        let start = Instant::now();

        // Snapshot, lookup and generation are read under the snapshot lock so
        // they are consistent with one another
        let (snapshot, key, cached, generation) = {
            let guard = self.snapshot.read();
            let key = CacheKey::new(kind, &from, guard.fingerprint);
            let mut cache = self.cache.lock();
            let cached = cache.get::<O>(&key, start);
            (guard.clone(), key, cached, cache.generation())
        };

        if let Some(value) = cached {
            let execution_time = start.elapsed();
            tracing::trace!(kind = %key.kind, "transform cache hit");
            self.recorder.record(key.kind.as_str(), execution_time, true);
            return TransformResult {
                value,
                was_from_cache: true,
                execution_time,
            };
        }

        let value = compute(&snapshot.system, from);
        let execution_time = start.elapsed();
        tracing::trace!(kind = %key.kind, "transform cache miss");
        self.recorder.record(key.kind.as_str(), execution_time, false);

        // Checked under the cache lock: dispose sets the flag before it
        // clears the cache under the same lock
        let mut cache = self.cache.lock();
        if !self.is_disposed() {
            cache.insert(key, value.clone(), generation, Instant::now());
        }
        drop(cache);

        TransformResult {
            value,
            was_from_cache: false,
            execution_time,
        }
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Transform every point, returning results in input order
    pub fn batch_transform<I, O, F>(
        &self,
        points: &[I],
        kind: impl Into<TransformKind>,
        compute: F,
    ) -> Result<BatchResult<O>>
    where
        I: CacheInput,
        O: CacheOutput,
        F: FnMut(&CoordinateSystem, I) -> O,
    {
        self.batch_transform_with_cancel(points, kind, compute, &CancelToken::new())
    }

    /// Like [`batch_transform`](Self::batch_transform), checking `cancel`
    /// before each chunk.
    ///
    /// Cancellation returns [`TransformError::Cancelled`]; results already
    /// computed stay cached.
    pub fn batch_transform_with_cancel<I, O, F>(
        &self,
        points: &[I],
        kind: impl Into<TransformKind>,
        mut compute: F,
        cancel: &CancelToken,
    ) -> Result<BatchResult<O>>
    where
        I: CacheInput,
        O: CacheOutput,
        F: FnMut(&CoordinateSystem, I) -> O,
    {
        self.ensure_live()?;
        let kind = kind.into();
        let start = Instant::now();
        let mut batch = BatchResult::with_capacity(points.len());

        for chunk in points.chunks(self.config.batch_chunk_size.max(1)) {
            self.check_chunk(cancel, batch.len())?;
            for &point in chunk {
                batch.push(self.run(point, kind.clone(), &mut compute));
            }
            tracing::trace!(kind = %kind, completed = batch.len(), "batch chunk processed");
        }

        batch.total_time = start.elapsed();
        tracing::debug!(
            kind = %kind,
            points = batch.len(),
            hit_rate = batch.hit_rate(),
            "batch transform finished"
        );
        Ok(batch)
    }

    /// Batch transform that yields to the tokio scheduler between chunks so
    /// other tasks on the same thread stay responsive
    pub async fn batch_transform_async<I, O, F>(
        &self,
        points: &[I],
        kind: impl Into<TransformKind>,
        mut compute: F,
        cancel: &CancelToken,
    ) -> Result<BatchResult<O>>
    where
        I: CacheInput,
        O: CacheOutput,
        F: FnMut(&CoordinateSystem, I) -> O,
    {
        self.ensure_live()?;
        let kind = kind.into();
        let start = Instant::now();
        let mut batch = BatchResult::with_capacity(points.len());

        for chunk in points.chunks(self.config.batch_chunk_size.max(1)) {
            self.check_chunk(cancel, batch.len())?;
            for &point in chunk {
                batch.push(self.run(point, kind.clone(), &mut compute));
            }
            tokio::task::yield_now().await;
        }

        batch.total_time = start.elapsed();
        tracing::debug!(
            kind = %kind,
            points = batch.len(),
            hit_rate = batch.hit_rate(),
            "async batch transform finished"
        );
        Ok(batch)
    }

    fn check_chunk(&self, cancel: &CancelToken, completed: usize) -> Result<()> {
        self.ensure_live()?;
        if cancel.is_cancelled() {
            tracing::debug!(completed, "batch transform cancelled");
            return Err(TransformError::Cancelled { completed });
        }
        Ok(())
    }

    // =========================================================================
    // Configuration and view
    // =========================================================================

    /// Replace the coordinate system configuration and drop every cached
    /// result. On error the previous configuration and cache stay intact.
    pub fn update_coordinate_system(&self, config: CoordinateSystemConfig) -> Result<()> {
        self.update(|system| system.configure(config))
    }

    pub fn view_state(&self) -> Result<ViewState> {
        Ok(self.coordinate_system()?.view_state())
    }

    pub fn set_view(&self, view: ViewState) -> Result<()> {
        self.update(|system| system.set_view(view))
    }

    pub fn apply_zoom(&self, factor: f64, focal: CanvasPoint) -> Result<()> {
        self.update(|system| system.apply_zoom(factor, focal))
    }

    pub fn apply_zoom_at_screen(&self, factor: f64, focal: ScreenPoint) -> Result<()> {
        self.update(|system| system.apply_zoom_at_screen(factor, focal))
    }

    pub fn apply_pan(&self, delta: Vec2) -> Result<()> {
        self.update(|system| system.apply_pan(delta))
    }

    pub fn center_on_grid_point(&self, point: GridPoint) -> Result<()> {
        self.update(|system| system.center_on_grid_point(point))
    }

    pub fn fit_grid_to_view(&self) -> Result<()> {
        self.update(|system| system.fit_grid_to_view())
    }

    pub fn reset_view(&self) -> Result<()> {
        self.update(CoordinateSystem::reset_view)
    }

    pub fn visible_grid_bounds(&self) -> Result<GridRect> {
        Ok(self.coordinate_system()?.visible_grid_bounds())
    }

    /// Apply `change` to a copy of the coordinate system, then swap it in and
    /// invalidate the cache while still holding the snapshot lock
    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut CoordinateSystem) -> tessera_core::Result<()>,
    {
        self.ensure_live()?;
        let mut guard = self.snapshot.write();
        let mut system = (*guard.system).clone();
        change(&mut system)?;

        *guard = Snapshot::new(system);
        let removed = self.cache.lock().invalidate_all();
        tracing::debug!(
            removed,
            fingerprint = guard.fingerprint,
            "coordinate system updated, cache invalidated"
        );
        Ok(())
    }

    // =========================================================================
    // Cache maintenance
    // =========================================================================

    /// Drop cached results whose transform name contains `pattern`
    pub fn invalidate_matching(&self, pattern: &str) -> Result<usize> {
        self.ensure_live()?;
        let removed = self.cache.lock().invalidate_matching(pattern);
        tracing::debug!(pattern, removed, "cache entries invalidated");
        Ok(removed)
    }

    pub fn invalidate_all(&self) -> Result<usize> {
        self.ensure_live()?;
        let removed = self.cache.lock().invalidate_all();
        tracing::debug!(removed, "cache cleared");
        Ok(removed)
    }

    pub fn purge_expired(&self) -> Result<usize> {
        self.ensure_live()?;
        Ok(self.cache.lock().purge_expired(Instant::now()))
    }

    pub fn get_metrics(&self) -> Result<Metrics> {
        self.ensure_live()?;
        let (stats, size, capacity) = {
            let cache = self.cache.lock();
            (cache.stats(), cache.len(), cache.capacity())
        };
        let stats = if self.config.enable_metrics {
            stats
        } else {
            Default::default()
        };
        let recording = if self.recorder.is_recording() {
            Some(self.recorder.summary())
        } else {
            None
        };

        Ok(Metrics {
            cache: stats,
            hit_rate: stats.hit_rate(),
            size,
            capacity,
            target_hit_rate: self.config.target_hit_rate,
            active_interpolations: self.count_active_interpolations(),
            recording,
        })
    }

    // =========================================================================
    // Recording
    // =========================================================================

    pub fn start_recording(&self) -> Result<()> {
        self.ensure_live()?;
        self.recorder.start();
        Ok(())
    }

    pub fn stop_recording(&self) -> Result<()> {
        self.ensure_live()?;
        self.recorder.stop();
        Ok(())
    }

    pub fn is_recording(&self) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.recorder.is_recording())
    }

    /// Every record collected since the last reset
    pub fn export_records(&self) -> Result<RecordingExport> {
        self.ensure_live()?;
        Ok(self.recorder.export())
    }

    // =========================================================================
    // Interpolation
    // =========================================================================

    /// Create an interpolation that is cancelled when the manager is disposed
    pub fn create_interpolation(
        &self,
        duration: Duration,
        easing: Easing,
        fps: u32,
    ) -> Result<InterpolationHandle> {
        let interpolation = Interpolation::new(duration, easing, fps);

        // Checked under the registry lock so dispose cannot miss it
        let mut registry = self.interpolations.lock();
        self.ensure_live()?;
        let id = registry.insert(interpolation.cancel_token());
        tracing::trace!(?easing, fps = interpolation.fps(), "interpolation created");

        Ok(InterpolationHandle {
            id,
            interpolation,
            registry: Arc::downgrade(&self.interpolations),
        })
    }

    /// Frames moving the view from its current state to `target`.
    ///
    /// The host applies each frame with [`set_view`](Self::set_view).
    pub fn animate_view_to(
        &self,
        target: ViewState,
        interpolation: &Interpolation,
    ) -> Result<Frames<ViewState>> {
        let system = self.coordinate_system()?;
        let target = ViewState::new(system.config().clamp_zoom(target.zoom), target.pan);
        Ok(interpolation.frames(system.view_state(), target))
    }

    /// Interpolations that are alive and not cancelled
    pub fn active_interpolations(&self) -> Result<usize> {
        self.ensure_live()?;
        Ok(self.count_active_interpolations())
    }

    fn count_active_interpolations(&self) -> usize {
        self.interpolations
            .lock()
            .values()
            .filter(|token| !token.is_cancelled())
            .count()
    }

    fn cancel_interpolations(&self) -> usize {
        let mut registry = self.interpolations.lock();
        let count = registry.len();
        for (_, token) in registry.drain() {
            token.cancel();
        }
        count
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Clear the cache, its statistics and all recorded data. The coordinate
    /// system configuration is kept.
    pub fn reset(&self) -> Result<()> {
        self.ensure_live()?;
        {
            let mut cache = self.cache.lock();
            cache.invalidate_all();
            cache.reset_stats();
        }
        self.recorder.reset();
        tracing::debug!("transform manager reset");
        Ok(())
    }

    /// Cancel live interpolations and release cached state. Every later call,
    /// including another `dispose`, fails with [`TransformError::Disposed`].
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Err(TransformError::Disposed);
        }
        let cancelled = self.cancel_interpolations();
        self.cache.lock().invalidate_all();
        self.recorder.reset();
        tracing::debug!(cancelled, "transform manager disposed");
        Ok(())
    }
}

impl Drop for TransformManager {
    fn drop(&mut self) {
        // Stop animations still driven from a dropped manager
        self.cancel_interpolations();
    }
}

macro_rules! bound_transforms {
    ($($(#[$doc:meta])* $name:ident($input:ty) -> $output:ty => $kind:ident;)*) => {
        impl TransformManager {
            $(
                $(#[$doc])*
                pub fn $name(&self, point: $input) -> Result<TransformResult<$output>> {
                    self.transform(point, TransformKind::$kind, CoordinateSystem::$name)
                }
            )*
        }
    };
}

bound_transforms! {
    screen_to_canvas(ScreenPoint) -> CanvasPoint => ScreenToCanvas;
    canvas_to_screen(CanvasPoint) -> ScreenPoint => CanvasToScreen;
    /// `None` when the point falls outside the grid
    canvas_to_grid(CanvasPoint) -> Option<GridPoint> => CanvasToGrid;
    grid_to_canvas(GridPoint) -> CanvasPoint => GridToCanvas;
    canvas_to_workspace(CanvasPoint) -> WorkspacePoint => CanvasToWorkspace;
    workspace_to_canvas(WorkspacePoint) -> CanvasPoint => WorkspaceToCanvas;
    screen_to_grid(ScreenPoint) -> Option<GridPoint> => ScreenToGrid;
    grid_to_screen(GridPoint) -> ScreenPoint => GridToScreen;
    screen_to_workspace(ScreenPoint) -> WorkspacePoint => ScreenToWorkspace;
    workspace_to_screen(WorkspacePoint) -> ScreenPoint => WorkspaceToScreen;
    workspace_to_grid(WorkspacePoint) -> Option<GridPoint> => WorkspaceToGrid;
    grid_to_workspace(GridPoint) -> WorkspacePoint => GridToWorkspace;
    grid_cell_to_canvas_bounds(GridPoint) -> CanvasRect => GridCellBounds;
}

/// An interpolation registered with a [`TransformManager`].
///
/// Dropping the handle deregisters it; disposing the manager cancels it.
pub struct InterpolationHandle {
    id: InterpolationId,
    interpolation: Interpolation,
    registry: Weak<Mutex<SlotMap<InterpolationId, CancelToken>>>,
}

impl InterpolationHandle {
    pub fn id(&self) -> InterpolationId {
        self.id
    }
}

impl Deref for InterpolationHandle {
    type Target = Interpolation;

    fn deref(&self) -> &Interpolation {
        &self.interpolation
    }
}

impl Drop for InterpolationHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.id);
        }
    }
}
