//! Tessera Transform
//!
//! Caching middleware over the pure coordinate system of `tessera_core`.
//!
//! # Features
//!
//! - **LRU + TTL Cache**: strict LRU eviction, absolute expiry, per-kind invalidation
//! - **Linearised Updates**: configuration changes invalidate the cache atomically
//! - **Batches**: order-preserving, chunked, cancellable, optionally async
//! - **Interpolations**: registered with the manager and cancelled on dispose
//! - **Instrumentation**: hit-rate metrics and an optional performance recorder

pub mod cache;
pub mod config;
pub mod error;
pub mod kind;
pub mod manager;
pub mod metrics;
pub mod result;

pub use cache::{CacheInput, CacheOutput, CacheStats, TransformCache};
pub use config::ManagerConfig;
pub use error::{Result, TransformError};
pub use kind::TransformKind;
pub use manager::{InterpolationHandle, InterpolationId, TransformManager};
pub use metrics::Metrics;
pub use result::{BatchResult, TransformResult};
