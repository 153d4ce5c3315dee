//! Annotated transform results

use std::time::Duration;

/// A transformed value and how it was obtained
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformResult<T> {
    pub value: T,
    pub was_from_cache: bool,
    /// Time spent inside the manager for this point
    pub execution_time: Duration,
}

impl<T> TransformResult<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Results of a batch, in input order
#[derive(Clone, Debug, PartialEq)]
pub struct BatchResult<T> {
    pub results: Vec<TransformResult<T>>,
    pub cache_hits: usize,
    /// Wall time for the whole batch, including yields
    pub total_time: Duration,
}

impl<T> BatchResult<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            cache_hits: 0,
            total_time: Duration::ZERO,
        }
    }

    pub(crate) fn push(&mut self, result: TransformResult<T>) {
        if result.was_from_cache {
            self.cache_hits += 1;
        }
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Fraction of points served from cache, 0 for an empty batch
    pub fn hit_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.cache_hits as f64 / self.results.len() as f64
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.results.iter().map(|r| &r.value)
    }

    pub fn into_values(self) -> Vec<T> {
        self.results.into_iter().map(|r| r.value).collect()
    }
}
