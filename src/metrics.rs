// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the SKU search layer.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host process is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `sku_search_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `backend`: indexed, legacy
//! - `outcome`: matched, no_match, hit, miss, passthrough

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record the result of resolving a SKU to product IDs
pub fn record_lookup(backend: &str, outcome: &str) {
    counter!(
        "sku_search_lookups_total",
        "backend" => backend.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a request that returned its input untouched (empty term, other scope)
pub fn record_passthrough(backend: &str) {
    counter!(
        "sku_search_passthrough_total",
        "backend" => backend.to_string()
    )
    .increment(1);
}

/// Record a result cache lookup (`hit` or `miss`)
pub fn record_cache(outcome: &str) {
    counter!(
        "sku_search_cache_lookups_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record how many order IDs the legacy path added to the host's results
pub fn record_orders_merged(added: usize) {
    counter!("sku_search_orders_merged_total").increment(added as u64);
}

/// Record a collaborator failure surfaced to the host
pub fn record_error(backend: &str, operation: &str) {
    counter!(
        "sku_search_errors_total",
        "backend" => backend.to_string(),
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(backend: &str, operation: &str, duration: Duration) {
    histogram!(
        "sku_search_operation_seconds",
        "backend" => backend.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records latency on drop.
pub struct LatencyTimer {
    backend: &'static str,
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    pub fn new(backend: &'static str, operation: &'static str) -> Self {
        Self {
            backend,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.backend, self.operation, self.start.elapsed());
    }
}
