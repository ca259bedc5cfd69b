// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Order SKU Search
//!
//! Search-translation layer that lets an order-management admin search find
//! orders by product SKU, on both order storage schemas of the host platform.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Filter Registrar                        │
//! │  • Adds the "product_sku" scope next to "products"         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Backend-Aware Query Translator              │
//! │  • SKU → product IDs via ProductLookup                     │
//! │  • Indexed schema: parameterized EXISTS predicate          │
//! │  • Legacy schema: order-ID set merged into host results    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     (legacy schema only)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Result Cache                          │
//! │  • Keyed by hash of the sorted product-ID set              │
//! │  • 1 hour TTL, shared store (Redis or in-memory)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use order_sku_search::{Collaborators, SearchHooks, SkuSearch, SkuSearchConfig};
//! use order_sku_search::search::OrderQueryContext;
//! use order_sku_search::storage::memory::{InMemoryCatalog, InMemoryResultCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(InMemoryCatalog::new());
//! catalog.add_product(42, "ABC123");
//!
//! let collaborators = Collaborators {
//!     products: catalog.clone(),
//!     legacy_orders: catalog.clone(),
//!     cache: Arc::new(InMemoryResultCache::new()),
//! };
//! let search = SkuSearch::with_storage(
//!     SkuSearchConfig::default(),
//!     collaborators,
//!     order_sku_search::OrderStorage::Indexed,
//! );
//!
//! if let SearchHooks::Indexed(hooks) = search.hooks() {
//!     let ctx = OrderQueryContext::new("wp_wc_orders");
//!     let where_sql = hooks.translate_where("", "ABC123", "product_sku", &ctx).await?;
//!     println!("{where_sql}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`search`]: filter options, SQL fragments, both schema translators
//! - [`storage`]: collaborator traits and memory / SQL / Redis adapters
//! - [`registrar`]: the [`SkuSearch`] extension and its hook sets
//! - [`config`]: [`SkuSearchConfig`]
//! - [`metrics`]: counters for lookups and cache behaviour

pub mod config;
pub mod metrics;
pub mod registrar;
pub mod search;
pub mod storage;

pub use config::{OrderStorage, SkuSearchConfig};
pub use registrar::{Collaborators, IndexedHooks, LegacyHooks, SearchHooks, SkuSearch};
pub use search::{
    OrderId, OrderQueryContext, ProductId, SearchFilterOptions, SearchFilterScope, SqlFragment,
    SqlParam,
};
pub use storage::traits::{
    LegacyOrderIndex, OrderStorageDetector, ProductLookup, ResultCache, StorageError,
};
