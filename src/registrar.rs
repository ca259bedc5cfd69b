// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SKU search extension and its hook sets.
//!
//! The storage backend is chosen once, at construction, and decides which
//! hooks exist at all:
//!
//! ```text
//! SkuSearch::new(config, collaborators, detector)
//!       │
//!       ├─→ indexed tables → IndexedHooks { register_filter_option, translate_where }
//!       └─→ legacy posts   → LegacyHooks  { translate_results }
//! ```

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::{OrderStorage, SkuSearchConfig};
use crate::search::{
    register_filter_option, IndexedTranslator, LegacyTranslator, OrderId, OrderQueryContext,
    SearchError, SearchFilterOptions,
};
use crate::storage::traits::{LegacyOrderIndex, OrderStorageDetector, ProductLookup, ResultCache};

/// External services the translators call into.
#[derive(Clone)]
pub struct Collaborators {
    pub products: Arc<dyn ProductLookup>,
    pub legacy_orders: Arc<dyn LegacyOrderIndex>,
    pub cache: Arc<dyn ResultCache>,
}

/// Hooks for the indexed order tables.
#[derive(Clone)]
pub struct IndexedHooks {
    config: Arc<SkuSearchConfig>,
    translator: IndexedTranslator,
}

impl IndexedHooks {
    /// Add the SKU scope to whatever option list the host passed.
    pub fn register_filter_option(&self, existing_options: &Value) -> Value {
        self.register_filter_options(SearchFilterOptions::from_host(existing_options))
            .to_json()
    }

    pub fn register_filter_options(&self, options: SearchFilterOptions) -> SearchFilterOptions {
        let label = html_escape::encode_safe(&self.config.filter_label);
        register_filter_option(options, &label)
    }

    pub async fn translate_where(
        &self,
        where_fragment: &str,
        search_term: &str,
        search_filter: &str,
        ctx: &OrderQueryContext,
    ) -> Result<String, SearchError> {
        self.translator
            .translate_where(where_fragment, search_term, search_filter, ctx)
            .await
    }

    /// Query context for the configured orders table.
    pub fn default_context(&self) -> OrderQueryContext {
        OrderQueryContext::for_config(&self.config)
    }
}

/// Hooks for the post-based order schema.
#[derive(Clone)]
pub struct LegacyHooks {
    translator: LegacyTranslator,
}

impl LegacyHooks {
    pub async fn translate_results(
        &self,
        existing_order_ids: &[OrderId],
        search_term: &str,
        search_fields: &[String],
    ) -> Result<Vec<OrderId>, SearchError> {
        self.translator
            .translate_results(existing_order_ids, search_term, search_fields)
            .await
    }
}

#[derive(Clone)]
pub enum SearchHooks {
    Indexed(IndexedHooks),
    Legacy(LegacyHooks),
}

impl SearchHooks {
    pub fn storage(&self) -> OrderStorage {
        match self {
            SearchHooks::Indexed(_) => OrderStorage::Indexed,
            SearchHooks::Legacy(_) => OrderStorage::Legacy,
        }
    }

    pub fn indexed(&self) -> Option<&IndexedHooks> {
        match self {
            SearchHooks::Indexed(hooks) => Some(hooks),
            SearchHooks::Legacy(_) => None,
        }
    }

    pub fn legacy(&self) -> Option<&LegacyHooks> {
        match self {
            SearchHooks::Legacy(hooks) => Some(hooks),
            SearchHooks::Indexed(_) => None,
        }
    }
}

/// The SKU search extension, wired for one storage backend.
pub struct SkuSearch {
    config: Arc<SkuSearchConfig>,
    hooks: SearchHooks,
}

impl SkuSearch {
    /// Pick the backend from `config.order_storage`, falling back to the detector.
    pub fn new(
        config: SkuSearchConfig,
        collaborators: Collaborators,
        detector: &dyn OrderStorageDetector,
    ) -> Self {
        let storage = config.order_storage.unwrap_or_else(|| {
            if detector.custom_order_tables_enabled() {
                OrderStorage::Indexed
            } else {
                OrderStorage::Legacy
            }
        });
        Self::with_storage(config, collaborators, storage)
    }

    pub fn with_storage(
        config: SkuSearchConfig,
        collaborators: Collaborators,
        storage: OrderStorage,
    ) -> Self {
        let config = Arc::new(config);
        let hooks = match storage {
            OrderStorage::Indexed => SearchHooks::Indexed(IndexedHooks {
                config: config.clone(),
                translator: IndexedTranslator::new(config.clone(), collaborators.products),
            }),
            OrderStorage::Legacy => SearchHooks::Legacy(LegacyHooks {
                translator: LegacyTranslator::new(
                    config.clone(),
                    collaborators.products,
                    collaborators.legacy_orders,
                    collaborators.cache,
                ),
            }),
        };
        info!(storage = ?storage, "SKU order search registered");
        Self { config, hooks }
    }

    pub fn hooks(&self) -> &SearchHooks {
        &self.hooks
    }

    pub fn storage(&self) -> OrderStorage {
        self.hooks.storage()
    }

    pub fn config(&self) -> &SkuSearchConfig {
        &self.config
    }
}
