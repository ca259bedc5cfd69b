// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Legacy-Schema Translator
//!
//! On the post-based schema the host only asks for extra order IDs, so this
//! path runs the product → order join itself and merges the result.
//!
//! # Flow
//!
//! ```text
//! translate_results(existing, term)
//!       │
//!       ├─→ empty term / no product → existing, untouched
//!       │
//!       ├─→ key = sha256(sorted product ids)
//!       │
//!       ├─→ ResultCache hit? → cached order ids
//!       │
//!       └─→ miss → join query → cache for 1h
//!                │
//!                └─→ existing ∪ found (de-duplicated)
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::cache_key::scoped_product_set_cache_key;
use super::sql_fragment::{placeholder_list, SqlFragment, SqlParam};
use super::{OrderId, ProductId, SearchError};
use crate::config::SkuSearchConfig;
use crate::metrics;
use crate::storage::traits::{LegacyOrderIndex, ProductLookup, ResultCache};

const BACKEND: &str = "legacy";

/// Everything the legacy join needs, resolved from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyOrderQuery {
    /// Sorted, de-duplicated product ids
    pub product_ids: Vec<ProductId>,
    pub post_type: String,
    pub statuses: Vec<String>,
    pub product_meta_key: String,
    pub posts_table: String,
    pub order_items_table: String,
    pub order_itemmeta_table: String,
}

impl LegacyOrderQuery {
    pub fn new(product_ids: &[ProductId], config: &SkuSearchConfig) -> Self {
        let mut product_ids = product_ids.to_vec();
        product_ids.sort_unstable();
        product_ids.dedup();

        Self {
            product_ids,
            post_type: config.legacy_order_post_type.clone(),
            statuses: config.legacy_order_statuses.clone(),
            product_meta_key: config.product_meta_key.clone(),
            posts_table: config.table("posts"),
            order_items_table: config.table("woocommerce_order_items"),
            order_itemmeta_table: config.table("woocommerce_order_itemmeta"),
        }
    }

    /// Everything besides the product set that changes the join's answer.
    ///
    /// Statuses are sorted so reordering the allow-list keeps the key.
    pub fn cache_scope(&self) -> String {
        let mut statuses = self.statuses.clone();
        statuses.sort_unstable();
        statuses.dedup();
        serde_json::json!([
            self.posts_table,
            self.order_items_table,
            self.order_itemmeta_table,
            self.post_type,
            self.product_meta_key,
            statuses,
        ])
        .to_string()
    }

    /// The join as a parameterized fragment.
    ///
    /// An empty product or status list collapses its IN-list to `1=0`.
    pub fn to_fragment(&self) -> SqlFragment {
        let status_clause = if self.statuses.is_empty() {
            "1=0".to_string()
        } else {
            format!("o.post_status IN ({})", placeholder_list("%s", self.statuses.len()))
        };
        let product_clause = if self.product_ids.is_empty() {
            "1=0".to_string()
        } else {
            format!(
                "oim.meta_value IN ({})",
                placeholder_list("%d", self.product_ids.len())
            )
        };

        let clause = format!(
            "SELECT DISTINCT CAST(o.ID AS SIGNED) AS order_id FROM %i o \
             INNER JOIN %i oi ON o.ID = oi.order_id \
             INNER JOIN %i oim ON oi.order_item_id = oim.order_item_id \
             WHERE o.post_type = %s AND {} AND oim.meta_key = %s AND {}",
            status_clause, product_clause
        );

        let mut params = vec![
            SqlParam::Identifier(self.posts_table.clone()),
            SqlParam::Identifier(self.order_items_table.clone()),
            SqlParam::Identifier(self.order_itemmeta_table.clone()),
            SqlParam::Text(self.post_type.clone()),
        ];
        params.extend(self.statuses.iter().map(|s| SqlParam::Text(s.clone())));
        params.push(SqlParam::Text(self.product_meta_key.clone()));
        params.extend(self.product_ids.iter().map(|id| SqlParam::Int(*id)));

        SqlFragment::new(clause, params)
    }
}

/// Union of `existing` and `found`, first occurrence wins, no duplicates.
pub fn merge_order_ids(existing: &[OrderId], found: &[OrderId]) -> Vec<OrderId> {
    let mut seen = HashSet::with_capacity(existing.len() + found.len());
    existing
        .iter()
        .chain(found.iter())
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Result-set translator for the post-based order schema.
#[derive(Clone)]
pub struct LegacyTranslator {
    config: Arc<SkuSearchConfig>,
    products: Arc<dyn ProductLookup>,
    orders: Arc<dyn LegacyOrderIndex>,
    cache: Arc<dyn ResultCache>,
}

impl LegacyTranslator {
    pub fn new(
        config: Arc<SkuSearchConfig>,
        products: Arc<dyn ProductLookup>,
        orders: Arc<dyn LegacyOrderIndex>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self {
            config,
            products,
            orders,
            cache,
        }
    }

    /// Merge orders containing the SKU's products into `existing_order_ids`.
    ///
    /// `_search_fields` is accepted for hook compatibility; the SKU match does
    /// not depend on which fields the host searched.
    #[instrument(skip(self, existing_order_ids, _search_fields), fields(existing = existing_order_ids.len()))]
    pub async fn translate_results(
        &self,
        existing_order_ids: &[OrderId],
        search_term: &str,
        _search_fields: &[String],
    ) -> Result<Vec<OrderId>, SearchError> {
        if search_term.is_empty() {
            metrics::record_passthrough(BACKEND);
            return Ok(existing_order_ids.to_vec());
        }

        let _timer = metrics::LatencyTimer::new(BACKEND, "translate_results");

        let product_ids = self
            .products
            .find_product_ids_by_sku(search_term)
            .await
            .inspect_err(|_| metrics::record_error(BACKEND, "lookup"))?;

        if product_ids.is_empty() {
            debug!(sku = %search_term, "No product with this SKU");
            metrics::record_lookup(BACKEND, "no_match");
            return Ok(existing_order_ids.to_vec());
        }
        metrics::record_lookup(BACKEND, "matched");

        let found = self.orders_for_products(&product_ids).await?;
        let merged = merge_order_ids(existing_order_ids, &found);
        metrics::record_orders_merged(merged.len() - dedup_len(existing_order_ids));

        Ok(merged)
    }

    /// Order ids for a product set, from the cache when possible.
    pub async fn orders_for_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<OrderId>, SearchError> {
        let query = LegacyOrderQuery::new(product_ids, &self.config);
        let key = scoped_product_set_cache_key(
            &self.config.cache_key_prefix,
            &query.cache_scope(),
            &query.product_ids,
        );

        if let Some(cached) = self
            .cache
            .get(&key)
            .await
            .inspect_err(|_| metrics::record_error(BACKEND, "cache_get"))?
        {
            debug!(key = %key, count = cached.len(), "Order cache hit");
            metrics::record_cache("hit");
            return Ok(cached);
        }
        metrics::record_cache("miss");

        let found = self
            .orders
            .find_orders_with_products(&query)
            .await
            .inspect_err(|_| metrics::record_error(BACKEND, "order_query"))?;

        debug!(key = %key, count = found.len(), "Order cache fill");
        self.cache
            .set(&key, &found, self.config.cache_ttl())
            .await
            .inspect_err(|_| metrics::record_error(BACKEND, "cache_set"))?;

        Ok(found)
    }
}

fn dedup_len(ids: &[OrderId]) -> usize {
    ids.iter().collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::{InMemoryCatalog, InMemoryResultCache, LegacyOrder};

    fn setup() -> (Arc<InMemoryCatalog>, Arc<InMemoryResultCache>, LegacyTranslator) {
        let catalog = Arc::new(InMemoryCatalog::new());
        let cache = Arc::new(InMemoryResultCache::new());
        let translator = LegacyTranslator::new(
            Arc::new(SkuSearchConfig::default()),
            catalog.clone(),
            catalog.clone(),
            cache.clone(),
        );
        (catalog, cache, translator)
    }

    #[test]
    fn test_merge_dedup() {
        let mut merged = merge_order_ids(&[1, 2], &[2, 5]);
        merged.sort_unstable();
        assert_eq!(merged, vec![1, 2, 5]);
    }

    #[test]
    fn test_merge_keeps_existing_first() {
        assert_eq!(merge_order_ids(&[9, 4, 9], &[4, 1]), vec![9, 4, 1]);
        assert_eq!(merge_order_ids(&[], &[]), Vec::<OrderId>::new());
    }

    #[test]
    fn test_query_fragment() {
        let query = LegacyOrderQuery::new(&[7, 3, 7], &SkuSearchConfig::default());
        assert_eq!(query.product_ids, vec![3, 7]);

        let sql = query.to_fragment().render().unwrap();
        assert_eq!(
            sql,
            "SELECT DISTINCT CAST(o.ID AS SIGNED) AS order_id FROM `wp_posts` o \
             INNER JOIN `wp_woocommerce_order_items` oi ON o.ID = oi.order_id \
             INNER JOIN `wp_woocommerce_order_itemmeta` oim ON oi.order_item_id = oim.order_item_id \
             WHERE o.post_type = 'shop_order' \
             AND o.post_status IN ('wc-completed','wc-processing','wc-on-hold','wc-pending','wc-refunded','wc-failed','wc-cancelled') \
             AND oim.meta_key = '_product_id' AND oim.meta_value IN (3,7)"
        );
    }

    #[test]
    fn test_query_fragment_no_statuses() {
        let config = SkuSearchConfig {
            legacy_order_statuses: Vec::new(),
            ..Default::default()
        };
        let sql = LegacyOrderQuery::new(&[1], &config).to_fragment().render().unwrap();
        assert!(sql.contains("o.post_type = 'shop_order' AND 1=0 AND"));
    }

    #[tokio::test]
    async fn test_empty_term_passthrough() {
        let (_, cache, translator) = setup();
        let out = translator.translate_results(&[5, 1, 5], "", &[]).await.unwrap();
        assert_eq!(out, vec![5, 1, 5]);
        assert_eq!(cache.stats().misses, 0);
    }

    #[tokio::test]
    async fn test_unknown_sku_keeps_existing() {
        let (_, cache, translator) = setup();
        let out = translator.translate_results(&[1, 2], "NOPE", &[]).await.unwrap();
        assert_eq!(out, vec![1, 2]);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_sku_match_merges() {
        let (catalog, _, translator) = setup();
        catalog.add_product(42, "ABC123");
        catalog.add_order(LegacyOrder::shop_order(100, "wc-processing", vec![42]));
        catalog.add_order(LegacyOrder::shop_order(101, "wc-completed", vec![7]));

        let out = translator.translate_results(&[2], "ABC123", &[]).await.unwrap();
        assert_eq!(out, vec![2, 100]);
    }

    #[tokio::test]
    async fn test_second_search_hits_cache() {
        let (catalog, cache, translator) = setup();
        catalog.add_product(42, "ABC123");
        catalog.add_order(LegacyOrder::shop_order(100, "wc-processing", vec![42]));

        let first = translator.translate_results(&[], "ABC123", &[]).await.unwrap();
        // New matching order after caching is not visible until expiry
        catalog.add_order(LegacyOrder::shop_order(200, "wc-processing", vec![42]));
        let second = translator.translate_results(&[], "ABC123", &[]).await.unwrap();

        assert_eq!(first, vec![100]);
        assert_eq!(second, first);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_cache_scope_tracks_config() {
        let base = LegacyOrderQuery::new(&[1], &SkuSearchConfig::default());
        let reordered = LegacyOrderQuery::new(
            &[1],
            &SkuSearchConfig {
                legacy_order_statuses: base.statuses.iter().rev().cloned().collect(),
                ..Default::default()
            },
        );
        let prefixed = LegacyOrderQuery::new(
            &[1],
            &SkuSearchConfig {
                table_prefix: "site2_".into(),
                ..Default::default()
            },
        );
        assert_eq!(base.cache_scope(), reordered.cache_scope());
        assert_ne!(base.cache_scope(), prefixed.cache_scope());
    }

    #[tokio::test]
    async fn test_sites_sharing_a_cache_stay_apart() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.add_product(42, "ABC123");
        catalog.add_order(LegacyOrder::shop_order(100, "wc-processing", vec![42]));
        catalog.add_order(LegacyOrder::shop_order(101, "wc-shipped", vec![42]));
        let cache = Arc::new(InMemoryResultCache::new());

        let stock = LegacyTranslator::new(
            Arc::new(SkuSearchConfig::default()),
            catalog.clone(),
            catalog.clone(),
            cache.clone(),
        );
        let mut statuses = SkuSearchConfig::default().legacy_order_statuses;
        statuses.push("wc-shipped".into());
        let custom = LegacyTranslator::new(
            Arc::new(SkuSearchConfig {
                legacy_order_statuses: statuses,
                ..Default::default()
            }),
            catalog.clone(),
            catalog.clone(),
            cache.clone(),
        );

        assert_eq!(stock.translate_results(&[], "ABC123", &[]).await.unwrap(), vec![100]);
        assert_eq!(custom.translate_results(&[], "ABC123", &[]).await.unwrap(), vec![100, 101]);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let (catalog, cache, translator) = setup();
        catalog.add_product(42, "ABC123");

        translator.translate_results(&[], "ABC123", &[]).await.unwrap();
        translator.translate_results(&[], "ABC123", &[]).await.unwrap();
        assert_eq!(cache.stats().hits, 1);
    }
}
