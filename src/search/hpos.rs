// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Indexed-Schema Translator
//!
//! Turns a SKU search into a WHERE predicate over the indexed orders table.
//! Nothing is executed here; the host runs the composed query.
//!
//! # SQL Generated
//!
//! ```sql
//! EXISTS (
//!     SELECT 1
//!     FROM `wp_woocommerce_order_items` AS oi
//!     INNER JOIN `wp_woocommerce_order_itemmeta` AS oim
//!         ON oi.order_item_id = oim.order_item_id
//!     WHERE oi.order_id = `wp_wc_orders`.`id`
//!         AND oim.meta_key = '_product_id'
//!         AND oim.meta_value IN (3,7)
//! )
//! ```
//!
//! An SKU that matches no product yields `1=0`: the search must come back
//! empty, never unconstrained.

use std::sync::Arc;
use tracing::{debug, instrument};

use super::sql_fragment::{placeholder_list, SqlFragment, SqlParam};
use super::{ProductId, SearchError, SearchFilterScope};
use crate::config::SkuSearchConfig;
use crate::metrics;
use crate::storage::traits::ProductLookup;

const BACKEND: &str = "indexed";

/// Host query context: where the current order row's id lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQueryContext {
    /// Orders table name or alias as used in the host query
    pub orders_table: String,
    /// Primary key column of the orders table
    pub id_column: String,
}

impl OrderQueryContext {
    pub fn new(orders_table: impl Into<String>) -> Self {
        Self {
            orders_table: orders_table.into(),
            id_column: "id".to_string(),
        }
    }

    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = id_column.into();
        self
    }

    /// Context for the configured orders table.
    pub fn for_config(config: &SkuSearchConfig) -> Self {
        Self::new(config.table("wc_orders"))
    }
}

/// Build the EXISTS membership predicate for `product_ids`.
///
/// Every table name and product id is a separate parameter.
pub fn build_sku_predicate(
    product_ids: &[ProductId],
    ctx: &OrderQueryContext,
    config: &SkuSearchConfig,
) -> SqlFragment {
    if product_ids.is_empty() {
        return SqlFragment::contradiction();
    }

    let clause = format!(
        "EXISTS (SELECT 1 FROM %i AS oi INNER JOIN %i AS oim ON oi.order_item_id = oim.order_item_id \
         WHERE oi.order_id = %i.%i AND oim.meta_key = %s AND oim.meta_value IN ({}))",
        placeholder_list("%d", product_ids.len())
    );

    let mut params = vec![
        SqlParam::Identifier(config.table("woocommerce_order_items")),
        SqlParam::Identifier(config.table("woocommerce_order_itemmeta")),
        SqlParam::Identifier(ctx.orders_table.clone()),
        SqlParam::Identifier(ctx.id_column.clone()),
        SqlParam::Text(config.product_meta_key.clone()),
    ];
    params.extend(product_ids.iter().map(|id| SqlParam::Int(*id)));

    SqlFragment::new(clause, params)
}

/// Join the host's fragment and ours with AND. A blank host fragment is replaced.
///
/// The host fragment is parenthesized so a top-level `OR` in it cannot
/// escape the predicate.
pub fn append_predicate(where_fragment: &str, predicate: &str) -> String {
    let host = where_fragment.trim();
    if host.is_empty() {
        predicate.to_string()
    } else {
        format!("({}) AND {}", host, predicate)
    }
}

/// WHERE-clause translator for the indexed order tables.
#[derive(Clone)]
pub struct IndexedTranslator {
    config: Arc<SkuSearchConfig>,
    products: Arc<dyn ProductLookup>,
}

impl IndexedTranslator {
    pub fn new(config: Arc<SkuSearchConfig>, products: Arc<dyn ProductLookup>) -> Self {
        Self { config, products }
    }

    /// Extend `where_fragment` with the SKU predicate.
    ///
    /// Returns the fragment unchanged for an empty term or any scope other
    /// than `product_sku`. Lookup failures propagate.
    #[instrument(skip(self, where_fragment, ctx))]
    pub async fn translate_where(
        &self,
        where_fragment: &str,
        search_term: &str,
        search_filter: &str,
        ctx: &OrderQueryContext,
    ) -> Result<String, SearchError> {
        let scope = SearchFilterScope::from(search_filter);
        if search_term.is_empty() || scope != SearchFilterScope::ProductSku {
            metrics::record_passthrough(BACKEND);
            return Ok(where_fragment.to_string());
        }

        let _timer = metrics::LatencyTimer::new(BACKEND, "translate_where");

        let product_ids = self
            .products
            .find_product_ids_by_sku(search_term)
            .await
            .inspect_err(|_| metrics::record_error(BACKEND, "lookup"))?;

        let predicate = build_sku_predicate(&product_ids, ctx, &self.config);
        if predicate.is_contradiction() {
            debug!(sku = %search_term, "No product with this SKU, forcing empty result");
            metrics::record_lookup(BACKEND, "no_match");
        } else {
            debug!(sku = %search_term, products = product_ids.len(), "SKU resolved");
            metrics::record_lookup(BACKEND, "matched");
        }

        Ok(append_predicate(where_fragment, &predicate.render()?))
    }
}
