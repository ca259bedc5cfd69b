// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL catalog over the platform's own tables.
//!
//! Reads, never writes. Tables used (with the configured prefix):
//!
//! ```sql
//! posts                      (ID, post_type, post_status)
//! postmeta                   (post_id, meta_key = '_sku', meta_value)
//! woocommerce_order_items    (order_item_id, order_id)
//! woocommerce_order_itemmeta (order_item_id, meta_key = '_product_id', meta_value)
//! ```
//!
//! ## sqlx Any Driver Quirks
//!
//! MySQL's `ID` columns are `BIGINT UNSIGNED`, which the `Any` driver will
//! not decode as `i64`; selects cast to `SIGNED` (SQLite accepts the same
//! cast as a NUMERIC conversion).

use async_trait::async_trait;
use sqlx::{any::AnyPoolOptions, AnyPool, Row};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::{debug, instrument};

use super::traits::{LegacyOrderIndex, ProductLookup, StorageError};
use crate::config::SkuSearchConfig;
use crate::search::{LegacyOrderQuery, OrderId, ProductId, SqlFragment, SqlParam, SqlValue};

// SQLx `Any` driver requires runtime installation
static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(|| {
        sqlx::any::install_default_drivers();
    });
}

/// Product types that carry a SKU
const PRODUCT_POST_TYPES: [&str; 2] = ["product", "product_variation"];

pub struct SqlCatalog {
    pool: AnyPool,
    config: Arc<SkuSearchConfig>,
}

impl SqlCatalog {
    /// Connect to `connection_string` (e.g. "mysql://..." or "sqlite://...").
    pub async fn connect(
        connection_string: &str,
        config: Arc<SkuSearchConfig>,
    ) -> Result<Self, StorageError> {
        install_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .connect(connection_string)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(Self::from_pool(pool, config))
    }

    /// Share an existing pool (the host's, usually).
    pub fn from_pool(pool: AnyPool, config: Arc<SkuSearchConfig>) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    fn product_lookup_fragment(&self, sku: &str) -> SqlFragment {
        let mut params = vec![
            SqlParam::Identifier(self.config.table("posts")),
            SqlParam::Identifier(self.config.table("postmeta")),
            SqlParam::Text(self.config.sku_meta_key.clone()),
            SqlParam::Text(sku.to_string()),
        ];
        params.extend(PRODUCT_POST_TYPES.iter().map(|t| SqlParam::Text(t.to_string())));

        SqlFragment::new(
            "SELECT DISTINCT CAST(p.ID AS SIGNED) AS id FROM %i p \
             INNER JOIN %i pm ON p.ID = pm.post_id \
             WHERE pm.meta_key = %s AND pm.meta_value = %s AND p.post_type IN (%s,%s)",
            params,
        )
    }

    /// Run `fragment` and read the first column of every row as an id.
    async fn fetch_ids(&self, fragment: &SqlFragment) -> Result<Vec<i64>, sqlx::Error> {
        let (sql, values) = fragment
            .to_bindable()
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                SqlValue::Int(n) => query.bind(n),
                SqlValue::Text(s) => query.bind(s),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|row| row.try_get::<i64, _>(0)).collect()
    }
}

#[async_trait]
impl ProductLookup for SqlCatalog {
    #[instrument(skip(self))]
    async fn find_product_ids_by_sku(&self, sku: &str) -> Result<Vec<ProductId>, StorageError> {
        let mut ids = self
            .fetch_ids(&self.product_lookup_fragment(sku))
            .await
            .map_err(|e| StorageError::Lookup(e.to_string()))?;
        ids.sort_unstable();
        debug!(count = ids.len(), "SKU lookup");
        Ok(ids)
    }
}

#[async_trait]
impl LegacyOrderIndex for SqlCatalog {
    #[instrument(skip(self, query), fields(products = query.product_ids.len()))]
    async fn find_orders_with_products(
        &self,
        query: &LegacyOrderQuery,
    ) -> Result<Vec<OrderId>, StorageError> {
        let mut ids = self
            .fetch_ids(&query.to_fragment())
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        ids.sort_unstable();
        debug!(count = ids.len(), "Legacy order join");
        Ok(ids)
    }
}
