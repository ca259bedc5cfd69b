use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::search::legacy::LegacyOrderQuery;
use crate::search::{OrderId, ProductId};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Product lookup failed: {0}")]
    Lookup(String),
    #[error("Order query failed: {0}")]
    Query(String),
    #[error("Result cache unavailable: {0}")]
    Cache(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Failed to decode cached value for '{key}': {reason}")]
    Decode { key: String, reason: String },
}

/// Resolves a SKU to the products that carry it (exact match, no limit).
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn find_product_ids_by_sku(&self, sku: &str) -> Result<Vec<ProductId>, StorageError>;
}

/// Runs the legacy-schema join that maps product IDs to order IDs.
#[async_trait]
pub trait LegacyOrderIndex: Send + Sync {
    async fn find_orders_with_products(
        &self,
        query: &LegacyOrderQuery,
    ) -> Result<Vec<OrderId>, StorageError>;
}

/// Shared, best-effort TTL store for computed order-ID sets.
///
/// Concurrent writers for the same key are tolerated: the value is a pure
/// function of the key, so last write wins with an equivalent value.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<OrderId>>, StorageError>;
    async fn set(&self, key: &str, order_ids: &[OrderId], ttl: Duration) -> Result<(), StorageError>;
}

/// Reports whether the platform stores orders in the indexed tables.
pub trait OrderStorageDetector: Send + Sync {
    fn custom_order_tables_enabled(&self) -> bool;
}

impl OrderStorageDetector for bool {
    fn custom_order_tables_enabled(&self) -> bool {
        *self
    }
}
