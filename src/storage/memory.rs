//! In-process adapters for the collaborator traits.
//!
//! [`InMemoryCatalog`] holds products and legacy orders and answers the same
//! questions as the SQL schema. [`InMemoryResultCache`] is a TTL cache with
//! hit/miss counters and a size bound, usable when no shared store is deployed.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::traits::{LegacyOrderIndex, ProductLookup, ResultCache, StorageError};
use crate::search::{LegacyOrderQuery, OrderId, ProductId};

/// An order in the post-based schema, reduced to what the join reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyOrder {
    pub id: OrderId,
    pub post_type: String,
    pub status: String,
    /// Product referenced by each line item
    pub product_ids: Vec<ProductId>,
}

impl LegacyOrder {
    pub fn new(
        id: OrderId,
        post_type: impl Into<String>,
        status: impl Into<String>,
        product_ids: Vec<ProductId>,
    ) -> Self {
        Self {
            id,
            post_type: post_type.into(),
            status: status.into(),
            product_ids,
        }
    }

    pub fn shop_order(id: OrderId, status: impl Into<String>, product_ids: Vec<ProductId>) -> Self {
        Self::new(id, "shop_order", status, product_ids)
    }
}

pub struct InMemoryCatalog {
    skus: DashMap<ProductId, String>,
    orders: DashMap<OrderId, LegacyOrder>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            skus: DashMap::new(),
            orders: DashMap::new(),
        }
    }

    pub fn add_product(&self, id: ProductId, sku: impl Into<String>) {
        self.skus.insert(id, sku.into());
    }

    pub fn add_order(&self, order: LegacyOrder) {
        self.orders.insert(order.id, order);
    }

    pub fn remove_order(&self, id: OrderId) {
        self.orders.remove(&id);
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductLookup for InMemoryCatalog {
    async fn find_product_ids_by_sku(&self, sku: &str) -> Result<Vec<ProductId>, StorageError> {
        let mut ids: Vec<ProductId> = self
            .skus
            .iter()
            .filter(|entry| entry.value() == sku)
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl LegacyOrderIndex for InMemoryCatalog {
    async fn find_orders_with_products(
        &self,
        query: &LegacyOrderQuery,
    ) -> Result<Vec<OrderId>, StorageError> {
        let mut ids: Vec<OrderId> = self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.post_type == query.post_type
                    && query.statuses.contains(&order.status)
                    && order
                        .product_ids
                        .iter()
                        .any(|id| query.product_ids.contains(id))
            })
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    order_ids: Vec<OrderId>,
    expires_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct ResultCacheStats {
    pub hits: u64,
    /// Includes lookups that found an expired entry
    pub misses: u64,
    /// Entries dropped on read because their TTL had passed
    pub expired: u64,
    pub entry_count: usize,
    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

/// Default bound for [`InMemoryResultCache::new`]
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// TTL cache of order-ID sets, keyed by product-set hash.
///
/// Bounded: once `max_entries` is reached the oldest insertion is evicted.
pub struct InMemoryResultCache {
    entries: DashMap<String, CacheEntry>,
    /// Insertion order for eviction (oldest first)
    order: Mutex<VecDeque<String>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl InMemoryResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Cache holding at most `max_entries` product sets (minimum 1).
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.order.lock().clear();
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.order.lock().retain(|key| self.entries.contains_key(key));
        before - self.entries.len()
    }

    pub fn stats(&self) -> ResultCacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        ResultCacheStats {
            hits,
            misses,
            expired: self.expired.load(Ordering::Relaxed),
            entry_count: self.entries.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for InMemoryResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<OrderId>>, StorageError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(entry.order_ids.clone()));
            }
            drop(entry); // Release read lock before removing
            self.entries.remove(key);
            self.order.lock().retain(|k| k != key);
            self.expired.fetch_add(1, Ordering::Relaxed);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set(&self, key: &str, order_ids: &[OrderId], ttl: Duration) -> Result<(), StorageError> {
        let entry = CacheEntry {
            order_ids: order_ids.to_vec(),
            expires_at: Instant::now() + ttl,
        };

        let mut order = self.order.lock();
        // Overwrites keep their slot
        if self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), entry);
            return Ok(());
        }

        // Evict oldest if at capacity
        while self.entries.len() >= self.max_entries {
            match order.pop_front() {
                Some(old_key) => {
                    self.entries.remove(&old_key);
                }
                None => break,
            }
        }

        self.entries.insert(key.to_string(), entry);
        order.push_back(key.to_string());
        Ok(())
    }
}
