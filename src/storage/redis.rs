// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis result cache.
//!
//! The shared store every request process reaches by key. Values are JSON
//! arrays of order ids with a TTL set by `SET .. EX`:
//!
//! ```text
//! {prefix}orders_with_sku_<sha256> → "[100,101]"   (EX 3600)
//! ```

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, instrument};

use super::traits::{ResultCache, StorageError};
use crate::search::OrderId;

#[derive(Clone)]
pub struct RedisResultCache {
    connection: ConnectionManager,
    /// Optional key prefix for namespacing (e.g., "site-2:")
    prefix: String,
}

impl RedisResultCache {
    pub async fn new(connection_string: &str) -> Result<Self, StorageError> {
        Self::with_prefix(connection_string, None).await
    }

    /// Connect with an optional key prefix, for sharing a Redis instance.
    pub async fn with_prefix(
        connection_string: &str,
        prefix: Option<&str>,
    ) -> Result<Self, StorageError> {
        let client =
            Client::open(connection_string).map_err(|e| StorageError::Cache(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| StorageError::Cache(e.to_string()))?;
        Ok(Self::from_connection(connection, prefix))
    }

    pub fn from_connection(connection: ConnectionManager, prefix: Option<&str>) -> Self {
        Self {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
        }
    }

    #[inline]
    fn prefixed_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[async_trait]
impl ResultCache for RedisResultCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<OrderId>>, StorageError> {
        let full_key = self.prefixed_key(key);
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(&full_key)
            .await
            .map_err(|e| StorageError::Cache(e.to_string()))?;

        match raw {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Decode {
                    key: full_key,
                    reason: e.to_string(),
                }),
        }
    }

    #[instrument(skip(self, order_ids), fields(count = order_ids.len()))]
    async fn set(&self, key: &str, order_ids: &[OrderId], ttl: Duration) -> Result<(), StorageError> {
        let full_key = self.prefixed_key(key);
        let payload =
            serde_json::to_string(order_ids).map_err(|e| StorageError::Cache(e.to_string()))?;
        // EX 0 is rejected by Redis
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(&full_key, payload, seconds)
            .await
            .map_err(|e| StorageError::Cache(e.to_string()))?;
        debug!(key = %full_key, seconds, "Cached order ids");
        Ok(())
    }
}
