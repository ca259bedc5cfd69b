// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the SKU search layer.
//!
//! # Example
//!
//! ```
//! use order_sku_search::SkuSearchConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SkuSearchConfig::default();
//! assert_eq!(config.cache_ttl_secs, 3600);
//! assert_eq!(config.table("posts"), "wp_posts");
//!
//! // Site with a custom table prefix and an extra order status
//! let config: SkuSearchConfig = serde_json::from_str(r#"{
//!     "table_prefix": "shop_",
//!     "legacy_order_statuses": ["wc-completed", "wc-shipped"]
//! }"#).unwrap();
//! assert_eq!(config.table("wc_orders"), "shop_wc_orders");
//! ```

use serde::Deserialize;
use std::time::Duration;

/// Which order storage schema the host platform runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStorage {
    /// Orders live in their own indexed tables (`wc_orders`).
    Indexed,
    /// Orders are generic posts with key/value metadata.
    Legacy,
}

/// Configuration for the SKU search layer.
///
/// All fields have defaults matching a stock installation.
#[derive(Debug, Clone, Deserialize)]
pub struct SkuSearchConfig {
    /// Prefix applied to every table name (e.g., "wp_")
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Line-item meta key that records the product reference
    #[serde(default = "default_product_meta_key")]
    pub product_meta_key: String,

    /// Product meta key holding the SKU
    #[serde(default = "default_sku_meta_key")]
    pub sku_meta_key: String,

    /// Post type of orders in the legacy schema
    #[serde(default = "default_legacy_order_post_type")]
    pub legacy_order_post_type: String,

    /// Order statuses the legacy join accepts
    #[serde(default = "default_legacy_order_statuses")]
    pub legacy_order_statuses: Vec<String>,

    /// Prefix for result cache keys
    #[serde(default = "default_cache_key_prefix")]
    pub cache_key_prefix: String,

    /// Result cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Label shown for the filter option
    #[serde(default = "default_filter_label")]
    pub filter_label: String,

    /// Force a backend instead of asking the detector
    #[serde(default)]
    pub order_storage: Option<OrderStorage>,
}

fn default_table_prefix() -> String { "wp_".to_string() }
fn default_product_meta_key() -> String { "_product_id".to_string() }
fn default_sku_meta_key() -> String { "_sku".to_string() }
fn default_legacy_order_post_type() -> String { "shop_order".to_string() }
fn default_legacy_order_statuses() -> Vec<String> {
    [
        "wc-completed",
        "wc-processing",
        "wc-on-hold",
        "wc-pending",
        "wc-refunded",
        "wc-failed",
        "wc-cancelled",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_cache_key_prefix() -> String { "orders_with_sku_".to_string() }
fn default_cache_ttl_secs() -> u64 { 3600 } // 1 hour
fn default_filter_label() -> String { "Product SKU".to_string() }

impl Default for SkuSearchConfig {
    fn default() -> Self {
        Self {
            table_prefix: default_table_prefix(),
            product_meta_key: default_product_meta_key(),
            sku_meta_key: default_sku_meta_key(),
            legacy_order_post_type: default_legacy_order_post_type(),
            legacy_order_statuses: default_legacy_order_statuses(),
            cache_key_prefix: default_cache_key_prefix(),
            cache_ttl_secs: default_cache_ttl_secs(),
            filter_label: default_filter_label(),
            order_storage: None,
        }
    }
}

impl SkuSearchConfig {
    /// Full table name for `base` with the configured prefix.
    pub fn table(&self, base: &str) -> String {
        format!("{}{}", self.table_prefix, base)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
