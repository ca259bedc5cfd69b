// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Translation
//!
//! Maps an admin "search by product SKU" request onto whichever order
//! schema the platform runs.
//!
//! # Architecture
//!
//! ```text
//! SearchFilterOptions ── register_filter_option ──→ host dropdown
//!
//! search term ── ProductLookup ──→ product ids
//!     │
//!     ├─→ IndexedTranslator → EXISTS predicate (SqlFragment) → host WHERE
//!     └─→ LegacyTranslator  → ResultCache / LegacyOrderIndex → merged order ids
//! ```

mod cache_key;
mod filter_options;
pub mod hpos;
pub mod legacy;
mod sql_fragment;

use thiserror::Error;

use crate::storage::traits::StorageError;

pub use cache_key::{product_set_cache_key, scoped_product_set_cache_key};
pub use filter_options::{
    register_filter_option, SearchFilterOptions, PRODUCTS_KEY, PRODUCT_SKU_KEY,
};
pub use hpos::{append_predicate, build_sku_predicate, IndexedTranslator, OrderQueryContext};
pub use legacy::{merge_order_ids, LegacyOrderQuery, LegacyTranslator};
pub use sql_fragment::{placeholder_list, FragmentError, SqlFragment, SqlParam, SqlValue};

/// Numeric product identifier
pub type ProductId = i64;

/// Numeric order identifier
pub type OrderId = i64;

/// Field the search term is matched against.
///
/// Only `product_sku` triggers this layer; every other scope passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilterScope {
    ProductSku,
    Other(String),
}

impl SearchFilterScope {
    pub fn as_str(&self) -> &str {
        match self {
            SearchFilterScope::ProductSku => PRODUCT_SKU_KEY,
            SearchFilterScope::Other(scope) => scope,
        }
    }
}

impl From<&str> for SearchFilterScope {
    fn from(scope: &str) -> Self {
        if scope == PRODUCT_SKU_KEY {
            SearchFilterScope::ProductSku
        } else {
            SearchFilterScope::Other(scope.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Invalid SQL fragment: {0}")]
    Fragment(#[from] FragmentError),
}
