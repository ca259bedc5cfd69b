//! Result cache keys for product-ID sets.
//!
//! The key depends only on the set's members: ids are sorted and
//! de-duplicated before hashing, so `{3, 7}` and `{7, 3, 3}` share a key.
//! A scope string (the query's tables, post type and statuses) is hashed in
//! too, so sites sharing one store with different settings never collide.

use sha2::{Digest, Sha256};

use super::ProductId;

pub fn product_set_cache_key(prefix: &str, product_ids: &[ProductId]) -> String {
    scoped_product_set_cache_key(prefix, "", product_ids)
}

/// Same as [`product_set_cache_key`], namespaced by `scope`.
pub fn scoped_product_set_cache_key(prefix: &str, scope: &str, product_ids: &[ProductId]) -> String {
    let mut ids = product_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("_");

    let mut hasher = Sha256::new();
    if !scope.is_empty() {
        hasher.update(scope.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(joined.as_bytes());
    format!("{}{}", prefix, hex::encode(hasher.finalize()))
}
