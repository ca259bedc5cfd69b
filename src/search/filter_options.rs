// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Filter Options
//!
//! Ordered scope-key → label mapping shown in the admin search dropdown.
//! Host input arrives as arbitrary JSON and is normalized once by
//! [`SearchFilterOptions::from_host`]; everything after that works on the
//! strict type.
//!
//! ```text
//! {"all": "All", "products": "Products", "customers": "Customers"}
//!                       │
//!                       ▼  register_filter_option
//! {"all": "All", "products": "Products", "product_sku": "Product SKU", "customers": "Customers"}
//! ```

use serde_json::{Map, Value};

/// Scope key of the existing product-name option the new option follows
pub const PRODUCTS_KEY: &str = "products";

/// Scope key of the SKU option
pub const PRODUCT_SKU_KEY: &str = "product_sku";

/// Ordered mapping of filter-scope key to label. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilterOptions {
    entries: Vec<(String, String)>,
}

impl SearchFilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize whatever the host passed in.
    ///
    /// - object: entries in insertion order
    /// - array: entries keyed by index ("0", "1", ...)
    /// - anything else: empty
    ///
    /// Non-string labels are stringified; `null` becomes an empty label.
    pub fn from_host(value: &Value) -> Self {
        let mut options = Self::new();
        match value {
            Value::Object(map) => {
                for (key, label) in map {
                    options.insert(key.clone(), label_text(label));
                }
            }
            Value::Array(items) => {
                for (index, label) in items.iter().enumerate() {
                    options.insert(index.to_string(), label_text(label));
                }
            }
            _ => {}
        }
        options
    }

    /// Set `key` to `label`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();
        match self.position(&key) {
            Some(pos) => self.entries[pos].1 = label,
            None => self.entries.push((key, label)),
        }
    }

    /// Insert a new entry right after `anchor`, or at the end if `anchor` is absent.
    /// Does nothing if `key` is already present.
    pub fn insert_after(&mut self, anchor: &str, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        if self.contains_key(&key) {
            return;
        }
        let entry = (key, label.into());
        match self.position(anchor) {
            Some(pos) => self.entries.insert(pos + 1, entry),
            None => self.entries.push(entry),
        }
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object in display order, for handing back to the host.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchFilterOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Add the SKU option right after `products`, or at the end.
///
/// Registering twice leaves a single `product_sku` entry.
pub fn register_filter_option(mut options: SearchFilterOptions, label: &str) -> SearchFilterOptions {
    options.insert_after(PRODUCTS_KEY, PRODUCT_SKU_KEY, label);
    options
}
