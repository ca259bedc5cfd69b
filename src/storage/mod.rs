//! Collaborator ports and their adapters.
//!
//! - [`traits`]: product lookup, legacy order index, result cache, schema detector
//! - [`memory`]: in-process implementations
//! - [`sql`]: sqlx (MySQL / SQLite) catalog
//! - [`redis`]: shared Redis result cache

pub mod memory;
pub mod redis;
pub mod sql;
pub mod traits;
