//! Catalog implementations.

pub mod static_catalog;
