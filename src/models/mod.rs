//! Data shapes shared between the store adapters and the HTTP layer.
//!
//! `ImageObject` is what a store reports about one of its objects;
//! `CatalogEntry` is the client-facing descriptor derived from it.

pub mod catalog;
pub mod image;
