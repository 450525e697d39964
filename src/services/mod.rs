pub mod catalog;
pub mod local_store;
pub mod range_resolver;
pub mod s3_store;
pub mod store;
