//! Shared handler state.

use crate::services::store::ObjectStore;
use std::sync::Arc;

/// Cloned into every request; holds no per-request or mutable data.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}
