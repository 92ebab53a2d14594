use std::sync::Arc;

use crate::store::EventStore;

pub mod config;
pub mod handlers;
pub mod models;
pub mod procedures;
pub mod routes;
pub mod store;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}
