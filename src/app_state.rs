use std::sync::Arc;

use crate::{
    config::AppConfig,
    services::{MenuCatalog, OrderLedger, SharedCartRegistry},
    store::Store,
};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderLedger,
    pub shared_carts: SharedCartRegistry,
    pub menu: MenuCatalog,
}

impl AppState {
    /// Services with default settings, as used by the tests.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            orders: OrderLedger::new(store.clone()),
            shared_carts: SharedCartRegistry::new(store.clone()),
            menu: MenuCatalog::new(store),
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            orders: OrderLedger::new(store.clone())
                .with_strict_transitions(config.orders.strict_transitions),
            shared_carts: SharedCartRegistry::new(store.clone())
                .with_code_attempts(config.shared_carts.code_attempts),
            menu: MenuCatalog::new(store),
        }
    }
}
