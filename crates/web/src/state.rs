//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::OrderConfig;
use crate::db::{
    IngredientRepository, OrderRepository, Repositories, TacoRepository, UserRepository,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories and the settings handlers read per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    repositories: Repositories,
    orders: OrderConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(repositories: Repositories, orders: OrderConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                repositories,
                orders,
            }),
        }
    }

    /// Ingredient reference data.
    #[must_use]
    pub fn ingredients(&self) -> &dyn IngredientRepository {
        self.inner.repositories.ingredients.as_ref()
    }

    /// Saved tacos.
    #[must_use]
    pub fn tacos(&self) -> &dyn TacoRepository {
        self.inner.repositories.tacos.as_ref()
    }

    /// Placed orders.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.repositories.orders.as_ref()
    }

    /// Registered customers.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.repositories.users.as_ref()
    }

    /// Order listing settings.
    #[must_use]
    pub fn order_config(&self) -> OrderConfig {
        self.inner.orders
    }
}
