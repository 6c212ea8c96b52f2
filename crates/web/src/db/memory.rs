//! In-memory repositories.
//!
//! Used by the handler and integration tests, and handy for running the site
//! without a database. State lives behind `tokio::sync::RwLock` and ids come
//! from atomic counters.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use taco_cloud_core::{
    Ingredient, IngredientId, IngredientType, NewOrder, NewUser, OrderId, Page, PageRequest,
    PlacedOrder, Taco, TacoDesign, TacoId, TacoSort, User, UserId,
};

use super::{
    IngredientRepository, OrderRepository, Repositories, RepositoryError, TacoRepository,
    UserRepository,
};

/// The ten classic ingredients, in seed order.
#[must_use]
pub fn default_ingredients() -> Vec<Ingredient> {
    [
        ("FLTO", "Flour Tortilla", IngredientType::Wrap),
        ("COTO", "Corn Tortilla", IngredientType::Wrap),
        ("GRBF", "Ground Beef", IngredientType::Protein),
        ("CARN", "Carnitas", IngredientType::Protein),
        ("TMTO", "Diced Tomatoes", IngredientType::Veggies),
        ("LETC", "Lettuce", IngredientType::Veggies),
        ("CHED", "Cheddar", IngredientType::Cheese),
        ("JACK", "Monterrey Jack", IngredientType::Cheese),
        ("SLSA", "Salsa", IngredientType::Sauce),
        ("SRCR", "Sour Cream", IngredientType::Sauce),
    ]
    .into_iter()
    .filter_map(|(id, name, kind)| {
        IngredientId::parse(id)
            .ok()
            .map(|id| Ingredient::new(id, name, kind))
    })
    .collect()
}

// =============================================================================
// Ingredients
// =============================================================================

/// Ingredients kept in insertion order.
#[derive(Default)]
pub struct InMemoryIngredientRepository {
    ingredients: RwLock<Vec<Ingredient>>,
}

impl InMemoryIngredientRepository {
    /// Create a repository holding `ingredients`.
    #[must_use]
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self {
            ingredients: RwLock::new(ingredients),
        }
    }
}

#[async_trait]
impl IngredientRepository for InMemoryIngredientRepository {
    async fn find_all(&self) -> Result<Vec<Ingredient>, RepositoryError> {
        Ok(self.ingredients.read().await.clone())
    }

    async fn find_by_id(&self, id: &IngredientId) -> Result<Option<Ingredient>, RepositoryError> {
        Ok(self
            .ingredients
            .read()
            .await
            .iter()
            .find(|i| &i.id == id)
            .cloned())
    }

    async fn save(&self, ingredient: &Ingredient) -> Result<(), RepositoryError> {
        let mut ingredients = self.ingredients.write().await;
        match ingredients.iter_mut().find(|i| i.id == ingredient.id) {
            Some(existing) => *existing = ingredient.clone(),
            None => ingredients.push(ingredient.clone()),
        }
        Ok(())
    }
}

// =============================================================================
// Tacos
// =============================================================================

/// Tacos keyed by id.
pub struct InMemoryTacoRepository {
    tacos: RwLock<HashMap<TacoId, Taco>>,
    next_id: AtomicI64,
}

impl Default for InMemoryTacoRepository {
    fn default() -> Self {
        Self {
            tacos: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryTacoRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully formed taco, keeping its id and timestamp.
    ///
    /// Later saves get ids above any inserted one.
    pub async fn insert(&self, taco: Taco) {
        self.next_id
            .fetch_max(taco.id.as_i64() + 1, Ordering::SeqCst);
        self.tacos.write().await.insert(taco.id, taco);
    }

    /// Number of stored tacos.
    pub async fn len(&self) -> usize {
        self.tacos.read().await.len()
    }

    /// Whether no taco is stored.
    pub async fn is_empty(&self) -> bool {
        self.tacos.read().await.is_empty()
    }
}

#[async_trait]
impl TacoRepository for InMemoryTacoRepository {
    async fn find_all(
        &self,
        page: PageRequest,
        sort: TacoSort,
    ) -> Result<Vec<Taco>, RepositoryError> {
        let mut tacos: Vec<Taco> = self.tacos.read().await.values().cloned().collect();
        tacos.sort_by(|a, b| sort.compare(a, b));
        Ok(page.slice(&tacos).to_vec())
    }

    async fn find_by_id(&self, id: TacoId) -> Result<Option<Taco>, RepositoryError> {
        Ok(self.tacos.read().await.get(&id).cloned())
    }

    async fn save(&self, design: TacoDesign) -> Result<Taco, RepositoryError> {
        let id = TacoId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let taco = Taco::from_design(id, Utc::now(), design);
        self.tacos.write().await.insert(id, taco.clone());
        Ok(taco)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Orders in placement order. Their tacos are saved to the taco repository.
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<PlacedOrder>>,
    tacos: Arc<InMemoryTacoRepository>,
    next_id: AtomicI64,
}

impl InMemoryOrderRepository {
    /// Create an empty repository saving tacos into `tacos`.
    #[must_use]
    pub fn new(tacos: Arc<InMemoryTacoRepository>) -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            tacos,
            next_id: AtomicI64::new(1),
        }
    }

    /// Every placed order, oldest first.
    pub async fn all(&self) -> Vec<PlacedOrder> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: NewOrder) -> Result<PlacedOrder, RepositoryError> {
        let mut tacos = Vec::with_capacity(order.tacos.len());
        for design in order.tacos {
            tacos.push(self.tacos.save(design).await?);
        }

        let placed = PlacedOrder {
            id: OrderId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            user_id: order.user_id,
            placed_at: Utc::now(),
            delivery: order.delivery,
            payment: order.payment,
            tacos,
        };
        self.orders.write().await.push(placed.clone());
        Ok(placed)
    }

    async fn find_by_user_order_by_placed_at_desc(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<PlacedOrder>, RepositoryError> {
        let mut orders: Vec<PlacedOrder> = self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| b.id.cmp(&a.id)));

        let total = orders.len() as u64;
        Ok(Page::new(page.slice(&orders).to_vec(), page, total))
    }
}

// =============================================================================
// Users
// =============================================================================

/// Users with their password hashes.
pub struct InMemoryUserRepository {
    users: RwLock<Vec<(User, String)>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user, leaving any live sessions pointing at nothing.
    #[cfg(test)]
    pub async fn remove(&self, id: UserId) {
        self.users.write().await.retain(|(u, _)| u.id != id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.clone()))
    }

    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(u, _)| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|(u, _)| u.username == user.username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let user = user.with_id(UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst)));
        users.push((user.clone(), password_hash.to_owned()));
        Ok(user)
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// A full set of in-memory repositories with typed handles for inspection.
#[derive(Clone)]
pub struct InMemoryRepositories {
    pub ingredients: Arc<InMemoryIngredientRepository>,
    pub tacos: Arc<InMemoryTacoRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub users: Arc<InMemoryUserRepository>,
}

impl InMemoryRepositories {
    /// Empty stores apart from `ingredients`.
    #[must_use]
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        let tacos = Arc::new(InMemoryTacoRepository::new());
        Self {
            ingredients: Arc::new(InMemoryIngredientRepository::new(ingredients)),
            orders: Arc::new(InMemoryOrderRepository::new(Arc::clone(&tacos))),
            tacos,
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    /// The same stores as trait objects for the application state.
    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories {
            ingredients: self.ingredients.clone(),
            tacos: self.tacos.clone(),
            orders: self.orders.clone(),
            users: self.users.clone(),
        }
    }
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self::new(default_ingredients())
    }
}
