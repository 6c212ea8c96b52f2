//! Repositories for Taco Cloud data.
//!
//! Handlers reach storage through the traits in this module, held as trait
//! objects in [`Repositories`]. Production uses the `PostgreSQL`
//! implementations; tests use the in-memory ones from [`memory`].
//!
//! # Tables
//!
//! - `ingredient` - Reference data, seeded by `tc-cli seed ingredients`
//! - `taco` / `taco_ingredient` - Saved tacos and their ordered ingredients
//! - `taco_order` / `taco_order_taco` - Placed orders and their tacos
//! - `app_user` - Customers with argon2 password hashes
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p taco-cloud-cli -- migrate
//! ```

pub mod cache;
pub mod ingredients;
pub mod memory;
pub mod orders;
pub mod tacos;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use taco_cloud_core::{
    Ingredient, IngredientId, NewOrder, NewUser, Page, PageRequest, PlacedOrder, Taco,
    TacoDesign, TacoId, TacoSort, User, UserId,
};

pub use cache::CachedIngredientRepository;
pub use ingredients::PgIngredientRepository;
pub use orders::PgOrderRepository;
pub use tacos::PgTacoRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Read access to ingredient reference data.
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// All ingredients in storage order.
    async fn find_all(&self) -> Result<Vec<Ingredient>, RepositoryError>;

    /// A single ingredient.
    async fn find_by_id(&self, id: &IngredientId) -> Result<Option<Ingredient>, RepositoryError>;

    /// Insert or replace an ingredient.
    async fn save(&self, ingredient: &Ingredient) -> Result<(), RepositoryError>;
}

/// Saved tacos.
#[async_trait]
pub trait TacoRepository: Send + Sync {
    /// One page of tacos under `sort`.
    async fn find_all(
        &self,
        page: PageRequest,
        sort: TacoSort,
    ) -> Result<Vec<Taco>, RepositoryError>;

    /// A single taco.
    async fn find_by_id(&self, id: TacoId) -> Result<Option<Taco>, RepositoryError>;

    /// Save a design, assigning its id and creation time.
    async fn save(&self, design: TacoDesign) -> Result<Taco, RepositoryError>;
}

/// Placed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save an order together with its tacos.
    async fn save(&self, order: NewOrder) -> Result<PlacedOrder, RepositoryError>;

    /// One page of a user's orders, most recent first.
    async fn find_by_user_order_by_placed_at_desc(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<PlacedOrder>, RepositoryError>;
}

/// Registered customers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look a user up by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look a user up by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// A user together with their password hash, for login.
    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Create a user.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, RepositoryError>;
}

/// The repositories a request handler can reach.
#[derive(Clone)]
pub struct Repositories {
    pub ingredients: Arc<dyn IngredientRepository>,
    pub tacos: Arc<dyn TacoRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// `PostgreSQL`-backed repositories sharing one pool.
    ///
    /// Ingredient reads are cached.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            ingredients: Arc::new(CachedIngredientRepository::new(PgIngredientRepository::new(
                pool.clone(),
            ))),
            tacos: Arc::new(PgTacoRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse an ingredient id read from the database.
fn ingredient_id_from_db(raw: &str) -> Result<IngredientId, RepositoryError> {
    IngredientId::parse(raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid ingredient id in database: {e}"))
    })
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Convert a page request to `LIMIT`/`OFFSET` parameters.
fn limit_offset(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.size), offset)
}
