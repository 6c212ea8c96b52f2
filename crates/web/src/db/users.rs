//! User repository backed by `PostgreSQL`.
//!
//! Password hashes are only read by [`UserRepository::get_password_hash`];
//! every other query leaves the column out.

use async_trait::async_trait;
use sqlx::PgPool;

use taco_cloud_core::{NewUser, User, UserId};

use super::{RepositoryError, UserRepository, conflict_on_unique};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    full_name: String,
    street: String,
    city: String,
    state: String,
    zip: String,
    phone_number: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            full_name: row.full_name,
            street: row.street,
            city: row.city,
            state: row.state,
            zip: row.zip,
            phone_number: row.phone_number,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for the `app_user` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, username, full_name, street, city, state, zip, phone_number
            FROM app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, username, full_name, street, city, state, zip, phone_number
            FROM app_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(
            r"
            SELECT id, username, full_name, street, city, state, zip, phone_number, password_hash
            FROM app_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| (User::from(r.user), r.password_hash)))
    }

    async fn create(&self, user: NewUser, password_hash: &str) -> Result<User, RepositoryError> {
        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO app_user (
                username, password_hash, full_name, street, city, state, zip, phone_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&user.username)
        .bind(password_hash)
        .bind(&user.full_name)
        .bind(&user.street)
        .bind(&user.city)
        .bind(&user.state)
        .bind(&user.zip)
        .bind(&user.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        Ok(user.with_id(UserId::new(id)))
    }
}
