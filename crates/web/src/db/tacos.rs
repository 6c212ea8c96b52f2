//! Taco repository backed by `PostgreSQL`.
//!
//! A taco's ingredients live in `taco_ingredient`, keyed by position so the
//! customer's selection order survives a round trip.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use taco_cloud_core::{Ingredient, PageRequest, Taco, TacoDesign, TacoId, TacoSort};

use super::ingredients::IngredientRow;
use super::{RepositoryError, TacoRepository, limit_offset};

#[derive(sqlx::FromRow)]
pub(super) struct TacoRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TacoIngredientRow {
    taco_id: i64,
    #[sqlx(flatten)]
    ingredient: IngredientRow,
}

/// Repository for the `taco` table.
#[derive(Clone)]
pub struct PgTacoRepository {
    pool: PgPool,
}

impl PgTacoRepository {
    /// Create a new taco repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TacoRepository for PgTacoRepository {
    async fn find_all(
        &self,
        page: PageRequest,
        sort: TacoSort,
    ) -> Result<Vec<Taco>, RepositoryError> {
        let query = match sort {
            TacoSort::NewestFirst => {
                r"
                SELECT id, name, created_at
                FROM taco
                ORDER BY created_at DESC, id DESC
                LIMIT $1 OFFSET $2
                "
            }
            TacoSort::OldestFirst => {
                r"
                SELECT id, name, created_at
                FROM taco
                ORDER BY created_at ASC, id ASC
                LIMIT $1 OFFSET $2
                "
            }
        };
        let (limit, offset) = limit_offset(page);

        let rows: Vec<TacoRow> = sqlx::query_as(query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        with_ingredients(&self.pool, rows).await
    }

    async fn find_by_id(&self, id: TacoId) -> Result<Option<Taco>, RepositoryError> {
        let row: Option<TacoRow> = sqlx::query_as(
            r"
            SELECT id, name, created_at
            FROM taco
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(with_ingredients(&self.pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, design: TacoDesign) -> Result<Taco, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let taco = insert_taco(&mut *tx, design).await?;
        tx.commit().await?;

        tracing::debug!(taco_id = %taco.id, "Saved taco");
        Ok(taco)
    }
}

/// Insert a taco and its ingredient links on an open connection.
///
/// Returns `RepositoryError::Conflict` if an ingredient does not exist.
pub(super) async fn insert_taco(
    conn: &mut PgConnection,
    design: TacoDesign,
) -> Result<Taco, RepositoryError> {
    let row: TacoRow = sqlx::query_as(
        r"
        INSERT INTO taco (name)
        VALUES ($1)
        RETURNING id, name, created_at
        ",
    )
    .bind(&design.name)
    .fetch_one(&mut *conn)
    .await?;

    for (position, ingredient) in (0_i32..).zip(&design.ingredients) {
        sqlx::query(
            r"
            INSERT INTO taco_ingredient (taco_id, position, ingredient_id)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(row.id)
        .bind(position)
        .bind(ingredient.id.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict(format!("unknown ingredient {}", ingredient.id));
            }
            RepositoryError::Database(e)
        })?;
    }

    Ok(Taco::from_design(TacoId::new(row.id), row.created_at, design))
}

/// Load the ingredients of `rows` and build tacos in the same order.
pub(super) async fn with_ingredients(
    pool: &PgPool,
    rows: Vec<TacoRow>,
) -> Result<Vec<Taco>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let links: Vec<TacoIngredientRow> = sqlx::query_as(
        r"
        SELECT ti.taco_id, i.id, i.name, i.type AS kind
        FROM taco_ingredient ti
        JOIN ingredient i ON i.id = ti.ingredient_id
        WHERE ti.taco_id = ANY($1)
        ORDER BY ti.taco_id, ti.position
        ",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_taco: HashMap<i64, Vec<Ingredient>> = HashMap::new();
    for link in links {
        by_taco
            .entry(link.taco_id)
            .or_default()
            .push(Ingredient::try_from(link.ingredient)?);
    }

    Ok(rows
        .into_iter()
        .map(|row| Taco {
            id: TacoId::new(row.id),
            name: row.name,
            created_at: row.created_at,
            ingredients: by_taco.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}
