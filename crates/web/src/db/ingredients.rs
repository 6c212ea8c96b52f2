//! Ingredient repository backed by `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use taco_cloud_core::{Ingredient, IngredientId, IngredientType};

use super::{IngredientRepository, RepositoryError, ingredient_id_from_db};

#[derive(sqlx::FromRow)]
pub(super) struct IngredientRow {
    pub id: String,
    pub name: String,
    pub kind: IngredientType,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = RepositoryError;

    fn try_from(row: IngredientRow) -> Result<Self, Self::Error> {
        Ok(Self::new(ingredient_id_from_db(&row.id)?, row.name, row.kind))
    }
}

/// Repository for the `ingredient` table.
#[derive(Clone)]
pub struct PgIngredientRepository {
    pool: PgPool,
}

impl PgIngredientRepository {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngredientRepository for PgIngredientRepository {
    async fn find_all(&self) -> Result<Vec<Ingredient>, RepositoryError> {
        let rows: Vec<IngredientRow> = sqlx::query_as(
            r"
            SELECT id, name, type AS kind
            FROM ingredient
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Ingredient::try_from).collect()
    }

    async fn find_by_id(&self, id: &IngredientId) -> Result<Option<Ingredient>, RepositoryError> {
        let row: Option<IngredientRow> = sqlx::query_as(
            r"
            SELECT id, name, type AS kind
            FROM ingredient
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Ingredient::try_from).transpose()
    }

    async fn save(&self, ingredient: &Ingredient) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO ingredient (id, name, type)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, type = EXCLUDED.type
            ",
        )
        .bind(ingredient.id.as_str())
        .bind(&ingredient.name)
        .bind(ingredient.kind)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
