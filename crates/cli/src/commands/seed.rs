//! Seed ingredient reference data from a YAML file.
//!
//! ```yaml
//! ingredients:
//!   - id: FLTO
//!     name: Flour Tortilla
//!     type: WRAP
//! ```
//!
//! Seeding is idempotent: ingredients are upserted by id.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use taco_cloud_core::Ingredient;
use taco_cloud_web::db::IngredientRepository;
use taco_cloud_web::db::ingredients::PgIngredientRepository;

use super::{CliError, connect};

/// Top-level layout of the seed file.
#[derive(Debug, Deserialize)]
struct IngredientsFile {
    ingredients: Vec<Ingredient>,
}

/// Parse and check a seed file's contents.
///
/// Ids are validated while parsing; duplicates and an empty list are
/// rejected here.
fn parse_ingredients(content: &str) -> Result<Vec<Ingredient>, CliError> {
    let file: IngredientsFile = serde_yaml::from_str(content)?;

    if file.ingredients.is_empty() {
        return Err(CliError::InvalidSeed("no ingredients listed".to_owned()));
    }

    let mut seen = HashSet::new();
    for ingredient in &file.ingredients {
        if !seen.insert(ingredient.id.as_str()) {
            return Err(CliError::InvalidSeed(format!(
                "duplicate ingredient id {}",
                ingredient.id
            )));
        }
    }

    Ok(file.ingredients)
}

/// Seed ingredients from `file_path`.
///
/// The file is validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database write
/// fails.
pub async fn ingredients(file_path: &Path) -> Result<(), CliError> {
    info!(path = %file_path.display(), "Loading ingredients from file");

    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.display().to_string(),
            source,
        })?;
    let ingredients = parse_ingredients(&content)?;
    info!(count = ingredients.len(), "Parsed ingredients");

    let pool = connect().await?;
    let repo = PgIngredientRepository::new(pool);

    for ingredient in &ingredients {
        repo.save(ingredient).await?;
        info!(id = %ingredient.id, name = %ingredient.name, "Seeded ingredient");
    }

    info!("Seeding complete!");
    Ok(())
}
