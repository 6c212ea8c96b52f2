//! Taco designs.
//!
//! A [`TacoDesign`] is what a customer builds on the design form or posts to
//! the JSON API. Saving it yields a [`Taco`] with an id and creation time.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::TacoId;
use super::ingredient::Ingredient;
use crate::validation::ValidationErrors;

/// Minimum number of characters in a taco name.
pub const MIN_NAME_LENGTH: usize = 5;

/// Maximum number of characters in a taco name (the `taco.name` column).
pub const MAX_NAME_LENGTH: usize = 50;

/// An unsaved taco: a name and an ordered selection of ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacoDesign {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl TacoDesign {
    /// Create a design.
    #[must_use]
    pub fn new(name: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            name: name.into(),
            ingredients,
        }
    }

    /// Check the name length and that at least one ingredient was chosen.
    ///
    /// # Errors
    ///
    /// Returns the failed checks keyed by `name` and `ingredients`.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.name.trim().chars().count() >= MIN_NAME_LENGTH,
            "name",
            "Name must be at least 5 characters long",
        );
        errors.check(
            self.name.trim().chars().count() <= MAX_NAME_LENGTH,
            "name",
            "Name must be at most 50 characters long",
        );
        errors.check(
            !self.ingredients.is_empty(),
            "ingredients",
            "You must choose at least 1 ingredient",
        );
        errors.into_result(())
    }
}

/// A persisted taco.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taco {
    pub id: TacoId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<Ingredient>,
}

impl Taco {
    /// Attach an id and creation time to a design.
    #[must_use]
    pub fn from_design(id: TacoId, created_at: DateTime<Utc>, design: TacoDesign) -> Self {
        Self {
            id,
            name: design.name,
            created_at,
            ingredients: design.ingredients,
        }
    }
}

/// Sort order for taco listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TacoSort {
    /// Most recently created first.
    #[default]
    NewestFirst,
    /// Oldest first.
    OldestFirst,
}

impl TacoSort {
    /// Compare two tacos under this order.
    ///
    /// Ties on creation time fall back to the id so the order is total.
    #[must_use]
    pub fn compare(self, a: &Taco, b: &Taco) -> Ordering {
        let ascending = a
            .created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id));
        match self {
            Self::NewestFirst => ascending.reverse(),
            Self::OldestFirst => ascending,
        }
    }
}
