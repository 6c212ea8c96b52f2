//! Ingredients and their grouping by type.
//!
//! Ingredients are immutable reference data. The design form shows them in one
//! list per [`IngredientType`], built by [`IngredientGroups::partition`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`IngredientId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IngredientIdError {
    /// The input string is empty.
    #[error("ingredient id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("ingredient id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than ASCII letters and digits.
    #[error("ingredient id must be alphanumeric")]
    InvalidCharacter,
}

/// Short code identifying an ingredient (e.g. `FLTO`, `GRBF`).
///
/// ## Constraints
///
/// - Length: 1-4 characters
/// - ASCII letters and digits only
///
/// ## Examples
///
/// ```
/// use taco_cloud_core::IngredientId;
///
/// assert!(IngredientId::parse("FLTO").is_ok());
/// assert!(IngredientId::parse("").is_err());
/// assert!(IngredientId::parse("TOOLONG").is_err());
/// assert!(IngredientId::parse("F-1").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct IngredientId(String);

impl IngredientId {
    /// Maximum length of an ingredient id (matches the `VARCHAR(4)` column).
    pub const MAX_LENGTH: usize = 4;

    /// Parse an `IngredientId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 4 characters, or
    /// contains anything but ASCII letters and digits.
    pub fn parse(s: &str) -> Result<Self, IngredientIdError> {
        if s.is_empty() {
            return Err(IngredientIdError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(IngredientIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IngredientIdError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for IngredientId {
    type Err = IngredientIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IngredientId {
    type Error = IngredientIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IngredientId> for String {
    fn from(id: IngredientId) -> Self {
        id.0
    }
}

/// The kind of an ingredient.
///
/// Declaration order is the display order of the design form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "ingredient_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngredientType {
    Wrap,
    Protein,
    Veggies,
    Cheese,
    Sauce,
}

impl IngredientType {
    /// Every type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Wrap,
        Self::Protein,
        Self::Veggies,
        Self::Cheese,
        Self::Sauce,
    ];

    /// Lower-cased name used as the group key in views.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Wrap => "wrap",
            Self::Protein => "protein",
            Self::Veggies => "veggies",
            Self::Cheese => "cheese",
            Self::Sauce => "sauce",
        }
    }

    /// Heading shown above the group on the design form.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Wrap => "Designate your wrap:",
            Self::Protein => "Pick your protein:",
            Self::Veggies => "Determine your veggies:",
            Self::Cheese => "Choose your cheese:",
            Self::Sauce => "Select your sauce:",
        }
    }
}

impl fmt::Display for IngredientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wrap => "WRAP",
            Self::Protein => "PROTEIN",
            Self::Veggies => "VEGGIES",
            Self::Cheese => "CHEESE",
            Self::Sauce => "SAUCE",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for IngredientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid ingredient type: {s}"))
    }
}

/// A single ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IngredientType,
}

impl Ingredient {
    /// Create an ingredient.
    #[must_use]
    pub fn new(id: IngredientId, name: impl Into<String>, kind: IngredientType) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// Ingredients of one type, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientGroup {
    pub kind: IngredientType,
    pub ingredients: Vec<Ingredient>,
}

impl IngredientGroup {
    /// Lower-cased type name (e.g. `"wrap"`).
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.kind.key()
    }
}

/// All ingredients partitioned by type, one group per [`IngredientType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientGroups(Vec<IngredientGroup>);

impl IngredientGroups {
    /// Partition `ingredients` by type.
    ///
    /// Every type gets a group, even when empty. Within a group the source
    /// order is preserved.
    #[must_use]
    pub fn partition(ingredients: &[Ingredient]) -> Self {
        let groups = IngredientType::ALL
            .into_iter()
            .map(|kind| IngredientGroup {
                kind,
                ingredients: ingredients
                    .iter()
                    .filter(|ingredient| ingredient.kind == kind)
                    .cloned()
                    .collect(),
            })
            .collect();

        Self(groups)
    }

    /// Look up a group by its lower-cased key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&IngredientGroup> {
        self.0.iter().find(|group| group.key() == key)
    }

    /// Iterate over the groups in type declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &IngredientGroup> {
        self.0.iter()
    }

    /// Number of groups (always the number of ingredient types).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a IngredientGroups {
    type Item = &'a IngredientGroup;
    type IntoIter = std::slice::Iter<'a, IngredientGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
