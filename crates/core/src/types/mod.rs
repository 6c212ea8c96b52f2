//! Core types for Taco Cloud.
//!
//! This module provides type-safe wrappers for the taco domain.

pub mod id;
pub mod ingredient;
pub mod order;
pub mod page;
pub mod taco;
pub mod user;

pub use id::*;
pub use ingredient::{
    Ingredient, IngredientGroup, IngredientGroups, IngredientId, IngredientIdError,
    IngredientType,
};
pub use order::{
    DeliveryAddress, NewOrder, OrderDraft, PaymentDetails, PlacedOrder, ValidatedOrder,
};
pub use page::{Page, PageRequest};
pub use taco::{Taco, TacoDesign, TacoSort};
pub use user::{NewUser, User};
