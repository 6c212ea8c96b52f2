//! Taco Cloud Core - Shared domain types.
//!
//! This crate provides the domain model used across all Taco Cloud components:
//! - `web` - Design form, order flow, and the taco JSON API
//! - `cli` - Command-line tools for migrations, seeding, and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Handlers in the web crate fetch data from repositories and
//! hand it to the functions here (ingredient grouping, order defaulting,
//! validation).
//!
//! # Modules
//!
//! - [`types`] - Ids, ingredients, tacos, orders, users, and pagination
//! - [`validation`] - Field-level validation results and checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, ValidationErrors};
