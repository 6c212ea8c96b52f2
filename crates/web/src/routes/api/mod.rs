//! JSON API routes.
//!
//! Every endpoint here is served with a permissive CORS policy.

pub mod tacos;

pub use tacos::{RECENT_TACOS_LIMIT, create_taco, recent_tacos, taco_by_id};
