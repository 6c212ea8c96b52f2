//! Session-related types.
//!
//! Types stored in the session for authentication and order state.

use serde::{Deserialize, Serialize};

use taco_cloud_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// full profile is loaded from the user store on each request that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the in-progress order.
    pub const ORDER: &str = "order";
}
