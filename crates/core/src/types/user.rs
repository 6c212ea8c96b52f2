//! Users and their default delivery details.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A registered customer.
///
/// The address fields are used to pre-fill the delivery section of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone_number: String,
}

/// Data needed to create a user (the password hash is stored separately).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone_number: String,
}

impl NewUser {
    /// Attach an id.
    #[must_use]
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            full_name: self.full_name,
            street: self.street,
            city: self.city,
            state: self.state,
            zip: self.zip,
            phone_number: self.phone_number,
        }
    }
}
