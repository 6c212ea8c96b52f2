//! Orders, from session draft to placed record.
//!
//! An order starts as an [`OrderDraft`] held in the customer's session. Its
//! fields are optional because the customer fills them in over several
//! requests. [`OrderDraft::validate`] turns a complete draft into a
//! [`ValidatedOrder`], which becomes a [`NewOrder`] once an owner is attached.
//! Saving a `NewOrder` yields an immutable [`PlacedOrder`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, UserId};
use super::taco::{Taco, TacoDesign};
use super::user::User;
use crate::validation::{
    ValidationErrors, fits_within, is_present, is_valid_card_expiration, is_valid_card_number,
    is_valid_cvv,
};

/// Column widths of the `taco_order` delivery and card number fields.
pub const MAX_DELIVERY_NAME_LENGTH: usize = 100;
pub const MAX_DELIVERY_STREET_LENGTH: usize = 100;
pub const MAX_DELIVERY_CITY_LENGTH: usize = 50;
pub const MAX_DELIVERY_STATE_LENGTH: usize = 20;
pub const MAX_DELIVERY_ZIP_LENGTH: usize = 10;
pub const MAX_CC_NUMBER_LENGTH: usize = 23;

/// An order being filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub delivery_name: Option<String>,
    pub delivery_street: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_state: Option<String>,
    pub delivery_zip: Option<String>,
    pub cc_number: Option<String>,
    pub cc_expiration: Option<String>,
    #[serde(rename = "ccCVV")]
    pub cc_cvv: Option<String>,
    #[serde(default)]
    pub tacos: Vec<TacoDesign>,
}

impl OrderDraft {
    /// Fill unset delivery fields from the user's profile.
    ///
    /// A field that already holds a value is left alone, including one the
    /// customer edited to something different from their profile.
    pub fn fill_delivery_defaults(&mut self, user: &User) {
        fill(&mut self.delivery_name, &user.full_name);
        fill(&mut self.delivery_street, &user.street);
        fill(&mut self.delivery_city, &user.city);
        fill(&mut self.delivery_state, &user.state);
        fill(&mut self.delivery_zip, &user.zip);
    }

    /// Add a taco design to the order.
    pub fn add_design(&mut self, design: TacoDesign) {
        self.tacos.push(design);
    }

    /// Check that delivery and payment details are complete and well formed.
    ///
    /// # Errors
    ///
    /// Returns the failed checks keyed by form field name.
    pub fn validate(&self) -> Result<ValidatedOrder, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(
            is_present(self.delivery_name.as_deref()),
            "deliveryName",
            "Delivery name is required",
        );
        errors.check(
            is_present(self.delivery_street.as_deref()),
            "deliveryStreet",
            "Street is required",
        );
        errors.check(
            is_present(self.delivery_city.as_deref()),
            "deliveryCity",
            "City is required",
        );
        errors.check(
            is_present(self.delivery_state.as_deref()),
            "deliveryState",
            "State is required",
        );
        errors.check(
            is_present(self.delivery_zip.as_deref()),
            "deliveryZip",
            "Zip code is required",
        );
        let limits = [
            (
                &self.delivery_name,
                "deliveryName",
                MAX_DELIVERY_NAME_LENGTH,
                "Delivery name must be at most 100 characters",
            ),
            (
                &self.delivery_street,
                "deliveryStreet",
                MAX_DELIVERY_STREET_LENGTH,
                "Street must be at most 100 characters",
            ),
            (
                &self.delivery_city,
                "deliveryCity",
                MAX_DELIVERY_CITY_LENGTH,
                "City must be at most 50 characters",
            ),
            (
                &self.delivery_state,
                "deliveryState",
                MAX_DELIVERY_STATE_LENGTH,
                "State must be at most 20 characters",
            ),
            (
                &self.delivery_zip,
                "deliveryZip",
                MAX_DELIVERY_ZIP_LENGTH,
                "Zip code must be at most 10 characters",
            ),
            (
                &self.cc_number,
                "ccNumber",
                MAX_CC_NUMBER_LENGTH,
                "Credit card number must be at most 23 characters",
            ),
        ];
        for (value, field, max, message) in limits {
            errors.check(fits_within(value.as_deref(), max), field, message);
        }
        errors.check(
            self.cc_number.as_deref().is_some_and(is_valid_card_number),
            "ccNumber",
            "Not a valid credit card number",
        );
        errors.check(
            self.cc_expiration
                .as_deref()
                .is_some_and(is_valid_card_expiration),
            "ccExpiration",
            "Must be formatted MM/YY",
        );
        errors.check(
            self.cc_cvv.as_deref().is_some_and(is_valid_cvv),
            "ccCVV",
            "Invalid CVV",
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        let text = |value: Option<&str>| value.unwrap_or_default().trim().to_owned();

        Ok(ValidatedOrder {
            delivery: DeliveryAddress {
                name: text(self.delivery_name.as_deref()),
                street: text(self.delivery_street.as_deref()),
                city: text(self.delivery_city.as_deref()),
                state: text(self.delivery_state.as_deref()),
                zip: text(self.delivery_zip.as_deref()),
            },
            payment: PaymentDetails {
                cc_number: text(self.cc_number.as_deref()),
                cc_expiration: text(self.cc_expiration.as_deref()),
                cc_cvv: text(self.cc_cvv.as_deref()),
            },
            tacos: self.tacos.clone(),
        })
    }
}

fn fill(field: &mut Option<String>, default: &str) {
    if field.is_none() {
        *field = Some(default.to_owned());
    }
}

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Card details for an order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub cc_number: String,
    pub cc_expiration: String,
    pub cc_cvv: String,
}

impl PaymentDetails {
    /// Card number with everything but the last four digits hidden.
    #[must_use]
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self
            .cc_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let last_four: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
        format!("**** {last_four}")
    }
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("cc_number", &self.masked_number())
            .field("cc_expiration", &self.cc_expiration)
            .field("cc_cvv", &"[REDACTED]")
            .finish()
    }
}

/// A draft that passed validation but has no owner yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub delivery: DeliveryAddress,
    pub payment: PaymentDetails,
    pub tacos: Vec<TacoDesign>,
}

impl ValidatedOrder {
    /// Attach the customer placing the order.
    #[must_use]
    pub fn owned_by(self, user_id: UserId) -> NewOrder {
        NewOrder {
            user_id,
            delivery: self.delivery,
            payment: self.payment,
            tacos: self.tacos,
        }
    }
}

/// An order ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub delivery: DeliveryAddress,
    pub payment: PaymentDetails,
    pub tacos: Vec<TacoDesign>,
}

/// A saved order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub delivery: DeliveryAddress,
    pub payment: PaymentDetails,
    pub tacos: Vec<Taco>,
}
