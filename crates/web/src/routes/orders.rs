//! Order route handlers.
//!
//! ```text
//! GET  /orders/current  - Order form for the in-progress order
//! POST /orders          - Validate and place the order
//! GET  /orders          - The customer's past orders, newest first
//! ```
//!
//! All three require a logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use taco_cloud_core::{OrderDraft, PageRequest, PlacedOrder, ValidationErrors};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{OrderSession, RequireAuth};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Order form data.
///
/// Field names match the inputs on the order form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub delivery_name: Option<String>,
    pub delivery_street: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_state: Option<String>,
    pub delivery_zip: Option<String>,
    pub cc_number: Option<String>,
    pub cc_expiration: Option<String>,
    #[serde(rename = "ccCVV")]
    pub cc_cvv: Option<String>,
}

impl OrderForm {
    /// Copy the submitted fields onto the draft, keeping its tacos.
    fn apply_to(self, draft: &mut OrderDraft) {
        draft.delivery_name = self.delivery_name;
        draft.delivery_street = self.delivery_street;
        draft.delivery_city = self.delivery_city;
        draft.delivery_state = self.delivery_state;
        draft.delivery_zip = self.delivery_zip;
        draft.cc_number = self.cc_number;
        draft.cc_expiration = self.cc_expiration;
        draft.cc_cvv = self.cc_cvv;
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the order history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Zero-based page index.
    pub page: Option<u32>,
}

// =============================================================================
// Templates
// =============================================================================

/// Order form template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/form.html")]
pub struct OrderFormTemplate {
    pub order: OrderDraftView,
    pub errors: ValidationErrors,
}

/// Draft fields as the form shows them.
pub struct OrderDraftView {
    pub delivery_name: String,
    pub delivery_street: String,
    pub delivery_city: String,
    pub delivery_state: String,
    pub delivery_zip: String,
    pub cc_number: String,
    pub cc_expiration: String,
    pub cc_cvv: String,
    pub tacos: Vec<String>,
}

impl From<&OrderDraft> for OrderDraftView {
    fn from(draft: &OrderDraft) -> Self {
        let text = |value: Option<&str>| value.unwrap_or_default().to_owned();
        Self {
            delivery_name: text(draft.delivery_name.as_deref()),
            delivery_street: text(draft.delivery_street.as_deref()),
            delivery_city: text(draft.delivery_city.as_deref()),
            delivery_state: text(draft.delivery_state.as_deref()),
            delivery_zip: text(draft.delivery_zip.as_deref()),
            cc_number: text(draft.cc_number.as_deref()),
            cc_expiration: text(draft.cc_expiration.as_deref()),
            cc_cvv: text(draft.cc_cvv.as_deref()),
            tacos: draft.tacos.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/list.html")]
pub struct OrderListTemplate {
    pub orders: Vec<OrderSummaryView>,
    pub page: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub total: u64,
}

/// One past order, preformatted for display.
pub struct OrderSummaryView {
    pub id: String,
    pub placed_at: String,
    pub delivery_name: String,
    pub delivery_address: String,
    pub card: String,
    pub tacos: Vec<String>,
}

impl From<&PlacedOrder> for OrderSummaryView {
    fn from(order: &PlacedOrder) -> Self {
        let d = &order.delivery;
        Self {
            id: order.id.to_string(),
            placed_at: order.placed_at.format("%b %-d, %Y %H:%M UTC").to_string(),
            delivery_name: d.name.clone(),
            delivery_address: format!("{}, {}, {} {}", d.street, d.city, d.state, d.zip),
            card: order.payment.masked_number(),
            tacos: order.tacos.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Show the order form.
///
/// Unset delivery fields are filled from the user's profile; anything the
/// customer already entered is kept.
#[instrument(skip(user, orders), fields(user_id = %user.id))]
pub async fn order_form(
    RequireAuth(user): RequireAuth,
    orders: OrderSession,
) -> Result<OrderFormTemplate> {
    let mut draft = orders.load().await?;
    draft.fill_delivery_defaults(&user);
    orders.store(&draft).await?;

    Ok(OrderFormTemplate {
        order: OrderDraftView::from(&draft),
        errors: ValidationErrors::new(),
    })
}

/// Place the order.
///
/// The submitted fields are kept in the session draft either way. A valid
/// order is saved once and the draft cleared.
#[instrument(skip(state, user, orders, form), fields(user_id = %user.id))]
pub async fn process_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    orders: OrderSession,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let mut draft = orders.load().await?;
    form.apply_to(&mut draft);
    orders.store(&draft).await?;

    let validated = match draft.validate() {
        Ok(validated) => validated,
        Err(errors) => {
            tracing::debug!(errors = errors.len(), "Order rejected");
            return Ok(OrderFormTemplate {
                order: OrderDraftView::from(&draft),
                errors,
            }
            .into_response());
        }
    };

    let placed = state.orders().save(validated.owned_by(user.id)).await?;
    orders.clear().await?;

    tracing::info!(
        order_id = %placed.id,
        tacos = placed.tacos.len(),
        "Order placed"
    );
    add_breadcrumb("order", "Order placed", &[("order_id", &placed.id.to_string())]);

    Ok(Redirect::to("/").into_response())
}

/// List the user's past orders.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders_for_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<HistoryQuery>,
) -> Result<OrderListTemplate> {
    let index = query.page.unwrap_or(0);
    let request = PageRequest::of(index, state.order_config().page_size);

    let page = state
        .orders()
        .find_by_user_order_by_placed_at_desc(user.id, request)
        .await?;

    Ok(OrderListTemplate {
        orders: page.items.iter().map(OrderSummaryView::from).collect(),
        page: index,
        previous_page: index.checked_sub(1),
        next_page: page.has_next().then(|| index.saturating_add(1)),
        total: page.total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use taco_cloud_core::{
        DeliveryAddress, OrderId, PaymentDetails, Taco, TacoDesign, TacoId, UserId,
    };

    use super::*;

    #[test]
    fn test_form_replaces_fields_and_keeps_tacos() {
        let mut draft = OrderDraft {
            delivery_name: Some("Old Name".to_owned()),
            ..OrderDraft::default()
        };
        draft.add_design(TacoDesign::new("Carnivore", Vec::new()));

        OrderForm {
            delivery_name: Some(String::new()),
            delivery_city: Some("Plano".to_owned()),
            ..OrderForm::default()
        }
        .apply_to(&mut draft);

        assert_eq!(draft.delivery_name.as_deref(), Some(""));
        assert_eq!(draft.delivery_city.as_deref(), Some("Plano"));
        assert_eq!(draft.tacos.len(), 1);
    }

    #[test]
    fn test_summary_view_masks_card() {
        let order = PlacedOrder {
            id: OrderId::new(5),
            user_id: UserId::new(1),
            placed_at: Utc.with_ymd_and_hms(2026, 3, 4, 18, 30, 0).unwrap(),
            delivery: DeliveryAddress {
                name: "Sam Rivera".to_owned(),
                street: "1234 Culinary Blvd.".to_owned(),
                city: "Plano".to_owned(),
                state: "TX".to_owned(),
                zip: "76227".to_owned(),
            },
            payment: PaymentDetails {
                cc_number: "4111111111111111".to_owned(),
                cc_expiration: "10/29".to_owned(),
                cc_cvv: "123".to_owned(),
            },
            tacos: vec![Taco::from_design(
                TacoId::new(9),
                Utc.with_ymd_and_hms(2026, 3, 4, 18, 29, 0).unwrap(),
                TacoDesign::new("Carnivore", Vec::new()),
            )],
        };

        let view = OrderSummaryView::from(&order);
        assert_eq!(view.id, "5");
        assert_eq!(view.placed_at, "Mar 4, 2026 18:30 UTC");
        assert_eq!(view.delivery_address, "1234 Culinary Blvd., Plano, TX 76227");
        assert_eq!(view.card, "**** 1111");
        assert_eq!(view.tacos, vec!["Carnivore"]);
    }
}
