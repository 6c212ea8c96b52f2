//! Taco design form route handlers.
//!
//! `GET /design` shows every ingredient grouped by type. A valid submission
//! is added to the in-progress order in the session and the customer moves on
//! to `/orders/current`; the taco itself is saved with the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use tracing::instrument;

use taco_cloud_core::{
    Ingredient, IngredientGroups, IngredientId, TacoDesign, ValidationErrors,
};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::OrderSession;
use crate::routes::api;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Design form data.
///
/// `ingredients` is repeated once per checked box.
#[derive(Debug, Default, Deserialize)]
pub struct DesignForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Design page template.
#[derive(Template, WebTemplate)]
#[template(path = "design.html")]
pub struct DesignTemplate {
    pub groups: IngredientGroups,
    pub design: TacoDesign,
    /// Raw ingredient ids from the last submission, for re-checking boxes.
    pub selected: Vec<String>,
    pub errors: ValidationErrors,
}

impl DesignTemplate {
    /// A form over `ingredients` showing `design`.
    #[must_use]
    pub fn new(ingredients: &[Ingredient], design: TacoDesign) -> Self {
        let selected = design
            .ingredients
            .iter()
            .map(|i| i.id.as_str().to_owned())
            .collect();

        Self {
            groups: IngredientGroups::partition(ingredients),
            design,
            selected,
            errors: ValidationErrors::new(),
        }
    }

    /// Whether the box for `ingredient` should be checked.
    #[must_use]
    pub fn is_checked(&self, ingredient: &Ingredient) -> bool {
        self.selected.iter().any(|s| s == ingredient.id.as_str())
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the design form with a blank design.
#[instrument(skip(state))]
pub async fn show_design_form(State(state): State<AppState>) -> Result<DesignTemplate> {
    let ingredients = state.ingredients().find_all().await?;
    Ok(DesignTemplate::new(&ingredients, TacoDesign::default()))
}

/// `POST /design`: JSON bodies create a taco through the API, anything else
/// is a design form submission.
pub async fn submit(
    State(state): State<AppState>,
    orders: OrderSession,
    request: Request,
) -> Response {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if is_json {
        return match axum::Json::<TacoDesign>::from_request(request, &state).await {
            Ok(json) => api::create_taco(State(state), json).await.into_response(),
            Err(rejection) => rejection.into_response(),
        };
    }

    match Form::<DesignForm>::from_request(request, &state).await {
        Ok(Form(form)) => process_design(state, orders, form).await.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Validate a design form submission.
///
/// On failure the form is shown again with the input preserved. On success
/// the design joins the session's order draft.
#[instrument(skip(state, orders, form), fields(name = %form.name))]
pub async fn process_design(
    state: AppState,
    orders: OrderSession,
    form: DesignForm,
) -> Result<Response> {
    let mut errors = ValidationErrors::new();
    let mut ingredients = Vec::with_capacity(form.ingredients.len());

    for raw in &form.ingredients {
        let found = match IngredientId::parse(raw) {
            Ok(id) => state.ingredients().find_by_id(&id).await?,
            Err(_) => None,
        };
        match found {
            Some(ingredient) => ingredients.push(ingredient),
            None => errors.add("ingredients", format!("Unknown ingredient {raw}")),
        }
    }

    let design = TacoDesign::new(form.name.trim(), ingredients);
    if let Err(invalid) = design.validate() {
        for error in invalid.iter() {
            errors.add(error.field.clone(), error.message.clone());
        }
    }

    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "Design rejected");
        let all = state.ingredients().find_all().await?;
        let mut page = DesignTemplate::new(&all, design);
        page.design.name = form.name;
        page.selected = form.ingredients;
        page.errors = errors;
        return Ok(page.into_response());
    }

    tracing::info!(design = ?design, "Processing taco design");
    add_breadcrumb("design", "Taco designed", &[("name", design.name.as_str())]);

    let mut draft = orders.load().await?;
    draft.add_design(design);
    orders.store(&draft).await?;

    Ok(Redirect::to("/orders/current").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use taco_cloud_core::IngredientType;

    use super::*;

    fn ingredient(id: &str, kind: IngredientType) -> Ingredient {
        Ingredient::new(IngredientId::parse(id).unwrap(), format!("Ingredient {id}"), kind)
    }

    fn ids(page: &DesignTemplate, key: &str) -> Vec<String> {
        page.groups
            .get(key)
            .unwrap()
            .ingredients
            .iter()
            .map(|i| i.id.to_string())
            .collect()
    }

    #[test]
    fn test_blank_form_groups_by_type() {
        let ingredients = vec![
            ingredient("1", IngredientType::Wrap),
            ingredient("2", IngredientType::Protein),
            ingredient("3", IngredientType::Wrap),
        ];

        let page = DesignTemplate::new(&ingredients, TacoDesign::default());

        assert_eq!(ids(&page, "wrap"), vec!["1", "3"]);
        assert_eq!(ids(&page, "protein"), vec!["2"]);
        assert!(ids(&page, "veggies").is_empty());
        assert!(ids(&page, "cheese").is_empty());
        assert!(ids(&page, "sauce").is_empty());
        assert_eq!(page.design, TacoDesign::default());
        assert!(page.errors.is_empty());
    }

    #[test]
    fn test_checked_boxes_follow_design() {
        let wrap = ingredient("FLTO", IngredientType::Wrap);
        let beef = ingredient("GRBF", IngredientType::Protein);
        let page = DesignTemplate::new(
            &[wrap.clone(), beef.clone()],
            TacoDesign::new("Carnivore", vec![wrap.clone()]),
        );

        assert!(page.is_checked(&wrap));
        assert!(!page.is_checked(&beef));
    }

    #[test]
    fn test_blank_form_renders_every_group() {
        let page = DesignTemplate::new(&[], TacoDesign::default());
        let html = page.render().unwrap();

        for kind in IngredientType::ALL {
            assert!(html.contains(kind.heading()));
        }
    }
}
