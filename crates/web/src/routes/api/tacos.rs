//! Taco API.
//!
//! ```text
//! GET  /design/recent  - Up to 12 most recently created tacos
//! GET  /design/{id}    - One taco, or 404 with an empty body
//! POST /design         - Create a taco (JSON body), 201 with the saved taco
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use taco_cloud_core::types::taco::MAX_NAME_LENGTH;
use taco_cloud_core::{PageRequest, Taco, TacoDesign, TacoId, TacoSort};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Most tacos returned by the recent listing.
pub const RECENT_TACOS_LIMIT: u32 = 12;

/// The most recently created tacos, newest first.
#[instrument(skip(state))]
pub async fn recent_tacos(State(state): State<AppState>) -> Result<Json<Vec<Taco>>> {
    let tacos = state
        .tacos()
        .find_all(PageRequest::first(RECENT_TACOS_LIMIT), TacoSort::NewestFirst)
        .await?;
    Ok(Json(tacos))
}

/// One taco by id.
#[instrument(skip(state))]
pub async fn taco_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    Ok(match state.tacos().find_by_id(TacoId::new(id)).await? {
        Some(taco) => Json(taco).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

/// Save a posted design as a new taco.
///
/// Only the name width is checked; a design without ingredients is accepted.
#[instrument(skip(state, design), fields(name = %design.name))]
pub async fn create_taco(
    State(state): State<AppState>,
    Json(design): Json<TacoDesign>,
) -> Result<(StatusCode, Json<Taco>)> {
    if design.name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    let taco = state.tacos().save(design).await?;
    tracing::info!(taco_id = %taco.id, "Created taco");
    Ok((StatusCode::CREATED, Json(taco)))
}
