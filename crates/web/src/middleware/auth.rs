//! Authentication middleware and extractors.
//!
//! Provides the extractor that resolves the logged-in user for user-scoped
//! route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::ACCEPT, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use taco_cloud_core::User;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// Loads the session's user from the user store. If nobody is logged in,
/// HTML requests are redirected to the login page and JSON requests get a
/// `401`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.full_name)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The session or user store failed.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let not_logged_in = || {
            if wants_json(parts) {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| {
                AuthRejection::Failed(AppError::Internal("session layer missing".to_owned()))
            })?;

        let current: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .map_err(|e| AuthRejection::Failed(e.into()))?
            .ok_or_else(not_logged_in)?;

        let user = state
            .users()
            .find_by_id(current.id)
            .await
            .map_err(|e| AuthRejection::Failed(e.into()))?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                // The account was removed while the session was alive
                tracing::warn!(user_id = %current.id, "Session refers to unknown user");
                if let Err(e) = session
                    .remove::<CurrentUser>(session_keys::CURRENT_USER)
                    .await
                {
                    tracing::warn!("Failed to clear stale session user: {}", e);
                }
                Err(not_logged_in())
            }
        }
    }
}

/// Whether the client asked for JSON.
fn wants_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

/// Helper to set the current user in the session.
///
/// The session id is cycled first so a pre-login session id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
