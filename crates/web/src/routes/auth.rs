//! Authentication route handlers.
//!
//! Handles username/password login and logout. Accounts are created with
//! `tc-cli user create`; there is no registration page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_session, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Human-readable text for a login error code.
fn login_error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid username or password.",
        "session" => "Your session could not be saved. Please try again.",
        _ => "Login failed. Please try again.",
    }
    .to_owned()
}

/// Human-readable text for a login success code.
fn login_success_message(code: &str) -> Option<String> {
    match code {
        "logout" => Some("You have been logged out.".to_owned()),
        _ => None,
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(login_error_message),
        success: query.success.as_deref().and_then(login_success_message),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.users());

    match auth.login_with_password(&form.username, &form.password).await {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                username: user.username.clone(),
            };

            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }

            set_sentry_user(&user.id, &user.username);
            tracing::info!(user_id = %user.id, "User logged in");
            Redirect::to("/").into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            Redirect::to("/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            crate::error::AppError::from(e).into_response()
        }
    }
}

/// Handle logout.
///
/// Destroys the whole session, including any in-progress order.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_session(&session).await {
        tracing::error!("Failed to flush session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/login?success=logout").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_messages() {
        assert_eq!(
            login_error_message("credentials"),
            "Invalid username or password."
        );
        assert_eq!(
            login_error_message("whatever"),
            "Login failed. Please try again."
        );
        assert!(login_success_message("logout").is_some());
        assert!(login_success_message("other").is_none());
    }
}
