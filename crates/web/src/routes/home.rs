//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Logged-in username, if any.
    pub username: Option<String>,
}

/// Display the home page.
pub async fn home(session: Session) -> impl IntoResponse {
    let username = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .map(|user| user.username);

    HomeTemplate { username }
}
