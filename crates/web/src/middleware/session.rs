//! Session middleware configuration and the order session extractor.
//!
//! Production stores sessions in `PostgreSQL` via `tower-sessions-sqlx-store`;
//! tests pass a `MemoryStore`.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use taco_cloud_core::OrderDraft;

use crate::error::AppError;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "taco_session";

/// Session expiry time in seconds (30 minutes of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 60;

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `store` - Session store (`PostgresStore` in production)
/// * `secure` - Whether cookies are restricted to HTTPS
#[must_use]
pub fn create_session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The in-progress order held in the session.
///
/// The draft is created empty on first access and lives until the order is
/// placed or the session expires.
pub struct OrderSession(Session);

impl OrderSession {
    /// Wrap a session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// The current draft, created and stored empty if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(&self) -> Result<OrderDraft, tower_sessions::session::Error> {
        if let Some(draft) = self.0.get::<OrderDraft>(session_keys::ORDER).await? {
            return Ok(draft);
        }

        let draft = OrderDraft::default();
        self.store(&draft).await?;
        Ok(draft)
    }

    /// Replace the draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store(&self, draft: &OrderDraft) -> Result<(), tower_sessions::session::Error> {
        self.0.insert(session_keys::ORDER, draft).await
    }

    /// Drop the draft after the order is placed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear(&self) -> Result<(), tower_sessions::session::Error> {
        self.0.remove::<OrderDraft>(session_keys::ORDER).await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for OrderSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))
    }
}
