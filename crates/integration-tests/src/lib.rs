//! Integration tests for Taco Cloud.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process server over in-memory stores
//! cargo test -p taco-cloud-integration-tests
//!
//! # Also run the PostgreSQL tests
//! TACO_TEST_DATABASE_URL=postgres://... cargo test -p taco-cloud-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `taco_api` - JSON endpoints under `/design`
//! - `design_form` - The design page and its validation
//! - `order_flow` - Login, design, order, and history
//! - `postgres` - Repositories against a real database (ignored by default)

use std::net::SocketAddr;

use reqwest::{Client, StatusCode, redirect::Policy};
use tower_sessions::MemoryStore;

use taco_cloud_core::{NewUser, User};
use taco_cloud_web::config::OrderConfig;
use taco_cloud_web::db::memory::InMemoryRepositories;
use taco_cloud_web::services::auth::AuthService;
use taco_cloud_web::state::AppState;

/// Password given to every test user.
pub const TEST_PASSWORD: &str = "tacos4ever";

/// A server running in the test's runtime on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    /// The stores behind the server, for seeding and assertions.
    pub repos: InMemoryRepositories,
}

impl TestServer {
    /// Start a server with the classic ingredients and empty stores.
    pub async fn start() -> Self {
        Self::start_with(OrderConfig::default()).await
    }

    /// Start a server with custom order settings.
    pub async fn start_with(orders: OrderConfig) -> Self {
        let repos = InMemoryRepositories::default();
        let state = AppState::new(repos.repositories(), orders);
        let app = taco_cloud_web::app(state, MemoryStore::default(), false);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self { addr, repos }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Create a customer named `username` with [`TEST_PASSWORD`].
    pub async fn create_user(&self, username: &str) -> User {
        AuthService::new(self.repos.users.as_ref())
            .register_with_password(
                NewUser {
                    username: username.to_owned(),
                    full_name: "Sam Rivera".to_owned(),
                    street: "1234 Culinary Blvd.".to_owned(),
                    city: "Plano".to_owned(),
                    state: "TX".to_owned(),
                    zip: "76227".to_owned(),
                    phone_number: "123-123-1234".to_owned(),
                },
                TEST_PASSWORD,
            )
            .await
            .expect("Failed to create test user")
    }

    /// A fresh client with its own session.
    pub async fn logged_in_client(&self, username: &str) -> Client {
        let client = client();
        let resp = client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", TEST_PASSWORD)])
            .send()
            .await
            .expect("Failed to log in");

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        client
    }
}

/// A client that keeps cookies and does not follow redirects.
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect.
pub fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
