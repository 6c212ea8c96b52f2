//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Home page
//! GET  /health            - Liveness check
//! GET  /health/ready      - Readiness check
//!
//! # Design (CORS: any origin)
//! GET  /design            - Design form, ingredients grouped by type
//! POST /design            - Form: add design to order; JSON: create taco (201)
//! GET  /design/recent     - Up to 12 most recent tacos (JSON)
//! GET  /design/{id}       - One taco (JSON) or 404
//!
//! # Orders (requires auth)
//! GET  /orders/current    - Order form, delivery defaults from the user
//! POST /orders            - Place the order
//! GET  /orders            - Past orders, newest first
//!
//! # Auth
//! GET  /login             - Login page
//! POST /login             - Login action
//! POST /logout            - Logout action
//! ```

pub mod api;
pub mod auth;
pub mod design;
pub mod health;
pub mod home;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Create the design and taco API routes router.
pub fn design_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(design::show_design_form).post(design::submit))
        .route("/recent", get(api::recent_tacos))
        .route("/{id}", get(api::taco_by_id))
        .layer(CorsLayer::permissive())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(orders::orders_for_user).post(orders::process_order),
        )
        .route("/current", get(orders::order_form))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/design", design_routes())
        .nest("/orders", order_routes())
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use chrono::{Duration, TimeZone, Utc};
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use taco_cloud_core::{NewUser, Taco, TacoDesign, TacoId};

    use crate::config::OrderConfig;
    use crate::db::UserRepository;
    use crate::db::memory::InMemoryRepositories;
    use crate::services::auth::AuthService;
    use crate::state::AppState;

    const FORM: &str = "application/x-www-form-urlencoded";

    struct TestApp {
        router: Router,
        repos: InMemoryRepositories,
        cookie: Option<String>,
    }

    impl TestApp {
        fn new() -> Self {
            let repos = InMemoryRepositories::default();
            let state = AppState::new(repos.repositories(), OrderConfig::default());
            Self {
                router: crate::app(state, MemoryStore::default(), false),
                repos,
                cookie: None,
            }
        }

        async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
            let builder = match &self.cookie {
                Some(cookie) => builder.header(header::COOKIE, cookie),
                None => builder,
            };
            let response = self
                .router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();

            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_owned());
            }
            response
        }

        async fn get(&mut self, uri: &str) -> Response {
            self.send(Request::get(uri), Body::empty()).await
        }

        async fn post_form(&mut self, uri: &str, body: &str) -> Response {
            self.send(
                Request::post(uri).header(header::CONTENT_TYPE, FORM),
                Body::from(body.to_owned()),
            )
            .await
        }

        async fn login(&mut self) {
            AuthService::new(self.repos.users.as_ref())
                .register_with_password(
                    NewUser {
                        username: "sam".to_owned(),
                        full_name: "Sam Rivera".to_owned(),
                        street: "1234 Culinary Blvd.".to_owned(),
                        city: "Plano".to_owned(),
                        state: "TX".to_owned(),
                        zip: "76227".to_owned(),
                        phone_number: "123-123-1234".to_owned(),
                    },
                    "password123",
                )
                .await
                .unwrap();

            let response = self
                .post_form("/login", "username=sam&password=password123")
                .await;
            assert_eq!(location(&response), "/");
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let mut app = TestApp::new();

        let response = app.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");

        assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_recent_tacos_newest_first_capped_at_twelve() {
        let mut app = TestApp::new();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        for i in 1..=15 {
            app.repos
                .tacos
                .insert(Taco::from_design(
                    TacoId::new(i),
                    start + Duration::minutes(i),
                    TacoDesign::new(format!("Taco number {i}"), Vec::new()),
                ))
                .await;
        }

        let response = app.get("/design/recent").await;
        assert_eq!(response.status(), StatusCode::OK);

        let tacos: Vec<serde_json::Value> =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(tacos.len(), 12);
        assert_eq!(tacos[0]["id"], 15);
        assert_eq!(tacos[11]["id"], 4);
    }

    #[tokio::test]
    async fn test_unknown_taco_is_404_with_empty_body() {
        let mut app = TestApp::new();

        let response = app.get("/design/999").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_json_post_creates_taco() {
        let mut app = TestApp::new();
        let body = serde_json::json!({
            "name": "Carnivore",
            "ingredients": [
                {"id": "FLTO", "name": "Flour Tortilla", "type": "WRAP"},
                {"id": "GRBF", "name": "Ground Beef", "type": "PROTEIN"},
            ],
        });

        let response = app
            .send(
                Request::post("/design").header(header::CONTENT_TYPE, "application/json"),
                Body::from(body.to_string()),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(created["name"], "Carnivore");
        assert_eq!(created["ingredients"][1]["id"], "GRBF");
        assert_eq!(app.repos.tacos.len().await, 1);

        let fetched = app.get(&format!("/design/{}", created["id"])).await;
        assert_eq!(fetched.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_design_page_lists_ingredients() {
        let mut app = TestApp::new();

        let response = app.get("/design").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Flour Tortilla"));
        assert!(html.contains("Sour Cream"));
        assert!(html.contains("Designate your wrap:"));
    }

    #[tokio::test]
    async fn test_invalid_design_renders_errors_and_saves_nothing() {
        let mut app = TestApp::new();

        let response = app.post_form("/design", "name=Taco").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Name must be at least 5 characters long"));
        assert!(html.contains("You must choose at least 1 ingredient"));
        assert!(html.contains("value=\"Taco\""));
        assert!(app.repos.tacos.is_empty().await);
    }

    #[tokio::test]
    async fn test_overlong_design_name_renders_error() {
        let mut app = TestApp::new();
        let name = "x".repeat(60);

        let response = app
            .post_form("/design", &format!("name={name}&ingredients=FLTO"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            body_text(response)
                .await
                .contains("Name must be at most 50 characters long")
        );

        // Nothing reached the draft
        app.login().await;
        let html = body_text(app.get("/orders/current").await).await;
        assert!(!html.contains(&name));
    }

    #[tokio::test]
    async fn test_json_post_rejects_overlong_name() {
        let mut app = TestApp::new();
        let body = serde_json::json!({ "name": "x".repeat(60) });

        let response = app
            .send(
                Request::post("/design").header(header::CONTENT_TYPE, "application/json"),
                Body::from(body.to_string()),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.repos.tacos.is_empty().await);
    }

    #[tokio::test]
    async fn test_valid_design_redirects_to_current_order() {
        let mut app = TestApp::new();

        let response = app
            .post_form("/design", "name=Carnivore&ingredients=FLTO&ingredients=GRBF")
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders/current");
        assert!(app.repos.tacos.is_empty().await);
    }

    #[tokio::test]
    async fn test_orders_require_login() {
        let mut app = TestApp::new();

        let response = app.get("/orders/current").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = app
            .send(
                Request::get("/orders").header(header::ACCEPT, "application/json"),
                Body::empty(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_password_redirects_with_error() {
        let mut app = TestApp::new();

        let response = app.post_form("/login", "username=nobody&password=whatever1").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?error=credentials");
    }

    #[tokio::test]
    async fn test_order_flow() {
        let mut app = TestApp::new();
        app.login().await;

        let response = app
            .post_form("/design", "name=Carnivore&ingredients=FLTO&ingredients=GRBF")
            .await;
        assert_eq!(location(&response), "/orders/current");

        let html = body_text(app.get("/orders/current").await).await;
        assert!(html.contains("Carnivore"));
        assert!(html.contains("value=\"Sam Rivera\""));

        // Missing payment details: nothing saved, draft kept
        let response = app
            .post_form(
                "/orders",
                "deliveryName=Sam+Rivera&deliveryStreet=1234+Culinary+Blvd.\
                 &deliveryCity=Plano&deliveryState=TX&deliveryZip=76227",
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Not a valid credit card number"));
        assert!(app.repos.orders.all().await.is_empty());

        let response = app
            .post_form(
                "/orders",
                "deliveryName=Sam+Rivera&deliveryStreet=1234+Culinary+Blvd.\
                 &deliveryCity=Plano&deliveryState=TX&deliveryZip=76227\
                 &ccNumber=4111111111111111&ccExpiration=10%2F29&ccCVV=123",
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let placed = app.repos.orders.all().await;
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].tacos.len(), 1);
        assert_eq!(placed[0].tacos[0].name, "Carnivore");
        assert_eq!(app.repos.tacos.len().await, 1);

        // The draft is gone
        let html = body_text(app.get("/orders/current").await).await;
        assert!(!html.contains("Carnivore"));

        let html = body_text(app.get("/orders").await).await;
        assert!(html.contains("Carnivore"));
        assert!(html.contains("**** 1111"));
    }

    #[tokio::test]
    async fn test_overlong_delivery_street_keeps_draft() {
        let mut app = TestApp::new();
        app.login().await;
        app.post_form("/design", "name=Carnivore&ingredients=FLTO").await;

        let response = app
            .post_form(
                "/orders",
                &format!(
                    "deliveryName=Sam+Rivera&deliveryStreet={}\
                     &deliveryCity=Plano&deliveryState=TX&deliveryZip=76227\
                     &ccNumber=4111111111111111&ccExpiration=10%2F29&ccCVV=123",
                    "x".repeat(120)
                ),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            body_text(response)
                .await
                .contains("Street must be at most 100 characters")
        );
        assert!(app.repos.orders.all().await.is_empty());
        assert!(app.repos.tacos.is_empty().await);

        // Fixing the street places the order
        let response = app
            .post_form(
                "/orders",
                "deliveryName=Sam+Rivera&deliveryStreet=1234+Culinary+Blvd.\
                 &deliveryCity=Plano&deliveryState=TX&deliveryZip=76227\
                 &ccNumber=4111111111111111&ccExpiration=10%2F29&ccCVV=123",
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(app.repos.orders.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_session_for_removed_user_is_cleared() {
        let mut app = TestApp::new();
        app.login().await;
        let user = app
            .repos
            .users
            .find_by_username("sam")
            .await
            .unwrap()
            .unwrap();
        app.repos.users.remove(user.id).await;

        let response = app.get("/orders").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = app
            .send(
                Request::get("/orders").header(header::ACCEPT, "application/json"),
                Body::empty(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_drops_session() {
        let mut app = TestApp::new();
        app.login().await;
        assert_eq!(app.get("/orders").await.status(), StatusCode::OK);

        let response = app.send(Request::post("/logout"), Body::empty()).await;
        assert_eq!(location(&response), "/login?success=logout");

        assert_eq!(app.get("/orders").await.status(), StatusCode::SEE_OTHER);
    }
}
