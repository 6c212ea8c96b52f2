//! Integration tests for the order flow: login, design, order, history.

use reqwest::{Client, StatusCode};

use taco_cloud_integration_tests::{TestServer, client, location};
use taco_cloud_web::config::OrderConfig;

const DELIVERY: [(&str, &str); 5] = [
    ("deliveryName", "Sam Rivera"),
    ("deliveryStreet", "1234 Culinary Blvd."),
    ("deliveryCity", "Plano"),
    ("deliveryState", "TX"),
    ("deliveryZip", "76227"),
];

const PAYMENT: [(&str, &str); 3] = [
    ("ccNumber", "4111111111111111"),
    ("ccExpiration", "10/29"),
    ("ccCVV", "123"),
];

async fn design(server: &TestServer, http: &Client, name: &str) {
    let resp = http
        .post(server.url("/design"))
        .form(&[("name", name), ("ingredients", "FLTO"), ("ingredients", "GRBF")])
        .send()
        .await
        .expect("Failed to submit design");
    assert_eq!(location(&resp), "/orders/current");
}

async fn place_order(server: &TestServer, http: &Client) -> reqwest::Response {
    let form: Vec<(&str, &str)> = DELIVERY.iter().chain(PAYMENT.iter()).copied().collect();
    http.post(server.url("/orders"))
        .form(&form)
        .send()
        .await
        .expect("Failed to submit order")
}

async fn page(server: &TestServer, http: &Client, path: &str) -> String {
    http.get(server.url(path))
        .send()
        .await
        .expect("Failed to get page")
        .text()
        .await
        .expect("Failed to read body")
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_order_pages_require_login() {
    let server = TestServer::start().await;
    let http = client();

    for path in ["/orders/current", "/orders"] {
        let resp = http.get(server.url(path)).send().await.expect("request");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/login");
    }

    let resp = http
        .get(server.url("/orders"))
        .header("Accept", "application/json")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password() {
    let server = TestServer::start().await;
    server.create_user("sam").await;

    let resp = client()
        .post(server.url("/login"))
        .form(&[("username", "sam"), ("password", "not-the-password")])
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(location(&resp), "/login?error=credentials");
}

// ============================================================================
// Placing Orders
// ============================================================================

#[tokio::test]
async fn test_order_form_prefills_delivery_from_profile() {
    let server = TestServer::start().await;
    server.create_user("sam").await;
    let http = server.logged_in_client("sam").await;
    design(&server, &http, "Carnivore").await;

    let html = page(&server, &http, "/orders/current").await;

    assert!(html.contains("Carnivore"));
    assert!(html.contains(r#"value="Sam Rivera""#));
    assert!(html.contains(r#"value="1234 Culinary Blvd.""#));
    assert!(html.contains(r#"value="76227""#));
}

#[tokio::test]
async fn test_failed_order_keeps_draft() {
    let server = TestServer::start().await;
    server.create_user("sam").await;
    let http = server.logged_in_client("sam").await;
    design(&server, &http, "Carnivore").await;

    let resp = http
        .post(server.url("/orders"))
        .form(&[
            ("deliveryName", "Sam Rivera"),
            ("deliveryStreet", "1234 Culinary Blvd."),
            ("deliveryCity", "Plano"),
            ("deliveryState", "TX"),
            ("deliveryZip", "76227"),
            ("ccNumber", "1234567890123456"),
            ("ccExpiration", "13/29"),
            ("ccCVV", "12"),
        ])
        .send()
        .await
        .expect("Failed to submit order");

    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.expect("Failed to read body");
    assert!(html.contains("Not a valid credit card number"));
    assert!(html.contains("Must be formatted MM/YY"));
    assert!(html.contains("Invalid CVV"));
    assert!(server.repos.orders.all().await.is_empty());
    assert!(server.repos.tacos.is_empty().await);

    // The draft still holds the taco and the corrected order succeeds
    let html = page(&server, &http, "/orders/current").await;
    assert!(html.contains("Carnivore"));
    assert_eq!(place_order(&server, &http).await.status(), StatusCode::SEE_OTHER);
    assert_eq!(server.repos.orders.all().await.len(), 1);
}

#[tokio::test]
async fn test_successful_order_persists_once_and_clears_draft() {
    let server = TestServer::start().await;
    let user = server.create_user("sam").await;
    let http = server.logged_in_client("sam").await;
    design(&server, &http, "Carnivore").await;
    design(&server, &http, "Breakfast Taco").await;

    let resp = place_order(&server, &http).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let orders = server.repos.orders.all().await;
    assert_eq!(orders.len(), 1);
    let order = orders.first().expect("one order");
    assert_eq!(order.user_id, user.id);
    assert_eq!(order.delivery.city, "Plano");
    let names: Vec<&str> = order.tacos.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Carnivore", "Breakfast Taco"]);
    assert_eq!(server.repos.tacos.len().await, 2);

    let html = page(&server, &http, "/orders/current").await;
    assert!(!html.contains("Carnivore"));
    assert!(html.contains("No tacos yet"));
}

// ============================================================================
// Order History
// ============================================================================

#[tokio::test]
async fn test_order_history_is_per_user_and_paged() {
    let server = TestServer::start_with(OrderConfig { page_size: 2 }).await;
    server.create_user("sam").await;
    server.create_user("alex").await;

    let sam = server.logged_in_client("sam").await;
    for name in ["First Taco", "Second Taco", "Third Taco"] {
        design(&server, &sam, name).await;
        assert_eq!(place_order(&server, &sam).await.status(), StatusCode::SEE_OTHER);
    }

    let first_page = page(&server, &sam, "/orders").await;
    assert!(first_page.contains("3 orders in total."));
    assert!(first_page.contains("Third Taco"));
    assert!(first_page.contains("Second Taco"));
    assert!(!first_page.contains("First Taco"));
    assert!(first_page.contains("/orders?page=1"));
    assert!(first_page.find("Third Taco") < first_page.find("Second Taco"));

    let second_page = page(&server, &sam, "/orders?page=1").await;
    assert!(second_page.contains("First Taco"));
    assert!(!second_page.contains("Third Taco"));
    assert!(second_page.contains("**** 1111"));

    let alex = server.logged_in_client("alex").await;
    let other = page(&server, &alex, "/orders").await;
    assert!(other.contains("You haven't placed any orders yet."));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::start().await;
    server.create_user("sam").await;
    let http = server.logged_in_client("sam").await;

    let resp = http
        .post(server.url("/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(location(&resp), "/login?success=logout");

    let resp = http
        .get(server.url("/orders"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let html = page(&server, &http, "/login?success=logout").await;
    assert!(html.contains("You have been logged out."));
}
