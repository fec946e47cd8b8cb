use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{AnchorDay, Engine, cycle_start};
use migration::MigratorTrait;
use server::{ServerState, router};

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build();
    router(ServerState::new(engine, chrono_tz::UTC, Duration::hours(1)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

async fn register(app: &Router, username: &str, billing_cycle: u32) -> String {
    let reply = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({
            "username": username,
            "password": "hunter2",
            "salary": "1000",
            "billing_cycle": billing_cycle,
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.json()["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn spends_show_up_in_the_live_view() {
    let app = app().await;
    let token = register(&app, "alice", 8).await;

    for (amount, description) in [("100.50", "groceries"), ("40", "bus pass")] {
        let reply = send(
            &app,
            Method::POST,
            "/add_transaction",
            Some(&token),
            Some(json!({ "amount": amount, "description": description })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    let reply = send(&app, Method::GET, "/", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let view = reply.json();
    assert_eq!(view["budget"]["allocated_minor"], 100_000);
    assert_eq!(view["total_spent_minor"], 14_050);
    assert_eq!(view["remaining_balance_minor"], 85_950);
    assert_eq!(view["transactions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_spends_are_rejected() {
    let app = app().await;
    let token = register(&app, "alice", 8).await;

    let reply = send(
        &app,
        Method::POST,
        "/add_transaction",
        Some(&token),
        Some(json!({ "amount": "-3", "description": "refund" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);

    let reply = send(
        &app,
        Method::POST,
        "/add_transaction",
        Some(&token),
        Some(json!({ "amount": "abc", "description": "coffee" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn protected_routes_need_a_live_session() {
    let app = app().await;
    let reply = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(&app, Method::GET, "/", Some("not-a-token"), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let token = register(&app, "alice", 8).await;
    let reply = send(&app, Method::POST, "/logout", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    let reply = send(&app, Method::GET, "/cycles", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_new_token() {
    let app = app().await;
    register(&app, "alice", 8).await;

    let reply = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "hunter2" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let token = reply.json()["token"].as_str().unwrap().to_string();

    let reply = send(&app, Method::GET, "/cycles", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["budgets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "alice", 8).await;
    let reply = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({
            "username": "alice",
            "password": "other",
            "salary": "5",
            "billing_cycle": 1,
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unfunded_cycle_redirects_to_set_budget() {
    let app = app().await;
    let token = register(&app, "alice", 1).await;

    // Moving the anchor off the 1st leaves the new current cycle unfunded.
    let reply = send(
        &app,
        Method::POST,
        "/update_profile",
        Some(&token),
        Some(json!({ "billing_cycle": 15 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["billing_cycle"], 15);

    let reply = send(&app, Method::GET, "/", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.headers[header::LOCATION], "/set_budget");

    let today = Utc::now().date_naive();
    let expected = cycle_start(today, AnchorDay::new(15).unwrap());
    let reply = send(&app, Method::GET, "/set_budget", Some(&token), None).await;
    assert_eq!(reply.json()["cycle_start"], expected.to_string());

    let reply = send(
        &app,
        Method::POST,
        "/set_budget",
        Some(&token),
        Some(json!({ "salary": "2000" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["cycle_start"], expected.to_string());

    let reply = send(
        &app,
        Method::POST,
        "/set_budget",
        Some(&token),
        Some(json!({ "salary": "2000" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    let reply = send(&app, Method::GET, "/", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_billing_cycle_is_rejected() {
    let app = app().await;
    let token = register(&app, "alice", 8).await;
    let reply = send(
        &app,
        Method::POST,
        "/update_profile",
        Some(&token),
        Some(json!({ "billing_cycle": 32 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn statement_downloads_as_pdf() {
    let app = app().await;
    let token = register(&app, "alice", 8).await;
    send(
        &app,
        Method::POST,
        "/add_transaction",
        Some(&token),
        Some(json!({ "amount": "12.34", "description": "tea" })),
    )
    .await;

    let reply = send(&app, Method::GET, "/download_statement", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/pdf");
    let disposition = reply.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Hakogane_Statement_"));
    assert!(reply.body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn statement_for_an_empty_month_redirects_home() {
    let app = app().await;
    let token = register(&app, "alice", 8).await;

    let reply = send(
        &app,
        Method::GET,
        "/download_statement?year=2001&month=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.headers[header::LOCATION], "/");
    assert_eq!(reply.json()["redirect"], "/");

    let reply = send(
        &app,
        Method::GET,
        "/download_statement?year=2001",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}
