use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use lpa_domain::actor::Address;
use lpa_domain::ports::BoxFuture;
use lpa_domain::ports::address::{AddressLookup, LookupError};
use lpa_domain::ports::random::RandomSource;
use lpa_domain::store::InMemoryLpaStore;
use lpa_infra::config::AppConfig;
use serde_json::Value;
use tower::ServiceExt;

use crate::middleware::issue_session_token;
use crate::routes;
use crate::state::AppState;

const SECRET: &str = "test-secret";
const FORM: &str = "application/x-www-form-urlencoded";

fn test_config() -> AppConfig {
    AppConfig {
        app_env: "test".to_string(),
        port: 0,
        log_level: "info".to_string(),
        data_backend: "memory".to_string(),
        redis_url: "redis://127.0.0.1:6379".to_string(),
        redis_key_prefix: "lpa:test".to_string(),
        session_secret: SECRET.to_string(),
        session_cookie: "lpa_session".to_string(),
        os_places_base_url: "http://127.0.0.1:1".to_string(),
        os_places_api_key: String::new(),
        address_lookup_timeout_ms: 1_000,
        app_public_url: "http://localhost:5050".to_string(),
        request_timeout_ms: 5_000,
        rate_limit_per_second: 20,
        rate_limit_burst: 40,
    }
}

struct CountingRandom(AtomicUsize);

impl RandomSource for CountingRandom {
    fn string(&self, length: usize) -> String {
        let n = self.0.fetch_add(1, Ordering::SeqCst);
        format!("{n:0>length$}")
    }
}

struct OnePostcode;

impl AddressLookup for OnePostcode {
    fn lookup_postcode(&self, postcode: &str) -> BoxFuture<'_, Result<Vec<Address>, LookupError>> {
        let postcode = postcode.to_string();
        Box::pin(async move {
            Ok(vec![Address {
                line1: "1 RICHMOND PLACE".to_string(),
                line2: String::new(),
                line3: String::new(),
                town_or_city: "BIRMINGHAM".to_string(),
                postcode,
            }])
        })
    }
}

fn test_app() -> axum::Router {
    let state = AppState::with_parts(
        test_config(),
        Arc::new(InMemoryLpaStore::new()),
        Arc::new(CountingRandom(AtomicUsize::new(1))),
        Arc::new(OnePostcode),
    );
    routes::router(state)
}

/// Runs `POST /start` and returns the session cookie and the LPA id.
async fn start(app: &axum::Router) -> (String, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/start")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_string();
    let location = location(&response);
    let lpa_id = location
        .strip_prefix("/lpa/")
        .and_then(|rest| rest.strip_suffix("/task-list"))
        .expect("task list location")
        .to_string();
    (cookie, lpa_id)
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location")
        .to_string()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(COOKIE, cookie)
        .header(CONTENT_TYPE, FORM)
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_reports_environment() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn wizard_pages_need_a_session() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/lpa/anything/task-list")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = test_app();
    let (_, lpa_id) = start(&app).await;
    let token = issue_session_token("other-secret", "session").expect("token");

    let response = app
        .oneshot(get(
            &format!("/lpa/{lpa_id}/task-list"),
            &format!("lpa_session={token}"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn started_session_shows_its_task_list() {
    let app = test_app();
    let (cookie, lpa_id) = start(&app).await;

    let response = app
        .oneshot(get(&format!("/lpa/{lpa_id}/task-list"), &cookie))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["lpa"]["id"], lpa_id.as_str());
    let tasks = body["tasks"].as_array().expect("tasks");
    assert!(!tasks.is_empty());
    assert_eq!(
        tasks[0]["path"],
        format!("/lpa/{lpa_id}/choose-attorneys").as_str()
    );
}

#[tokio::test]
async fn another_lpa_is_not_found() {
    let app = test_app();
    let (cookie, _) = start(&app).await;

    let response = app
        .oneshot(get("/lpa/someone-else/task-list", &cookie))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_without_an_lpa_is_not_found() {
    let token = issue_session_token(SECRET, "fresh-session").expect("token");

    let response = test_app()
        .oneshot(get(
            "/lpa/guessed-id/choose-attorneys",
            &format!("lpa_session={token}"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_attorney_is_unprocessable() {
    let app = test_app();
    let (cookie, lpa_id) = start(&app).await;

    let response = app
        .oneshot(post_form(
            &format!("/lpa/{lpa_id}/choose-attorneys"),
            &cookie,
            "first-names=&last-name=Smith",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    let errors = body["errors"].as_array().expect("errors");
    assert!(errors.iter().any(|error| error["field"] == "first-names"));
}

#[tokio::test]
async fn answering_no_to_replacements_returns_to_task_list() {
    let app = test_app();
    let (cookie, lpa_id) = start(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            &format!("/lpa/{lpa_id}/do-you-want-replacement-attorneys"),
            &cookie,
            "yes-no=no",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/lpa/{lpa_id}/task-list"));

    let response = app
        .oneshot(get(&format!("/lpa/{lpa_id}/task-list"), &cookie))
        .await
        .expect("response");
    let body = json_body(response).await;
    let replacements = body["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .find(|task| task["section"] == "choose_replacement_attorneys")
        .cloned()
        .expect("replacement task");
    assert_eq!(replacements["state"], "completed");
}

#[tokio::test]
async fn attorney_flow_redirects_to_address_then_summary() {
    let app = test_app();
    let (cookie, lpa_id) = start(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            &format!("/lpa/{lpa_id}/choose-attorneys"),
            &cookie,
            "first-names=John&last-name=Doe&email=john%40example.com\
             &date-of-birth-day=1&date-of-birth-month=2&date-of-birth-year=1980",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let address_page = location(&response);
    assert!(address_page.starts_with(&format!("/lpa/{lpa_id}/choose-attorneys-address?id=")));

    let response = app
        .clone()
        .oneshot(post_form(
            &address_page,
            &cookie,
            "action=lookup&lookup-postcode=B14+7ED",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["addresses"][0]["postcode"], "B14 7ED");

    let response = app
        .clone()
        .oneshot(post_form(
            &address_page,
            &cookie,
            "action=manual&address-line-1=1+RICHMOND+PLACE&address-town=BIRMINGHAM\
             &address-postcode=B14+7ED",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/lpa/{lpa_id}/choose-attorneys-summary")
    );

    let response = app
        .oneshot(get(
            &format!("/lpa/{lpa_id}/choose-attorneys-summary"),
            &cookie,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["lpa"]["attorneys"][0]["first_names"], "John");
}

#[tokio::test]
async fn empty_summary_redirects_to_details() {
    let app = test_app();
    let (cookie, lpa_id) = start(&app).await;

    let response = app
        .oneshot(get(
            &format!("/lpa/{lpa_id}/choose-people-to-notify-summary"),
            &cookie,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/lpa/{lpa_id}/choose-people-to-notify")
    );
}

#[tokio::test]
async fn payment_confirmation_needs_a_payment_id() {
    let app = test_app();
    let (cookie, lpa_id) = start(&app).await;

    let response = app
        .clone()
        .oneshot(get(
            &format!("/lpa/{lpa_id}/payment-confirmation"),
            &cookie,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get(
            &format!("/lpa/{lpa_id}/payment-confirmation?paymentId=pay-123"),
            &cookie,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["payment"]["payment_id"], "pay-123");
    assert_eq!(body["next"], format!("/lpa/{lpa_id}/task-list").as_str());
}
