mod wizard;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use lpa_domain::actor::Address;
use lpa_domain::date::DobWarning;
use lpa_domain::matching::NameWarning;
use lpa_domain::routing::{Destination, Page};
use lpa_domain::validation::FieldError;
use lpa_domain::wizard::{FormErrors, StepOutcome};
use serde::Serialize;

use crate::error::ApiError;
use crate::{middleware as app_middleware, observability, state::AppState};

pub fn router(state: AppState) -> Router {
    let lpa = wizard::router()
        .route_layer(middleware::from_fn(
            app_middleware::require_session_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/start", post(start))
        .nest("/lpa/:lpa_id", lpa)
        .layer(middleware::from_fn(app_middleware::metrics_layer))
        .layer(app_middleware::timeout_layer(&state.config))
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::session_middleware,
        ))
        .layer(middleware::from_fn(
            app_middleware::correlation_id_middleware,
        ));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer(&state.config));
    }

    app.with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
    })
}

async fn metrics() -> Response {
    match observability::render_metrics() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Opens a fresh session with an empty LPA and sends the donor to its task
/// list.
async fn start(State(state): State<AppState>) -> Result<Response, ApiError> {
    let session_id = uuid::Uuid::now_v7().simple().to_string();
    let lpa = state.service.load(&session_id).await?;
    let token = app_middleware::issue_session_token(&state.config.session_secret, &session_id)?;
    let cookie = app_middleware::session_cookie(&state.config, &token);
    let location = Destination::page(Page::TaskList).url(&lpa.id);

    tracing::info!(lpa_id = %lpa.id, "session started");
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&location)).into_response())
}

#[derive(Debug, Serialize)]
struct FieldErrorView<'a> {
    field: &'static str,
    code: &'static str,
    #[serde(flatten)]
    error: &'a FieldError,
}

#[derive(Debug, Serialize)]
struct DobWarningView {
    code: &'static str,
    warning: DobWarning,
}

#[derive(Debug, Serialize)]
struct InvalidView<'a> {
    errors: Vec<FieldErrorView<'a>>,
    name_warning: Option<&'a NameWarning>,
    dob_warning: Option<DobWarningView>,
    addresses: &'a [Address],
}

impl<'a> From<&'a FormErrors> for InvalidView<'a> {
    fn from(form: &'a FormErrors) -> Self {
        Self {
            errors: form
                .errors
                .iter()
                .map(|field| FieldErrorView {
                    field: field.name,
                    code: field.error.code(),
                    error: &field.error,
                })
                .collect(),
            name_warning: form.name_warning.as_ref(),
            dob_warning: form.dob_warning.map(|warning| DobWarningView {
                code: warning.code(),
                warning,
            }),
            addresses: &form.addresses,
        }
    }
}

#[derive(Debug, Serialize)]
struct AddressesView {
    addresses: Vec<Address>,
}

/// Renders a POST result: `303` to the next page, `422` with the errors and
/// warnings to show, or `200` with postcode lookup results.
pub(crate) fn step_response(page: Page, lpa_id: &str, outcome: StepOutcome) -> Response {
    match outcome {
        StepOutcome::Redirect(destination) => {
            observability::register_step_outcome(page.path(), "redirect");
            Redirect::to(&destination.url(lpa_id)).into_response()
        }
        StepOutcome::Invalid(form) => {
            observability::register_step_outcome(page.path(), "invalid");
            if form.name_warning.is_some() {
                observability::register_name_warning(page.path());
            }
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(InvalidView::from(&form)),
            )
                .into_response()
        }
        StepOutcome::Addresses { addresses } => {
            observability::register_step_outcome(page.path(), "addresses");
            (StatusCode::OK, Json(AddressesView { addresses })).into_response()
        }
    }
}

pub(crate) fn redirect_to(lpa_id: &str, destination: &Destination) -> Response {
    Redirect::to(&destination.url(lpa_id)).into_response()
}
