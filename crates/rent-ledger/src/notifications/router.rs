use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::calendar::BillingPeriod;
use crate::ledger::store::RoomStore;

use super::dispatcher::{DispatchError, NotificationDispatcher};
use super::gateway::{MessageGateway, RecipientDirectory};
use super::scheduler::Scheduler;

/// Shared state behind the engine's trigger surface.
pub struct EngineState<S, D, G> {
    pub dispatcher: Arc<NotificationDispatcher<S, D, G>>,
    pub scheduler: Arc<Scheduler<S, D, G>>,
    /// When set, the run-now endpoint requires `Authorization: Bearer <secret>`.
    pub cron_secret: Option<String>,
}

impl<S, D, G> Clone for EngineState<S, D, G> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            scheduler: self.scheduler.clone(),
            cron_secret: self.cron_secret.clone(),
        }
    }
}

/// Router builder for the on-demand trigger, scheduler control, payment
/// confirmation, and ledger row endpoints.
pub fn engine_router<S, D, G>(state: EngineState<S, D, G>) -> Router
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    Router::new()
        .route("/api/v1/notifications/run", post(run_now_handler::<S, D, G>))
        .route(
            "/api/v1/scheduler",
            get(scheduler_status_handler::<S, D, G>).post(scheduler_action_handler::<S, D, G>),
        )
        .route(
            "/api/v1/rooms/:room_id/payments/confirmation",
            post(confirm_payment_handler::<S, D, G>),
        )
        .route(
            "/api/v1/rooms/:room_id/ledger/:year",
            get(ledger_row_handler::<S, D, G>),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RunRequest {
    /// Gregorian day to evaluate as; defaults to the host clock.
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn run_now_handler<S, D, G>(
    State(state): State<EngineState<S, D, G>>,
    headers: HeaderMap,
    body: Option<Json<RunRequest>>,
) -> Response
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    if let Err(response) = check_cron_secret(&state, &headers) {
        return response;
    }

    let today = body
        .and_then(|Json(request)| request.today)
        .unwrap_or_else(|| Local::now().date_naive());

    let dispatcher = state.dispatcher.clone();
    let outcome = tokio::task::spawn_blocking(move || dispatcher.run_at(today)).await;

    match outcome {
        Ok(Ok(result)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "results": result })),
        )
            .into_response(),
        Ok(Err(err)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn check_cron_secret<S, D, G>(
    state: &EngineState<S, D, G>,
    headers: &HeaderMap,
) -> Result<(), Response> {
    let Some(secret) = state.cron_secret.as_deref() else {
        return Ok(());
    };

    let expected = format!("Bearer {secret}");
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if presented == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "invalid or missing bearer token" })),
        )
            .into_response())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchedulerRequest {
    pub(crate) action: SchedulerAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SchedulerAction {
    Start,
    Stop,
    Status,
}

pub(crate) async fn scheduler_action_handler<S, D, G>(
    State(state): State<EngineState<S, D, G>>,
    Json(request): Json<SchedulerRequest>,
) -> Response
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    let message = match request.action {
        SchedulerAction::Start => {
            if state.scheduler.start() {
                "notification scheduler started"
            } else {
                "notification scheduler already running"
            }
        }
        SchedulerAction::Stop => {
            if state.scheduler.stop() {
                "notification scheduler stopped"
            } else {
                "notification scheduler was not running"
            }
        }
        SchedulerAction::Status => {
            if state.scheduler.is_running() {
                "scheduler is running"
            } else {
                "scheduler is stopped"
            }
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "running": state.scheduler.is_running(),
            "message": message,
        })),
    )
        .into_response()
}

pub(crate) async fn scheduler_status_handler<S, D, G>(
    State(state): State<EngineState<S, D, G>>,
) -> Response
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    let running = state.scheduler.is_running();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "running": running,
            "message": if running { "scheduler is running" } else { "scheduler is stopped" },
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmationRequest {
    pub(crate) year: i32,
    pub(crate) month_index: u8,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn confirm_payment_handler<S, D, G>(
    State(state): State<EngineState<S, D, G>>,
    Path(room_id): Path<String>,
    Json(request): Json<ConfirmationRequest>,
) -> Response
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    let period = match BillingPeriod::new(request.year, request.month_index) {
        Ok(period) => period,
        Err(err) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let dispatcher = state.dispatcher.clone();
    let outcome =
        tokio::task::spawn_blocking(move || dispatcher.confirm_payment_at(&room_id, period, today))
            .await;

    match outcome {
        Ok(Ok(detail)) => (StatusCode::OK, Json(json!({ "success": true, "detail": detail })))
            .into_response(),
        Ok(Err(err)) => dispatch_error_response(err),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LedgerQuery {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn ledger_row_handler<S, D, G>(
    State(state): State<EngineState<S, D, G>>,
    Path((room_id, year)): Path<(String, i32)>,
    Query(query): Query<LedgerQuery>,
) -> Response
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match state.dispatcher.ledger_year(&room_id, year, today) {
        Ok(months) => (
            StatusCode::OK,
            Json(json!({ "room_id": room_id, "year": year, "months": months })),
        )
            .into_response(),
        Err(err) => dispatch_error_response(err),
    }
}

fn dispatch_error_response(err: DispatchError) -> Response {
    let status = match &err {
        DispatchError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        DispatchError::NoTenancy(_) => StatusCode::CONFLICT,
        DispatchError::Calendar(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DispatchError::Gateway(_) => StatusCode::BAD_GATEWAY,
        DispatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
