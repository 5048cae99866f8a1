use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::auth::AuthError;
use super::domain::{ChildrenDisclosure, DocumentKind, SessionId, StagedFile};
use super::repository::{ApplicationRepository, BrokerGateway, NotificationLog, RepositoryError};
use super::service::{IntakeService, IntakeServiceError};
use super::session::SessionError;

const NOTIFICATION_FEED_LIMIT: usize = 20;

/// Router builder exposing the wizard actions and the dashboard reads.
pub fn intake_router<R, N, B>(service: Arc<IntakeService<R, N, B>>) -> Router
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    Router::new()
        .route("/api/v1/intake/sessions", post(open_handler::<R, N, B>))
        .route(
            "/api/v1/intake/sessions/:session_id",
            get(state_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/verify",
            post(verify_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/application",
            post(begin_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/advance",
            post(advance_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/back",
            post(back_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/documents",
            post(stage_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/disclosure",
            put(disclosure_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/details",
            put(details_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/submit",
            post(submit_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/support",
            post(support_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/applications",
            get(history_handler::<R, N, B>),
        )
        .route("/api/v1/intake/documents", get(archive_handler::<R, N, B>))
        .route(
            "/api/v1/intake/notifications",
            get(notifications_handler::<R, N, B>),
        )
        .route(
            "/api/v1/intake/support",
            get(support_contact_handler::<R, N, B>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenSessionRequest {
    pub(crate) phone: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyRequest {
    pub(crate) code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StageRequest {
    pub(crate) kind: DocumentKind,
    pub(crate) files: Vec<StagedFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisclosureRequest {
    pub(crate) disclosure: ChildrenDisclosure,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsRequest {
    pub(crate) inn: String,
    pub(crate) email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SupportMessageRequest {
    pub(crate) message: String,
}

pub(crate) async fn open_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    axum::Json(request): axum::Json<OpenSessionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.open_session(&request.phone) {
        Ok(opened) => (StatusCode::CREATED, axum::Json(opened)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn state_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.wizard_state(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verify_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<VerifyRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.verify_code(&SessionId(session_id), &request.code) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "authenticated": true })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn begin_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.begin_application(&SessionId(session_id)) {
        Ok(step) => step_response(step),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn advance_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.advance(&SessionId(session_id)) {
        Ok(step) => step_response(step),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn back_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.retreat(&SessionId(session_id)) {
        Ok(step) => step_response(step),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stage_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<StageRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.stage_documents(&SessionId(session_id), request.kind, request.files) {
        Ok(staged) => {
            let message = format!(
                "{} photos staged ({} file(s))",
                staged.kind.label(),
                staged.file_count
            );
            (
                StatusCode::OK,
                axum::Json(json!({
                    "kind": staged.kind,
                    "file_count": staged.file_count,
                    "message": message,
                })),
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn disclosure_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<DisclosureRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.choose_disclosure(&SessionId(session_id), request.disclosure) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "disclosure": request.disclosure })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn details_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<DetailsRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.set_details(&SessionId(session_id), &request.inn, &request.email) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.submit(&SessionId(session_id), Utc::now()) {
        Ok(application) => {
            let view = application.history_entry();
            (
                StatusCode::ACCEPTED,
                axum::Json(json!({
                    "application": view,
                    "message": "Documents sent to the broker; application accepted for processing",
                })),
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn support_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SupportMessageRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.support_request(&SessionId(session_id), &request.message) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            axum::Json(json!({ "message": "Message sent to the support desk" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.history() {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn archive_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.archive() {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn notifications_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    match service.notifications(NOTIFICATION_FEED_LIMIT) {
        Ok(feed) => (StatusCode::OK, axum::Json(feed)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn support_contact_handler<R, N, B>(
    State(service): State<Arc<IntakeService<R, N, B>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    (
        StatusCode::OK,
        axum::Json(service.support_contact().clone()),
    )
        .into_response()
}

fn step_response(step: super::session::WizardStep) -> Response {
    (
        StatusCode::OK,
        axum::Json(json!({ "step": step, "step_index": step.index() })),
    )
        .into_response()
}

/// Status a service error maps to on the wire. Validation rejections are
/// 422, auth failures 401, unknown handles 404, adapter failures 500.
pub(crate) fn status_for(error: &IntakeServiceError) -> StatusCode {
    match error {
        IntakeServiceError::Session(SessionError::Auth(AuthError::CodeMismatch))
        | IntakeServiceError::Session(SessionError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
        IntakeServiceError::Session(_) | IntakeServiceError::EmptySupportMessage => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        IntakeServiceError::UnknownSession => StatusCode::NOT_FOUND,
        IntakeServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        IntakeServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        IntakeServiceError::Repository(_)
        | IntakeServiceError::Notification(_)
        | IntakeServiceError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: IntakeServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
