use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use cara_domain::ChatTurn;
use cara_service::{Error as ServiceError, TurnRequest, TurnResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/chat/turn", post(turn))
		.route("/v1/chat/session/{id}/history", get(history))
		.route("/v1/chat/session/{id}/clear", post(clear))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn turn(
	State(state): State<AppState>,
	Json(payload): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
	let response = state.service.handle_turn(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
	session_id: Uuid,
	turns: Vec<ChatTurn>,
}

async fn history(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
	let Some(transcript) = state.service.transcript(id).await else {
		return Err(ApiError::new(
			StatusCode::NOT_FOUND,
			"unknown_session",
			"No session exists for this identifier.",
		));
	};

	Ok(Json(HistoryResponse { session_id: id, turns: transcript.turns().to_vec() }))
}

/// Clearing is idempotent: removing an unknown session is not an error from
/// the caller's point of view.
async fn clear(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
	let removed = state.service.clear_session(id);

	tracing::debug!(session_id = %id, removed, "Session clear requested.");

	StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

/// Turn-level failures map to stable error codes with non-leaking messages;
/// backend details go to the log only, and the session history is untouched
/// so the caller can retry the same utterance.
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match &err {
			ServiceError::InvalidRequest { message } => {
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message.clone())
			},
			ServiceError::SessionBusy { .. } => Self::new(
				StatusCode::CONFLICT,
				"session_busy",
				"A turn is already in flight for this session.",
			),
			ServiceError::RetrievalUnavailable { .. } => {
				tracing::error!(error = %err, "Retrieval backend failure.");

				Self::new(
					StatusCode::SERVICE_UNAVAILABLE,
					"retrieval_unavailable",
					"The retrieval backend is currently unavailable. Please retry.",
				)
			},
			ServiceError::RewriteFailed { .. } => {
				tracing::error!(error = %err, "Query rewrite failure.");

				Self::new(
					StatusCode::BAD_GATEWAY,
					"rewrite_failed",
					"The assistant could not process the question. Please retry.",
				)
			},
			ServiceError::GenerationFailed { .. } => {
				tracing::error!(error = %err, "Answer generation failure.");

				Self::new(
					StatusCode::BAD_GATEWAY,
					"generation_failed",
					"The assistant could not produce an answer. Please retry.",
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
