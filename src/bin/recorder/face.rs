use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use browser_steps::{CommandOutcome, RecorderError, Snapshot, Step, StepCommand, StepId};
use serde_json::json;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::types::{Command, FinishPayload, FinishResponse, LabelPayload, SessionInfo};

#[derive(Clone)]
pub struct AppState {
    pub cmd_tx: mpsc::Sender<Command>,
    pub steps: watch::Receiver<Snapshot>,
    pub recipe_dir: PathBuf,
}

pub enum ApiError {
    Recorder(RecorderError),
    /// The session loop is gone.
    Unavailable,
}

impl From<RecorderError> for ApiError {
    fn from(err: RecorderError) -> Self {
        ApiError::Recorder(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Recorder(err @ RecorderError::NoActiveSession) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            ApiError::Recorder(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "recording session loop is not running".to_string(),
            ),
        };
        warn!(%status, %message, "request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", get(session_status).post(start_session).delete(discard_session))
        .route("/session/finish", post(finish_session))
        .route("/steps", get(list_steps).post(apply_command))
        .route("/steps/{id}", delete(delete_step))
        .route("/steps/{id}/label", put(relabel_step))
        .route("/events", get(sse_handler))
        .with_state(Arc::new(state))
}

/// Bind the first free port in `port..port + 10`.
pub async fn bind(host: &str, port: u16) -> anyhow::Result<tokio::net::TcpListener> {
    let last = port.saturating_add(9);
    for p in port..=last {
        match tokio::net::TcpListener::bind((host, p)).await {
            Ok(listener) => return Ok(listener),
            Err(err) => debug!(port = p, error = %err, "port unavailable"),
        }
    }
    anyhow::bail!("could not bind recorder web server: no free port in {port}-{last}")
}

/// Round-trip one command through the session loop.
async fn ask<T>(
    state: &AppState,
    make: impl FnOnce(oneshot::Sender<T>) -> Command,
) -> ApiResult<T> {
    let (reply, rx) = oneshot::channel();
    state
        .cmd_tx
        .send(make(reply))
        .await
        .map_err(|_| ApiError::Unavailable)?;
    rx.await.map_err(|_| ApiError::Unavailable)
}

async fn session_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<SessionInfo>> {
    let info = ask(&state, |reply| Command::Status { reply }).await?;
    Ok(Json(info))
}

async fn start_session(State(state): State<Arc<AppState>>) -> ApiResult<Json<SessionInfo>> {
    let info = ask(&state, |reply| Command::Start { reply }).await?;
    info!(session_id = ?info.session_id, "[Web] session started");
    Ok(Json(info))
}

async fn discard_session(State(state): State<Arc<AppState>>) -> ApiResult<Json<SessionInfo>> {
    let info = ask(&state, |reply| Command::Discard { reply }).await?;
    Ok(Json(info))
}

async fn finish_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FinishPayload>,
) -> ApiResult<Json<FinishResponse>> {
    let (recipe, path) = ask(&state, |reply| Command::Finish {
        name: payload.name,
        recipe_dir: state.recipe_dir.clone(),
        reply,
    })
    .await??;

    info!(path = %path.display(), steps = recipe.steps.len(), "[Web] recipe saved");
    Ok(Json(FinishResponse { path, recipe }))
}

async fn list_steps(State(state): State<Arc<AppState>>) -> Json<Vec<Step>> {
    let steps = state.steps.borrow().clone();
    Json(steps.as_ref().clone())
}

async fn apply_command(
    State(state): State<Arc<AppState>>,
    Json(command): Json<StepCommand>,
) -> ApiResult<Json<CommandOutcome>> {
    let outcome = ask(&state, |reply| Command::Apply { command, reply }).await??;
    Ok(Json(outcome))
}

async fn delete_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<StepId>,
) -> ApiResult<Json<CommandOutcome>> {
    let command = StepCommand::Delete { id };
    let outcome = ask(&state, |reply| Command::Apply { command, reply }).await??;
    Ok(Json(outcome))
}

async fn relabel_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<StepId>,
    Json(payload): Json<LabelPayload>,
) -> ApiResult<Json<CommandOutcome>> {
    let command = StepCommand::Relabel {
        id,
        label: payload.label,
    };
    let outcome = ask(&state, |reply| Command::Apply { command, reply }).await??;
    Ok(Json(outcome))
}

/// Streams the current sequence, then every new snapshot, as `steps` events.
async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.steps.clone()).filter_map(|steps: Snapshot| {
        match Event::default().event("steps").json_data(steps.as_ref()) {
            Ok(event) => Some(Ok::<_, Infallible>(event)),
            Err(err) => {
                warn!(error = %err, "could not encode snapshot");
                None
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
