//! HTTP request handlers

use std::convert::Infallible;
use std::sync::Arc;

use async_stream::stream;
use axum::extract::{FromRequest, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::models::{
    completion_id, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
    ErrorResponse, HealthResponse, ModelInfo, ModelListResponse,
};
use crate::backend::{WebhookChatRequest, WebhookItemStream};
use crate::error::AppError;
use crate::AppState;

/// `Json` extractor that renders its rejection as this API's error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create a chat completion
///
/// Forwards the latest message to the model's backend webhook and translates
/// the item stream back, either aggregated into one completion object or as
/// a server-sent-event chunk stream. The webhook call happens before any
/// response byte is written, so connection-stage failures surface as plain
/// HTTP errors in both modes.
#[utoipa::path(
    post,
    path = "/v1/chat/completions",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Aggregated completion, or SSE chunk stream when `stream` is set", body = ChatCompletionResponse),
        (status = 400, description = "Malformed request body, empty messages, or unknown model", body = ErrorResponse),
        (status = 502, description = "Backend webhook failed or sent an undecodable response", body = ErrorResponse),
        (status = 504, description = "Backend webhook timed out", body = ErrorResponse),
    ),
    tag = "Chat"
)]
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ChatCompletionRequest>,
) -> Result<Response, AppError> {
    info!(
        model = %request.model,
        stream = request.is_stream(),
        "Received chat completion request"
    );

    let url = state
        .registry
        .resolve(&request.model)
        .ok_or_else(|| AppError::ModelNotFound(request.model.clone()))?
        .to_string();

    let chat_input = request
        .latest_input()
        .ok_or_else(|| {
            AppError::InvalidRequest(
                "messages must contain at least one message with content".to_string(),
            )
        })?
        .to_string();

    let payload = WebhookChatRequest::send_message(request.session_id(), chat_input);
    let items = state.webhook.send_chat(&url, &payload).await?;

    if request.is_stream() {
        Ok(stream_chunks(items, request.model).into_response())
    } else {
        let response = aggregate_items(items, request.model).await?;
        Ok(Json(response).into_response())
    }
}

/// Collect the full backend item stream into one completion object.
async fn aggregate_items(
    mut items: WebhookItemStream,
    model: String,
) -> Result<ChatCompletionResponse, AppError> {
    let mut content = String::new();
    while let Some(item) = items.next().await {
        content.push_str(&item?.content);
    }

    info!(chars = content.len(), "Chat completion aggregated");
    Ok(ChatCompletionResponse::assistant(model, content))
}

/// Frame the backend item stream as OpenAI completion chunks over SSE.
///
/// The sequence is one role chunk, one content chunk per item, one finish
/// chunk. Once the first frame is out the HTTP status is already sent; a
/// failure after that terminates the stream with an `error` event instead
/// of a finish chunk.
fn stream_chunks(
    mut items: WebhookItemStream,
    model: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let id = completion_id();
    let created = Utc::now().timestamp();

    let events = stream! {
        yield sse_event(&ChatCompletionChunk::role_chunk(&id, created, &model));

        let mut sent = 0usize;
        loop {
            match items.next().await {
                Some(Ok(item)) => {
                    sent += 1;
                    yield sse_event(&ChatCompletionChunk::content_chunk(
                        &id,
                        created,
                        &model,
                        item.content,
                    ));
                }
                Some(Err(err)) => {
                    warn!(error = %err, "Backend stream failed mid-completion");
                    yield error_event(&err);
                    return;
                }
                None => break,
            }
        }

        info!(chunks = sent, "Chat completion streamed");
        yield sse_event(&ChatCompletionChunk::finish_chunk(&id, created, &model));
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Serialize a chunk into one `data:` frame.
fn sse_event<T: Serialize>(payload: &T) -> Result<Event, Infallible> {
    let data = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().data(data))
}

/// Terminal frame reporting a mid-stream failure.
fn error_event(err: &AppError) -> Result<Event, Infallible> {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    let data = serde_json::to_string(&body).unwrap_or_else(|_| "{}".to_string());
    Ok(Event::default().event("error").data(data))
}

/// List available models
#[utoipa::path(
    get,
    path = "/v1/models",
    responses(
        (status = 200, description = "All configured models", body = ModelListResponse),
    ),
    tag = "Models"
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelListResponse> {
    let created = state.registry.created_at();
    let data = state
        .registry
        .names()
        .into_iter()
        .map(|id| ModelInfo {
            id,
            object: "model".to_string(),
            created,
        })
        .collect();

    Json(ModelListResponse {
        object: "list".to_string(),
        data,
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Gateway is serving", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models: state.registry.len(),
    })
}
