//! HTTP route definitions

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::api::models::{
    AssistantMessage, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
    ChatMessage, ChunkChoice, ChunkDelta, CompletionChoice, ContentPart, ErrorResponse,
    HealthResponse, MessageContent, ModelInfo, ModelListResponse,
};
use crate::AppState;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Webhook Chat Gateway API",
        version = "0.2.0",
        description = "OpenAI-compatible chat completion gateway in front of webhook chat backends.",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        handlers::chat_completions,
        handlers::list_models,
        handlers::health_check,
    ),
    components(schemas(
        ChatCompletionRequest,
        ChatMessage,
        MessageContent,
        ContentPart,
        ChatCompletionResponse,
        CompletionChoice,
        AssistantMessage,
        ChatCompletionChunk,
        ChunkChoice,
        ChunkDelta,
        ModelListResponse,
        ModelInfo,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Chat", description = "Chat completion endpoints"),
        (name = "Models", description = "Model listing endpoints"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // OpenAI-compatible API under the /v1 prefix
    let api_routes = Router::new()
        .route("/chat/completions", post(handlers::chat_completions))
        .route("/models", get(handlers::list_models));

    Router::new()
        // Health check endpoint
        .route("/health", get(handlers::health_check))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes under /v1 prefix
        .nest("/v1", api_routes)
        // Add shared state
        .with_state(state)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        // Browser clients talk to this API directly
        .layer(CorsLayer::permissive())
}
