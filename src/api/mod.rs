//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for hatch-server, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Chat (`/api/chat`)
//! - `POST /api/chat` - Answer the latest user message from the FAQ table
//!
//! ## Contact (`/api/contact`)
//! - `POST /api/contact` - Validate a contact-form submission and email it
//!
//! ## Documentation
//! - `GET /api/openapi.json` - OpenAPI document
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Errors
//!
//! Every error response has the shape `{ "error": "<message>" }`. Payloads
//! that can't be parsed are rejected with `400 { "error": "Bad request" }`.
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::AppState;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ContactRequest, ContactResponse, ErrorResponse,
};
use crate::utils::toml_config::ServerConfig;
use axum::{Router, http::HeaderValue, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI description of the public endpoints
#[derive(OpenApi)]
#[openapi(
    paths(handlers::chat::chat, handlers::contact::contact),
    components(schemas(
        ChatRequest,
        ChatMessage,
        ChatResponse,
        ContactRequest,
        ContactResponse,
        ErrorResponse
    )),
    tags(
        (name = "chat", description = "Scripted FAQ chat"),
        (name = "contact", description = "Contact-form relay")
    )
)]
pub struct ApiDoc;

/// Build the complete application: `/health`, the `/api` routes and the
/// HTTP middleware stack configured from `server`.
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", routes::create_router());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
        .layer(
            ServiceBuilder::new()
                // Outermost: CorsLayer needs a `Default` response body, which
                // the limit layer's body wrapper does not provide
                .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&server.cors_origins)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
