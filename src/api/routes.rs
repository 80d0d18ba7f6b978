use crate::AppState;
use crate::api::ApiDoc;
use axum::{
    Json, Router,
    routing::{get, post},
};
use utoipa::OpenApi;

/// Routes mounted under `/api`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(crate::api::handlers::chat::chat))
        .route("/contact", post(crate::api::handlers::contact::contact))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
