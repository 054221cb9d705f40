use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    attachment_handler, close_handler, delete_document_handler, document_stats_handler,
    get_document_handler, health_handler, history_handler, list_documents_handler,
    mark_all_read_handler, mark_read_handler, reopen_handler, send_message_handler,
    status_handler, upload_document_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.limits.max_body_bytes());

    let chat = Router::new()
        .route("/message", post(send_message_handler))
        .route("/history/{session_id}", get(history_handler))
        .route("/status/{session_id}", get(status_handler))
        .route("/read/{message_id}", patch(mark_read_handler))
        .route("/read-all/{session_id}", patch(mark_all_read_handler))
        .route("/reopen/{session_id}", patch(reopen_handler))
        .route("/close/{session_id}", post(close_handler));

    let documents = Router::new()
        .route("/", get(list_documents_handler))
        .route("/upload", post(upload_document_handler))
        .route("/stats", get(document_stats_handler))
        .route(
            "/{document_id}",
            get(get_document_handler).delete(delete_document_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .route("/attachments/{*key}", get(attachment_handler))
        .nest("/chat", chat)
        .nest("/documents", documents)
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
