use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use helpline::infrastructure::observability::{REQUEST_ID_HEADER, RequestId, request_id_middleware};

fn app() -> Router {
    Router::new()
        .route(
            "/echo",
            get(|Extension(RequestId(id)): Extension<RequestId>| async move { id }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

#[test]
fn given_request_id_header_constant_when_accessed_then_returns_correct_value() {
    assert_eq!(REQUEST_ID_HEADER, "x-request-id");
}

#[tokio::test]
async fn given_incoming_request_id_when_handling_then_it_is_echoed_and_visible_to_handlers() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"req-42");
}

#[tokio::test]
async fn given_no_request_id_when_handling_then_a_uuid_is_minted() {
    let response = app()
        .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let minted = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(minted).is_ok());
}
