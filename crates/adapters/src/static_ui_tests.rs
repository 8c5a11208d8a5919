use super::*;
use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;

#[tokio::test]
async fn null_static_ui_404s_everything() {
    let ui = NullStaticUI;
    let router = ui.router();
    let response =
        router.oneshot(Request::builder().uri("/anything").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), 404);
}
