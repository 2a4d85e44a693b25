// tests/metrics.rs
//
// The Prometheus recorder can only be installed once per process, so this
// file holds the single test that exercises the /metrics route.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt as _; // for `oneshot`

use deal_reminder_dispatcher::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_renders_cadence_gauge() {
    let metrics = Metrics::init(15);
    let app = metrics.router();

    let req = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .expect("build GET /metrics");

    let resp = app.oneshot(req).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec();
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(
        text.contains("reminder_cron_cadence_minutes"),
        "exposition should carry the cadence gauge:\n{text}"
    );
}
