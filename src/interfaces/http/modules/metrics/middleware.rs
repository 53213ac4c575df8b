//! HTTP request metrics middleware
//!
//! - `plugspot_http_requests_total`: counter labelled `method`, `path`, `status`
//! - `plugspot_http_request_duration_seconds`: histogram labelled `method`, `path`
//!
//! `path` is the matched route template, so `/api/v1/chargers/{id}` stays a
//! single series. Unmatched requests share the `unmatched` label.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "plugspot_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("plugspot_http_request_duration_seconds", "method" => method, "path" => path)
        .record(duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::Service;

    #[test]
    fn records_route_template() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut app = Router::new()
            .route("/chargers/{id}", get(|| async { "ok" }))
            .layer(middleware::from_fn(http_metrics_middleware));
        let request = Request::builder()
            .uri("/chargers/c-42")
            .body(Body::empty())
            .unwrap();

        // The local recorder is thread-bound; a current-thread runtime keeps
        // the request on this thread.
        let status = metrics::with_local_recorder(&recorder, || {
            rt.block_on(async { app.call(request).await.unwrap().status() })
        });
        assert_eq!(status, 200);

        let rendered = handle.render();
        assert!(rendered.contains("plugspot_http_requests_total"));
        assert!(rendered.contains(r#"path="/chargers/{id}""#));
        assert!(!rendered.contains("c-42"));
    }
}
