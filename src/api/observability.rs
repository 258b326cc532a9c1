use crate::api::AppState;
use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// `GET /api/metrics`
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Part of the service a request hit, used as a low-cardinality metric label.
fn area(route: &str) -> &'static str {
    let rest = route.strip_prefix("/api/").unwrap_or(route);
    match rest.split('/').next() {
        Some("catalog") => "catalog",
        Some("admin") => "admin",
        Some("auth") => "auth",
        Some("metrics") => "metrics",
        _ if route.starts_with("/media") => "media",
        _ => "other",
    }
}

fn outcome(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

/// Wraps each request in a span, logs its completion and records
/// `http_requests_total` / `http_request_duration_seconds`.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    // Unmatched paths collapse to one label value.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        %method,
        %path,
        %route,
    );

    async move {
        let response = next.run(req).await;
        let elapsed = start.elapsed();
        let status = response.status();

        let labels = [
            ("method", method.to_string()),
            ("route", route.clone()),
            ("area", area(&path).to_string()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            status_code = status.as_u16(),
            outcome = outcome(status),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "same-origin"),
    (
        "content-security-policy",
        "default-src 'none'; img-src 'self'; frame-ancestors 'none'",
    ),
];

/// Adds the fixed security headers; auth and admin responses also get
/// `Cache-Control: no-store`.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let private = matches!(area(req.uri().path()), "auth" | "admin");
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    if private {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_from_route() {
        assert_eq!(area("/api/catalog/{kind}/{id}"), "catalog");
        assert_eq!(area("/api/admin/books/{id}"), "admin");
        assert_eq!(area("/api/auth/signup"), "auth");
        assert_eq!(area("/api/metrics"), "metrics");
        assert_eq!(area("/media/covers/hobbit.jpg"), "media");
        assert_eq!(area("/favicon.ico"), "other");
    }

    #[test]
    fn test_outcome_buckets() {
        assert_eq!(outcome(StatusCode::SEE_OTHER), "success");
        assert_eq!(outcome(StatusCode::CONFLICT), "client_error");
        assert_eq!(outcome(StatusCode::INTERNAL_SERVER_ERROR), "error");
    }
}
