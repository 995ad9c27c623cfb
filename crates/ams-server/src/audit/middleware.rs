//! Audit recorder middleware
//!
//! Wraps the whole router and observes every inbound request/response
//! pair on audit-worthy paths:
//!
//! - classifies the path against an allowlist and an exclusion list;
//!   non-audit-worthy paths pass straight through
//! - resolves the principal (failure degrades to anonymous actor fields)
//! - captures and redacts the request body of mutating methods; bodies
//!   that are not valid JSON degrade to a null snapshot
//! - derives action, entity name, and record id from method + path shape
//! - records elapsed time and response status; failure of the inner
//!   service is recorded with status 500 and re-propagated unchanged
//! - persists the entry on a detached, time-bounded task; persistence
//!   failure is logged and discarded, never surfaced to the caller
//!
//! Exactly one entry is written per audited request (zero on persistence
//! failure), independent of the domain entries the workflow coordinator
//! may add inside the handler.

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap, Method},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::{
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};
use tower::{Layer, Service};
use tracing::{debug, error, warn};

use super::models::{ActorSnapshot, AuditAction, AuditedTable, NewAuditEntry};
use super::queries::insert_audit_entry;
use super::redact::redact;
use crate::auth::resolve_principal;

/// Path prefixes that are audit-worthy.
const AUDITED_PREFIXES: &[&str] = &[
    "/api/",
    "/auth/",
    "/users/",
    "/assets/",
    "/maintenance/",
    "/transfers/",
    "/auctions/",
    "/disposals/",
    "/notifications/",
    "/reports/",
    "/audit",
];

/// Paths that are never audited: health probes, static assets, docs.
const EXCLUDED_PATHS: &[&str] = &["/health", "/uploads/", "/static/", "/docs", "/redoc", "/openapi.json"];

/// Audit recorder layer
#[derive(Clone)]
pub struct AuditLayer {
    pool: PgPool,
    jwt_secret: Arc<str>,
    write_timeout: Duration,
}

impl AuditLayer {
    pub fn new(pool: PgPool, jwt_secret: impl Into<Arc<str>>, write_timeout: Duration) -> Self {
        Self {
            pool,
            jwt_secret: jwt_secret.into(),
            write_timeout,
        }
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = AuditMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuditMiddleware {
            inner,
            pool: self.pool.clone(),
            jwt_secret: Arc::clone(&self.jwt_secret),
            write_timeout: self.write_timeout,
        }
    }
}

/// Audit recorder service
#[derive(Clone)]
pub struct AuditMiddleware<S> {
    inner: S,
    pool: PgPool,
    jwt_secret: Arc<str>,
    write_timeout: Duration,
}

impl<S> Service<Request> for AuditMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Take the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !should_audit(request.uri().path()) {
            return Box::pin(inner.call(request));
        }

        let pool = self.pool.clone();
        let jwt_secret = Arc::clone(&self.jwt_secret);
        let write_timeout = self.write_timeout;

        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let headers = request.headers().clone();

            let ip_address = client_ip(&headers, request.extensions().get::<ConnectInfo<SocketAddr>>());
            let user_agent = headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            // Resolution failure is indistinguishable from anonymous here;
            // the recorder must complete either way.
            let principal = resolve_principal(&pool, &headers, &jwt_secret).await;
            let actor = ActorSnapshot::from(principal.as_ref());

            let captures_body = matches!(method, Method::POST | Method::PUT | Method::PATCH);
            let (request, new_values) = if captures_body {
                let (parts, body) = request.into_parts();
                match body.collect().await {
                    Ok(collected) => {
                        let bytes = collected.to_bytes();
                        let snapshot = snapshot_body(&bytes);
                        (Request::from_parts(parts, Body::from(bytes)), snapshot)
                    },
                    Err(e) => {
                        warn!(
                            method = %method,
                            path = %path,
                            error = %e,
                            "Failed to buffer request body"
                        );
                        (Request::from_parts(parts, Body::empty()), None)
                    },
                }
            } else {
                (request, None)
            };

            let start = Instant::now();
            let result = inner.call(request).await;
            let duration_ms = start.elapsed().as_millis() as i64;

            let action = classify_action(&method, &path);
            let (table, record_id) = classify_target(&path);

            let builder = |status: i32| {
                let mut b = NewAuditEntry::builder(action)
                    .actor(actor.clone())
                    .table(table)
                    .record_id(record_id)
                    .request(method.to_string(), path.clone())
                    .outcome(status, duration_ms);
                if let Some(ref values) = new_values {
                    b = b.new_values(values.clone());
                }
                if let Some(ref ip) = ip_address {
                    b = b.ip_address(ip.clone());
                }
                if let Some(ref agent) = user_agent {
                    b = b.user_agent(agent.clone());
                }
                b
            };

            match result {
                Ok(response) => {
                    let status = response.status();
                    let (response, error_message) = if status.as_u16() >= 400 {
                        capture_error_body(response).await
                    } else {
                        (response, None)
                    };

                    let mut entry = builder(status.as_u16() as i32);
                    if let Some(message) = error_message {
                        entry = entry.error_message(message);
                    }
                    persist(pool, write_timeout, entry.build());

                    Ok(response)
                },
                Err(err) => {
                    // Record the failure, then re-raise it unchanged: audit
                    // capture must be invisible to error propagation.
                    let entry = builder(500).error_message(err.to_string());
                    persist(pool, write_timeout, entry.build());

                    Err(err)
                },
            }
        })
    }
}

/// Path classification for the recorder.
pub(crate) fn should_audit(path: &str) -> bool {
    if EXCLUDED_PATHS.iter().any(|p| path.contains(p)) {
        return false;
    }
    AUDITED_PREFIXES.iter().any(|p| path.contains(p))
}

/// Derive the action from HTTP method and path shape.
pub(crate) fn classify_action(method: &Method, path: &str) -> AuditAction {
    match *method {
        Method::GET => {
            if trailing_numeric_segment(path) {
                AuditAction::View
            } else {
                AuditAction::List
            }
        },
        Method::POST => AuditAction::Create,
        Method::PUT | Method::PATCH => AuditAction::Update,
        Method::DELETE => AuditAction::Delete,
        _ => AuditAction::Other,
    }
}

fn trailing_numeric_segment(path: &str) -> bool {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Derive the target entity and record id from the path.
pub(crate) fn classify_target(path: &str) -> (AuditedTable, Option<i64>) {
    let trimmed = path
        .strip_prefix("/api/v1")
        .or_else(|| path.strip_prefix("/api"))
        .unwrap_or(path);

    let table = trimmed
        .split('/')
        .find(|s| !s.is_empty())
        .map(AuditedTable::from_path_segment)
        .unwrap_or(AuditedTable::Other);

    let record_id = trimmed
        .split('/')
        .filter(|s| !s.is_empty())
        .find_map(|s| {
            if s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse::<i64>().ok()
            } else {
                None
            }
        });

    (table, record_id)
}

/// Redact the raw body and parse the result leniently; anything that is
/// not valid JSON after masking becomes a null snapshot.
fn snapshot_body(bytes: &Bytes) -> Option<JsonValue> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let masked = redact(&text);
    serde_json::from_str::<JsonValue>(&masked).ok()
}

/// Prefer the first hop of x-forwarded-for, fall back to the socket peer.
fn client_ip(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().map(str::trim).unwrap_or("");
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }
    connect_info.map(|ci| ci.0.ip().to_string())
}

/// Buffer an error response body so its detail can be recorded, then hand
/// back an equivalent response.
async fn capture_error_body(response: Response) -> (Response, Option<String>) {
    let (parts, body) = response.into_parts();
    match body.collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            let message = if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).into_owned())
            };
            (Response::from_parts(parts, Body::from(bytes)), message)
        },
        Err(e) => {
            warn!(error = %e, "Failed to buffer error response body");
            (Response::from_parts(parts, Body::empty()), None)
        },
    }
}

/// Persist the entry off the request path. Fail-open by design: loss is
/// logged so the silent path stays observable, but the caller's outcome is
/// never affected.
fn persist(pool: PgPool, bound: Duration, entry: NewAuditEntry) {
    tokio::spawn(async move {
        match tokio::time::timeout(bound, insert_audit_entry(&pool, entry)).await {
            Ok(Ok(saved)) => {
                debug!(
                    audit_id = %saved.id,
                    action = %saved.action,
                    "Audit trail entry created"
                );
            },
            Ok(Err(e)) => {
                error!(error = %e, "Failed to persist audit trail entry");
            },
            Err(_) => {
                error!(
                    timeout_ms = bound.as_millis() as u64,
                    "Audit trail write timed out"
                );
            },
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_audit_allowlist() {
        assert!(should_audit("/api/v1/assets"));
        assert!(should_audit("/api/v1/transfer-requests/7"));
        assert!(should_audit("/api/v1/audit"));
        assert!(!should_audit("/"));
        assert!(!should_audit("/favicon.ico"));
    }

    #[test]
    fn test_should_audit_exclusions_win() {
        assert!(!should_audit("/health"));
        assert!(!should_audit("/api/v1/docs"));
        assert!(!should_audit("/static/app.js"));
        assert!(!should_audit("/uploads/photo.png"));
        assert!(!should_audit("/openapi.json"));
    }

    #[test]
    fn test_classify_action() {
        assert_eq!(classify_action(&Method::GET, "/api/v1/assets/42"), AuditAction::View);
        assert_eq!(classify_action(&Method::GET, "/api/v1/assets"), AuditAction::List);
        assert_eq!(classify_action(&Method::GET, "/api/v1/assets/"), AuditAction::List);
        assert_eq!(classify_action(&Method::POST, "/api/v1/assets"), AuditAction::Create);
        assert_eq!(classify_action(&Method::PUT, "/api/v1/assets/42"), AuditAction::Update);
        assert_eq!(classify_action(&Method::PATCH, "/api/v1/assets/42"), AuditAction::Update);
        assert_eq!(classify_action(&Method::DELETE, "/api/v1/assets/42"), AuditAction::Delete);
        assert_eq!(classify_action(&Method::HEAD, "/api/v1/assets"), AuditAction::Other);
    }

    #[test]
    fn test_classify_target() {
        assert_eq!(classify_target("/api/v1/assets/42"), (AuditedTable::Assets, Some(42)));
        assert_eq!(classify_target("/api/v1/assets"), (AuditedTable::Assets, None));
        assert_eq!(
            classify_target("/api/v1/transfer-requests/7"),
            (AuditedTable::TransferRequests, Some(7))
        );
        assert_eq!(classify_target("/api/v1/audit"), (AuditedTable::AuditTrail, None));
        assert_eq!(classify_target("/api/v1/widgets/3"), (AuditedTable::Other, Some(3)));
    }

    #[test]
    fn test_snapshot_body_redacts_and_parses() {
        let bytes = Bytes::from(r#"{"name": "Printer", "password": "hunter2"}"#);
        let snapshot = snapshot_body(&bytes).unwrap();
        assert_eq!(snapshot["name"], "Printer");
        assert_eq!(snapshot["password"], "***MASKED***");
    }

    #[test]
    fn test_snapshot_body_malformed_is_none() {
        assert!(snapshot_body(&Bytes::from("not json at all {")).is_none());
        assert!(snapshot_body(&Bytes::new()).is_none());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers, None).as_deref(), Some("203.0.113.9"));

        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None), None);
    }
}
