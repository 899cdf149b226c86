use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use schoolhub::directory::admin::{admin_router, AdminService};
use schoolhub::directory::{directory_router, DirectoryBackend, DirectoryService, SessionDirectory};
use serde_json::json;
use std::sync::Arc;

/// Public listing routes, the admin back office and the operational probes.
pub(crate) fn with_directory_routes<B, S>(
    directory: Arc<DirectoryService<B>>,
    admin: Arc<AdminService<B, S>>,
) -> axum::Router
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    directory_router(directory)
        .merge(admin_router(admin))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{local_admin, InMemoryDirectory, InMemorySessions};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use schoolhub::directory::SchoolImporter;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    const FIXTURE: &str = include_str!("../../../crates/schoolhub/fixtures/odisha_schools.csv");

    fn app(ready: bool) -> axum::Router {
        let schools = SchoolImporter::from_reader(FIXTURE.as_bytes()).expect("fixture imports");
        let (user, profile) = local_admin(Utc::now());
        let backend = Arc::new(InMemoryDirectory::seeded(schools).with_profile(profile));
        let sessions = Arc::new(InMemorySessions::default().with_admin("ops-token", user));

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);

        with_directory_routes(
            Arc::new(DirectoryService::new(backend.clone())),
            Arc::new(AdminService::new(backend, sessions)),
        )
        .layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_the_startup_flag() {
        let response = app(false)
            .oneshot(get("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");

        let response = app(true)
            .oneshot(get("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let response = app(true)
            .oneshot(get("/metrics"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn seeded_listing_is_served_alongside_admin_routes() {
        let router = app(true);

        let response = router
            .clone()
            .oneshot(get("/api/v1/schools?city=Cuttack&sort=established"))
            .await
            .expect("route executes");
        let payload = json_body(response).await;
        assert_eq!(payload["total_filtered"], 3);
        assert_eq!(payload["records"][0]["name"], "Delhi Public School Kalinga");

        let response = router
            .oneshot(
                Request::get("/api/v1/admin/users")
                    .header(header::AUTHORIZATION, "Bearer ops-token")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["summary"]["admins"], 1);
    }
}
