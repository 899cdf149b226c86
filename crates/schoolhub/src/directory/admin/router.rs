use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access::bearer_token;
use super::service::{AdminError, AdminService};
use super::settings::SiteSettings;
use super::stats::{AnalyticsReport, DashboardStats};
use super::users::UserDirectory;
use crate::directory::backend::{BackendError, DirectoryBackend, SessionDirectory};
use crate::directory::domain::{SchoolFields, SchoolId, SchoolRecord};

type SharedAdmin<B, S> = Arc<AdminService<B, S>>;

/// Router builder for the admin back office. Every route requires a bearer
/// token that resolves to a user holding the admin role.
pub fn admin_router<B, S>(service: SharedAdmin<B, S>) -> Router
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    Router::new()
        .route("/api/v1/admin/session", get(session_handler::<B, S>))
        .route(
            "/api/v1/admin/schools",
            get(list_schools_handler::<B, S>)
                .post(create_school_handler::<B, S>)
                .delete(delete_all_handler::<B, S>),
        )
        .route(
            "/api/v1/admin/schools/:school_id",
            put(update_school_handler::<B, S>).delete(delete_school_handler::<B, S>),
        )
        .route("/api/v1/admin/users", get(users_handler::<B, S>))
        .route("/api/v1/admin/dashboard", get(dashboard_handler::<B, S>))
        .route("/api/v1/admin/analytics", get(analytics_handler::<B, S>))
        .route(
            "/api/v1/admin/settings",
            get(settings_handler::<B, S>).put(save_settings_handler::<B, S>),
        )
        .route(
            "/api/v1/admin/settings/reset",
            post(reset_settings_handler::<B, S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    search: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SchoolMutation {
    notice: &'static str,
    school: SchoolRecord,
}

pub(crate) async fn session_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    let user = service.authorize(bearer_token(&headers))?;
    Ok(Json(json!({
        "user_id": user.id,
        "email": user.email,
        "role": "admin",
    })))
}

pub(crate) async fn list_schools_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SchoolRecord>>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.schools(&params.search)?))
}

pub(crate) async fn create_school_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
    fields: Result<Json<SchoolFields>, JsonRejection>,
) -> Result<(StatusCode, Json<SchoolMutation>), AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    let school = service.create_school(read_body(fields)?)?;
    Ok((
        StatusCode::CREATED,
        Json(SchoolMutation {
            notice: "School created successfully",
            school,
        }),
    ))
}

pub(crate) async fn update_school_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
    Path(school_id): Path<String>,
    fields: Result<Json<SchoolFields>, JsonRejection>,
) -> Result<Json<SchoolMutation>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    let school = service.update_school(&SchoolId(school_id), read_body(fields)?)?;
    Ok(Json(SchoolMutation {
        notice: "School updated successfully",
        school,
    }))
}

pub(crate) async fn delete_school_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
    Path(school_id): Path<String>,
) -> Result<Json<serde_json::Value>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    let id = SchoolId(school_id);
    service.delete_school(&id)?;
    Ok(Json(json!({
        "notice": "School deleted successfully",
        "school_id": id,
    })))
}

pub(crate) async fn delete_all_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    let deleted = service.delete_all_schools()?;
    Ok(Json(json!({
        "notice": "All schools deleted successfully",
        "deleted": deleted,
    })))
}

pub(crate) async fn users_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<UserDirectory>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.users(&params.search, Utc::now())?))
}

pub(crate) async fn dashboard_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.dashboard()?))
}

pub(crate) async fn analytics_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsReport>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.analytics()?))
}

pub(crate) async fn settings_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
) -> Result<Json<SiteSettings>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.settings()?))
}

pub(crate) async fn save_settings_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
    settings: Result<Json<SiteSettings>, JsonRejection>,
) -> Result<Json<SiteSettings>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.save_settings(read_body(settings)?)?))
}

pub(crate) async fn reset_settings_handler<B, S>(
    State(service): State<SharedAdmin<B, S>>,
    headers: HeaderMap,
) -> Result<Json<SiteSettings>, AdminError>
where
    B: DirectoryBackend + 'static,
    S: SessionDirectory + 'static,
{
    service.authorize(bearer_token(&headers))?;
    Ok(Json(service.reset_settings()?))
}

/// Unwrap a JSON body, turning axum's plain-text rejection into an admin error.
fn read_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AdminError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AdminError::InvalidPayload(rejection.body_text()))
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AdminError::Forbidden => StatusCode::FORBIDDEN,
            AdminError::Validation(_)
            | AdminError::Settings(_)
            | AdminError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Mutation {
                source: BackendError::Conflict,
                ..
            } => StatusCode::CONFLICT,
            AdminError::Mutation { .. } | AdminError::Backend(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
