use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::backend::DirectoryBackend;
use super::domain::SchoolId;
use super::listing::{ListingState, SortKey};
use super::service::{DirectoryError, DirectoryService};

/// Router builder exposing the public listing endpoints.
pub fn directory_router<B>(service: Arc<DirectoryService<B>>) -> Router
where
    B: DirectoryBackend + 'static,
{
    Router::new()
        .route("/api/v1/schools", get(listing_handler::<B>))
        .route("/api/v1/schools/:school_id", get(school_handler::<B>))
        .route("/api/v1/cities", get(cities_handler::<B>))
        .route("/api/v1/boards", get(boards_handler::<B>))
        .with_state(service)
}

/// Query string accepted by `GET /api/v1/schools`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

impl ListingQuery {
    pub fn into_state(self) -> Result<ListingState, super::listing::UnknownSortKey> {
        let mut state = ListingState::default();
        if let Some(query) = self.q {
            state.set_search_query(query);
        }
        if let Some(city) = self.city {
            state.select_city(city);
        }
        if let Some(board) = self.board {
            state.select_board(board);
        }
        if let Some(sort) = self.sort {
            state.set_sort_key(sort.parse::<SortKey>()?);
        }
        if let Some(page) = self.page {
            state.go_to_page(page);
        }
        Ok(state)
    }
}

pub(crate) async fn listing_handler<B>(
    State(service): State<Arc<DirectoryService<B>>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Response
where
    B: DirectoryBackend + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match query.into_state() {
        Ok(state) => (StatusCode::OK, Json(service.listing(&state))).into_response(),
        Err(err) => bad_request(err.to_string()),
    }
}

fn bad_request(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) async fn school_handler<B>(
    State(service): State<Arc<DirectoryService<B>>>,
    Path(school_id): Path<String>,
) -> Response
where
    B: DirectoryBackend + 'static,
{
    match service.school(&SchoolId(school_id)) {
        Ok(school) => (StatusCode::OK, Json(school)).into_response(),
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn cities_handler<B>(State(service): State<Arc<DirectoryService<B>>>) -> Response
where
    B: DirectoryBackend + 'static,
{
    match service.cities() {
        Ok(cities) => (StatusCode::OK, Json(cities)).into_response(),
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn boards_handler<B>(State(service): State<Arc<DirectoryService<B>>>) -> Response
where
    B: DirectoryBackend + 'static,
{
    match service.boards() {
        Ok(boards) => (StatusCode::OK, Json(boards)).into_response(),
        Err(err) => directory_error_response(err),
    }
}

fn directory_error_response(err: DirectoryError) -> Response {
    let status = match err {
        DirectoryError::NotFound(_) => StatusCode::NOT_FOUND,
        DirectoryError::Backend(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
