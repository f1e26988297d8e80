//! `GET /api?action=...`

use super::error::ApiError;
use super::AppState;
use crate::catalog::{build_metadata, thumbnail_catalog, ThumbnailCatalog, VideoMetadata};
use crate::extractor::SearchResult;
use crate::validator::{validate_search_query, validate_video_url};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
pub struct ApiParams {
    pub action: Option<String>,
    pub url: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

pub async fn api_handler(
    State(state): State<AppState>,
    params: Result<Query<ApiParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    debug!("api action={:?}", params.action);

    match params.action.as_deref() {
        Some("getVideoInfo") => {
            let meta = video_info(&state, params.url.as_deref()).await?;
            Ok(Json(meta).into_response())
        }
        Some("searchVideos") => {
            let results = search(&state, params.query.as_deref()).await?;
            Ok(Json(results).into_response())
        }
        Some("getThumbnails") => Ok(Json(thumbnails(params.url.as_deref())?).into_response()),
        _ => Err(ApiError::invalid_action()),
    }
}

async fn video_info(state: &AppState, url: Option<&str>) -> Result<VideoMetadata, ApiError> {
    let url = validate_video_url(url)?;
    let info = state.extractor.fetch_info(&url).await?;
    let meta = build_metadata(&info);
    info!("{}: {} catalog entries", url.video_id(), meta.formats.len());
    Ok(meta)
}

async fn search(state: &AppState, query: Option<&str>) -> Result<SearchResponse, ApiError> {
    let query = validate_search_query(query)?;
    let results = state
        .extractor
        .search(&query, state.settings.search_limit)
        .await?;
    info!("Search {:?}: {} results", query.as_str(), results.len());
    Ok(SearchResponse { results })
}

fn thumbnails(url: Option<&str>) -> Result<ThumbnailCatalog, ApiError> {
    let url = validate_video_url(url)?;
    Ok(thumbnail_catalog(url.video_id()))
}
