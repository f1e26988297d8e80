//! `GET /download`
//!
//! - `format_id=<id>`: stream the chosen format as an attachment
//! - `json=1` (or `ajax=1`): the same JSON as `getVideoInfo`
//! - neither: an HTML page listing the catalog as links
//!
//! Metadata is fetched at most once per request and shared between the
//! filename and extension lookups.

use super::error::ApiError;
use super::pages::{error_page, format_list_page};
use super::AppState;
use crate::catalog::build_metadata;
use crate::streaming::FormatSelector;
use crate::utils::error::TubefetchError;
use crate::validator::validate_video_url;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub format_id: Option<String>,
    pub json: Option<String>,
    pub ajax: Option<String>,
}

impl DownloadParams {
    fn wants_json(&self) -> bool {
        self.json.as_deref() == Some("1") || self.ajax.as_deref() == Some("1")
    }
}

pub async fn download_handler(
    State(state): State<AppState>,
    params: Result<Query<DownloadParams>, QueryRejection>,
) -> Response {
    let span = info_span!("download", request_id = %Uuid::new_v4());
    async move {
        // Unreadable parameters leave no json flag to honour, so answer in HTML
        let params = match params {
            Ok(Query(params)) => params,
            Err(rejection) => {
                let api = ApiError::from(rejection);
                return error_page(api.status, &api.message);
            }
        };

        if params.wants_json() {
            return match json_metadata(&state, &params).await {
                Ok(response) => response,
                Err(e) => e.into_response(),
            };
        }

        match html_or_stream(&state, &params).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_client_error() {
                    info!("Download request rejected: {}", e);
                } else {
                    warn!("Download failed before streaming: {}", e);
                }
                let api = ApiError::from(e);
                error_page(api.status, &api.message)
            }
        }
    }
    .instrument(span)
    .await
}

async fn json_metadata(state: &AppState, params: &DownloadParams) -> Result<Response, ApiError> {
    let url = validate_video_url(params.url.as_deref())?;
    let info = state.extractor.fetch_info(&url).await?;
    Ok(Json(build_metadata(&info)).into_response())
}

async fn html_or_stream(state: &AppState, params: &DownloadParams) -> Result<Response, TubefetchError> {
    let url = validate_video_url(params.url.as_deref())?;

    // Reject a bad selector before any subprocess runs
    let selector = params
        .format_id
        .as_deref()
        .map(FormatSelector::parse)
        .transpose()?;

    let info = state.extractor.fetch_info(&url).await?;

    match selector {
        Some(selector) => {
            info!("Download requested: {} format {}", url, selector);
            state.responder.stream(&url, selector, Some(&info)).await
        }
        None => Ok(format_list_page(&url, &build_metadata(&info))),
    }
}
