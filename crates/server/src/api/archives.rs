//! Archive listing and download handlers.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use logfetch_core::{ArchiveEntry, ArchiveError};
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeFile;
use tracing::error;

use crate::metrics::ARCHIVE_DOWNLOADS_TOTAL;
use crate::state::AppState;

/// Response for listing archives
#[derive(Debug, Serialize)]
pub struct ListArchivesResponse {
    pub archives: Vec<ArchiveEntry>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ArchiveErrorResponse {
    pub error: String,
}

/// List archives in the configured archive directory, newest first
pub async fn list_archives(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListArchivesResponse>, impl IntoResponse> {
    match logfetch_core::list_archives(state.archive_dir()) {
        Ok(archives) => Ok(Json(ListArchivesResponse { archives })),
        Err(e) => {
            error!("Failed to list archives: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ArchiveErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// Download an archive by filename
pub async fn download_archive(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    serve_attachment(&state, &filename).await
}

/// Serve an archive as a file attachment.
///
/// The requested name is reduced to its basename and checked against the
/// archive naming contract before touching the filesystem, so requests
/// cannot reach outside the archive directory.
pub(super) async fn serve_attachment(state: &AppState, requested: &str) -> Response {
    let path = match logfetch_core::resolve_archive(state.archive_dir(), requested) {
        Ok(path) => path,
        Err(ArchiveError::InvalidName(name)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ArchiveErrorResponse {
                    error: format!("Invalid archive name: {}", name),
                }),
            )
                .into_response();
        }
        Err(ArchiveError::NotFound(name)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ArchiveErrorResponse {
                    error: format!("Archive not found: {}", name),
                }),
            )
                .into_response();
        }
        Err(ArchiveError::Io(e)) => {
            error!("Failed to resolve archive: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // resolve_archive already validated, so the basename is present
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive.tar.gz")
        .to_string();

    let request = Request::builder().body(Body::empty());
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to build file request: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match ServeFile::new(&path).try_call(request).await {
        Ok(res) => {
            let mut response = res.map(Body::new);
            // ServeFile can still answer with an error status, e.g. when the
            // file vanished between resolution and serving.
            if response.status().is_success() {
                let disposition = format!("attachment; filename=\"{}\"", filename);
                if let Ok(value) = HeaderValue::from_str(&disposition) {
                    response
                        .headers_mut()
                        .insert(header::CONTENT_DISPOSITION, value);
                }
                ARCHIVE_DOWNLOADS_TOTAL.inc();
            }
            response
        }
        Err(e) => {
            error!("Failed to serve archive {}: {}", filename, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
