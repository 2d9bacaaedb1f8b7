//! /v1/blobs, /v1/blob-urls and /v1/download endpoint handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use super::is_owned_path;
use super::types::{V1BlobUrlRequest, V1BlobUrlResponse, V1ErrorResponse};
use crate::AppState;
use crate::config::Config;
use crate::storage::{FileStorage, FileStorageError, OCTET_STREAM};
use crate::users::session_auth::RequireAuth;
use crate::users::tokens::{issue_download_token, verify_download_token};

/// Largest accepted blob body, in bytes.
pub const MAX_BLOB_SIZE: usize = 100 * 1024 * 1024;

fn forbidden_path() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(V1ErrorResponse::forbidden(
            "Blob path is outside the caller's prefix",
        )),
    )
        .into_response()
}

fn storage_failure(e: &FileStorageError) -> Response {
    tracing::error!("Blob storage failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(V1ErrorResponse::internal_error("Blob storage is unavailable")),
    )
        .into_response()
}

/// Store the request body at `path`, replacing any previous blob.
pub async fn put<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    auth: RequireAuth,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    F: FileStorage,
{
    if !is_owned_path(&auth.blob_prefix(), &path) {
        return forbidden_path();
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(OCTET_STREAM)
        .to_owned();
    let size = body.len();

    match state.files.put(&path, body.to_vec(), &content_type).await {
        Ok(()) => {
            tracing::debug!(path = %path, size, content_type = %content_type, "Blob stored");
            StatusCode::CREATED.into_response()
        }
        Err(e) => storage_failure(&e),
    }
}

/// Remove the blob at `path`. Missing blobs are not an error.
pub async fn delete<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    auth: RequireAuth,
    Path(path): Path<String>,
) -> Response
where
    F: FileStorage,
{
    if !is_owned_path(&auth.blob_prefix(), &path) {
        return forbidden_path();
    }

    match state.files.delete(&path).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_failure(&e),
    }
}

/// Resolve a stable download URL for a stored blob.
pub async fn download_url<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
    auth: RequireAuth,
    Json(payload): Json<V1BlobUrlRequest>,
) -> Response
where
    F: FileStorage,
{
    if !is_owned_path(&auth.blob_prefix(), &payload.path) {
        return forbidden_path();
    }

    match state.files.exists(&payload.path).await {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(V1ErrorResponse::not_found(format!(
                    "No blob at {}",
                    payload.path
                ))),
            )
                .into_response();
        }
        Err(e) => return storage_failure(&e),
    }

    match issue_download_token(&payload.path, config.jwt_secret()) {
        Ok(token) => {
            let url = format!(
                "{}/v1/download/{}",
                config.public_url().trim_end_matches('/'),
                token
            );
            (StatusCode::OK, Json(V1BlobUrlResponse { url })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to sign download token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(V1ErrorResponse::internal_error("Failed to sign download URL")),
            )
                .into_response()
        }
    }
}

/// Serve a blob to whoever holds its download token.
pub async fn download<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
    Path(token): Path<String>,
) -> Response
where
    F: FileStorage,
{
    let Ok(path) = verify_download_token(&token, config.jwt_secret()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(V1ErrorResponse::not_found("Unknown download link")),
        )
            .into_response();
    };

    match state.files.get(&path).await {
        Ok(object) => {
            let content_type = HeaderValue::from_str(&object.content_type)
                .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));
            (
                StatusCode::OK,
                [(CONTENT_TYPE, content_type)],
                object.content,
            )
                .into_response()
        }
        Err(FileStorageError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(V1ErrorResponse::not_found("The file no longer exists")),
        )
            .into_response(),
        Err(e) => storage_failure(&e),
    }
}
