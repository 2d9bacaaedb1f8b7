//! /v1/files endpoint handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cabinet_business::{FileCategory, ManagedFile};
use uuid::Uuid;

use super::is_owned_path;
use super::types::{V1ErrorResponse, V1FileCreateRequest, V1FilesListResponse};
use crate::AppState;
use crate::catalog::{CatalogStorage, CatalogStorageError, FileInsert};
use crate::users::session_auth::RequireAuth;

/// List the caller's catalog records, ordered by name.
pub async fn list<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    auth: RequireAuth,
) -> Response
where
    C: CatalogStorage,
{
    match state.catalog.list_for_user(auth.user_id()).await {
        Ok(records) => {
            let files = records.into_iter().map(ManagedFile::from).collect();
            (StatusCode::OK, Json(V1FilesListResponse { files })).into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %auth.user_id(), "Failed to list files: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(V1ErrorResponse::from(&e))).into_response()
        }
    }
}

/// Create a catalog record for a blob the caller already stored.
pub async fn create<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    auth: RequireAuth,
    Json(payload): Json<V1FileCreateRequest>,
) -> Response
where
    C: CatalogStorage,
{
    if payload.user_id != auth.user_id().to_string() {
        return (
            StatusCode::FORBIDDEN,
            Json(V1ErrorResponse::forbidden(
                "Records can only be created for the signed-in user",
            )),
        )
            .into_response();
    }

    if !is_owned_path(&auth.blob_prefix(), &payload.storage_path) {
        return (
            StatusCode::FORBIDDEN,
            Json(V1ErrorResponse::forbidden(
                "Storage path is outside the caller's prefix",
            )),
        )
            .into_response();
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(V1ErrorResponse::bad_request("File name cannot be empty")),
        )
            .into_response();
    }

    let category = match FileCategory::from_str(&payload.category) {
        Ok(category) => category,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(V1ErrorResponse::bad_request(e.to_string())),
            )
                .into_response();
        }
    };

    let insert = FileInsert {
        user_id: auth.user_id(),
        name: payload.name,
        category,
        size: payload.size,
        url: payload.url,
        storage_path: payload.storage_path,
    };

    match state.catalog.insert(insert).await {
        Ok(record) => {
            tracing::info!(
                user_id = %auth.user_id(),
                file_id = %record.id,
                category = %record.category.as_str(),
                "File record created"
            );
            (StatusCode::CREATED, Json(ManagedFile::from(record))).into_response()
        }
        Err(e @ CatalogStorageError::Conflict(_)) => {
            (StatusCode::CONFLICT, Json(V1ErrorResponse::from(&e))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create file record: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(V1ErrorResponse::from(&e))).into_response()
        }
    }
}

/// Delete one of the caller's records.
///
/// Answers 204 whether or not the record existed, including for ids that are not UUIDs,
/// so a repeated delete is harmless.
pub async fn delete<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Response
where
    C: CatalogStorage,
{
    let Ok(id) = Uuid::parse_str(&id) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match state.catalog.delete_for_user(id, auth.user_id()).await {
        Ok(removed) => {
            if removed {
                tracing::info!(user_id = %auth.user_id(), file_id = %id, "File record deleted");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to delete file record: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(V1ErrorResponse::from(&e))).into_response()
        }
    }
}
