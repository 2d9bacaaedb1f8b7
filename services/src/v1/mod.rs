//! V1 API module containing all versioned API endpoints.
//!
//! - `files` - catalog records
//! - `blobs` - blob upload, removal and download URLs
//! - `types` - shared request/response types

pub mod blobs;
pub mod files;
pub mod types;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::AppState;
use crate::catalog::CatalogStorage;
use crate::database::SqlStorage;
use crate::storage::FileStorage;
use crate::users::storage::UserStorage;

/// True if `path` names an object strictly below `prefix` with no relative segments.
pub(crate) fn is_owned_path(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => {
            !rest.is_empty()
                && rest
                    .split('/')
                    .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        }
        None => false,
    }
}

/// Creates the V1 API router with all endpoints.
pub fn routes<S, U, C, F>() -> Router<AppState<S, U, C, F>>
where
    S: SqlStorage,
    U: UserStorage,
    C: CatalogStorage,
    F: FileStorage,
{
    Router::new()
        .route(
            "/files",
            get(files::list::<S, U, C, F>).post(files::create::<S, U, C, F>),
        )
        .route("/files/{id}", delete(files::delete::<S, U, C, F>))
        .route(
            "/blobs/{*path}",
            put(blobs::put::<S, U, C, F>)
                .delete(blobs::delete::<S, U, C, F>)
                .layer(DefaultBodyLimit::max(blobs::MAX_BLOB_SIZE)),
        )
        .route("/blob-urls", post(blobs::download_url::<S, U, C, F>))
        .route("/download/{token}", get(blobs::download::<S, U, C, F>))
}
