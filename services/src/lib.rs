use crate::catalog::CatalogStorage;
use crate::config::Config;
use crate::database::SqlStorage;
use crate::storage::FileStorage;
use crate::users::{ResetMailer, RevocationCache, UserStorage};
use axum::{
    Router,
    extract::{Extension, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{any, get},
};
use opentelemetry::{global, propagation::Extractor};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub mod catalog;
pub mod config;
pub mod database;
pub mod storage;
pub mod telemetry;
pub mod users;
pub mod v1;

/// Version reported in the `x-service-version` health header.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared handler state: the account, catalog and blob backends.
pub struct AppState<S, U, C, F> {
    pub sql_storage: S,
    pub user_storage: U,
    pub catalog: C,
    pub files: F,
    pub mailer: Arc<dyn ResetMailer>,
}

impl<S, U, C, F> AppState<S, U, C, F> {
    pub fn new(
        sql_storage: S,
        user_storage: U,
        catalog: C,
        files: F,
        mailer: Arc<dyn ResetMailer>,
    ) -> Self {
        Self {
            sql_storage,
            user_storage,
            catalog,
            files,
            mailer,
        }
    }
}

impl<S: Clone, U: Clone, C: Clone, F: Clone> Clone for AppState<S, U, C, F> {
    fn clone(&self) -> Self {
        Self {
            sql_storage: self.sql_storage.clone(),
            user_storage: self.user_storage.clone(),
            catalog: self.catalog.clone(),
            files: self.files.clone(),
            mailer: Arc::clone(&self.mailer),
        }
    }
}

struct HeaderExtractor<'a>(&'a axum::http::HeaderMap);

impl<'a> Extractor for HeaderExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Builds the full application router.
pub fn routes<S, U, C, F>(state: AppState<S, U, C, F>, config: Config) -> Router
where
    S: SqlStorage,
    U: UserStorage,
    C: CatalogStorage,
    F: FileStorage,
{
    Router::new()
        .route("/is-health", get(health_check::<S, U, C, F>))
        .nest("/auth", users::auth_routes::<S, U, C, F>())
        .nest("/v1", v1::routes::<S, U, C, F>())
        .fallback(any(catch_all))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let parent_context = global::get_text_map_propagator(|propagator| {
                    propagator.extract(&HeaderExtractor(request.headers()))
                });

                let span = tracing::info_span!(
                    "http_request",
                    http_request.method = ?request.method(),
                    http_request.uri = %request.uri().path(),
                    http_request.version = ?request.version(),
                    http_request.user_agent = ?request.headers().get(axum::http::header::USER_AGENT),
                );
                span.set_parent(parent_context);
                span
            }),
        )
        .layer(Extension(RevocationCache::with_default_capacity()))
        .layer(Extension(config))
        .with_state(state)
}

async fn health_check<S, U, C, F>(
    State(state): State<AppState<S, U, C, F>>,
    Extension(config): Extension<Config>,
) -> impl IntoResponse
where
    S: SqlStorage,
    F: FileStorage,
{
    let (database_ok, files_ok) =
        tokio::join!(state.sql_storage.is_connected(), state.files.is_reachable());

    let mut response = if database_ok && files_ok {
        (StatusCode::OK, "OK").into_response()
    } else {
        tracing::warn!(database_ok, files_ok, "Health check failed");
        (StatusCode::BAD_GATEWAY, "502").into_response()
    };

    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-service-env"),
        HeaderValue::from_static(config.environment().as_str()),
    );
    headers.insert(
        HeaderName::from_static("x-service-version"),
        HeaderValue::from_static(SERVICE_VERSION),
    );

    response
}

async fn catch_all() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
