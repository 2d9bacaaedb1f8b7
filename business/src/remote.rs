//! HTTP backends talking to `cabinet-services`.
//!
//! [`RemoteIdentity`], [`RemoteCatalog`] and [`RemoteBlobStore`] share one [`ApiClient`].
//! Signing in stores the session token on the client, so catalog and blob calls made
//! afterwards carry `Authorization: Bearer <token>` automatically.

use std::sync::{Arc, RwLock};

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::BusinessConfig;
use crate::blob::{BlobError, BlobStore};
use crate::catalog::{CatalogError, FileCatalog};
use crate::file::{ManagedFile, NewFileRecord};
use crate::identity::{AuthError, Identity, IdentityProvider};

/// Shared HTTP client with the current session token.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &BusinessConfig) -> Self {
        Self {
            base_url: config.api_url().to_owned(),
            http: reqwest::Client::new(),
            token: Arc::default(),
        }
    }

    /// Restores a previously saved session token.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("lock poisoned").clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("lock poisoned") = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL with `tail` appended as percent-encoded path segments.
    fn segments_url(&self, prefix: &str, tail: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.url(prefix)).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|()| format!("{} cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .extend(tail.split('/'));
        Ok(url)
    }

    fn request(&self, method: Method, url: impl reqwest::IntoUrl) -> RequestBuilder {
        let request = self.http.request(method, url);
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) if !body.message.is_empty() => body.message,
        Ok(body) if !body.error.is_empty() => body.error,
        _ => status.to_string(),
    }
}

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordResetRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
    user_id: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    user_id: String,
    email: String,
}

/// Identity provider backed by the service's `/auth` routes.
#[derive(Clone)]
pub struct RemoteIdentity {
    client: ApiClient,
}

impl RemoteIdentity {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn start_session(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let response = self
            .client
            .request(Method::POST, self.client.url(path))
            .json(&CredentialsRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let session: SessionResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(e.to_string()))?;
                self.client.set_token(Some(session.token));
                Ok(Identity {
                    user_id: session.user_id,
                    email: session.email,
                })
            }
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            StatusCode::CONFLICT => Err(AuthError::EmailInUse),
            StatusCode::BAD_REQUEST => Err(AuthError::InvalidInput(error_message(response).await)),
            _ => Err(AuthError::Provider(error_message(response).await)),
        }
    }
}

impl IdentityProvider for RemoteIdentity {
    async fn current(&self) -> Result<Option<Identity>, AuthError> {
        if self.client.token().is_none() {
            return Ok(None);
        }

        let response = self
            .client
            .request(Method::GET, self.client.url("/auth/session"))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let identity: IdentityResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(e.to_string()))?;
                Ok(Some(Identity {
                    user_id: identity.user_id,
                    email: identity.email,
                }))
            }
            StatusCode::UNAUTHORIZED => {
                log::info!("Saved session is no longer valid");
                self.client.set_token(None);
                Ok(None)
            }
            _ => Err(AuthError::Provider(error_message(response).await)),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.start_session("/auth/sign-in", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.start_session("/auth/sign-up", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.client.token().is_none() {
            return Ok(());
        }

        let response = self
            .client
            .request(Method::POST, self.client.url("/auth/sign-out"))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() || status == StatusCode::UNAUTHORIZED => {
                self.client.set_token(None);
                Ok(())
            }
            _ => Err(AuthError::Provider(error_message(response).await)),
        }
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .request(Method::POST, self.client.url("/auth/password-reset"))
            .json(&PasswordResetRequest { email })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(AuthError::UnknownEmail(email.to_owned())),
            StatusCode::BAD_REQUEST => Err(AuthError::InvalidInput(error_message(response).await)),
            _ => Err(AuthError::Provider(error_message(response).await)),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListFilesResponse {
    files: Vec<ManagedFile>,
}

async fn catalog_error(response: Response) -> CatalogError {
    match response.status() {
        StatusCode::UNAUTHORIZED => CatalogError::Unauthorized,
        status => CatalogError::Rejected {
            status: status.as_u16(),
            message: error_message(response).await,
        },
    }
}

/// File catalog backed by the service's `/v1/files` routes.
#[derive(Clone)]
pub struct RemoteCatalog {
    client: ApiClient,
}

impl RemoteCatalog {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl FileCatalog for RemoteCatalog {
    async fn list(&self, user_id: &str) -> Result<Vec<ManagedFile>, CatalogError> {
        let response = self
            .client
            .request(Method::GET, self.client.url("/v1/files"))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(catalog_error(response).await);
        }

        let body: ListFilesResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        let total = body.files.len();
        let files: Vec<_> = body
            .files
            .into_iter()
            .filter(|file| file.user_id == user_id)
            .collect();
        if files.len() != total {
            log::warn!(
                "Catalog returned {} records not owned by the current user",
                total - files.len()
            );
        }
        Ok(files)
    }

    async fn create(&self, record: NewFileRecord) -> Result<ManagedFile, CatalogError> {
        let response = self
            .client
            .request(Method::POST, self.client.url("/v1/files"))
            .json(&record)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(catalog_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let url = self
            .client
            .segments_url("/v1/files", id)
            .map_err(CatalogError::Network)?;
        let response = self
            .client
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
            _ => Err(catalog_error(response).await),
        }
    }
}

// ============================================================================
// Blob store
// ============================================================================

#[derive(Debug, Serialize)]
struct BlobUrlRequest<'a> {
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct BlobUrlResponse {
    url: String,
}

async fn blob_error(response: Response, path: &str) -> BlobError {
    match response.status() {
        StatusCode::UNAUTHORIZED => BlobError::Unauthorized,
        StatusCode::NOT_FOUND => BlobError::NotFound(path.to_owned()),
        status => BlobError::Rejected {
            status: status.as_u16(),
            message: error_message(response).await,
        },
    }
}

/// Blob store backed by the service's `/v1/blobs` routes.
#[derive(Clone)]
pub struct RemoteBlobStore {
    client: ApiClient,
}

impl RemoteBlobStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl BlobStore for RemoteBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        let url = self
            .client
            .segments_url("/v1/blobs", path)
            .map_err(BlobError::Network)?;
        let response = self
            .client
            .request(Method::PUT, url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BlobError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(blob_error(response, path).await)
        }
    }

    async fn download_url(&self, path: &str) -> Result<String, BlobError> {
        let response = self
            .client
            .request(Method::POST, self.client.url("/v1/blob-urls"))
            .json(&BlobUrlRequest { path })
            .send()
            .await
            .map_err(|e| BlobError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(blob_error(response, path).await);
        }

        let body: BlobUrlResponse = response
            .json()
            .await
            .map_err(|e| BlobError::Decode(e.to_string()))?;
        Ok(body.url)
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let url = self
            .client
            .segments_url("/v1/blobs", path)
            .map_err(BlobError::Network)?;
        let response = self
            .client
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(|e| BlobError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
            _ => Err(blob_error(response, path).await),
        }
    }
}
