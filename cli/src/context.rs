//! Wiring between the session file, the API client and the business layer.

use anyhow::{Result, bail};
use cabinet_business::{
    ApiClient, AuthSession, BusinessConfig, FileManager, Identity, RemoteBlobStore,
    RemoteCatalog, RemoteIdentity, SessionState,
};
use tracing::{debug, instrument};

use crate::config::{SessionStore, StoredSession};

pub type CliFileManager = FileManager<RemoteCatalog, RemoteBlobStore>;

/// Everything a command needs to talk to the service.
pub struct CliContext {
    config: BusinessConfig,
    client: ApiClient,
    session: AuthSession<RemoteIdentity>,
    store: SessionStore,
}

impl CliContext {
    /// Builds the context. A saved token is reused only for the service that issued it.
    pub fn new(config: BusinessConfig, store: SessionStore) -> Result<Self> {
        let mut client = ApiClient::new(&config);
        if let Some(saved) = store.load()? {
            if saved.api_url == config.api_url() {
                client = client.with_token(saved.token);
            } else {
                debug!(saved = %saved.api_url, "Ignoring session saved for another service");
            }
        }

        let session = AuthSession::new(RemoteIdentity::new(client.clone()));
        Ok(Self {
            config,
            client,
            session,
            store,
        })
    }

    pub fn session(&self) -> &AuthSession<RemoteIdentity> {
        &self.session
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Resolves the saved session against the service.
    ///
    /// A token the service no longer accepts is removed from disk.
    #[instrument(skip_all, name = "restore_session")]
    pub async fn restore(&self) -> Result<Option<Identity>> {
        let had_token = self.client.token().is_some();
        match self.session.start().await {
            SessionState::SignedIn(identity) => Ok(Some(identity)),
            SessionState::SignedOut => {
                if had_token && self.client.token().is_none() {
                    debug!("Saved session was rejected, removing it");
                    self.store.clear()?;
                }
                Ok(None)
            }
        }
    }

    /// The signed-in identity, or an error telling the user to sign in.
    pub async fn require_identity(&self) -> Result<Identity> {
        match self.restore().await? {
            Some(identity) => Ok(identity),
            None => bail!("Not signed in. Run `cabinet signin` first."),
        }
    }

    /// Saves the client's current token for `identity`.
    pub fn persist(&self, identity: &Identity) -> Result<()> {
        let Some(token) = self.client.token() else {
            bail!("The service did not return a session token");
        };
        self.store.save(&StoredSession {
            api_url: self.config.api_url().to_owned(),
            token,
            identity: identity.clone(),
        })
    }

    /// File manager for `identity`, sharing this context's token.
    pub fn file_manager(&self, identity: Identity) -> CliFileManager {
        FileManager::new(
            identity,
            RemoteCatalog::new(self.client.clone()),
            RemoteBlobStore::new(self.client.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn saved(api_url: &str) -> StoredSession {
        StoredSession {
            api_url: api_url.to_owned(),
            token: "saved-token".to_owned(),
            identity: Identity {
                user_id: "u1".to_owned(),
                email: "a@example.com".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn test_restore_saved_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .and(header("authorization", "Bearer saved-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "user_id": "u1",
                    "email": "a@example.com"
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        store.save(&saved(&server.uri())).unwrap();

        let ctx = CliContext::new(BusinessConfig::new(server.uri()), store).unwrap();
        let identity = ctx.require_identity().await.unwrap();

        assert_eq!(identity.user_id, "u1");
        assert!(ctx.store().load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejected_session_is_removed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        store.save(&saved(&server.uri())).unwrap();

        let ctx = CliContext::new(BusinessConfig::new(server.uri()), store).unwrap();

        assert_eq!(ctx.restore().await.unwrap(), None);
        assert!(ctx.store().load().unwrap().is_none());
        assert!(ctx.require_identity().await.is_err());
    }

    #[tokio::test]
    async fn test_session_for_other_service_is_ignored() {
        let server = MockServer::start().await;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        store.save(&saved("http://elsewhere.test")).unwrap();

        let ctx = CliContext::new(BusinessConfig::new(server.uri()), store).unwrap();

        assert_eq!(ctx.restore().await.unwrap(), None);
        // no request was made and the other service's session is kept
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(ctx.store().load().unwrap().is_some());
    }
}
