//! In-memory backends for tests and offline use.
//!
//! Each backend can be told to fail a specific operation, to exercise the
//! orchestrator's recovery paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::blob::{BlobError, BlobStore};
use crate::catalog::{CatalogError, FileCatalog};
use crate::file::{ManagedFile, NewFileRecord};
use crate::identity::{AuthError, Identity, IdentityProvider};

#[derive(Default)]
struct Switch(AtomicBool);

impl Switch {
    fn set(&self, on: bool) {
        self.0.store(on, Ordering::SeqCst);
    }

    fn is_on(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Names singled out for failure, independent of the global switches.
#[derive(Default)]
struct Targets(RwLock<Vec<String>>);

impl Targets {
    fn add(&self, name: &str) {
        self.0.write().expect("lock poisoned").push(name.to_owned());
    }

    fn any(&self, matches: impl Fn(&str) -> bool) -> bool {
        self.0.read().expect("lock poisoned").iter().any(|n| matches(n))
    }
}

#[derive(Default)]
struct CatalogFailures {
    list: Switch,
    create: Switch,
    create_names: Targets,
    delete: Switch,
}

/// In-memory implementation of [`FileCatalog`].
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    records: Arc<RwLock<HashMap<String, ManagedFile>>>,
    failures: Arc<CatalogFailures>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<ManagedFile> {
        self.records.read().expect("lock poisoned").get(id).cloned()
    }

    /// Inserts a record directly, bypassing failure injection.
    pub fn insert(&self, file: ManagedFile) {
        self.records
            .write()
            .expect("lock poisoned")
            .insert(file.id.clone(), file);
    }

    pub fn fail_list(&self, fail: bool) {
        self.failures.list.set(fail);
    }

    pub fn fail_create(&self, fail: bool) {
        self.failures.create.set(fail);
    }

    /// Fails `create` for records named `name`, leaving other records alone.
    pub fn fail_create_for(&self, name: &str) {
        self.failures.create_names.add(name);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.failures.delete.set(fail);
    }
}

impl FileCatalog for MemoryCatalog {
    async fn list(&self, user_id: &str) -> Result<Vec<ManagedFile>, CatalogError> {
        if self.failures.list.is_on() {
            return Err(CatalogError::Unavailable("simulated list failure".to_owned()));
        }

        let records = self.records.read().expect("lock poisoned");
        Ok(records
            .values()
            .filter(|file| file.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, record: NewFileRecord) -> Result<ManagedFile, CatalogError> {
        let targeted = self.failures.create_names.any(|n| n == record.name);
        if self.failures.create.is_on() || targeted {
            return Err(CatalogError::Unavailable(
                "simulated create failure".to_owned(),
            ));
        }

        let file = record.with_id(Uuid::new_v4().to_string());
        self.insert(file.clone());
        Ok(file)
    }

    async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        if self.failures.delete.is_on() {
            return Err(CatalogError::Unavailable(
                "simulated delete failure".to_owned(),
            ));
        }

        self.records.write().expect("lock poisoned").remove(id);
        Ok(())
    }
}

#[derive(Clone)]
struct StoredBlob {
    content: Vec<u8>,
    content_type: String,
}

#[derive(Default)]
struct BlobFailures {
    upload: Switch,
    upload_names: Targets,
    download_url: Switch,
    delete: Switch,
}

/// In-memory implementation of [`BlobStore`].
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, StoredBlob>>>,
    failures: Arc<BlobFailures>,
    base_url: String,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::with_base_url("memory://blobs")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            blobs: Arc::default(),
            failures: Arc::default(),
            base_url: base_url.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.read().expect("lock poisoned").contains_key(path)
    }

    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(path)
            .map(|blob| blob.content.clone())
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(path)
            .map(|blob| blob.content_type.clone())
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self
            .blobs
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    pub fn fail_upload(&self, fail: bool) {
        self.failures.upload.set(fail);
    }

    /// Fails uploads of files named `name`.
    ///
    /// Object paths end in `-{name}`, see [`crate::file::storage_path`].
    pub fn fail_upload_for(&self, name: &str) {
        self.failures.upload_names.add(name);
    }

    pub fn fail_download_url(&self, fail: bool) {
        self.failures.download_url.set(fail);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.failures.delete.set(fail);
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        let targeted = self
            .failures
            .upload_names
            .any(|n| path.ends_with(&format!("-{n}")));
        if self.failures.upload.is_on() || targeted {
            return Err(BlobError::Unavailable("simulated upload failure".to_owned()));
        }

        self.blobs.write().expect("lock poisoned").insert(
            path.to_owned(),
            StoredBlob {
                content: bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, BlobError> {
        if self.failures.download_url.is_on() {
            return Err(BlobError::Unavailable(
                "simulated download url failure".to_owned(),
            ));
        }

        if !self.contains(path) {
            return Err(BlobError::NotFound(path.to_owned()));
        }
        Ok(format!("{}/{}", self.base_url, path))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        if self.failures.delete.is_on() {
            return Err(BlobError::Unavailable("simulated delete failure".to_owned()));
        }

        self.blobs.write().expect("lock poisoned").remove(path);
        Ok(())
    }
}

#[derive(Clone)]
struct Account {
    user_id: String,
    password: String,
}

/// In-memory implementation of [`IdentityProvider`].
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    current: Arc<RwLock<Option<Identity>>>,
    resets: Arc<RwLock<Vec<String>>>,
    unavailable: Arc<Switch>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with pre-registered `(email, password)` accounts.
    pub fn with_accounts<'a>(accounts: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let identity = Self::new();
        {
            let mut map = identity.accounts.write().expect("lock poisoned");
            for (email, password) in accounts {
                map.insert(
                    email.to_owned(),
                    Account {
                        user_id: Uuid::new_v4().to_string(),
                        password: password.to_owned(),
                    },
                );
            }
        }
        identity
    }

    /// Emails that were sent a password reset, in order.
    pub fn resets(&self) -> Vec<String> {
        self.resets.read().expect("lock poisoned").clone()
    }

    /// Makes every call fail as if the provider could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.unavailable.is_on() {
            return Err(AuthError::Network("simulated provider outage".to_owned()));
        }
        Ok(())
    }

    fn start_session(&self, email: &str, user_id: &str) -> Identity {
        let identity = Identity {
            user_id: user_id.to_owned(),
            email: email.to_owned(),
        };
        *self.current.write().expect("lock poisoned") = Some(identity.clone());
        identity
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn current(&self) -> Result<Option<Identity>, AuthError> {
        self.check_available()?;
        Ok(self.current.read().expect("lock poisoned").clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_available()?;

        let account = self
            .accounts
            .read()
            .expect("lock poisoned")
            .get(email)
            .cloned();
        match account {
            Some(account) if account.password == password => {
                Ok(self.start_session(email, &account.user_id))
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_available()?;

        if !email.contains('@') || password.len() < 6 {
            return Err(AuthError::InvalidInput(
                "email must contain @ and password must be 6+ characters".to_owned(),
            ));
        }

        let user_id = {
            let mut accounts = self.accounts.write().expect("lock poisoned");
            if accounts.contains_key(email) {
                return Err(AuthError::EmailInUse);
            }
            let user_id = Uuid::new_v4().to_string();
            accounts.insert(
                email.to_owned(),
                Account {
                    user_id: user_id.clone(),
                    password: password.to_owned(),
                },
            );
            user_id
        };

        Ok(self.start_session(email, &user_id))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_available()?;
        *self.current.write().expect("lock poisoned") = None;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.check_available()?;

        if !self
            .accounts
            .read()
            .expect("lock poisoned")
            .contains_key(email)
        {
            return Err(AuthError::UnknownEmail(email.to_owned()));
        }
        self.resets
            .write()
            .expect("lock poisoned")
            .push(email.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FileCategory;

    fn record(user_id: &str, name: &str) -> NewFileRecord {
        NewFileRecord {
            name: name.to_owned(),
            category: FileCategory::Other,
            size: 3,
            url: format!("memory://blobs/{name}"),
            user_id: user_id.to_owned(),
            storage_path: format!("files/{user_id}/r-{name}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_scopes_list_to_owner() {
        let catalog = MemoryCatalog::new();
        catalog.create(record("alice", "a.txt")).await.unwrap();
        catalog.create(record("bob", "b.txt")).await.unwrap();

        let files = catalog.list("alice").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.txt");
    }

    #[tokio::test]
    async fn test_catalog_delete_is_idempotent() {
        let catalog = MemoryCatalog::new();
        let file = catalog.create(record("alice", "a.txt")).await.unwrap();

        catalog.delete(&file.id).await.unwrap();
        catalog.delete(&file.id).await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_injection() {
        let catalog = MemoryCatalog::new();
        catalog.fail_list(true);
        assert!(matches!(
            catalog.list("alice").await,
            Err(CatalogError::Unavailable(_))
        ));
        catalog.fail_list(false);
        assert!(catalog.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_targeted_failures_leave_other_names_alone() {
        let catalog = MemoryCatalog::new();
        catalog.fail_create_for("bad.txt");
        assert!(catalog.create(record("alice", "bad.txt")).await.is_err());
        assert!(catalog.create(record("alice", "good.txt")).await.is_ok());

        let store = MemoryBlobStore::new();
        store.fail_upload_for("bad.txt");
        assert!(
            store
                .upload("files/u/1-bad.txt", b"x".to_vec(), "text/plain")
                .await
                .is_err()
        );
        store
            .upload("files/u/2-notbad.txt.bak", b"x".to_vec(), "text/plain")
            .await
            .unwrap();
        assert_eq!(store.paths(), ["files/u/2-notbad.txt.bak"]);
    }

    #[tokio::test]
    async fn test_blob_store_round_trip() {
        let store = MemoryBlobStore::new();
        store
            .upload("files/u/1-a.txt", b"abc".to_vec(), "text/plain")
            .await
            .unwrap();

        assert_eq!(store.content("files/u/1-a.txt"), Some(b"abc".to_vec()));
        assert_eq!(
            store.content_type("files/u/1-a.txt").as_deref(),
            Some("text/plain")
        );
        assert_eq!(
            store.download_url("files/u/1-a.txt").await.unwrap(),
            "memory://blobs/files/u/1-a.txt"
        );

        store.delete("files/u/1-a.txt").await.unwrap();
        store.delete("files/u/1-a.txt").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_download_url_for_missing_blob() {
        let store = MemoryBlobStore::new();
        assert_eq!(
            store.download_url("files/u/missing").await,
            Err(BlobError::NotFound("files/u/missing".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_identity_sign_up_then_sign_in() {
        let identity = MemoryIdentity::new();
        let created = identity.sign_up("a@example.com", "secret1").await.unwrap();
        identity.sign_out().await.unwrap();
        assert_eq!(identity.current().await.unwrap(), None);

        let signed_in = identity.sign_in("a@example.com", "secret1").await.unwrap();
        assert_eq!(created, signed_in);
        assert_eq!(identity.current().await.unwrap(), Some(signed_in));
    }

    #[tokio::test]
    async fn test_identity_rejects_duplicate_email() {
        let identity = MemoryIdentity::with_accounts([("a@example.com", "secret1")]);
        assert_eq!(
            identity.sign_up("a@example.com", "another").await,
            Err(AuthError::EmailInUse)
        );
    }

    #[tokio::test]
    async fn test_identity_password_reset() {
        let identity = MemoryIdentity::with_accounts([("a@example.com", "secret1")]);
        identity.send_password_reset("a@example.com").await.unwrap();
        assert!(matches!(
            identity.send_password_reset("b@example.com").await,
            Err(AuthError::UnknownEmail(_))
        ));
        assert_eq!(identity.resets(), vec!["a@example.com".to_owned()]);
    }
}
