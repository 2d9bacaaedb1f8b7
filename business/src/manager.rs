//! Upload, list and delete orchestration for one signed-in user.
//!
//! [`FileManager`] keeps the file list, the names of in-flight uploads and a queue of
//! [`Notice`]s. Every failure is recovered locally: the cause is logged and the user
//! gets a fixed message. Nothing is retried.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use log::{error, info, warn};

use crate::blob::{BlobError, BlobStore};
use crate::catalog::{CatalogError, FileCatalog};
use crate::category::{CategoryBuckets, classify};
use crate::file::{ManagedFile, NewFileRecord, UploadFile, random_id, storage_path};
use crate::identity::Identity;
use crate::notice::Notice;

/// Progress of the file list fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last fetch failed. The previous list is kept.
    Failed,
}

/// Copy of the manager state for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerSnapshot {
    pub status: ListStatus,
    pub files: Vec<ManagedFile>,
    /// Names of uploads still in flight, in start order.
    pub uploading: Vec<String>,
}

#[derive(Debug, Default)]
struct ManagerState {
    mounted: bool,
    status: ListStatus,
    files: Vec<ManagedFile>,
    uploading: Vec<String>,
    notices: Vec<Notice>,
}

/// Why a single upload failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Blob upload failed: {0}")]
    Blob(BlobError),

    #[error("Could not resolve download URL: {0}")]
    DownloadUrl(BlobError),

    #[error("Catalog write failed: {0}")]
    Catalog(CatalogError),
}

/// Per-file outcome of an upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<ManagedFile>,
    pub failed: Vec<(String, UploadError)>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of [`FileManager::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    NotFound,
    Failed,
}

/// Asks the user to confirm a delete.
pub trait DeletePrompt {
    fn confirm(&self, file: &ManagedFile) -> bool;
}

impl<F> DeletePrompt for F
where
    F: Fn(&ManagedFile) -> bool,
{
    fn confirm(&self, file: &ManagedFile) -> bool {
        self(file)
    }
}

/// Log line for a stored blob that never got its catalog record.
fn orphan_message(path: &str, err: &UploadError) -> String {
    let cause = match err {
        UploadError::DownloadUrl(_) => "its download URL could not be resolved",
        UploadError::Catalog(_) => "the catalog write failed",
        UploadError::Blob(_) => "the upload failed",
    };
    format!("Blob {path} left without a catalog record: {cause}")
}

/// File workflow for one authenticated user.
#[derive(Clone)]
pub struct FileManager<C, B> {
    identity: Identity,
    catalog: C,
    blobs: B,
    state: Arc<Mutex<ManagerState>>,
}

impl<C: FileCatalog, B: BlobStore> FileManager<C, B> {
    pub fn new(identity: Identity, catalog: C, blobs: B) -> Self {
        Self {
            identity,
            catalog,
            blobs,
            state: Arc::default(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn snapshot(&self) -> ManagerSnapshot {
        let state = self.lock();
        ManagerSnapshot {
            status: state.status,
            files: state.files.clone(),
            uploading: state.uploading.clone(),
        }
    }

    pub fn status(&self) -> ListStatus {
        self.lock().status
    }

    pub fn files(&self) -> Vec<ManagedFile> {
        self.lock().files.clone()
    }

    /// Current files grouped by category.
    pub fn buckets(&self) -> CategoryBuckets {
        CategoryBuckets::group(&self.lock().files)
    }

    /// Returns and clears the queued notices.
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }

    /// Loads the file list the first time it is called.
    ///
    /// Returns `false` without fetching on every later call.
    pub async fn mount(&self) -> bool {
        {
            let mut state = self.lock();
            if state.mounted {
                return false;
            }
            state.mounted = true;
        }
        self.refresh().await;
        true
    }

    /// Reloads the file list. Returns whether the fetch succeeded.
    pub async fn refresh(&self) -> bool {
        self.lock().status = ListStatus::Loading;

        match self.catalog.list(&self.identity.user_id).await {
            Ok(mut files) => {
                files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
                let mut state = self.lock();
                state.files = files;
                state.status = ListStatus::Loaded;
                true
            }
            Err(e) => {
                error!("Failed to list files for {}: {e}", self.identity.user_id);
                let mut state = self.lock();
                state.status = ListStatus::Failed;
                state.notices.push(Notice::ListFailed);
                false
            }
        }
    }

    /// Uploads every file concurrently, then reloads the list.
    ///
    /// One failing file does not stop the others.
    pub async fn upload(&self, files: Vec<UploadFile>) -> UploadReport {
        if files.is_empty() {
            return UploadReport::default();
        }

        self.lock()
            .uploading
            .extend(files.iter().map(|file| file.name.clone()));

        let results = join_all(files.into_iter().map(|file| self.upload_one(file))).await;

        let mut report = UploadReport::default();
        for (name, result) in results {
            match result {
                Ok(file) => report.uploaded.push(file),
                Err(e) => report.failed.push((name, e)),
            }
        }
        info!(
            "Upload batch finished: {} uploaded, {} failed",
            report.uploaded.len(),
            report.failed.len()
        );

        self.refresh().await;
        report
    }

    async fn upload_one(&self, file: UploadFile) -> (String, Result<ManagedFile, UploadError>) {
        let name = file.name.clone();
        let result = self.run_pipeline(file).await;

        let mut state = self.lock();
        if let Some(index) = state.uploading.iter().position(|n| *n == name) {
            state.uploading.remove(index);
        }
        if let Err(e) = &result {
            error!("Upload of {name} failed: {e}");
            state.notices.push(Notice::UploadFailed { name: name.clone() });
        }
        drop(state);

        (name, result)
    }

    async fn run_pipeline(&self, file: UploadFile) -> Result<ManagedFile, UploadError> {
        let UploadFile {
            name,
            content_type,
            bytes,
        } = file;
        let path = storage_path(&self.identity.user_id, &random_id(), &name);
        let size = bytes.len() as u64;

        self.blobs
            .upload(&path, bytes, &content_type)
            .await
            .map_err(UploadError::Blob)?;

        let url = self
            .blobs
            .download_url(&path)
            .await
            .map_err(UploadError::DownloadUrl)
            .inspect_err(|e| warn!("{}", orphan_message(&path, e)))?;

        let record = NewFileRecord {
            name,
            category: classify(&content_type),
            size,
            url,
            user_id: self.identity.user_id.clone(),
            storage_path: path.clone(),
        };

        self.catalog
            .create(record)
            .await
            .map_err(UploadError::Catalog)
            .inspect_err(|e| warn!("{}", orphan_message(&path, e)))
    }

    /// Deletes a file from the current list after the prompt confirms.
    ///
    /// The blob goes first, then the record. The list only changes when both succeed.
    pub async fn delete(&self, id: &str, prompt: &impl DeletePrompt) -> DeleteOutcome {
        let Some(file) = self.lock().files.iter().find(|f| f.id == id).cloned() else {
            return DeleteOutcome::NotFound;
        };

        if !prompt.confirm(&file) {
            return DeleteOutcome::Cancelled;
        }

        if let Err(e) = self.blobs.delete(&file.storage_path).await {
            error!("Failed to delete blob {}: {e}", file.storage_path);
            return self.delete_failed(file.name);
        }

        if let Err(e) = self.catalog.delete(&file.id).await {
            error!("Failed to delete record {}: {e}", file.id);
            return self.delete_failed(file.name);
        }

        self.lock().files.retain(|f| f.id != file.id);
        info!("Deleted {} ({})", file.name, file.id);
        DeleteOutcome::Deleted
    }

    fn delete_failed(&self, name: String) -> DeleteOutcome {
        self.lock().notices.push(Notice::DeleteFailed { name });
        DeleteOutcome::Failed
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
