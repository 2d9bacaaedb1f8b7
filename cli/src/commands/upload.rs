//! Upload command.

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use cabinet_business::UploadFile;
use tracing::{debug, instrument};

use crate::context::CliContext;
use crate::output::Output;

/// Reads `path` and guesses its content type from the extension.
pub async fn read_upload_file(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file name: {}", path.display()))?
        .to_owned();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned();
    debug!(name = %name, content_type = %content_type, size = bytes.len(), "File read");
    Ok(UploadFile::new(name, content_type, bytes))
}

#[instrument(skip_all, name = "upload", fields(count = paths.len()))]
pub async fn run_upload(ctx: &CliContext, paths: &[impl AsRef<Path>]) -> Result<()> {
    let out = Output::new();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_upload_file(path.as_ref()).await?);
    }

    let identity = ctx.require_identity().await?;
    let manager = ctx.file_manager(identity);

    out.info(format!("Uploading {} file(s)...", files.len()));
    let report = manager.upload(files).await;

    for file in &report.uploaded {
        out.success(format!(
            "{} ({}, {})",
            file.name,
            file.category.label(),
            file.size_display()
        ));
    }
    for notice in manager.drain_notices() {
        out.error(notice);
    }

    if !report.is_complete() {
        bail!("{} of the uploads failed", report.failed.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_business::FileCategory;

    #[tokio::test]
    async fn test_read_upload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let file = read_upload_file(&path).await.unwrap();

        assert_eq!(file.name, "photo.jpg");
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.size(), 10);
        assert_eq!(file.category(), FileCategory::Images);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzzunknown");
        std::fs::write(&path, b"?").unwrap();

        let file = read_upload_file(&path).await.unwrap();

        assert_eq!(file.content_type, "application/octet-stream");
        assert_eq!(file.category(), FileCategory::Other);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload_file(&dir.path().join("nope.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
