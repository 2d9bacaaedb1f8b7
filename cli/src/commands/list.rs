//! List files command.

use anyhow::{Result, bail};
use cabinet_business::{CategoryBuckets, ListStatus};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::context::CliContext;
use crate::output::Output;

#[derive(Debug, PartialEq, Eq, Tabled)]
pub struct FileRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

/// Table rows grouped by category in display order.
pub fn flat_rows(buckets: &CategoryBuckets) -> Vec<FileRow> {
    buckets
        .non_empty()
        .flat_map(|(category, files)| {
            files.iter().map(move |file| FileRow {
                category: category.label().to_owned(),
                name: truncate_str(&file.name, 40),
                size: file.size_display(),
                id: file.id.clone(),
            })
        })
        .collect()
}

#[instrument(skip_all, name = "list", fields(flat))]
pub async fn run_list(ctx: &CliContext, flat: bool) -> Result<()> {
    let out = Output::new();
    let identity = ctx.require_identity().await?;
    let manager = ctx.file_manager(identity);

    manager.mount().await;
    if manager.status() == ListStatus::Failed {
        for notice in manager.drain_notices() {
            out.error(notice);
        }
        bail!("could not load files");
    }

    let buckets = manager.buckets();
    if buckets.total() == 0 {
        out.dim("No files yet. Use `cabinet upload <paths>` to add some.");
        return Ok(());
    }

    if flat {
        let mut table = Table::new(flat_rows(&buckets));
        table.with(Style::rounded());
        out.print(table);
    } else {
        for (category, files) in buckets.non_empty() {
            out.folder(category, files.len());
            for file in files {
                out.file_item(file);
            }
        }
    }
    out.total(buckets.total());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_business::{FileCategory, ManagedFile};

    fn file(id: &str, name: &str, category: FileCategory, size: u64) -> ManagedFile {
        ManagedFile {
            id: id.to_owned(),
            name: name.to_owned(),
            category,
            size,
            url: format!("http://localhost/v1/download/{id}"),
            user_id: "u1".to_owned(),
            storage_path: format!("files/u1/{id}-{name}"),
        }
    }

    #[test]
    fn test_flat_rows_grouped_by_category() {
        let files = vec![
            file("1", "notes.pdf", FileCategory::Documents, 2048),
            file("2", "cat.png", FileCategory::Images, 10),
            file("3", "song.mp3", FileCategory::Audio, 1),
        ];
        let rows = flat_rows(&CategoryBuckets::group(&files));

        let order: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["2", "1", "3"]);
        assert_eq!(rows[0].category, FileCategory::Images.label());
        assert_eq!(rows[1].size, files[0].size_display());
    }

    #[test]
    fn test_flat_rows_empty() {
        assert!(flat_rows(&CategoryBuckets::group(&[])).is_empty());
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a-very-long-file-name.txt", 10), "a-very-...");
    }
}
