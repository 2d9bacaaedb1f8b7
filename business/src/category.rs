//! File classification by content type.
//!
//! Every stored file belongs to exactly one [`FileCategory`], derived once from the
//! declared content type at upload time. [`CategoryBuckets`] groups a file list into the
//! five fixed buckets used by the folder and grouped views.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::file::ManagedFile;

/// The five fixed classification buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Images,
    Videos,
    Documents,
    Audio,
    Other,
}

impl FileCategory {
    /// All categories in display order.
    pub const ALL: [Self; 5] = [
        Self::Images,
        Self::Videos,
        Self::Documents,
        Self::Audio,
        Self::Other,
    ];

    /// Human-readable label used by the folder view.
    pub fn label(self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Documents => "Documents",
            Self::Audio => "Audio",
            Self::Other => "Other",
        }
    }

    /// Lowercase wire form, as stored in the catalog.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Documents => "documents",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Images => 0,
            Self::Videos => 1,
            Self::Documents => 2,
            Self::Audio => 3,
            Self::Other => 4,
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown file category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for FileCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// Maps a declared content type to its category.
///
/// Precedence is image, video, audio, then document-like types. Matching is
/// case-sensitive: `IMAGE/PNG` is [`FileCategory::Other`].
pub fn classify(content_type: &str) -> FileCategory {
    if content_type.starts_with("image/") {
        FileCategory::Images
    } else if content_type.starts_with("video/") {
        FileCategory::Videos
    } else if content_type.starts_with("audio/") {
        FileCategory::Audio
    } else if content_type == "application/pdf"
        || content_type.starts_with("text/")
        || content_type.contains("document")
    {
        FileCategory::Documents
    } else {
        FileCategory::Other
    }
}

/// A file list partitioned by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBuckets {
    buckets: [Vec<ManagedFile>; 5],
}

impl CategoryBuckets {
    /// Groups files by their stored category, preserving input order within a bucket.
    pub fn group(files: &[ManagedFile]) -> Self {
        let mut buckets = Self::default();
        for file in files {
            buckets.buckets[file.category.index()].push(file.clone());
        }
        buckets
    }

    pub fn get(&self, category: FileCategory) -> &[ManagedFile] {
        &self.buckets[category.index()]
    }

    /// Per-category counts in display order, including empty buckets.
    pub fn counts(&self) -> [(FileCategory, usize); 5] {
        FileCategory::ALL.map(|category| (category, self.get(category).len()))
    }

    /// Only the populated buckets, in display order.
    pub fn non_empty(&self) -> impl Iterator<Item = (FileCategory, &[ManagedFile])> + '_ {
        FileCategory::ALL
            .into_iter()
            .map(|category| (category, self.get(category)))
            .filter(|(_, files)| !files.is_empty())
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}
