//! Document library
//!
//! Part drawings live as `<part>.pdf` files directly under the documents
//! root. Lookup is case-insensitive on the file stem; the files themselves
//! are served statically under `/documents/`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

const DOCUMENT_EXTENSION: &str = "pdf";

/// Public path prefix the documents root is served under.
pub const DOCUMENTS_URL_PREFIX: &str = "/documents";

/// A successful lookup, as returned to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMatch {
    pub found: bool,
    pub part_number: String,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    root: PathBuf,
}

impl DocumentLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root if it does not exist yet.
    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// File name of the document for `part_number`, if any.
    ///
    /// The part number is trimmed; a blank one never matches. When several
    /// files differ only in case, the first in byte order wins.
    pub fn find(&self, part_number: &str) -> Option<String> {
        let wanted = part_number.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Documents root unreadable");
                return None;
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                Path::new(name)
                    .extension()
                    .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
            })
            .collect();
        names.sort();

        names.into_iter().find(|name| {
            Path::new(name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.to_lowercase() == wanted)
        })
    }

    /// Look up `part_number` and build the viewer response.
    pub fn lookup(&self, part_number: &str, now: DateTime<Utc>) -> Option<DocumentMatch> {
        let filename = self.find(part_number)?;
        Some(DocumentMatch {
            found: true,
            part_number: part_number.to_string(),
            url: cache_busting_url(&filename, now),
            filename,
        })
    }
}

/// `/documents/<file>?v=<UTC timestamp>`, so a replaced file is re-fetched.
pub fn cache_busting_url(filename: &str, now: DateTime<Utc>) -> String {
    format!("{DOCUMENTS_URL_PREFIX}/{filename}?v={}", now.format("%Y%m%d%H%M%S"))
}
