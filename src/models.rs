use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One share link parsed from the dump file: the opaque file id and the
/// access token that follows the `#` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub file_id: String,
    pub token: String,
}

/// A catalog entry. The catalog is an array of JSON objects with arbitrary
/// fields; only `category` and `url` get a typed view here. Everything else
/// is carried through untouched, key order included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRecord(Map<String, Value>);

impl CatalogRecord {
    pub fn category(&self) -> Option<&str> {
        self.0.get("category").and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get("url").and_then(Value::as_str)
    }

    pub fn set_url(&mut self, url: String) {
        self.0.insert("url".to_string(), Value::String(url));
    }

    /// Thumbnail entries are exempt from URL rewriting, whatever their
    /// letter casing.
    pub fn is_thumbnail(&self) -> bool {
        self.category()
            .map(|c| c.eq_ignore_ascii_case("thumbnails"))
            .unwrap_or(false)
    }
}

/// Counts reported after a reconciliation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileSummary {
    pub updated: usize,
    pub eligible: usize,
}

/// Counts reported after a thumbnail extraction run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThumbnailSummary {
    pub generated: usize,
    pub failed: usize,
}
