/// Shared data structures for the triage core
///
/// These structs represent the data model that flows between the photo
/// source, the delete-pile store, and the presentation layer.
use serde::{Deserialize, Serialize};

/// A single photo asset from the device library.
///
/// `id` is the source-stable identity; `uri` is the source's opaque
/// native locator. `display_url` is the lazily resolved renderer-safe
/// locator — the resolver cache is the single authority for it, and it
/// is never written to persistence when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub uri: String,
    /// Creation timestamp in epoch milliseconds.
    #[serde(rename = "creationTime")]
    pub creation_time: i64,
    #[serde(
        rename = "displayUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_url: Option<String>,
}

impl Photo {
    pub fn new(id: impl Into<String>, uri: impl Into<String>, creation_time: i64) -> Self {
        Photo {
            id: id.into(),
            uri: uri.into(),
            creation_time,
            display_url: None,
        }
    }
}

/// A bucket of photos sharing a calendar month/year.
///
/// The label (e.g. "January 2025") doubles as display text and grouping
/// identity. It is unique within one aggregation pass but is not a
/// durable identifier: groups are regenerated wholesale whenever the
/// underlying photo set or the delete pile changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub label: String,
    pub count: usize,
    /// Members in source enumeration order (newest first when the
    /// source sorts by creation time descending).
    pub photos: Vec<Photo>,
}

/// Direction of a swipe decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Swipe right: keep the photo.
    Keep,
    /// Swipe left: stage the photo for deletion.
    Delete,
}

/// The most recent swipe decision, retained for single-level undo.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub photo_id: String,
    pub direction: SwipeDirection,
}

/// Outcome of one batch deletion run. Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDeleteResult {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchDeleteResult {
    /// True when every requested photo was deleted.
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.succeeded == self.requested
    }
}
