/// Photo source collaborator
///
/// The device photo library sits behind this trait so that platform
/// bindings (and test fakes) can be injected. All calls are async and
/// `?Send`: the core runs on one logical thread (a current-thread
/// runtime) and never hands these futures to worker threads.
use async_trait::async_trait;

use crate::error::TriageError;
use crate::types::Photo;

/// Media-type filter for enumeration. Only photos are triaged; the
/// variant exists so the wire shape matches the platform call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFilter {
    Photo,
}

/// One page of an enumeration pass.
#[derive(Debug, Clone)]
pub struct PhotoPage {
    pub items: Vec<Photo>,
    /// Opaque cursor to hand back for the next page.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Extended per-asset info, queried when resolving a display locator.
#[derive(Debug, Clone, Default)]
pub struct AssetInfo {
    /// A local `file://` locator the renderer can consume directly,
    /// when the platform exposes one.
    pub local_locator: Option<String>,
    /// The platform locator; may carry a scheme the renderer rejects.
    pub remote_locator: String,
    pub filename: Option<String>,
}

#[async_trait(?Send)]
pub trait PhotoSource {
    /// Request (or re-check) library access. `Ok(false)` means denied.
    async fn request_access(&self) -> Result<bool, TriageError>;

    /// Enumerate one page of assets matching `filter`, following
    /// `cursor` when given. The source sorts by creation time.
    async fn enumerate(
        &self,
        filter: MediaFilter,
        page_size: usize,
        cursor: Option<String>,
    ) -> Result<PhotoPage, TriageError>;

    /// Fetch extended info for a single asset.
    async fn get_extended_info(&self, id: &str) -> Result<AssetInfo, TriageError>;

    /// Physically delete the given assets. Returns the platform's
    /// single success boolean; partial outcomes are not reported, which
    /// is why the batch executor deletes item by item.
    async fn delete_by_ids(&self, ids: &[String]) -> Result<bool, TriageError>;
}
