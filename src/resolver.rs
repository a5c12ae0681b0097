/// Display-locator resolution
///
/// The photo source hands out opaque asset locators; on iOS these are
/// `ph://` URLs the renderer cannot open. This module resolves an
/// asset into a renderer-safe locator, falling back tier by tier:
///
/// 1. the source's local `file://` locator, when present
/// 2. the source's remote locator, when it is safe
/// 3. the media-directory path derived from the filename (iOS
///    workaround for stubborn `ph://` assets)
/// 4. the photo's own uri, when it is safe
/// 5. the caller-supplied placeholder
///
/// Resolution never fails past this boundary — the worst case is the
/// placeholder. Results are cached by photo id; this cache is the
/// single authority for display locators.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::source::PhotoSource;
use crate::types::Photo;

/// Locator scheme the renderer rejects.
const UNSAFE_SCHEME: &str = "ph://";

/// Batch resolution chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// True when the renderer can consume this locator.
pub fn is_safe_locator(url: &str) -> bool {
    !url.is_empty() && !url.starts_with(UNSAFE_SCHEME)
}

pub struct DisplayResolver {
    source: Rc<dyn PhotoSource>,
    placeholder: String,
    chunk_size: usize,
    cache: RefCell<HashMap<String, String>>,
}

impl DisplayResolver {
    pub fn new(source: Rc<dyn PhotoSource>, placeholder: impl Into<String>) -> Self {
        DisplayResolver {
            source,
            placeholder: placeholder.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The already-cached locator for an id, if any.
    pub fn cached(&self, photo_id: &str) -> Option<String> {
        self.cache.borrow().get(photo_id).cloned()
    }

    /// Resolve a renderer-safe locator for one photo. Idempotent and
    /// cheap on repeat calls for the same id.
    pub async fn resolve(&self, photo: &Photo) -> String {
        if let Some(hit) = self.cached(&photo.id) {
            return hit;
        }
        let locator = self.resolve_uncached(photo).await;
        self.cache
            .borrow_mut()
            .insert(photo.id.clone(), locator.clone());
        locator
    }

    /// Resolve locators for many photos, processed in fixed-size
    /// chunks. One photo failing to resolve never fails the batch —
    /// it simply maps to the placeholder.
    pub async fn resolve_many(&self, photos: &[Photo]) -> HashMap<String, String> {
        let mut resolved = HashMap::with_capacity(photos.len());
        for chunk in photos.chunks(self.chunk_size) {
            for photo in chunk {
                let locator = self.resolve(photo).await;
                resolved.insert(photo.id.clone(), locator);
            }
        }
        resolved
    }

    async fn resolve_uncached(&self, photo: &Photo) -> String {
        match self.source.get_extended_info(&photo.id).await {
            Ok(info) => {
                let candidate = info
                    .local_locator
                    .filter(|l| !l.is_empty())
                    .unwrap_or(info.remote_locator);
                if is_safe_locator(&candidate) {
                    return candidate;
                }

                println!(
                    "⚠️  Unsafe locator for photo {}, trying fallbacks",
                    photo.id
                );

                // iOS media-directory workaround, works for some assets
                if let Some(filename) = info.filename.filter(|f| !f.is_empty()) {
                    return format!("file:///var/mobile/Media/{}", filename);
                }

                self.fallback_for(photo)
            }
            Err(e) => {
                eprintln!("⚠️  Failed to get info for photo {}: {}", photo.id, e);
                self.fallback_for(photo)
            }
        }
    }

    fn fallback_for(&self, photo: &Photo) -> String {
        if is_safe_locator(&photo.uri) {
            photo.uri.clone()
        } else {
            self.placeholder.clone()
        }
    }
}
