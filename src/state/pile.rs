/// The delete pile: photos staged for deletion but not yet removed.
///
/// One shared instance (`Rc<DeletePile>`) backs every screen. Contents
/// are loaded lazily from storage on first access and written through
/// after every mutation, so a pending deletion marked just before a
/// crash is still staged on the next launch.
///
/// Mutations are optimistic: a failed persistence write is logged and
/// returned as an error, but the in-memory change stands. Losing a
/// pending-delete marker is recoverable (the user re-swipes); the
/// actual deletions in batch.rs never depend on pile durability.
///
/// Known limitation: there is no internal mutual exclusion. Callers on
/// the single-threaded runtime are expected to await each mutation
/// before issuing the next; two interleaved `add` calls racing on the
/// same snapshot resolve last-write-wins at the storage layer.
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;
use crate::storage::Storage;
use crate::types::Photo;

/// Storage key, shared with earlier app versions.
const PILE_KEY: &str = "deletePile";

/// Bumped if the persisted Photo shape ever changes.
const PILE_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredPile {
    version: u32,
    photos: Vec<Photo>,
}

struct PileInner {
    loaded: bool,
    photos: Vec<Photo>,
    /// Bumped on every effective mutation; lets derived state (the
    /// grouped-photo view) recompute exactly when the pile changed.
    version: u64,
}

pub struct DeletePile {
    storage: Rc<dyn Storage>,
    inner: RefCell<PileInner>,
}

impl DeletePile {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        DeletePile {
            storage,
            inner: RefCell::new(PileInner {
                loaded: false,
                photos: Vec::new(),
                version: 0,
            }),
        }
    }

    /// Current pile contents, oldest staged first.
    pub async fn photos(&self) -> Vec<Photo> {
        self.ensure_loaded().await;
        self.inner.borrow().photos.clone()
    }

    pub async fn len(&self) -> usize {
        self.ensure_loaded().await;
        self.inner.borrow().photos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, photo_id: &str) -> bool {
        self.ensure_loaded().await;
        self.inner.borrow().photos.iter().any(|p| p.id == photo_id)
    }

    /// Mutation counter for derived-state invalidation.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Stage a photo for deletion. No-op if it is already staged
    /// (at most one entry per id).
    pub async fn add(&self, photo: Photo) -> Result<(), TriageError> {
        self.ensure_loaded().await;
        {
            let mut inner = self.inner.borrow_mut();
            if inner.photos.iter().any(|p| p.id == photo.id) {
                return Ok(());
            }
            inner.photos.push(photo);
            inner.version += 1;
        }
        self.persist().await
    }

    /// Unstage a photo. No-op if it is not in the pile.
    pub async fn remove(&self, photo_id: &str) -> Result<(), TriageError> {
        self.ensure_loaded().await;
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.photos.len();
            inner.photos.retain(|p| p.id != photo_id);
            if inner.photos.len() == before {
                return Ok(());
            }
            inner.version += 1;
        }
        self.persist().await
    }

    /// Unstage several photos with a single write-through, used by the
    /// batch executor when reconciling after a partial failure.
    pub async fn remove_many(&self, photo_ids: &[String]) -> Result<(), TriageError> {
        self.ensure_loaded().await;
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.photos.len();
            inner.photos.retain(|p| !photo_ids.contains(&p.id));
            if inner.photos.len() == before {
                return Ok(());
            }
            inner.version += 1;
        }
        self.persist().await
    }

    /// Empty the pile.
    pub async fn clear(&self) -> Result<(), TriageError> {
        self.ensure_loaded().await;
        {
            let mut inner = self.inner.borrow_mut();
            if inner.photos.is_empty() {
                return Ok(());
            }
            inner.photos.clear();
            inner.version += 1;
        }
        self.persist().await
    }

    /// Load from storage once. A failed or unparsable load degrades to
    /// an empty pile — nothing pending — with a logged warning.
    async fn ensure_loaded(&self) {
        if self.inner.borrow().loaded {
            return;
        }

        let photos = match self.storage.get_item(PILE_KEY).await {
            Ok(Some(raw)) => parse_stored_pile(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                eprintln!("⚠️  Failed to load delete pile: {}", e);
                Vec::new()
            }
        };

        let mut inner = self.inner.borrow_mut();
        // A concurrent first access may have loaded already
        if !inner.loaded {
            inner.photos = photos;
            inner.loaded = true;
        }
    }

    /// Write the current contents through to storage.
    async fn persist(&self) -> Result<(), TriageError> {
        let snapshot = StoredPile {
            version: PILE_SCHEMA_VERSION,
            photos: self.inner.borrow().photos.clone(),
        };
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| TriageError::Persistence(format!("serialize delete pile: {}", e)))?;

        if let Err(e) = self.storage.set_item(PILE_KEY, &json).await {
            eprintln!("⚠️  Failed to save delete pile: {}", e);
            return Err(e);
        }
        Ok(())
    }
}

/// Accepts the current versioned form and the bare photo array written
/// by earlier app versions; anything else degrades to empty.
fn parse_stored_pile(raw: &str) -> Vec<Photo> {
    if let Ok(stored) = serde_json::from_str::<StoredPile>(raw) {
        return stored.photos;
    }
    if let Ok(photos) = serde_json::from_str::<Vec<Photo>>(raw) {
        return photos;
    }
    eprintln!("⚠️  Stored delete pile is malformed, starting empty");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testutil::FailingStorage;

    fn pile_with_memory() -> (DeletePile, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (DeletePile::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_add_is_idempotent_per_id() {
        let (pile, _) = pile_with_memory();

        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();
        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();

        assert_eq!(pile.len().await, 1);
    }

    #[tokio::test]
    async fn test_add_then_remove_leaves_no_residue() {
        let (pile, _) = pile_with_memory();
        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();
        pile.add(Photo::new("b", "ph://b", 200)).await.unwrap();

        pile.remove("b").await.unwrap();

        let photos = pile.photos().await;
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, "a");
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let (pile, _) = pile_with_memory();
        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();

        let version = pile.version();
        pile.remove("nope").await.unwrap();

        assert_eq!(pile.len().await, 1);
        assert_eq!(pile.version(), version);
    }

    #[tokio::test]
    async fn test_write_through_survives_new_instance() {
        let (pile, storage) = pile_with_memory();
        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();
        pile.add(Photo::new("b", "ph://b", 200)).await.unwrap();
        pile.remove("a").await.unwrap();

        // A fresh pile over the same storage sees the persisted state
        let reloaded = DeletePile::new(storage);
        let photos = reloaded.photos().await;
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, "b");
    }

    #[tokio::test]
    async fn test_clear_empties_and_persists() {
        let (pile, storage) = pile_with_memory();
        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();
        pile.clear().await.unwrap();

        assert!(pile.is_empty().await);
        let reloaded = DeletePile::new(storage);
        assert!(reloaded.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_empty() {
        let pile = DeletePile::new(Rc::new(FailingStorage::new()));
        assert!(pile.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_memory_state() {
        let storage = Rc::new(FailingStorage::new());
        storage.set_fail_reads(false);
        let pile = DeletePile::new(storage);

        let result = pile.add(Photo::new("a", "ph://a", 100)).await;

        assert!(matches!(result, Err(TriageError::Persistence(_))));
        // Optimistic update: the in-memory pile still has the photo
        assert_eq!(pile.len().await, 1);
    }

    #[tokio::test]
    async fn test_legacy_bare_array_still_parses() {
        let storage = Rc::new(MemoryStorage::new());
        storage
            .set_item(
                "deletePile",
                r#"[{"id":"a","uri":"ph://a","creationTime":100}]"#,
            )
            .await
            .unwrap();

        let pile = DeletePile::new(storage);
        assert_eq!(pile.len().await, 1);
        assert!(pile.contains("a").await);
    }

    #[tokio::test]
    async fn test_malformed_payload_degrades_to_empty() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("deletePile", "not json at all").await.unwrap();

        let pile = DeletePile::new(storage);
        assert!(pile.is_empty().await);
    }

    #[tokio::test]
    async fn test_version_bumps_only_on_effective_mutation() {
        let (pile, _) = pile_with_memory();
        assert_eq!(pile.version(), 0);

        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();
        assert_eq!(pile.version(), 1);

        pile.add(Photo::new("a", "ph://a", 100)).await.unwrap();
        assert_eq!(pile.version(), 1);

        pile.clear().await.unwrap();
        assert_eq!(pile.version(), 2);

        pile.clear().await.unwrap();
        assert_eq!(pile.version(), 2);
    }
}
