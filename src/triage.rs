/// Presentation-facing facade.
///
/// One `PhotoTriage` is built at app startup and handed (by reference
/// or clone of its `Rc` internals) to every screen, so the delete pile
/// and the grouped-photo view always come from the same place — no
/// ambient singletons, one source of truth.
///
/// The grouped view is derived state: it depends on the library and on
/// the delete pile. Instead of implicit reactivity, the facade caches
/// the last aggregation keyed by the pile's version counter and
/// recomputes exactly when that counter moved (or on explicit refresh).
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::batch::BatchDeleteExecutor;
use crate::error::TriageError;
use crate::groups;
use crate::resolver::DisplayResolver;
use crate::source::{MediaFilter, PhotoSource};
use crate::state::pile::DeletePile;
use crate::state::session::SwipeSession;
use crate::storage::Storage;
use crate::types::{BatchDeleteResult, DateGroup, Photo};

pub struct PhotoTriage {
    source: Rc<dyn PhotoSource>,
    pile: Rc<DeletePile>,
    resolver: Rc<DisplayResolver>,
    executor: BatchDeleteExecutor,
    access_granted: Cell<bool>,
    /// Last aggregation, keyed by the pile version it was computed at.
    groups_cache: RefCell<Option<(u64, Vec<DateGroup>)>>,
}

impl PhotoTriage {
    pub fn new(
        source: Rc<dyn PhotoSource>,
        storage: Rc<dyn Storage>,
        placeholder: impl Into<String>,
    ) -> Self {
        let pile = Rc::new(DeletePile::new(storage));
        let resolver = Rc::new(DisplayResolver::new(source.clone(), placeholder));
        let executor = BatchDeleteExecutor::new(source.clone(), pile.clone());
        PhotoTriage {
            source,
            pile,
            resolver,
            executor,
            access_granted: Cell::new(false),
            groups_cache: RefCell::new(None),
        }
    }

    /// Request photo library access. Denial is a blocking state with a
    /// retry action — calling this again re-requests; nothing retries
    /// automatically.
    pub async fn request_access(&self) -> Result<(), TriageError> {
        if self.access_granted.get() {
            return Ok(());
        }
        let granted = self.source.request_access().await?;
        self.access_granted.set(granted);
        if granted {
            Ok(())
        } else {
            Err(TriageError::PermissionDenied)
        }
    }

    /// The grouped-photo list for the home screen, newest month first,
    /// with everything already staged for deletion filtered out.
    /// Served from cache until the pile changes.
    pub async fn photo_groups(&self) -> Result<Vec<DateGroup>, TriageError> {
        self.request_access().await?;

        let version = self.pile.version();
        if let Some((cached_at, cached)) = self.groups_cache.borrow().as_ref() {
            if *cached_at == version {
                return Ok(cached.clone());
            }
        }

        let exclude: HashSet<String> = self
            .pile
            .photos()
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        let result = groups::list_groups(self.source.as_ref(), &exclude).await?;

        *self.groups_cache.borrow_mut() = Some((version, result.clone()));
        Ok(result)
    }

    /// Drop the cached aggregation and rebuild it.
    pub async fn refresh_groups(&self) -> Result<Vec<DateGroup>, TriageError> {
        *self.groups_cache.borrow_mut() = None;
        self.photo_groups().await
    }

    /// Current delete-pile contents for the confirmation screen.
    pub async fn delete_pile(&self) -> Vec<Photo> {
        self.pile.photos().await
    }

    pub async fn pile_len(&self) -> usize {
        self.pile.len().await
    }

    /// The shared pile, for components that need it directly.
    pub fn pile(&self) -> Rc<DeletePile> {
        self.pile.clone()
    }

    pub fn resolver(&self) -> Rc<DisplayResolver> {
        self.resolver.clone()
    }

    /// Begin a swipe session for a date group. The session still needs
    /// `load().await` before the first card shows.
    pub fn start_session(&self, group: &DateGroup) -> SwipeSession {
        let ids = group.photos.iter().map(|p| p.id.clone()).collect();
        SwipeSession::new(
            group.label.clone(),
            ids,
            self.source.clone(),
            self.pile.clone(),
            self.resolver.clone(),
        )
    }

    /// Begin a swipe session from the serialized id list carried by
    /// the navigation layer.
    pub fn start_session_from_json(&self, group_label: &str, ids_json: &str) -> SwipeSession {
        SwipeSession::from_id_json(
            group_label,
            ids_json,
            self.source.clone(),
            self.pile.clone(),
            self.resolver.clone(),
        )
    }

    /// Physically delete everything in the pile. Returns exact counts;
    /// the pile is reconciled to hold only the failures (if any).
    pub async fn execute_batch_delete(&self) -> BatchDeleteResult {
        let staged = self.pile.photos().await;
        self.executor.execute(&staged).await
    }

    /// Unstage everything without deleting anything.
    pub async fn clear_pile(&self) -> Result<(), TriageError> {
        self.pile.clear().await
    }

    /// Warm up the platform's locator handlers: request access, touch
    /// one asset and its extended info. Some platforms only start
    /// serving usable locators after this. Failures are logged and
    /// swallowed — this is an optimization, not a dependency.
    pub async fn warm_up(&self) {
        if self.request_access().await.is_err() {
            eprintln!("⚠️  Warm-up skipped: no photo library access");
            return;
        }
        match self.source.enumerate(MediaFilter::Photo, 1, None).await {
            Ok(page) => {
                if let Some(first) = page.items.first() {
                    if let Err(e) = self.source.get_extended_info(&first.id).await {
                        eprintln!("⚠️  Warm-up info probe failed: {}", e);
                    }
                }
                println!("📷 Photo locator warm-up complete");
            }
            Err(e) => eprintln!("⚠️  Warm-up enumeration failed: {}", e),
        }
    }
}
