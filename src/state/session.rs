/// The swipe session: per-group triage state machine.
///
/// A session is created when the user opens a date group and discarded
/// when they leave. It owns the ordered queue of not-yet-decided
/// photos, accepts keep/delete decisions, and supports exactly one
/// level of undo. "Delete" decisions flow into the shared delete pile
/// immediately (that is what survives navigation); "keep" decisions
/// are deliberately forgotten with the session.
///
/// Phases: `Loading → Ready → (Deciding → Ready)* → Exhausted`.
/// `Deciding` is a guard sub-state: gesture-release callbacks can fire
/// in overlapping fashion, and a decision that is still settling must
/// suppress any decision that arrives on top of it.
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::TriageError;
use crate::groups;
use crate::resolver::DisplayResolver;
use crate::source::PhotoSource;
use crate::state::pile::DeletePile;
use crate::types::{Decision, Photo, SwipeDirection};

/// How many queue positions get their display locator prefetched, so
/// the visible card and the one behind it never block on IO.
pub const PREFETCH_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Deciding,
    Exhausted,
}

struct SessionInner {
    phase: SessionPhase,
    /// Group members in source enumeration order, pile members already
    /// dropped at load time. The queue is this list minus `processed`.
    photos: Vec<Photo>,
    processed: Vec<String>,
    last_decision: Option<Decision>,
}

pub struct SwipeSession {
    group_label: String,
    source_ids: Vec<String>,
    source: Rc<dyn PhotoSource>,
    pile: Rc<DeletePile>,
    resolver: Rc<DisplayResolver>,
    inner: RefCell<SessionInner>,
    deciding: Cell<bool>,
}

impl SwipeSession {
    /// Create a session for a group from an explicit id list. The
    /// session starts in `Loading`; call `load` before swiping.
    pub fn new(
        group_label: impl Into<String>,
        source_ids: Vec<String>,
        source: Rc<dyn PhotoSource>,
        pile: Rc<DeletePile>,
        resolver: Rc<DisplayResolver>,
    ) -> Self {
        SwipeSession {
            group_label: group_label.into(),
            source_ids,
            source,
            pile,
            resolver,
            inner: RefCell::new(SessionInner {
                phase: SessionPhase::Loading,
                photos: Vec::new(),
                processed: Vec::new(),
                last_decision: None,
            }),
            deciding: Cell::new(false),
        }
    }

    /// Create a session from the serialized id list the navigation
    /// layer carries. An unparsable list means an empty queue, never
    /// a crash.
    pub fn from_id_json(
        group_label: impl Into<String>,
        ids_json: &str,
        source: Rc<dyn PhotoSource>,
        pile: Rc<DeletePile>,
        resolver: Rc<DisplayResolver>,
    ) -> Self {
        let source_ids = match serde_json::from_str::<Vec<String>>(ids_json) {
            Ok(ids) => ids,
            Err(e) => {
                eprintln!("⚠️  Malformed photo id list, starting empty: {}", e);
                Vec::new()
            }
        };
        Self::new(group_label, source_ids, source, pile, resolver)
    }

    /// Resolve the member photos and prefetch the first locators.
    /// On a source failure the session stays in `Loading` so the
    /// caller can retry.
    pub async fn load(&self) -> Result<(), TriageError> {
        let all = groups::enumerate_all(self.source.as_ref(), groups::DEFAULT_PAGE_SIZE).await?;
        let mut by_id: HashMap<String, Photo> =
            all.into_iter().map(|p| (p.id.clone(), p)).collect();

        let piled: HashSet<String> = self
            .pile
            .photos()
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();

        let photos: Vec<Photo> = self
            .source_ids
            .iter()
            .filter(|id| !piled.contains(*id))
            .filter_map(|id| by_id.remove(id))
            .collect();

        {
            let mut inner = self.inner.borrow_mut();
            inner.phase = if photos.is_empty() {
                SessionPhase::Exhausted
            } else {
                SessionPhase::Ready
            };
            inner.photos = photos;
            inner.processed.clear();
            inner.last_decision = None;
        }

        self.prefetch(PREFETCH_DEPTH).await;
        Ok(())
    }

    /// Resolve display locators for the first `depth` queue positions
    /// and attach them. Presentation calls this after `load` and after
    /// every decision; a still-missing locator on the second card is a
    /// transient loading affordance, not an error.
    pub async fn prefetch(&self, depth: usize) {
        let targets: Vec<Photo> = self
            .remaining()
            .into_iter()
            .take(depth)
            .filter(|p| p.display_url.is_none())
            .collect();
        if targets.is_empty() {
            return;
        }

        let resolved = self.resolver.resolve_many(&targets).await;

        let mut inner = self.inner.borrow_mut();
        for photo in inner.photos.iter_mut() {
            if photo.display_url.is_none() {
                if let Some(url) = resolved.get(&photo.id) {
                    photo.display_url = Some(url.clone());
                }
            }
        }
    }

    /// Record a decision for the photo at the head of the queue.
    ///
    /// Overlapping calls while a decision is settling are suppressed
    /// and return the current phase unchanged. Deciding the final
    /// remaining photo transitions to `Exhausted` regardless of
    /// direction.
    pub async fn decide(&self, direction: SwipeDirection) -> SessionPhase {
        if self.deciding.get() {
            return self.phase();
        }
        if self.inner.borrow().phase != SessionPhase::Ready {
            return self.phase();
        }
        let Some(head) = self.head() else {
            return self.phase();
        };

        self.deciding.set(true);

        if direction == SwipeDirection::Delete {
            // Best-effort durability: the decision stands even if the
            // write-through fails (the pile keeps it in memory)
            if let Err(e) = self.pile.add(head.clone()).await {
                eprintln!("⚠️  Could not persist delete decision: {}", e);
            }
        }

        let phase = {
            let mut inner = self.inner.borrow_mut();
            inner.processed.push(head.id.clone());
            inner.last_decision = Some(Decision {
                photo_id: head.id.clone(),
                direction,
            });
            let exhausted = inner
                .photos
                .iter()
                .all(|p| inner.processed.contains(&p.id));
            inner.phase = if exhausted {
                SessionPhase::Exhausted
            } else {
                SessionPhase::Ready
            };
            inner.phase
        };

        self.deciding.set(false);
        phase
    }

    /// Reverse exactly the last decision. The undone photo becomes the
    /// new head. A second undo without a fresh decision is a no-op, as
    /// is an undo while a decision is settling.
    pub async fn undo(&self) -> SessionPhase {
        if self.deciding.get() {
            return self.phase();
        }
        let Some(decision) = self.inner.borrow_mut().last_decision.take() else {
            return self.phase();
        };

        if decision.direction == SwipeDirection::Delete {
            if let Err(e) = self.pile.remove(&decision.photo_id).await {
                eprintln!("⚠️  Could not persist undo: {}", e);
            }
        }

        let mut inner = self.inner.borrow_mut();
        if let Some(pos) = inner
            .processed
            .iter()
            .rposition(|id| id == &decision.photo_id)
        {
            inner.processed.remove(pos);
        }
        inner.phase = SessionPhase::Ready;
        inner.phase
    }

    /// The photo currently on top of the queue.
    pub fn head(&self) -> Option<Photo> {
        self.remaining().into_iter().next()
    }

    /// The photo behind the head (the "next card").
    pub fn next(&self) -> Option<Photo> {
        self.remaining().into_iter().nth(1)
    }

    /// Undecided photos, head first.
    pub fn remaining(&self) -> Vec<Photo> {
        let inner = self.inner.borrow();
        inner
            .photos
            .iter()
            .filter(|p| !inner.processed.contains(&p.id))
            .cloned()
            .collect()
    }

    pub fn remaining_len(&self) -> usize {
        let inner = self.inner.borrow();
        inner
            .photos
            .iter()
            .filter(|p| !inner.processed.contains(&p.id))
            .count()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.deciding.get() {
            return SessionPhase::Deciding;
        }
        self.inner.borrow().phase
    }

    /// Terminal signal: every photo in the group has been decided.
    /// The presentation layer routes away on this and may mark the
    /// group completed in its own tracker, keyed by this label.
    pub fn is_exhausted(&self) -> bool {
        self.phase() == SessionPhase::Exhausted
    }

    pub fn group_label(&self) -> &str {
        &self.group_label
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.inner.borrow().last_decision.clone()
    }
}
