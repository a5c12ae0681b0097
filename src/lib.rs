//! photo-sweep: the triage core behind a swipe-to-clean photo app.
//!
//! The device photo library is grouped by month; the user swipes
//! through a group keeping or staging each photo, staged photos
//! accumulate in a durable delete pile, and a confirmed batch delete
//! removes them for real. This crate is only that core — the photo
//! source and the key-value persistence are injected collaborators,
//! and everything visual (cards, gestures, theming, navigation) lives
//! in the presentation layer on top.
//!
//! Entry point: [`PhotoTriage`], built once over a [`PhotoSource`] and
//! a [`Storage`] backend and shared with every screen.
//!
//! The core runs on a single-threaded cooperative runtime; all
//! collaborator calls are async, and nothing here spawns parallel
//! work. The one shared mutable piece is the delete pile — see
//! [`DeletePile`] for its (deliberately lock-free) semantics.

pub mod batch;
pub mod error;
pub mod groups;
pub mod resolver;
pub mod source;
pub mod state;
pub mod storage;
pub mod triage;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use batch::BatchDeleteExecutor;
pub use error::TriageError;
pub use groups::list_groups;
pub use resolver::DisplayResolver;
pub use source::{AssetInfo, MediaFilter, PhotoPage, PhotoSource};
pub use state::pile::DeletePile;
pub use state::session::{SessionPhase, SwipeSession};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use triage::PhotoTriage;
pub use types::{BatchDeleteResult, DateGroup, Decision, Photo, SwipeDirection};
