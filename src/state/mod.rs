/// Triage state module
///
/// This module holds the two stateful pieces of the core:
/// - The durable, cross-screen delete pile (pile.rs)
/// - The transient per-group swipe session (session.rs)

pub mod pile;
pub mod session;

pub use pile::DeletePile;
pub use session::{SessionPhase, SwipeSession};
