/// Batch deletion of the staged delete pile.
///
/// The platform's batch delete primitive reports a single boolean for
/// the whole call, so it cannot distinguish "all deleted" from "some
/// deleted". The user-visible contract needs exact counts, so deletion
/// runs item by item with independent failure accounting — one photo
/// failing never aborts the run.
///
/// After the run settles the pile is reconciled: a clean sweep clears
/// it outright, a partial one removes exactly the photos that are
/// gone. Successfully deleted photos must never linger in the pile.
use std::rc::Rc;

use crate::source::PhotoSource;
use crate::state::pile::DeletePile;
use crate::types::{BatchDeleteResult, Photo};

pub struct BatchDeleteExecutor {
    source: Rc<dyn PhotoSource>,
    pile: Rc<DeletePile>,
}

impl BatchDeleteExecutor {
    pub fn new(source: Rc<dyn PhotoSource>, pile: Rc<DeletePile>) -> Self {
        BatchDeleteExecutor { source, pile }
    }

    /// Delete the given photos from the device and reconcile the pile.
    /// Always produces a result, even under partial failure.
    pub async fn execute(&self, photos: &[Photo]) -> BatchDeleteResult {
        let requested = photos.len();
        let mut succeeded_ids: Vec<String> = Vec::new();
        let mut failed = 0usize;

        for photo in photos {
            match self.source.delete_by_ids(&[photo.id.clone()]).await {
                Ok(true) => succeeded_ids.push(photo.id.clone()),
                Ok(false) => {
                    eprintln!("⚠️  Source refused to delete photo {}", photo.id);
                    failed += 1;
                }
                Err(e) => {
                    eprintln!("⚠️  Error deleting photo {}: {}", photo.id, e);
                    failed += 1;
                }
            }
        }

        let result = BatchDeleteResult {
            requested,
            succeeded: succeeded_ids.len(),
            failed,
        };

        self.reconcile(&succeeded_ids, &result).await;

        if result.is_complete() {
            println!("🗑️  Deleted all {} staged photos", result.succeeded);
        } else {
            println!(
                "🗑️  Deleted {} of {} staged photos ({} failed)",
                result.succeeded, result.requested, result.failed
            );
        }

        result
    }

    /// Drop the deleted photos from the pile. Persistence here is
    /// best-effort: the photos are already gone from the device, and a
    /// stale pile entry only costs the user a re-confirmation.
    async fn reconcile(&self, succeeded_ids: &[String], result: &BatchDeleteResult) {
        if result.requested == 0 {
            return;
        }
        let outcome = if result.is_complete() {
            self.pile.clear().await
        } else {
            self.pile.remove_many(succeeded_ids).await
        };
        if let Err(e) = outcome {
            eprintln!("⚠️  Could not reconcile delete pile: {}", e);
        }
    }
}
