/// Shared test doubles for the collaborator traits.
///
/// `FakeSource` is an in-memory photo library with switches for every
/// failure mode the core has to survive; `FailingStorage` simulates a
/// broken persistence layer.
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::TriageError;
use crate::source::{AssetInfo, MediaFilter, PhotoPage, PhotoSource};
use crate::storage::{MemoryStorage, Storage};
use crate::types::Photo;

pub struct FakeSource {
    photos: RefCell<Vec<Photo>>,
    infos: RefCell<HashMap<String, AssetInfo>>,
    info_failures: RefCell<HashSet<String>>,
    delete_failures: RefCell<HashSet<String>>,
    deleted: RefCell<Vec<String>>,
    access_granted: Cell<bool>,
    enumerate_fail: Cell<bool>,
    lying_has_more: Cell<bool>,
    page_limit: Cell<Option<usize>>,
    delete_reports_false: Cell<bool>,
    enumerate_calls: Cell<usize>,
    info_calls: Cell<usize>,
}

impl FakeSource {
    pub fn new(photos: Vec<Photo>) -> Self {
        FakeSource {
            photos: RefCell::new(photos),
            infos: RefCell::new(HashMap::new()),
            info_failures: RefCell::new(HashSet::new()),
            delete_failures: RefCell::new(HashSet::new()),
            deleted: RefCell::new(Vec::new()),
            access_granted: Cell::new(true),
            enumerate_fail: Cell::new(false),
            lying_has_more: Cell::new(false),
            page_limit: Cell::new(None),
            delete_reports_false: Cell::new(false),
            enumerate_calls: Cell::new(0),
            info_calls: Cell::new(0),
        }
    }

    pub fn with_access_denied(self) -> Self {
        self.access_granted.set(false);
        self
    }

    pub fn with_info(self, id: &str, info: AssetInfo) -> Self {
        self.infos.borrow_mut().insert(id.to_string(), info);
        self
    }

    pub fn with_info_failure(self, id: &str) -> Self {
        self.info_failures.borrow_mut().insert(id.to_string());
        self
    }

    pub fn with_enumerate_failure(self) -> Self {
        self.enumerate_fail.set(true);
        self
    }

    /// Serve at most this many items per page regardless of the
    /// requested page size.
    pub fn with_page_size_limit(self, limit: usize) -> Self {
        self.page_limit.set(Some(limit));
        self
    }

    /// Always claim more pages exist. Exercises the aggregator's
    /// defensive termination on an empty page.
    pub fn with_lying_has_more(self) -> Self {
        self.lying_has_more.set(true);
        self
    }

    pub fn with_delete_failure(self, id: &str) -> Self {
        self.delete_failures.borrow_mut().insert(id.to_string());
        self
    }

    /// Deletion calls return `Ok(false)` instead of failing outright.
    pub fn with_delete_reporting_false(self) -> Self {
        self.delete_reports_false.set(true);
        self
    }

    pub fn set_access_granted(&self, granted: bool) {
        self.access_granted.set(granted);
    }

    pub fn set_enumerate_failure(&self, fail: bool) {
        self.enumerate_fail.set(fail);
    }

    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.get()
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.get()
    }

    /// Ids physically deleted, in deletion order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PhotoSource for FakeSource {
    async fn request_access(&self) -> Result<bool, TriageError> {
        Ok(self.access_granted.get())
    }

    async fn enumerate(
        &self,
        _filter: MediaFilter,
        page_size: usize,
        cursor: Option<String>,
    ) -> Result<PhotoPage, TriageError> {
        self.enumerate_calls.set(self.enumerate_calls.get() + 1);
        if self.enumerate_fail.get() {
            return Err(TriageError::Source("enumerate failed".to_string()));
        }

        let offset: usize = match cursor {
            Some(c) => c
                .parse()
                .map_err(|_| TriageError::Source(format!("bad cursor: {}", c)))?,
            None => 0,
        };
        let effective = match self.page_limit.get() {
            Some(limit) => page_size.min(limit),
            None => page_size,
        };

        let photos = self.photos.borrow();
        let end = (offset + effective).min(photos.len());
        let items: Vec<Photo> = photos
            .get(offset..end)
            .map(|s| s.to_vec())
            .unwrap_or_default();
        let has_more = end < photos.len();

        if self.lying_has_more.get() {
            return Ok(PhotoPage {
                items,
                next_cursor: Some(end.to_string()),
                has_more: true,
            });
        }

        Ok(PhotoPage {
            items,
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    async fn get_extended_info(&self, id: &str) -> Result<AssetInfo, TriageError> {
        self.info_calls.set(self.info_calls.get() + 1);
        if self.info_failures.borrow().contains(id) {
            return Err(TriageError::Source(format!("info failed for {}", id)));
        }
        if let Some(info) = self.infos.borrow().get(id) {
            return Ok(info.clone());
        }
        let photos = self.photos.borrow();
        let photo = photos
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| TriageError::Source(format!("unknown asset: {}", id)))?;
        Ok(AssetInfo {
            local_locator: None,
            remote_locator: photo.uri.clone(),
            filename: None,
        })
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<bool, TriageError> {
        for id in ids {
            if self.delete_failures.borrow().contains(id) {
                return Err(TriageError::Source(format!("cannot delete {}", id)));
            }
        }
        if self.delete_reports_false.get() {
            return Ok(false);
        }
        let mut photos = self.photos.borrow_mut();
        for id in ids {
            photos.retain(|p| &p.id != id);
            self.deleted.borrow_mut().push(id.clone());
        }
        Ok(true)
    }
}

/// Storage whose reads and/or writes fail on demand. Defaults to
/// failing both; passthrough goes to an inner `MemoryStorage`.
pub struct FailingStorage {
    inner: MemoryStorage,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl FailingStorage {
    pub fn new() -> Self {
        FailingStorage {
            inner: MemoryStorage::new(),
            fail_reads: Cell::new(true),
            fail_writes: Cell::new(true),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

#[async_trait(?Send)]
impl Storage for FailingStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, TriageError> {
        if self.fail_reads.get() {
            return Err(TriageError::Persistence("simulated read failure".to_string()));
        }
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), TriageError> {
        if self.fail_writes.get() {
            return Err(TriageError::Persistence("simulated write failure".to_string()));
        }
        self.inner.set_item(key, value).await
    }
}
