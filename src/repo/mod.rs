//! In-memory page repository
use crate::domain::PhotoTypePage;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Page cache keyed by page number.
///
/// Unbounded and never invalidated on its own; entries live until `clear`
/// or until the owning service is dropped. There is no check-then-insert:
/// concurrent misses on the same page both insert and the last write wins.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: Mutex<HashMap<u32, PhotoTypePage>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: u32) -> Option<PhotoTypePage> {
        self.pages.lock().get(&page).cloned()
    }

    pub fn insert(&self, page: u32, value: PhotoTypePage) {
        self.pages.lock().insert(page, value);
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.lock().contains_key(&page)
    }

    pub fn clear(&self) {
        self.pages.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }
}
