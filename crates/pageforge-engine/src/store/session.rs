//! Page hierarchy operations as the editing surface sees them.
//!
//! [`EditorSession`] wraps the raw [`DocumentStore`] operations with the one
//! piece of choreography the store itself does not know about: when the user
//! switches pages, the outgoing page's transient block sequence (owned by the
//! editing surface until that moment) must be flushed into the page entity
//! before the pointer moves.

use crate::models::{Block, Page, PageId};
use crate::store::{DocumentStore, StoreError};

/// A single editing session over one document store.
#[derive(Debug)]
pub struct EditorSession {
    store: DocumentStore,
}

impl EditorSession {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn into_store(self) -> DocumentStore {
        self.store
    }

    /// Creates a root page and switches to it.
    pub fn create_page(&mut self, title: &str) -> Result<PageId, StoreError> {
        let id = self.store.create_page(title, None)?;
        self.store.set_active(&id)?;
        Ok(id)
    }

    /// Creates a child page under the active page and switches to it.
    pub fn create_subpage(&mut self, title: &str) -> Result<PageId, StoreError> {
        let parent = self.store.active_id().clone();
        let id = self.store.create_page(title, Some(&parent))?;
        self.store.set_active(&id)?;
        Ok(id)
    }

    pub fn rename_page(&mut self, id: &PageId, title: &str) -> Result<(), StoreError> {
        self.store.rename_page(id, title)
    }

    /// Deletes a page with its whole subtree. Confirmation is the caller's
    /// concern; the session only enforces the store invariants.
    pub fn delete_page(&mut self, id: &PageId) -> Result<usize, StoreError> {
        self.store.delete_page(id)
    }

    /// Switches the active page, first flushing the outgoing page's current
    /// block sequence into the store.
    pub fn switch_to(
        &mut self,
        target: &PageId,
        outgoing_blocks: Vec<Block>,
    ) -> Result<&Page, StoreError> {
        if !self.store.contains(target) {
            return Err(StoreError::PageNotFound(target.clone()));
        }
        let outgoing = self.store.active_id().clone();
        self.store.replace_page_blocks(&outgoing, outgoing_blocks)?;
        self.store.set_active(target)?;
        Ok(self.store.active_page())
    }
}
