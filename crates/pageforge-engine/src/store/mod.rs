//! In-memory document store: every page of the workspace plus the
//! current-page pointer.
//!
//! All operations are synchronous in-memory mutations; on success the store is
//! always left consistent (`parent_id`/`children` mutually agree, the active
//! pointer references an existing page). Failed operations change nothing.

pub mod session;

use std::collections::HashMap;

use crate::models::{Block, BlockError, BlockId, BlockPayload, Page, PageId};

/// Errors from page- and block-level store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("cannot delete the last remaining page")]
    LastPage,
    #[error("no page with id {0}")]
    PageNotFound(PageId),
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// The single mutable document store of a running instance.
///
/// Pages live in a map keyed by id; `order` preserves creation order (it
/// drives index rendering and multi-page export). Block ids come from a
/// store-owned monotonic counter, so they stay unique across every container.
#[derive(Debug)]
pub struct DocumentStore {
    pages: HashMap<PageId, Page>,
    order: Vec<PageId>,
    active: PageId,
    next_block_id: u64,
}

impl DocumentStore {
    /// Creates a store holding one empty root page, which becomes active.
    pub fn new(initial_title: impl Into<String>) -> Self {
        let mut page = Page::new(initial_title, None);
        let id = page.id.clone();
        let mut store = Self {
            pages: HashMap::new(),
            order: Vec::new(),
            active: id.clone(),
            next_block_id: 1,
        };
        store.assign_block_ids(&mut page.content);
        store.pages.insert(id.clone(), page);
        store.order.push(id);
        store
    }

    /// Rebuilds a store from already-linked pages, repairing hierarchy
    /// inconsistencies (orphaned `parent_id`s, stale or missing `children`
    /// entries) rather than rejecting them.
    pub(crate) fn from_pages(pages_in_order: Vec<Page>, active: Option<PageId>) -> Self {
        let mut store = Self {
            pages: HashMap::new(),
            order: Vec::new(),
            active: PageId::from(""),
            next_block_id: 1,
        };
        for mut page in pages_in_order {
            store.assign_block_ids(&mut page.content);
            store.order.push(page.id.clone());
            store.pages.insert(page.id.clone(), page);
        }
        if store.pages.is_empty() {
            let fallback = Page::new("Home", None);
            store.active = fallback.id.clone();
            store.order.push(fallback.id.clone());
            store.pages.insert(fallback.id.clone(), fallback);
        }
        store.repair_hierarchy();
        store.active = match active {
            Some(id) if store.pages.contains_key(&id) => id,
            _ => store.order[0].clone(),
        };
        store
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.pages.contains_key(id)
    }

    pub fn get_page(&self, id: &PageId) -> Result<&Page, StoreError> {
        self.pages
            .get(id)
            .ok_or_else(|| StoreError::PageNotFound(id.clone()))
    }

    pub fn get_page_mut(&mut self, id: &PageId) -> Result<&mut Page, StoreError> {
        self.pages
            .get_mut(id)
            .ok_or_else(|| StoreError::PageNotFound(id.clone()))
    }

    /// Pages in creation order.
    pub fn pages_in_order(&self) -> impl Iterator<Item = &Page> {
        self.order.iter().filter_map(|id| self.pages.get(id))
    }

    /// Root pages (no parent) in creation order.
    pub fn root_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages_in_order().filter(|p| p.is_root())
    }

    pub fn active_id(&self) -> &PageId {
        &self.active
    }

    pub fn active_page(&self) -> &Page {
        // Invariant: the active pointer always references an existing page.
        &self.pages[&self.active]
    }

    pub fn set_active(&mut self, id: &PageId) -> Result<(), StoreError> {
        if !self.pages.contains_key(id) {
            return Err(StoreError::PageNotFound(id.clone()));
        }
        self.active = id.clone();
        Ok(())
    }

    /// Creates a page with default content, registering it in the parent's
    /// `children` when a parent is given.
    pub fn create_page(
        &mut self,
        title: impl Into<String>,
        parent_id: Option<&PageId>,
    ) -> Result<PageId, StoreError> {
        if let Some(parent) = parent_id
            && !self.pages.contains_key(parent)
        {
            return Err(StoreError::PageNotFound(parent.clone()));
        }

        let mut page = Page::new(title, parent_id.cloned());
        self.assign_block_ids(&mut page.content);
        let id = page.id.clone();
        if let Some(parent) = parent_id {
            // Checked above; the page graph stays a forest because new pages
            // only ever attach under existing ones.
            self.pages
                .get_mut(parent)
                .expect("parent existence checked")
                .children
                .push(id.clone());
        }
        self.pages.insert(id.clone(), page);
        self.order.push(id.clone());
        Ok(id)
    }

    /// Deletes a page and all of its descendants (pre-order cascade),
    /// returning how many pages were removed.
    ///
    /// Refused when the page is the only one left. If the active page is
    /// among the deleted, an arbitrary survivor becomes active.
    pub fn delete_page(&mut self, id: &PageId) -> Result<usize, StoreError> {
        if !self.pages.contains_key(id) {
            return Err(StoreError::PageNotFound(id.clone()));
        }
        if self.pages.len() == 1 {
            return Err(StoreError::LastPage);
        }

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);

        // Cascading deletion could also empty the store if this subtree is
        // everything; refuse that the same way.
        if doomed.len() == self.pages.len() {
            return Err(StoreError::LastPage);
        }

        let parent_id = self.pages[id].parent_id.clone();
        if let Some(parent_id) = parent_id
            && let Some(parent) = self.pages.get_mut(&parent_id)
        {
            parent.children.retain(|child| child != id);
        }

        for victim in &doomed {
            self.pages.remove(victim);
            self.order.retain(|p| p != victim);
        }

        if !self.pages.contains_key(&self.active) {
            self.active = self.order[0].clone();
        }
        Ok(doomed.len())
    }

    pub fn rename_page(&mut self, id: &PageId, title: impl Into<String>) -> Result<(), StoreError> {
        self.get_page_mut(id)?.title = title.into();
        Ok(())
    }

    /// Registers a batch of imported pages, assigning fresh block ids.
    ///
    /// All pages enter the store before any links are resolved, so a child
    /// may precede its parent in the batch; parent/child references into the
    /// batch or into already-present pages survive, anything else is cleaned
    /// up.
    pub fn register_imported_pages(&mut self, pages: Vec<Page>) {
        for mut page in pages {
            self.assign_block_ids(&mut page.content);
            self.order.push(page.id.clone());
            self.pages.insert(page.id.clone(), page);
        }
        self.repair_hierarchy();
    }

    /// Registers a single imported page.
    pub fn register_imported_page(&mut self, page: Page) {
        self.register_imported_pages(vec![page]);
    }

    // --- block operations -------------------------------------------------

    /// Inserts a block at `index` of the page's top-level sequence, returning
    /// its assigned id.
    pub fn insert_block(
        &mut self,
        page_id: &PageId,
        index: usize,
        mut block: Block,
    ) -> Result<BlockId, StoreError> {
        self.assign_block_ids(std::slice::from_mut(&mut block));
        let id = block.id;
        self.get_page_mut(page_id)?.insert_block(index, block);
        Ok(id)
    }

    /// Appends a block to a toggle's child sequence.
    pub fn insert_block_into_toggle(
        &mut self,
        page_id: &PageId,
        toggle_id: BlockId,
        mut block: Block,
    ) -> Result<BlockId, StoreError> {
        self.assign_block_ids(std::slice::from_mut(&mut block));
        let id = block.id;
        self.get_page_mut(page_id)?
            .insert_into_toggle(toggle_id, block)?;
        Ok(id)
    }

    pub fn delete_block(&mut self, page_id: &PageId, id: BlockId) -> Result<Block, StoreError> {
        Ok(self.get_page_mut(page_id)?.delete_block(id)?)
    }

    /// Mutates a block in place through the given closure.
    pub fn update_block(
        &mut self,
        page_id: &PageId,
        id: BlockId,
        mutate: impl FnOnce(&mut Block),
    ) -> Result<(), StoreError> {
        let block = self
            .get_page_mut(page_id)?
            .find_block_mut(id)
            .ok_or(BlockError::NotFound(id))?;
        mutate(block);
        Ok(())
    }

    /// Replaces a page's entire block sequence (the flush point when the
    /// editing surface hands back its transient state). An empty sequence is
    /// replaced with one default paragraph.
    pub fn replace_page_blocks(
        &mut self,
        page_id: &PageId,
        mut blocks: Vec<Block>,
    ) -> Result<(), StoreError> {
        if blocks.is_empty() {
            blocks.push(Block::paragraph(""));
        }
        self.assign_block_ids(&mut blocks);
        self.get_page_mut(page_id)?.content = blocks;
        Ok(())
    }

    // --- internals --------------------------------------------------------

    fn assign_block_ids(&mut self, blocks: &mut [Block]) {
        for block in blocks {
            block.set_id(BlockId::new(self.next_block_id));
            self.next_block_id += 1;
            if let BlockPayload::Toggle { nested_blocks } = &mut block.payload {
                self.assign_block_ids(nested_blocks);
            }
        }
    }

    fn collect_subtree(&self, id: &PageId, out: &mut Vec<PageId>) {
        out.push(id.clone());
        if let Some(page) = self.pages.get(id) {
            for child in &page.children {
                if self.pages.contains_key(child) && !out.contains(child) {
                    self.collect_subtree(child, out);
                }
            }
        }
    }

    fn repair_hierarchy(&mut self) {
        let known: Vec<PageId> = self.order.clone();

        // Drop parent links to missing pages.
        for id in &known {
            let parent = self.pages[id].parent_id.clone();
            if let Some(parent_id) = parent
                && !self.pages.contains_key(&parent_id)
            {
                self.pages
                    .get_mut(id)
                    .expect("id taken from order")
                    .parent_id = None;
            }
        }

        // Children lists: drop unknown ids and duplicates, then make sure
        // every parent_id is mirrored exactly once.
        for id in &known {
            let page = self.pages.get_mut(id).expect("id taken from order");
            let mut seen = Vec::new();
            page.children.retain(|child| {
                let keep = !seen.contains(child);
                seen.push(child.clone());
                keep
            });
        }
        for id in &known {
            self.pages
                .get_mut(id)
                .expect("id taken from order")
                .children
                .retain(|child| known.contains(child));
        }
        for id in &known {
            let parent = self.pages[id].parent_id.clone();
            if let Some(parent_id) = parent
                && let Some(parent) = self.pages.get_mut(&parent_id)
                && !parent.children.contains(id)
            {
                parent.children.push(id.clone());
            }
        }
        // Children entries whose page points at a different parent are stale.
        for id in &known {
            let children = self.pages[id].children.clone();
            let keep: Vec<PageId> = children
                .into_iter()
                .filter(|child| self.pages[child].parent_id.as_ref() == Some(id))
                .collect();
            self.pages.get_mut(id).expect("id taken from order").children = keep;
        }
    }
}
