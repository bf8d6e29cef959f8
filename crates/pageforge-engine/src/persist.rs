//! The persisted form of the document: one JSON-encodable value holding the
//! entire page/block graph.
//!
//! Every block record is stored verbatim, including recursively nested toggle
//! children at unbounded depth. Index and table-of-contents blocks carry no
//! derived content here; their output is regenerated from live store state at
//! render/export time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Page, PageId};
use crate::store::DocumentStore;

/// JSON object mapping page id to its page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedDocument(pub BTreeMap<PageId, Page>);

impl DocumentStore {
    /// Snapshots the full store into its persistable form.
    pub fn to_persisted(&self) -> PersistedDocument {
        PersistedDocument(
            self.pages_in_order()
                .map(|page| (page.id.clone(), page.clone()))
                .collect(),
        )
    }

    /// Rebuilds a store from a persisted document.
    ///
    /// Page order is reconstructed as a pre-order walk of the page forest
    /// (roots in map order, then their children), and hierarchy
    /// inconsistencies are repaired rather than rejected. Block ids are
    /// session-local and reassigned here.
    pub fn from_persisted(doc: PersistedDocument) -> Self {
        let PersistedDocument(pages) = doc;
        let mut ordered = Vec::with_capacity(pages.len());
        let mut placed: Vec<PageId> = Vec::new();

        fn place(
            id: &PageId,
            pages: &BTreeMap<PageId, Page>,
            ordered: &mut Vec<Page>,
            placed: &mut Vec<PageId>,
        ) {
            if placed.contains(id) {
                return;
            }
            let Some(page) = pages.get(id) else { return };
            placed.push(id.clone());
            ordered.push(page.clone());
            for child in &page.children {
                place(child, pages, ordered, placed);
            }
        }

        for (id, page) in &pages {
            if page.parent_id.is_none() {
                place(id, &pages, &mut ordered, &mut placed);
            }
        }
        // Pages whose parent chain is broken still need to survive the load.
        for id in pages.keys() {
            place(id, &pages, &mut ordered, &mut placed);
        }

        DocumentStore::from_pages(ordered, None)
    }
}
