use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::block::{Block, BlockId, BlockPayload};

/// Stable identity of a page; doubles as the key of the persisted document map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Errors from block-level container operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("cannot delete the only block of a page")]
    LastBlock,
    #[error("no block with id {0}")]
    NotFound(BlockId),
}

/// A titled document: an ordered block sequence plus its position in the page
/// forest (`parent_id` up, `children` down, kept mutually consistent by the
/// store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_uri: Option<String>,
    #[serde(default)]
    pub parent_id: Option<PageId>,
    #[serde(default)]
    pub children: Vec<PageId>,
    #[serde(default)]
    pub content: Vec<Block>,
}

impl Page {
    /// Creates a page holding one default paragraph block, the minimum
    /// content a page container may hold.
    pub fn new(title: impl Into<String>, parent_id: Option<PageId>) -> Self {
        Self {
            id: PageId::generate(),
            title: title.into(),
            emoji: None,
            cover_image_uri: None,
            parent_id,
            children: Vec::new(),
            content: vec![Block::paragraph("")],
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Finds a block by id anywhere in the page, descending into toggles.
    pub fn find_block(&self, id: BlockId) -> Option<&Block> {
        find_in(&self.content, id)
    }

    pub fn find_block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        find_in_mut(&mut self.content, id)
    }

    /// Inserts a block at `index` in the top-level sequence (clamped to the
    /// end).
    pub fn insert_block(&mut self, index: usize, block: Block) {
        let index = index.min(self.content.len());
        self.content.insert(index, block);
    }

    /// Appends a child block to the toggle identified by `toggle_id`.
    pub fn insert_into_toggle(&mut self, toggle_id: BlockId, block: Block) -> Result<(), BlockError> {
        match self.find_block_mut(toggle_id) {
            Some(Block {
                payload: BlockPayload::Toggle { nested_blocks },
                ..
            }) => {
                nested_blocks.push(block);
                Ok(())
            }
            _ => Err(BlockError::NotFound(toggle_id)),
        }
    }

    /// Removes a block by id, wherever it lives.
    ///
    /// Deleting the last top-level block is refused: a page always holds at
    /// least one block. A toggle losing its last nested block is fine; it
    /// collapses to a leaf toggle.
    pub fn delete_block(&mut self, id: BlockId) -> Result<Block, BlockError> {
        if let Some(index) = self.content.iter().position(|b| b.id == id) {
            if self.content.len() == 1 {
                return Err(BlockError::LastBlock);
            }
            return Ok(self.content.remove(index));
        }
        remove_nested(&mut self.content, id).ok_or(BlockError::NotFound(id))
    }

    /// Visits every block in document order, descending into toggles before
    /// moving to the next sibling (pre-order).
    pub fn walk_blocks<'a>(&'a self, visit: &mut impl FnMut(&'a Block)) {
        walk(&self.content, visit);
    }
}

fn walk<'a>(blocks: &'a [Block], visit: &mut impl FnMut(&'a Block)) {
    for block in blocks {
        visit(block);
        walk(block.nested(), visit);
    }
}

fn find_in(blocks: &[Block], id: BlockId) -> Option<&Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_in(block.nested(), id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let BlockPayload::Toggle { nested_blocks } = &mut block.payload
            && let Some(found) = find_in_mut(nested_blocks, id)
        {
            return Some(found);
        }
    }
    None
}

fn remove_nested(blocks: &mut [Block], id: BlockId) -> Option<Block> {
    for block in blocks {
        if let BlockPayload::Toggle { nested_blocks } = &mut block.payload {
            if let Some(index) = nested_blocks.iter().position(|b| b.id == id) {
                return Some(nested_blocks.remove(index));
            }
            if let Some(found) = remove_nested(nested_blocks, id) {
                return Some(found);
            }
        }
    }
    None
}
