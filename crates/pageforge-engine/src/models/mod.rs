pub mod block;
pub mod page;

pub use block::{
    Alignment, Block, BlockId, BlockPayload, CodeLanguage, LIST_CONTENT_TAG, ListItem, MediaType,
    RunMode,
};
pub use page::{BlockError, Page, PageId};
