//! HTML import.
//!
//! Documents exported by this crate round-trip losslessly through their
//! `data-block-type` attributes. Anything else is imported on a best-effort
//! basis: recognised tags become their closest block variant, the rest is kept
//! as paragraphs with the original inline markup intact.

pub mod dom;

mod convert;
mod page;

pub use page::{import_page, import_pages};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The document contained nothing parseable at all.
    #[error("no importable content found in `{0}`")]
    NoContentRoot(String),
}
