pub mod export;
pub mod import;
pub mod io;
pub mod markers;
pub mod models;
pub mod persist;
pub mod store;

// Re-export key types for easier usage
pub use export::{convert_to_embed_url, export_file_name, export_page};
pub use import::{ImportError, import_page, import_pages};
pub use io::IoError;
pub use markers::{MarkerKind, NumberStyle, compute_markers, list_markers};
pub use models::*;
pub use persist::PersistedDocument;
pub use store::{DocumentStore, StoreError, session::EditorSession};
