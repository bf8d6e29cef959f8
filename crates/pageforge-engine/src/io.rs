//! Filesystem boundary: document files, export directories, and archives.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::export::{assets, export_file_name, export_page};
use crate::import::{ImportError, import_page, import_pages};
use crate::models::{Page, PageId};
use crate::persist::PersistedDocument;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Writes the whole store to a JSON document file.
pub fn save_document(store: &DocumentStore, path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&store.to_persisted())?;
    fs::write(path, json)?;
    Ok(())
}

/// Loads a store from a JSON document file.
pub fn load_document(path: &Path) -> Result<DocumentStore, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    let doc: PersistedDocument = serde_json::from_str(&json)?;
    Ok(DocumentStore::from_persisted(doc))
}

fn write_shared_assets(dir: &Path) -> Result<(), IoError> {
    fs::write(dir.join(assets::STYLESHEET_NAME), assets::STYLESHEET)?;
    fs::write(dir.join(assets::SCRIPT_NAME), assets::SCRIPT)?;
    Ok(())
}

/// Exports one page as a standalone HTML file into `dir`, alongside the
/// shared stylesheet and script. Returns the page file's path.
pub fn export_single_page(
    store: &DocumentStore,
    page_id: &PageId,
    dir: &Path,
) -> Result<PathBuf, IoError> {
    let page = store.get_page(page_id)?;
    fs::create_dir_all(dir)?;
    write_shared_assets(dir)?;

    let path = dir.join(export_file_name(&page.title));
    fs::write(&path, export_page(page, store, true))?;
    Ok(path)
}

/// Exports every page into `dir` with cross-page navigation, alongside the
/// shared assets. Returns the written page paths in store order.
pub fn export_all_pages(store: &DocumentStore, dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    fs::create_dir_all(dir)?;
    write_shared_assets(dir)?;

    let mut written = Vec::with_capacity(store.len());
    for page in store.pages_in_order() {
        let path = dir.join(export_file_name(&page.title));
        fs::write(&path, export_page(page, store, false))?;
        written.push(path);
    }
    Ok(written)
}

/// Exports every page plus the shared assets into one zip archive.
pub fn export_archive(store: &DocumentStore, path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();

    for page in store.pages_in_order() {
        writer.start_file(export_file_name(&page.title), options)?;
        writer.write_all(export_page(page, store, false).as_bytes())?;
    }
    writer.start_file(assets::STYLESHEET_NAME, options)?;
    writer.write_all(assets::STYLESHEET.as_bytes())?;
    writer.start_file(assets::SCRIPT_NAME, options)?;
    writer.write_all(assets::SCRIPT.as_bytes())?;
    writer.finish()?;
    Ok(())
}

/// Imports one HTML file as a page.
pub fn import_html_file(path: &Path) -> Result<Page, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let html = fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(import_page(&html, &file_name)?)
}

/// Imports a set of HTML files, rebuilding parent/child links from their
/// file names.
pub fn import_html_files(paths: &[PathBuf]) -> Result<Vec<Page>, IoError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            return Err(IoError::NotFound(path.clone()));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.push((name, fs::read_to_string(path)?));
    }
    Ok(import_pages(&files)?)
}

/// Imports every HTML file found in a zip archive, rebuilding parent/child
/// links from the entry names. Non-HTML entries (assets) are ignored.
pub fn import_archive(path: &Path) -> Result<Vec<Page>, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if !(name.ends_with(".html") || name.ends_with(".htm")) {
            continue;
        }
        // Entry names may carry directory prefixes; hierarchy is recovered
        // from the bare file name.
        let bare = name.rsplit('/').next().unwrap_or(&name).to_string();
        let mut html = String::new();
        entry.read_to_string(&mut html)?;
        files.push((bare, html));
    }
    Ok(import_pages(&files)?)
}
