//! Whole-file import: HTML documents in, pages out.

use super::ImportError;
use super::convert::block_from_element;
use super::dom::{Element, parse_elements};
use crate::models::Page;

/// Default emoji for pages created by import.
const IMPORTED_PAGE_EMOJI: &str = "\u{1F4C4}";

/// Imports one HTML document as a page.
///
/// The page title comes from the document itself when possible (a
/// `.page-title` element, then `<title>`), falling back to the file name.
pub fn import_page(html: &str, file_name: &str) -> Result<Page, ImportError> {
    let roots = parse_elements(html);
    if roots.is_empty() {
        return Err(ImportError::NoContentRoot(file_name.to_string()));
    }

    let title = find_in(&roots, &|el| el.has_class("page-title"))
        .map(|el| el.text().trim().to_string())
        .filter(|title| !title.is_empty())
        .or_else(|| {
            find_in(&roots, &|el| el.tag == "title")
                .map(|el| el.text().trim().to_string())
                .filter(|title| !title.is_empty())
        })
        .unwrap_or_else(|| file_stem(file_name).to_string());

    let emoji = find_in(&roots, &|el| el.has_class("page-emoji"))
        .map(|el| el.text().trim().to_string())
        .filter(|emoji| !emoji.is_empty())
        .unwrap_or_else(|| IMPORTED_PAGE_EMOJI.to_string());

    let cover_image_uri = find_in(&roots, &|el| el.has_class("cover-image"))
        .and_then(|img| img.attr("src"))
        .map(String::from);

    let blocks: Vec<_> = content_root_children(&roots)
        .into_iter()
        .filter_map(block_from_element)
        .collect();

    let mut page = Page::new(&title, None);
    page.emoji = Some(emoji);
    page.cover_image_uri = cover_image_uri;
    if !blocks.is_empty() {
        page.content = blocks;
    }
    Ok(page)
}

/// Imports a set of `(file name, html)` documents and reconstructs the page
/// hierarchy from file-name prefixes: `notes_detail.html` becomes a child of
/// `notes.html` when both are present. The longest matching prefix wins;
/// pages with no matching prefix stay roots.
///
/// Pages come back in input order, each linked to its parent by id.
pub fn import_pages(files: &[(String, String)]) -> Result<Vec<Page>, ImportError> {
    let mut pages = Vec::with_capacity(files.len());
    for (name, html) in files {
        pages.push(import_page(html, name)?);
    }

    let stems: Vec<String> = files
        .iter()
        .map(|(name, _)| file_stem(name).to_string())
        .collect();

    for child_index in 0..pages.len() {
        let Some(parent_index) = parent_by_prefix(&stems, child_index) else {
            continue;
        };
        let child_id = pages[child_index].id.clone();
        let parent_id = pages[parent_index].id.clone();
        pages[child_index].parent_id = Some(parent_id);
        pages[parent_index].children.push(child_id);
    }
    Ok(pages)
}

/// Longest prefix of `stems[child]` (cut at `_` or `-`) that names another
/// file's stem.
fn parent_by_prefix(stems: &[String], child: usize) -> Option<usize> {
    let stem = &stems[child];
    let cuts: Vec<usize> = stem
        .char_indices()
        .filter(|(_, ch)| *ch == '_' || *ch == '-')
        .map(|(at, _)| at)
        .collect();
    for cut in cuts.into_iter().rev() {
        let prefix = &stem[..cut];
        if let Some(found) = stems
            .iter()
            .position(|candidate| candidate == prefix && candidate != stem)
            && found != child
        {
            return Some(found);
        }
    }
    None
}

fn file_stem(file_name: &str) -> &str {
    file_name
        .strip_suffix(".html")
        .or_else(|| file_name.strip_suffix(".htm"))
        .unwrap_or(file_name)
}

fn find_in<'a>(roots: &'a [Element], pred: &impl Fn(&Element) -> bool) -> Option<&'a Element> {
    for root in roots {
        if pred(root) {
            return Some(root);
        }
        if let Some(found) = root.find(pred) {
            return Some(found);
        }
    }
    None
}

/// The elements to convert into blocks, from the most specific content
/// container the document offers.
fn content_root_children<'a>(roots: &'a [Element]) -> Vec<&'a Element> {
    for class in ["page-content", "editor-content", "main-content"] {
        if let Some(root) = find_in(roots, &|el| el.has_class(class)) {
            return root.child_elements().collect();
        }
    }
    if let Some(body) = find_in(roots, &|el| el.tag == "body") {
        return body.child_elements().collect();
    }
    roots.iter().collect()
}
