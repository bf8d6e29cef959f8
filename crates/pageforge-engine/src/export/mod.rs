//! HTML export: one self-contained document per page.
//!
//! Exported markup is both a presentation artifact and a wire format: every
//! block carries a `data-block-type` attribute, which is what makes lossless
//! re-import possible. Export never fails for a structurally valid tree;
//! missing payload data renders as documented defaults or placeholders.

pub mod assets;
mod blocks;
pub mod embed;

pub use embed::convert_to_embed_url;

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::models::Page;
use crate::store::DocumentStore;

pub(crate) use blocks::collect_headings;

/// Rendering state threaded through one page export.
pub(crate) struct ExportContext<'a> {
    pub store: &'a DocumentStore,
    pub page: &'a Page,
    heading_counter: usize,
    live_code_counter: usize,
}

impl<'a> ExportContext<'a> {
    fn new(store: &'a DocumentStore, page: &'a Page) -> Self {
        Self {
            store,
            page,
            heading_counter: 0,
            live_code_counter: 0,
        }
    }

    /// Next `heading-<n>` anchor, assigned in document order (pre-order
    /// through nested toggles) and reset per page.
    pub(crate) fn next_heading_anchor(&mut self) -> String {
        let anchor = format!("heading-{}", self.heading_counter);
        self.heading_counter += 1;
        anchor
    }

    /// Per-export unique index for live-code containers, so inline scripts of
    /// sibling blocks cannot collide.
    pub(crate) fn next_live_code_index(&mut self) -> usize {
        let index = self.live_code_counter;
        self.live_code_counter += 1;
        index
    }
}

/// Renders a complete HTML document for one page.
///
/// `standalone` exports omit the page-tree navigation sidebar; multi-page
/// archive exports include it so pages link to each other.
pub fn export_page(page: &Page, store: &DocumentStore, standalone: bool) -> String {
    let mut ctx = ExportContext::new(store, page);

    let mut body = String::new();
    if page.content.is_empty() {
        body.push_str("<div class=\"empty-page\">This page is empty.</div>");
    } else {
        for block in &page.content {
            body.push_str(&blocks::render_block(block, &mut ctx));
        }
    }

    let nav = if standalone {
        String::new()
    } else {
        render_navigation(store)
    };

    let cover = match &page.cover_image_uri {
        Some(uri) if !uri.is_empty() => format!(
            "<div class=\"cover-area\"><img src=\"{}\" class=\"cover-image\" alt=\"Page cover\"></div>",
            encode_double_quoted_attribute(uri)
        ),
        _ => String::new(),
    };

    let breadcrumb = if page.is_root() {
        String::new()
    } else {
        format!(
            "<div class=\"breadcrumb\">{}</div>",
            render_breadcrumb(page, store)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{stylesheet}">
</head>
<body>
    <div class="exported-app">
        {nav}
        <main class="exported-main">
            <div class="page-header">
                {cover}
                <div class="title-section">
                    <span class="page-emoji">{emoji}</span>
                    <h1 class="page-title">{title}</h1>
                </div>
                {breadcrumb}
            </div>
            <div class="page-content">
{body}
            </div>
        </main>
    </div>
    <script src="{script}"></script>
</body>
</html>
"#,
        title = encode_text(&page.title),
        stylesheet = assets::STYLESHEET_NAME,
        emoji = encode_text(page.emoji.as_deref().unwrap_or("\u{1F60A}")),
        nav = nav,
        cover = cover,
        breadcrumb = breadcrumb,
        body = body,
        script = assets::SCRIPT_NAME,
    )
}

/// Export filename for a page title: lowercased, every byte outside
/// `[a-z0-9_-]` replaced by `_`, with the `.html` extension.
pub fn export_file_name(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            stem.push(ch.to_ascii_lowercase());
        } else {
            stem.push('_');
        }
    }
    format!("{stem}.html")
}

fn render_breadcrumb(page: &Page, store: &DocumentStore) -> String {
    let mut ancestors = Vec::new();
    let mut cursor = page.parent_id.as_ref();
    while let Some(id) = cursor {
        match store.get_page(id) {
            Ok(parent) => {
                ancestors.push(parent);
                cursor = parent.parent_id.as_ref();
            }
            Err(_) => break,
        }
    }
    ancestors.reverse();

    let mut out = String::new();
    for ancestor in ancestors {
        write!(
            out,
            "<a href=\"{}\">{}</a><span class=\"breadcrumb-sep\"> / </span>",
            encode_double_quoted_attribute(&export_file_name(&ancestor.title)),
            encode_text(&ancestor.title)
        )
        .expect("writing to string");
    }
    write!(
        out,
        "<span class=\"breadcrumb-current\">{}</span>",
        encode_text(&page.title)
    )
    .expect("writing to string");
    out
}

fn render_navigation(store: &DocumentStore) -> String {
    fn render_nav_tree(page: &Page, level: usize, store: &DocumentStore, out: &mut String) {
        let class = if level > 0 {
            "nav-item nav-subitem"
        } else {
            "nav-item"
        };
        let emoji = page
            .emoji
            .as_deref()
            .map(|e| format!("{e} "))
            .unwrap_or_default();
        write!(
            out,
            "<li class=\"{class}\"><a href=\"{}\" class=\"nav-link\">{}{}</a>",
            encode_double_quoted_attribute(&export_file_name(&page.title)),
            encode_text(&emoji),
            encode_text(&page.title)
        )
        .expect("writing to string");
        if !page.children.is_empty() {
            out.push_str("<ul class=\"nav-submenu\">");
            for child in &page.children {
                if let Ok(child_page) = store.get_page(child) {
                    render_nav_tree(child_page, level + 1, store, out);
                }
            }
            out.push_str("</ul>");
        }
        out.push_str("</li>");
    }

    let mut items = String::new();
    for root in store.root_pages() {
        render_nav_tree(root, 0, store, &mut items);
    }
    format!(
        concat!(
            "<nav class=\"exported-nav\">",
            "<div class=\"nav-header\"><h2>Pages</h2></div>",
            "<ul class=\"nav-menu\">{}</ul>",
            "</nav>"
        ),
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Page};
    use crate::store::DocumentStore;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn store_with_blocks(blocks: Vec<Block>) -> DocumentStore {
        let mut store = DocumentStore::new("Test Page");
        let id = store.active_id().clone();
        store.replace_page_blocks(&id, blocks).unwrap();
        store
    }

    #[rstest]
    #[case("My Page", "my_page.html")]
    #[case("Notes-2024_draft", "notes-2024_draft.html")]
    #[case("Caf\u{e9} & More!", "caf____more_.html")]
    #[case("UPPER", "upper.html")]
    fn file_names_are_sanitized(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(export_file_name(title), expected);
    }

    #[test]
    fn heading_anchors_are_assigned_in_preorder() {
        let store = store_with_blocks(vec![
            Block::heading(1, "first"),
            Block::toggle("t", vec![Block::heading(2, "second")]),
            Block::heading(3, "third"),
        ]);
        let html = export_page(store.active_page(), &store, true);

        assert!(html.contains("<h1 id=\"heading-0\""));
        assert!(html.contains("<h2 id=\"heading-1\""));
        assert!(html.contains("<h3 id=\"heading-2\""));
    }

    #[test]
    fn toc_anchors_match_heading_ids() {
        let store = store_with_blocks(vec![
            Block::table_of_contents(),
            Block::heading(1, "Intro"),
            Block::toggle("more", vec![Block::heading(2, "Hidden")]),
        ]);
        let html = export_page(store.active_page(), &store, true);

        assert!(html.contains("href=\"#heading-0\">Intro"));
        assert!(html.contains("href=\"#heading-1\">Hidden"));
        assert!(html.contains("id=\"heading-0\""));
        assert!(html.contains("id=\"heading-1\""));
    }

    #[test]
    fn list_markers_appear_in_export() {
        let store = store_with_blocks(vec![Block::unordered_list(vec![
            crate::models::ListItem::new(0, "A"),
            crate::models::ListItem::new(1, "B"),
            crate::models::ListItem::new(0, "C"),
        ])]);
        let html = export_page(store.active_page(), &store, true);

        let markers: Vec<&str> = html
            .match_indices("exported-list-marker ul-marker\">")
            .map(|(at, token)| {
                let start = at + token.len();
                &html[start..html[start..].find('<').unwrap() + start]
            })
            .collect();
        assert_eq!(markers, vec!["•", "◦", "•"]);
    }

    #[test]
    fn standalone_export_has_no_navigation() {
        let store = store_with_blocks(vec![Block::paragraph("hi")]);
        let standalone = export_page(store.active_page(), &store, true);
        let archived = export_page(store.active_page(), &store, false);

        assert!(!standalone.contains("exported-nav"));
        assert!(archived.contains("exported-nav"));
    }

    #[test]
    fn non_root_page_gets_breadcrumb() {
        let mut store = DocumentStore::new("Root");
        let root = store.active_id().clone();
        let child = store.create_page("Child", Some(&root)).unwrap();
        let html = export_page(store.get_page(&child).unwrap(), &store, true);

        assert!(html.contains("class=\"breadcrumb\""));
        assert!(html.contains("href=\"root.html\">Root</a>"));
        assert!(html.contains("<span class=\"breadcrumb-current\">Child</span>"));
    }

    #[test]
    fn index_block_lists_page_tree() {
        let mut store = DocumentStore::new("Root");
        let root = store.active_id().clone();
        store.create_page("Child", Some(&root)).unwrap();
        store
            .replace_page_blocks(&root, vec![Block::index()])
            .unwrap();
        let html = export_page(store.get_page(&root).unwrap(), &store, true);

        assert!(html.contains("<div class=\"index-item\"><a href=\"root.html\">Root</a></div>"));
        assert!(
            html.contains("<div class=\"index-item subpage\"><a href=\"child.html\">Child</a></div>")
        );
    }

    #[test]
    fn sibling_live_code_blocks_get_distinct_ids() {
        let live = |js: &str| {
            Block::new(
                crate::models::BlockPayload::LiveCode {
                    html_source: String::new(),
                    css_source: String::new(),
                    js_source: js.to_string(),
                    run_mode: Default::default(),
                    auto_run: false,
                    width: "100%".into(),
                    height: "400px".into(),
                },
                "",
            )
        };
        let store = store_with_blocks(vec![live("1"), live("2")]);
        let html = export_page(store.active_page(), &store, true);

        assert!(html.contains("id=\"live-code-0\""));
        assert!(html.contains("id=\"live-code-1\""));
    }

    #[test]
    fn title_is_escaped_in_head() {
        let mut store = DocumentStore::new("A <b> & title");
        let id = store.active_id().clone();
        store
            .replace_page_blocks(&id, vec![Block::paragraph("x")])
            .unwrap();
        let html = export_page(store.active_page(), &store, true);
        assert!(html.contains("<title>A &lt;b&gt; &amp; title</title>"));
    }

    #[test]
    fn empty_page_renders_placeholder() {
        let mut page = Page::new("Empty", None);
        page.content.clear();
        let store = DocumentStore::new("Other");
        let html = export_page(&page, &store, true);
        assert!(html.contains("This page is empty."));
    }
}
