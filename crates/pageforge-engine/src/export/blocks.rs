//! Fixed HTML shapes for each block variant.
//!
//! Every top-level block is wrapped in `<div class="block align-*"
//! data-block-type="...">` so the importer can later take the lossless
//! round-trip path. The inner shapes mirror what the editing surface renders,
//! minus anything interactive.

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

use super::{ExportContext, export_file_name};
use crate::markers::{MarkerKind, list_markers};
use crate::models::{Block, BlockPayload, ListItem, Page};

/// Renders one top-level block, wrapper included.
pub(crate) fn render_block(block: &Block, ctx: &mut ExportContext<'_>) -> String {
    format!(
        "<div class=\"block align-{}\" data-block-type=\"{}\">{}</div>",
        block.alignment.as_str(),
        block.type_name(),
        render_inner(block, ctx)
    )
}

fn render_inner(block: &Block, ctx: &mut ExportContext<'_>) -> String {
    match &block.payload {
        BlockPayload::Paragraph => {
            format!(
                "<div class=\"block-content align-{}\">{}</div>",
                block.alignment.as_str(),
                block.content
            )
        }
        BlockPayload::Heading1 | BlockPayload::Heading2 | BlockPayload::Heading3 => {
            let tag = match block.payload {
                BlockPayload::Heading1 => "h1",
                BlockPayload::Heading2 => "h2",
                _ => "h3",
            };
            let anchor = ctx.next_heading_anchor();
            format!(
                "<{tag} id=\"{anchor}\" class=\"align-{}\">{}</{tag}>",
                block.alignment.as_str(),
                block.content
            )
        }
        BlockPayload::UnorderedList { list_items } => {
            render_list(list_items, MarkerKind::Bullet, block)
        }
        BlockPayload::OrderedList { list_items } => {
            render_list(list_items, MarkerKind::Numbered, block)
        }
        BlockPayload::Toggle { nested_blocks } => render_toggle(block, nested_blocks, ctx),
        BlockPayload::Code { language } => {
            format!(
                concat!(
                    "<div class=\"code-block\" data-language=\"{lang}\">",
                    "<div class=\"code-header\"><span class=\"code-language\">{upper}</span></div>",
                    "<div class=\"code-content\"><pre><code class=\"language-{lang}\">{code}</code></pre></div>",
                    "</div>"
                ),
                lang = language.as_str(),
                upper = language.as_str().to_uppercase(),
                code = encode_text(&block.content)
            )
        }
        BlockPayload::Image {
            source_uri,
            alt_text,
            ..
        } => {
            if source_uri.is_empty() {
                media_placeholder("Image not loaded")
            } else {
                format!(
                    "<div class=\"media-block\"><div class=\"media-content\"><img src=\"{}\" alt=\"{}\"></div></div>",
                    encode_double_quoted_attribute(source_uri),
                    encode_double_quoted_attribute(alt_text.as_deref().unwrap_or(""))
                )
            }
        }
        BlockPayload::Video { source_uri, .. } => {
            if source_uri.is_empty() {
                media_placeholder("Video not loaded")
            } else {
                format!(
                    "<div class=\"media-block\"><div class=\"media-content\"><iframe src=\"{}\" allowfullscreen></iframe></div></div>",
                    encode_double_quoted_attribute(source_uri)
                )
            }
        }
        BlockPayload::Pdf { source_uri, .. } => {
            if source_uri.is_empty() {
                media_placeholder("PDF not loaded")
            } else {
                format!(
                    "<div class=\"media-block\"><div class=\"media-content\"><iframe src=\"{}\" type=\"application/pdf\"></iframe></div></div>",
                    encode_double_quoted_attribute(source_uri)
                )
            }
        }
        BlockPayload::Link { url, title } => {
            if url.is_empty() {
                media_placeholder("Link not configured")
            } else {
                let title = if title.is_empty() { url } else { title };
                format!(
                    concat!(
                        "<a href=\"{href}\" target=\"_blank\" class=\"link-block\">",
                        "<span class=\"link-title\">{title}</span>",
                        "<span class=\"link-url\">{url}</span>",
                        "</a>"
                    ),
                    href = encode_double_quoted_attribute(url),
                    title = encode_text(title),
                    url = encode_text(url)
                )
            }
        }
        BlockPayload::ExternalEmbed {
            source_url,
            width,
            height,
        } => {
            if source_url.is_empty() {
                media_placeholder("External page not configured")
            } else {
                format!(
                    concat!(
                        "<div class=\"external-block-export\" data-source-url=\"{url_attr}\" ",
                        "data-width=\"{width}\" data-height=\"{height}\" ",
                        "style=\"width: {width}; height: {height};\">",
                        "<div class=\"external-header-export\">External page: {url_text}</div>",
                        "<div class=\"external-content-export\">",
                        "<iframe src=\"{embed}\" frameborder=\"0\" allowfullscreen></iframe>",
                        "</div></div>"
                    ),
                    url_attr = encode_double_quoted_attribute(source_url),
                    width = encode_double_quoted_attribute(width),
                    height = encode_double_quoted_attribute(height),
                    url_text = encode_text(source_url),
                    embed = encode_double_quoted_attribute(&super::embed::convert_to_embed_url(
                        source_url
                    ))
                )
            }
        }
        BlockPayload::LiveCode {
            html_source,
            css_source,
            js_source,
            run_mode,
            auto_run,
            width,
            height,
        } => {
            let container = format!("live-code-{}", ctx.next_live_code_index());
            format!(
                concat!(
                    "<div class=\"live-code-seamless\" id=\"{id}\" data-run-mode=\"{mode}\" ",
                    "data-auto-run=\"{auto}\" data-width=\"{width}\" data-height=\"{height}\" ",
                    "style=\"width: {width};\">",
                    "<style>#{id} .live-code-content {{\n{css}\n}}</style>",
                    "<div class=\"live-code-content\">{html}</div>",
                    "<script>(function() {{ try {{\n{js}\n}} catch (error) {{ console.error(error); }} }})();</script>",
                    "</div>"
                ),
                id = container,
                mode = run_mode.as_str(),
                auto = auto_run,
                width = encode_double_quoted_attribute(width),
                height = encode_double_quoted_attribute(height),
                css = css_source,
                html = html_source,
                js = js_source
            )
        }
        BlockPayload::Index => format!(
            concat!(
                "<div class=\"index-block\">",
                "<div class=\"index-header\">Page index</div>",
                "<div class=\"index-content\">{}</div>",
                "</div>"
            ),
            render_index(ctx)
        ),
        BlockPayload::TableOfContents => format!(
            concat!(
                "<div class=\"toc-block\">",
                "<div class=\"toc-header\">Contents</div>",
                "<div class=\"toc-content\">{}</div>",
                "</div>"
            ),
            render_toc(ctx.page)
        ),
    }
}

fn media_placeholder(message: &str) -> String {
    format!(
        "<div class=\"media-block\"><div class=\"media-placeholder\">{}</div></div>",
        encode_text(message)
    )
}

fn render_list(items: &[ListItem], kind: MarkerKind, block: &Block) -> String {
    let list_class = match kind {
        MarkerKind::Bullet => "ul-list",
        MarkerKind::Numbered => "ol-list",
    };
    let marker_class = match kind {
        MarkerKind::Bullet => "ul-marker",
        MarkerKind::Numbered => "ol-marker",
    };
    let markers = list_markers(kind, items.iter().map(|item| item.level as usize));

    let mut out = format!(
        "<div class=\"exported-list-block {list_class} align-{}\">",
        block.alignment.as_str()
    );
    for (item, marker) in items.iter().zip(markers) {
        write!(
            out,
            concat!(
                "<div class=\"exported-list-item\" data-level=\"{level}\">",
                "<span class=\"exported-list-marker {marker_class}\">{marker}</span>",
                "<span class=\"exported-list-content\">{content}</span>",
                "</div>"
            ),
            level = item.level,
            marker_class = marker_class,
            marker = marker,
            content = item.content
        )
        .expect("writing to string");
    }
    out.push_str("</div>");
    out
}

fn render_toggle(block: &Block, nested: &[Block], ctx: &mut ExportContext<'_>) -> String {
    let mut inner = String::new();
    if nested.is_empty() {
        inner.push_str("<div class=\"block-content\"></div>");
    } else {
        for child in nested {
            // Nested blocks keep their own data-block-type wrapper so import
            // recursion works at any depth.
            write!(
                inner,
                "<div class=\"block toggle-nested-block align-{}\" data-block-type=\"{}\">{}</div>",
                child.alignment.as_str(),
                child.type_name(),
                render_inner(child, ctx)
            )
            .expect("writing to string");
        }
    }
    format!(
        concat!(
            "<div class=\"toggle-block\">",
            "<div class=\"toggle-header\"><span class=\"toggle-title\">{}</span></div>",
            "<div class=\"toggle-content\"><div class=\"toggle-inner-content\">{}</div></div>",
            "</div>"
        ),
        block.content, inner
    )
}

fn render_index(ctx: &ExportContext<'_>) -> String {
    fn render_page_tree(page: &Page, level: usize, ctx: &ExportContext<'_>, out: &mut String) {
        let class = if level > 0 {
            "index-item subpage"
        } else {
            "index-item"
        };
        write!(
            out,
            "<div class=\"{class}\"><a href=\"{}\">{}</a></div>",
            encode_double_quoted_attribute(&export_file_name(&page.title)),
            encode_text(&page.title)
        )
        .expect("writing to string");
        for child in &page.children {
            if let Ok(child_page) = ctx.store.get_page(child) {
                render_page_tree(child_page, level + 1, ctx, out);
            }
        }
    }

    let mut out = String::new();
    for root in ctx.store.root_pages() {
        render_page_tree(root, 0, ctx, &mut out);
    }
    out
}

fn render_toc(page: &Page) -> String {
    let headings = collect_headings(page);
    if headings.is_empty() {
        return "<div class=\"toc-empty\">No headings found</div>".to_string();
    }

    let mut out = String::new();
    for (index, heading) in headings.iter().enumerate() {
        let depth = match heading.payload {
            BlockPayload::Heading1 => 1,
            BlockPayload::Heading2 => 2,
            _ => 3,
        };
        write!(
            out,
            "<a class=\"toc-item toc-h{depth}\" href=\"#heading-{index}\">{}</a>",
            encode_text(&strip_tags(&heading.content))
        )
        .expect("writing to string");
    }
    out
}

/// All heading blocks of a page in pre-order, matching the anchor numbering
/// assigned during rendering.
pub(crate) fn collect_headings(page: &Page) -> Vec<&Block> {
    let mut headings = Vec::new();
    page.walk_blocks(&mut |block| {
        if block.payload.is_heading() {
            headings.push(block);
        }
    });
    headings
}

/// Reduces rich inline HTML to its plain text.
fn strip_tags(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let re = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));
    re.replace_all(html, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_keeps_plain_text() {
        assert_eq!(strip_tags("Hello <strong>bold</strong> world"), "Hello bold world");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn collect_headings_descends_into_toggles() {
        let mut page = Page::new("P", None);
        page.content = vec![
            Block::heading(1, "a"),
            Block::toggle("t", vec![Block::heading(2, "b")]),
            Block::heading(3, "c"),
        ];
        let texts: Vec<&str> = collect_headings(&page)
            .iter()
            .map(|h| h.content.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
