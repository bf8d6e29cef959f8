//! Element-to-block conversion.
//!
//! Two paths exist. Markup produced by our own exporter carries a
//! `data-block-type` attribute on every block wrapper and converts back
//! losslessly. Foreign markup goes through per-tag recognisers instead; what
//! no recogniser claims is kept as a paragraph with its inline markup
//! verbatim, so a lossy import never silently drops visible content.

use regex::Regex;
use std::sync::OnceLock;

use super::dom::Element;
use crate::models::{Alignment, Block, BlockPayload, CodeLanguage, ListItem, RunMode};

/// Converts one element to a block, if it represents one.
///
/// Returns `None` for elements with no importable content (whitespace-only
/// containers, scripts, navigation chrome).
pub(crate) fn block_from_element(el: &Element) -> Option<Block> {
    match el.attr("data-block-type") {
        Some(tag) => Some(tagged_block(el, tag)),
        None => foreign_block(el),
    }
}

fn alignment_of(el: &Element) -> Alignment {
    el.class_attr()
        .split_whitespace()
        .find(|token| token.starts_with("align-"))
        .map(Alignment::from_class_token)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Round-trip path
// ---------------------------------------------------------------------------

/// Rebuilds a block from an exported wrapper. Missing inner structure falls
/// back to the variant's defaults rather than failing the import.
fn tagged_block(el: &Element, tag: &str) -> Block {
    let mut block = match tag {
        "paragraph" => Block::paragraph(
            el.find_class("block-content")
                .map(|content| content.inner_html.clone())
                .unwrap_or_default(),
        ),
        "heading1" | "heading2" | "heading3" => {
            let depth = tag.as_bytes()[tag.len() - 1] - b'0';
            let content = el
                .find(&|child| matches!(child.tag.as_str(), "h1" | "h2" | "h3"))
                .map(|heading| heading.inner_html.clone())
                .unwrap_or_default();
            Block::heading(depth, content)
        }
        "unorderedList" => Block::unordered_list(exported_list_items(el)),
        "orderedList" => Block::ordered_list(exported_list_items(el)),
        "toggle" => exported_toggle(el),
        "code" => {
            let language = el
                .find_class("code-block")
                .and_then(|code| code.attr("data-language"))
                .map(CodeLanguage::parse_lossy)
                .unwrap_or_default();
            let source = el
                .find_tag("code")
                .map(|code| code.text())
                .unwrap_or_default();
            Block::code(language, source)
        }
        "image" => match el.find_tag("img") {
            Some(img) => {
                let alt = img.attr("alt").filter(|alt| !alt.is_empty());
                Block::image(img.attr("src").unwrap_or(""), alt.map(String::from))
            }
            None => Block::image("", None),
        },
        "video" => Block::video(iframe_src(el)),
        "pdf" => Block::pdf(iframe_src(el)),
        "link" => match el.find_class("link-block") {
            Some(anchor) => {
                let url = anchor.attr("href").unwrap_or("").to_string();
                let title = anchor
                    .find_class("link-title")
                    .map(|span| span.text())
                    .unwrap_or_default();
                Block::link(url, title)
            }
            None => Block::link("", ""),
        },
        "externalEmbed" => match el.find_class("external-block-export") {
            Some(embed) => Block::new(
                BlockPayload::ExternalEmbed {
                    source_url: embed.attr("data-source-url").unwrap_or("").to_string(),
                    width: embed.attr("data-width").unwrap_or("100%").to_string(),
                    height: embed.attr("data-height").unwrap_or("400px").to_string(),
                },
                "",
            ),
            None => Block::external_embed(""),
        },
        "liveCode" => el
            .find_class("live-code-seamless")
            .map(live_code_block)
            .unwrap_or_else(|| live_code_block(el)),
        "index" => Block::index(),
        "tableOfContents" => Block::table_of_contents(),
        // Unknown tag from a newer or altered export: keep what it shows.
        _ => return lossy_paragraph(el).unwrap_or_else(|| Block::paragraph("")),
    };
    block.alignment = alignment_of(el);
    block
}

fn iframe_src(el: &Element) -> String {
    el.find_tag("iframe")
        .and_then(|iframe| iframe.attr("src"))
        .unwrap_or("")
        .to_string()
}

fn exported_list_items(el: &Element) -> Vec<ListItem> {
    let mut items = Vec::new();
    let mut rows = Vec::new();
    el.find_all(&|child| child.has_class("exported-list-item"), &mut rows);
    for row in rows {
        let level = row
            .attr("data-level")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let content = row
            .find_class("exported-list-content")
            .map(|span| span.inner_html.clone())
            .unwrap_or_default();
        items.push(ListItem::new(level, content));
    }
    items
}

fn exported_toggle(el: &Element) -> Block {
    let header = el
        .find_class("toggle-title")
        .map(|title| title.inner_html.clone())
        .unwrap_or_default();
    let mut nested = Vec::new();
    if let Some(inner) = el.find_class("toggle-inner-content") {
        for child in inner.child_elements() {
            if let Some(tag) = child.attr("data-block-type") {
                nested.push(tagged_block(child, tag));
            }
        }
    }
    Block::toggle(header, nested)
}

fn live_code_block(container: &Element) -> Block {
    let html_source = container
        .find_class("live-code-content")
        .map(|content| content.inner_html.clone())
        .unwrap_or_default();
    let css_source = container
        .find_tag("style")
        .map(|style| unwrap_scoped_css(&style.inner_html))
        .unwrap_or_default();
    let js_source = container
        .find_tag("script")
        .map(|script| unwrap_guarded_js(&script.inner_html))
        .unwrap_or_default();

    Block::new(
        BlockPayload::LiveCode {
            html_source,
            css_source,
            js_source,
            run_mode: RunMode::parse_lossy(container.attr("data-run-mode").unwrap_or("full")),
            auto_run: container.attr("data-auto-run") == Some("true"),
            width: container.attr("data-width").unwrap_or("100%").to_string(),
            height: container.attr("data-height").unwrap_or("400px").to_string(),
        },
        "",
    )
}

/// Peels the `#live-code-N .live-code-content { ... }` scoping wrapper the
/// exporter adds around the user's stylesheet.
fn unwrap_scoped_css(scoped: &str) -> String {
    let Some(open) = scoped.find('{') else {
        return scoped.trim().to_string();
    };
    let Some(close) = scoped.rfind('}') else {
        return scoped.trim().to_string();
    };
    if close <= open {
        return scoped.trim().to_string();
    }
    scoped[open + 1..close]
        .trim_matches('\n')
        .to_string()
}

/// Peels the try/catch IIFE wrapper the exporter adds around user scripts.
fn unwrap_guarded_js(wrapped: &str) -> String {
    static GUARD: OnceLock<Regex> = OnceLock::new();
    let re = GUARD.get_or_init(|| {
        Regex::new(
            r"(?s)^\(function\(\) \{ try \{\n(.*)\n\} catch \(error\) \{ console\.error\(error\); \} \}\)\(\);$",
        )
        .expect("invalid script guard regex")
    });
    match re.captures(wrapped.trim()) {
        Some(caps) => caps[1].to_string(),
        None => wrapped.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Foreign path
// ---------------------------------------------------------------------------

/// Tags that carry no importable content.
const SKIPPED_TAGS: [&str; 7] = [
    "script", "style", "template", "noscript", "nav", "head", "meta",
];

fn foreign_block(el: &Element) -> Option<Block> {
    if SKIPPED_TAGS.contains(&el.tag.as_str()) {
        return None;
    }

    let mut block = match el.tag.as_str() {
        "h1" => Block::heading(1, el.inner_html.clone()),
        "h2" => Block::heading(2, el.inner_html.clone()),
        // Depth beyond what the model distinguishes clamps to the smallest
        // heading.
        "h3" | "h4" | "h5" | "h6" => Block::heading(3, el.inner_html.clone()),
        "p" => {
            let content = el.inner_html.trim();
            if content.is_empty() {
                return None;
            }
            Block::paragraph(content)
        }
        "ul" => Block::unordered_list(foreign_list_items(el)),
        "ol" => Block::ordered_list(foreign_list_items(el)),
        "pre" => {
            let code = el.find_tag("code");
            let language = code
                .map(|code| language_from_classes(code.class_attr()))
                .unwrap_or_default();
            let source = code.map(|code| code.text()).unwrap_or_else(|| el.text());
            Block::code(language, source)
        }
        "img" => {
            let alt = el.attr("alt").filter(|alt| !alt.is_empty());
            Block::image(el.attr("src").unwrap_or(""), alt.map(String::from))
        }
        "video" => {
            let src = el
                .attr("src")
                .map(String::from)
                .or_else(|| {
                    el.find_tag("source")
                        .and_then(|source| source.attr("src"))
                        .map(String::from)
                })
                .unwrap_or_default();
            Block::video(src)
        }
        "iframe" => {
            let src = el.attr("src").unwrap_or("");
            if src.ends_with(".pdf") || el.attr("type") == Some("application/pdf") {
                Block::pdf(src)
            } else {
                Block::external_embed(src)
            }
        }
        "a" => Block::link(el.attr("href").unwrap_or(""), el.text().trim()),
        "details" => {
            let header = el
                .find_tag("summary")
                .map(|summary| summary.inner_html.clone())
                .unwrap_or_default();
            let nested = el
                .child_elements()
                .filter(|child| child.tag != "summary")
                .filter_map(foreign_block)
                .collect();
            Block::toggle(header, nested)
        }
        "div" | "section" | "article" | "main" => return foreign_container(el),
        _ => return lossy_paragraph(el),
    };
    block.alignment = alignment_of(el);
    Some(block)
}

/// Recognises our own exported shapes when the `data-block-type` wrapper has
/// been stripped, then falls back to a verbatim paragraph.
fn foreign_container(el: &Element) -> Option<Block> {
    if el.has_class("exported-list-block") {
        let items = exported_list_items(el);
        let block = if el.has_class("ol-list") {
            Block::ordered_list(items)
        } else {
            Block::unordered_list(items)
        };
        return Some(with_alignment(block, el));
    }
    if el.class_contains("live-code") {
        return Some(with_alignment(live_code_block(el), el));
    }
    if el.class_contains("toggle") {
        return Some(with_alignment(exported_toggle(el), el));
    }
    if el.has_class("index-block") {
        return Some(Block::index());
    }
    if el.has_class("toc-block") {
        return Some(Block::table_of_contents());
    }
    if el.has_class("block-content") {
        let content = el.inner_html.trim();
        if content.is_empty() {
            return None;
        }
        return Some(with_alignment(Block::paragraph(content), el));
    }
    lossy_paragraph(el)
}

fn with_alignment(mut block: Block, el: &Element) -> Block {
    block.alignment = alignment_of(el);
    block
}

/// Last-resort conversion: anything with visible text becomes a paragraph
/// carrying the element's inline markup verbatim.
fn lossy_paragraph(el: &Element) -> Option<Block> {
    if el.text().trim().is_empty() {
        return None;
    }
    Some(with_alignment(
        Block::paragraph(el.inner_html.trim()),
        el,
    ))
}

/// Flattens a foreign `<ul>`/`<ol>` tree into levelled items. An item's text
/// is its inline content up to the first nested list; nested lists continue
/// one level deeper.
fn foreign_list_items(list: &Element) -> Vec<ListItem> {
    fn walk(list: &Element, level: u8, out: &mut Vec<ListItem>) {
        for li in list.child_elements().filter(|child| child.tag == "li") {
            let content = direct_inline_content(li);
            if !content.trim().is_empty() {
                out.push(ListItem::new(level, content.trim().to_string()));
            }
            for nested in li
                .child_elements()
                .filter(|child| child.tag == "ul" || child.tag == "ol")
            {
                walk(nested, level.saturating_add(1), out);
            }
        }
    }

    let mut items = Vec::new();
    walk(list, 0, &mut items);
    items
}

fn direct_inline_content(li: &Element) -> String {
    use super::dom::Node;
    let mut out = String::new();
    for node in &li.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) if child.tag == "ul" || child.tag == "ol" => break,
            Node::Element(child) => out.push_str(&child.outer_html()),
        }
    }
    out
}

fn language_from_classes(classes: &str) -> CodeLanguage {
    static LANGUAGE: OnceLock<Regex> = OnceLock::new();
    let re = LANGUAGE
        .get_or_init(|| Regex::new(r"(?:language|lang)-(\w+)").expect("invalid language regex"));
    re.captures(classes)
        .map(|caps| CodeLanguage::parse_lossy(&caps[1]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::dom::parse_elements;
    use pretty_assertions::assert_eq;

    fn convert(html: &str) -> Block {
        let els = parse_elements(html);
        block_from_element(&els[0]).expect("block")
    }

    #[test]
    fn foreign_headings_clamp_to_three_levels() {
        assert_eq!(convert("<h1>a</h1>").payload, BlockPayload::Heading1);
        assert_eq!(convert("<h2>a</h2>").payload, BlockPayload::Heading2);
        assert_eq!(convert("<h3>a</h3>").payload, BlockPayload::Heading3);
        assert_eq!(convert("<h5>a</h5>").payload, BlockPayload::Heading3);
    }

    #[test]
    fn foreign_paragraph_keeps_inline_markup() {
        let block = convert("<p>keep <em>this</em> markup</p>");
        assert_eq!(block.content, "keep <em>this</em> markup");
    }

    #[test]
    fn foreign_nested_list_recovers_levels() {
        let block = convert(concat!(
            "<ul>",
            "<li>one<ul><li>one-a</li><li>one-b</li></ul></li>",
            "<li>two</li>",
            "</ul>"
        ));
        let BlockPayload::UnorderedList { list_items } = &block.payload else {
            panic!("expected list, got {:?}", block.payload);
        };
        let rows: Vec<(u8, &str)> = list_items
            .iter()
            .map(|item| (item.level, item.content.as_str()))
            .collect();
        assert_eq!(rows, vec![(0, "one"), (1, "one-a"), (1, "one-b"), (0, "two")]);
    }

    #[test]
    fn foreign_pre_detects_language_class() {
        let block = convert("<pre><code class=\"language-python\">print(1)</code></pre>");
        assert_eq!(
            block.payload,
            BlockPayload::Code {
                language: CodeLanguage::Python
            }
        );
        assert_eq!(block.content, "print(1)");
    }

    #[test]
    fn foreign_pre_without_language_defaults_to_javascript() {
        let block = convert("<pre><code>let x = 1;</code></pre>");
        assert_eq!(
            block.payload,
            BlockPayload::Code {
                language: CodeLanguage::Javascript
            }
        );
    }

    #[test]
    fn foreign_iframe_splits_pdf_from_embed() {
        let pdf = convert("<iframe src=\"file.pdf\"></iframe>");
        assert!(matches!(pdf.payload, BlockPayload::Pdf { .. }));

        let embed = convert("<iframe src=\"https://example.com/page\"></iframe>");
        assert!(matches!(embed.payload, BlockPayload::ExternalEmbed { .. }));
    }

    #[test]
    fn foreign_details_becomes_toggle() {
        let block = convert("<details><summary>More</summary><p>inside</p></details>");
        assert_eq!(block.content, "More");
        assert_eq!(block.nested().len(), 1);
        assert_eq!(block.nested()[0].content, "inside");
    }

    #[test]
    fn unrecognized_markup_survives_as_verbatim_paragraph() {
        let block = convert("<blockquote>quoted <b>text</b></blockquote>");
        assert_eq!(block.payload, BlockPayload::Paragraph);
        assert_eq!(block.content, "quoted <b>text</b>");
    }

    #[test]
    fn empty_containers_import_as_nothing() {
        let els = parse_elements("<div>   </div>");
        assert_eq!(block_from_element(&els[0]), None);
        let els = parse_elements("<p></p>");
        assert_eq!(block_from_element(&els[0]), None);
    }

    #[test]
    fn scripts_are_skipped() {
        let els = parse_elements("<script>alert(1)</script>");
        assert_eq!(block_from_element(&els[0]), None);
    }

    #[test]
    fn tagged_paragraph_restores_content_and_alignment() {
        let block = convert(concat!(
            "<div class=\"block align-center\" data-block-type=\"paragraph\">",
            "<div class=\"block-content align-center\">Hello <strong>bold</strong></div>",
            "</div>"
        ));
        assert_eq!(block.payload, BlockPayload::Paragraph);
        assert_eq!(block.content, "Hello <strong>bold</strong>");
        assert_eq!(block.alignment, Alignment::Center);
    }

    #[test]
    fn tagged_block_with_missing_structure_gets_defaults() {
        let block = convert("<div class=\"block align-left\" data-block-type=\"externalEmbed\"></div>");
        assert_eq!(
            block.payload,
            BlockPayload::ExternalEmbed {
                source_url: String::new(),
                width: "100%".into(),
                height: "400px".into(),
            }
        );
    }

    #[test]
    fn scoped_css_unwraps_to_user_stylesheet() {
        let scoped = "#live-code-3 .live-code-content {\np { color: red; }\n}";
        assert_eq!(unwrap_scoped_css(scoped), "p { color: red; }");
        assert_eq!(unwrap_scoped_css("#x .live-code-content {\n\n}"), "");
    }

    #[test]
    fn guarded_js_unwraps_to_user_script() {
        let wrapped =
            "(function() { try {\nconsole.log('hi');\n} catch (error) { console.error(error); } })();";
        assert_eq!(unwrap_guarded_js(wrapped), "console.log('hi');");
        assert_eq!(unwrap_guarded_js("plain();"), "plain();");
    }
}
