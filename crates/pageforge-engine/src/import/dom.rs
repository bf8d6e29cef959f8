//! A small, permissive HTML parser.
//!
//! Imported documents are not under our control: hand-authored markup,
//! foreign exports, or our own earlier output. The parser therefore never
//! fails; it tokenizes what it can and builds a best-effort element tree.
//! Each element keeps the raw source slice of its content (`inner_html`), so
//! unrecognized markup can be carried through an import verbatim instead of
//! being re-serialized.

use html_escape::decode_html_entities;

/// One node of the parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A parsed element: lowercased tag, decoded attributes, children, and the
/// verbatim source of its content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub inner_html: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn class_attr(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// Whole-token class membership.
    pub fn has_class(&self, token: &str) -> bool {
        self.class_attr().split_whitespace().any(|c| c == token)
    }

    /// Substring match over the class attribute (used for fuzzy recognisers
    /// like "toggle" or "live-code" on foreign markup).
    pub fn class_contains(&self, needle: &str) -> bool {
        self.class_attr().contains(needle)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First descendant element matching the predicate, depth-first.
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        self.find(&|el| el.tag == tag)
    }

    pub fn find_class(&self, token: &str) -> Option<&Element> {
        self.find(&|el| el.has_class(token))
    }

    /// Every descendant element matching the predicate, depth-first order.
    pub fn find_all<'a>(&'a self, pred: &impl Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if pred(child) {
                out.push(child);
            }
            child.find_all(pred, out);
        }
    }

    /// Concatenated text of all descendant text nodes, entities decoded.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Re-serializes this element from its parsed parts. Content is the
    /// verbatim source slice, so inline markup survives unchanged.
    pub fn outer_html(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            if value.is_empty() {
                out.push_str(&format!(" {name}"));
            } else {
                out.push_str(&format!(
                    " {name}=\"{}\"",
                    html_escape::encode_double_quoted_attribute(value)
                ));
            }
        }
        if VOID_TAGS.contains(&self.tag.as_str()) {
            out.push('>');
        } else {
            out.push_str(&format!(">{}</{}>", self.inner_html, self.tag));
        }
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&decode_html_entities(text)),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

const VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_TAGS: [&str; 4] = ["script", "style", "textarea", "title"];

/// Block-level tags that implicitly terminate an open `<p>`.
const P_CLOSERS: [&str; 12] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "pre", "blockquote",
];

/// Parses an HTML string into a node forest.
pub fn parse(source: &str) -> Vec<Node> {
    Parser::new(source).run()
}

/// The root elements of a parsed document (text between them discarded).
pub fn parse_elements(source: &str) -> Vec<Element> {
    parse(source)
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
        .collect()
}

struct OpenElement {
    element: Element,
    content_start: usize,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    roots: Vec<Node>,
    stack: Vec<OpenElement>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Node> {
        while self.pos < self.src.len() {
            if self.rest().starts_with("<!--") {
                self.skip_comment();
            } else if self.rest().starts_with("<!") || self.rest().starts_with("<?") {
                self.skip_until('>');
            } else if self.rest().starts_with("</") {
                self.handle_close_tag();
            } else if self.at_tag_open() {
                self.handle_open_tag();
            } else {
                self.handle_text();
            }
        }
        // Unclosed elements run to end of input.
        let end = self.src.len();
        while !self.stack.is_empty() {
            self.close_top(end);
        }
        self.roots
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn at_tag_open(&self) -> bool {
        let bytes = self.rest().as_bytes();
        bytes.first() == Some(&b'<') && bytes.get(1).is_some_and(|b| b.is_ascii_alphabetic())
    }

    fn skip_comment(&mut self) {
        match self.rest().find("-->") {
            Some(at) => self.pos += at + 3,
            None => self.pos = self.src.len(),
        }
    }

    fn skip_until(&mut self, stop: char) {
        match self.rest().find(stop) {
            Some(at) => self.pos += at + stop.len_utf8(),
            None => self.pos = self.src.len(),
        }
    }

    fn handle_text(&mut self) {
        let start = self.pos;
        let mut end = self.src.len();
        // A lone '<' that opens nothing is ordinary text. Skip the first
        // character by its UTF-8 width before searching for the next tag.
        let mut search = start
            + self.src[start..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
        while let Some(at) = self.src[search..].find('<') {
            let abs = search + at;
            let next = self.src.as_bytes().get(abs + 1);
            let opens = matches!(next, Some(b) if b.is_ascii_alphabetic())
                || matches!(next, Some(&b'/') | Some(&b'!') | Some(&b'?'));
            if opens {
                end = abs;
                break;
            }
            search = abs + 1;
        }
        if self.src.as_bytes()[start] == b'<' && end == self.src.len() && start + 1 >= end {
            // Trailing '<'.
            self.pos = end;
            return;
        }
        self.pos = end;
        let text = &self.src[start..end];
        if !text.trim().is_empty() {
            self.append(Node::Text(text.to_string()));
        }
    }

    fn handle_close_tag(&mut self) {
        let tag_start = self.pos;
        let Some(gt) = self.rest().find('>') else {
            self.pos = self.src.len();
            return;
        };
        let name = self.src[self.pos + 2..self.pos + gt]
            .trim()
            .to_ascii_lowercase();
        self.pos += gt + 1;

        if let Some(depth) = self
            .stack
            .iter()
            .rposition(|open| open.element.tag == name)
        {
            // Implicitly close anything the stray markup left open.
            while self.stack.len() > depth + 1 {
                self.close_top(tag_start);
            }
            self.close_top(tag_start);
        }
        // No matching open tag: ignore the stray close.
    }

    fn handle_open_tag(&mut self) {
        let tag_open_at = self.pos;
        let Some(gt) = self.rest().find('>') else {
            self.pos = self.src.len();
            return;
        };
        let raw_tag = &self.src[self.pos + 1..self.pos + gt];
        let self_closing = raw_tag.ends_with('/');
        let raw_tag = raw_tag.trim_end_matches('/');

        let name_len = raw_tag
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
            .count();
        let tag = raw_tag[..name_len].to_ascii_lowercase();
        let attrs = parse_attrs(&raw_tag[name_len..]);
        self.pos += gt + 1;

        self.apply_implicit_closes(&tag, tag_open_at);

        let element = Element {
            tag: tag.clone(),
            attrs,
            children: Vec::new(),
            inner_html: String::new(),
        };

        if self_closing || VOID_TAGS.contains(&tag.as_str()) {
            self.append(Node::Element(element));
            return;
        }

        if RAW_TEXT_TAGS.contains(&tag.as_str()) {
            let (content, after) = self.take_raw_text(&tag);
            let mut element = element;
            element.inner_html = content.to_string();
            if !content.is_empty() {
                element.children.push(Node::Text(content.to_string()));
            }
            self.pos = after;
            self.append(Node::Element(element));
            return;
        }

        self.stack.push(OpenElement {
            element,
            content_start: self.pos,
        });
    }

    /// `<li>` closes an open `<li>`; block-level tags close an open `<p>`.
    fn apply_implicit_closes(&mut self, tag: &str, at: usize) {
        if let Some(top) = self.stack.last() {
            if tag == "li" && top.element.tag == "li" {
                self.close_top(at);
            } else if P_CLOSERS.contains(&tag) && top.element.tag == "p" {
                self.close_top(at);
            }
        }
    }

    fn take_raw_text(&self, tag: &str) -> (&'a str, usize) {
        let close = format!("</{tag}");
        let lower = self.rest().to_ascii_lowercase();
        match lower.find(&close) {
            Some(at) => {
                let content = &self.src[self.pos..self.pos + at];
                let after_close = match self.src[self.pos + at..].find('>') {
                    Some(gt) => self.pos + at + gt + 1,
                    None => self.src.len(),
                };
                (content, after_close)
            }
            None => (&self.src[self.pos..], self.src.len()),
        }
    }

    fn close_top(&mut self, content_end: usize) {
        let Some(mut open) = self.stack.pop() else {
            return;
        };
        let end = content_end.max(open.content_start);
        open.element.inner_html = self.src[open.content_start..end].to_string();
        self.append(Node::Element(open.element));
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(open) => open.element.children.push(node),
            None => self.roots.push(node),
        }
    }
}

fn parse_attrs(mut rest: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let name_len = rest
            .bytes()
            .take_while(|b| !b.is_ascii_whitespace() && *b != b'=')
            .count();
        if name_len == 0 {
            rest = &rest[1..];
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = if let Some(stripped) = rest.strip_prefix('=') {
            let stripped = stripped.trim_start();
            if let Some(quoted) = stripped.strip_prefix('"') {
                let end = quoted.find('"').unwrap_or(quoted.len());
                rest = &quoted[(end + 1).min(quoted.len())..];
                &quoted[..end]
            } else if let Some(quoted) = stripped.strip_prefix('\'') {
                let end = quoted.find('\'').unwrap_or(quoted.len());
                rest = &quoted[(end + 1).min(quoted.len())..];
                &quoted[..end]
            } else {
                let end = stripped
                    .bytes()
                    .take_while(|b| !b.is_ascii_whitespace())
                    .count();
                let value = &stripped[..end];
                rest = &stripped[end..];
                value
            }
        } else {
            ""
        };
        attrs.push((name, decode_html_entities(value).into_owned()));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_element(source: &str) -> Element {
        parse_elements(source).into_iter().next().expect("element")
    }

    #[test]
    fn parses_nested_elements() {
        let el = first_element("<div><p>one</p><p>two</p></div>");
        assert_eq!(el.tag, "div");
        let texts: Vec<String> = el.child_elements().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn decodes_attribute_entities() {
        let el = first_element("<a href=\"https://example.com?a=1&amp;b=2\">x</a>");
        assert_eq!(el.attr("href"), Some("https://example.com?a=1&b=2"));
    }

    #[test]
    fn handles_unquoted_and_bare_attributes() {
        let el = first_element("<iframe src=movie.mp4 allowfullscreen></iframe>");
        assert_eq!(el.attr("src"), Some("movie.mp4"));
        assert_eq!(el.attr("allowfullscreen"), Some(""));
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let els = parse_elements("<img src=\"a.png\"><p>after</p>");
        assert_eq!(els.len(), 2);
        assert_eq!(els[0].tag, "img");
        assert_eq!(els[1].text(), "after");
    }

    #[test]
    fn unclosed_li_terminates_at_next_li() {
        let el = first_element("<ul><li>one<li>two</ul>");
        let items: Vec<String> = el.child_elements().map(|li| li.text()).collect();
        assert_eq!(items, vec!["one", "two"]);
    }

    #[test]
    fn script_content_is_raw_text() {
        let el = first_element("<script>if (a < b) { run(); }</script>");
        assert_eq!(el.inner_html, "if (a < b) { run(); }");
        assert!(el.children.len() == 1);
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let els = parse_elements("<!DOCTYPE html><!-- note --><div>x</div>");
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].tag, "div");
    }

    #[test]
    fn inner_html_is_verbatim_source() {
        let el = first_element("<div>keep <strong class=\"x\">this</strong> markup</div>");
        assert_eq!(el.inner_html, "keep <strong class=\"x\">this</strong> markup");
    }

    #[test]
    fn unclosed_elements_close_at_end_of_input() {
        let els = parse_elements("<div><p>dangling");
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].find_tag("p").unwrap().text(), "dangling");
    }

    #[test]
    fn mismatched_close_tags_are_ignored() {
        let els = parse_elements("<div>text</span></div>");
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].text(), "text");
    }

    #[test]
    fn text_entities_are_decoded() {
        let el = first_element("<pre>a &lt; b &amp;&amp; c &gt; d</pre>");
        assert_eq!(el.text(), "a < b && c > d");
    }

    #[test]
    fn class_helpers() {
        let el = first_element("<div class=\"toggle-block open\">x</div>");
        assert!(el.has_class("toggle-block"));
        assert!(!el.has_class("toggle"));
        assert!(el.class_contains("toggle"));
    }

    #[test]
    fn find_is_depth_first() {
        let el = first_element("<div><section><em>deep</em></section><em>shallow</em></div>");
        assert_eq!(el.find_tag("em").unwrap().text(), "deep");
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let el = first_element("<p>1 < 2</p>");
        assert_eq!(el.text(), "1 < 2");
    }

    #[test]
    fn text_starting_with_multibyte_character_is_parsed() {
        let el = first_element("<p>\u{e9}migr\u{e9} notes</p>");
        assert_eq!(el.text(), "\u{e9}migr\u{e9} notes");
    }

    #[test]
    fn emoji_only_text_node_is_parsed() {
        let el = first_element("<span class=\"page-emoji\">\u{1F60A}</span><p>after</p>");
        assert_eq!(el.text(), "\u{1F60A}");
    }
}
