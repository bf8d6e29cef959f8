use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime identity of a block, assigned by the owning [`DocumentStore`].
///
/// Block ids are session-local: they are never persisted and get reassigned
/// whenever a page is loaded or imported.
///
/// [`DocumentStore`]: crate::store::DocumentStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Horizontal alignment of a block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Recovers an alignment from an `align-*` class token, defaulting to left.
    pub fn from_class_token(token: &str) -> Self {
        match token {
            "align-center" => Alignment::Center,
            "align-right" => Alignment::Right,
            "align-justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}

/// Syntax-highlighting language of a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    #[default]
    Javascript,
    Python,
    Html,
    Css,
    Json,
    Sql,
    Php,
    Java,
    Csharp,
    Cpp,
    Typescript,
    Bash,
    Markdown,
    Xml,
    Yaml,
    Plaintext,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 16] = [
        CodeLanguage::Javascript,
        CodeLanguage::Python,
        CodeLanguage::Html,
        CodeLanguage::Css,
        CodeLanguage::Json,
        CodeLanguage::Sql,
        CodeLanguage::Php,
        CodeLanguage::Java,
        CodeLanguage::Csharp,
        CodeLanguage::Cpp,
        CodeLanguage::Typescript,
        CodeLanguage::Bash,
        CodeLanguage::Markdown,
        CodeLanguage::Xml,
        CodeLanguage::Yaml,
        CodeLanguage::Plaintext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Javascript => "javascript",
            CodeLanguage::Python => "python",
            CodeLanguage::Html => "html",
            CodeLanguage::Css => "css",
            CodeLanguage::Json => "json",
            CodeLanguage::Sql => "sql",
            CodeLanguage::Php => "php",
            CodeLanguage::Java => "java",
            CodeLanguage::Csharp => "csharp",
            CodeLanguage::Cpp => "cpp",
            CodeLanguage::Typescript => "typescript",
            CodeLanguage::Bash => "bash",
            CodeLanguage::Markdown => "markdown",
            CodeLanguage::Xml => "xml",
            CodeLanguage::Yaml => "yaml",
            CodeLanguage::Plaintext => "plaintext",
        }
    }

    /// Best-effort parse of a language token, falling back to javascript.
    pub fn parse_lossy(token: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == token.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media kind carried by image, video, and pdf blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Pdf,
}

/// Which of the three live-code sources actually execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    #[default]
    Full,
    HtmlOnly,
    CssOnly,
    JsOnly,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Full => "full",
            RunMode::HtmlOnly => "htmlOnly",
            RunMode::CssOnly => "cssOnly",
            RunMode::JsOnly => "jsOnly",
        }
    }

    pub fn parse_lossy(token: &str) -> Self {
        match token {
            "htmlOnly" => RunMode::HtmlOnly,
            "cssOnly" => RunMode::CssOnly,
            "jsOnly" => RunMode::JsOnly,
            _ => RunMode::Full,
        }
    }
}

/// One item of a hierarchical list block.
///
/// `level` encodes indentation (0 = top level); the item's position within the
/// surrounding `listItems` sequence is its document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub content: String,
}

impl ListItem {
    pub fn new(level: u8, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
        }
    }
}

pub(crate) fn default_embed_width() -> String {
    "100%".to_string()
}

pub(crate) fn default_embed_height() -> String {
    "400px".to_string()
}

/// Variant-specific payload of a block.
///
/// The serde tag doubles as the persisted `type` field and as the
/// `data-block-type` attribute on exported HTML, so the importer can
/// reconstruct the exact variant from either encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BlockPayload {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    UnorderedList {
        #[serde(default)]
        list_items: Vec<ListItem>,
    },
    OrderedList {
        #[serde(default)]
        list_items: Vec<ListItem>,
    },
    /// Recursive container: children are owned exclusively by this toggle and
    /// may themselves be toggles, to unbounded depth.
    Toggle {
        #[serde(default)]
        nested_blocks: Vec<Block>,
    },
    Code {
        #[serde(default)]
        language: CodeLanguage,
    },
    Image {
        media_type: MediaType,
        #[serde(default)]
        source_uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
    },
    Video {
        media_type: MediaType,
        #[serde(default)]
        source_uri: String,
    },
    Pdf {
        media_type: MediaType,
        #[serde(default)]
        source_uri: String,
    },
    Link {
        #[serde(default)]
        url: String,
        #[serde(default)]
        title: String,
    },
    ExternalEmbed {
        #[serde(default)]
        source_url: String,
        #[serde(default = "default_embed_width")]
        width: String,
        #[serde(default = "default_embed_height")]
        height: String,
    },
    LiveCode {
        #[serde(default)]
        html_source: String,
        #[serde(default)]
        css_source: String,
        #[serde(default)]
        js_source: String,
        #[serde(default)]
        run_mode: RunMode,
        #[serde(default)]
        auto_run: bool,
        #[serde(default = "default_embed_width")]
        width: String,
        #[serde(default = "default_embed_height")]
        height: String,
    },
    /// Derived at render/export time from the full page set; never persisted
    /// with content.
    Index,
    /// Derived at render/export time from the current page's headings; never
    /// persisted with content.
    TableOfContents,
}

impl BlockPayload {
    /// The persisted/exported `type` tag for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockPayload::Paragraph => "paragraph",
            BlockPayload::Heading1 => "heading1",
            BlockPayload::Heading2 => "heading2",
            BlockPayload::Heading3 => "heading3",
            BlockPayload::UnorderedList { .. } => "unorderedList",
            BlockPayload::OrderedList { .. } => "orderedList",
            BlockPayload::Toggle { .. } => "toggle",
            BlockPayload::Code { .. } => "code",
            BlockPayload::Image { .. } => "image",
            BlockPayload::Video { .. } => "video",
            BlockPayload::Pdf { .. } => "pdf",
            BlockPayload::Link { .. } => "link",
            BlockPayload::ExternalEmbed { .. } => "externalEmbed",
            BlockPayload::LiveCode { .. } => "liveCode",
            BlockPayload::Index => "index",
            BlockPayload::TableOfContents => "tableOfContents",
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            BlockPayload::Heading1 | BlockPayload::Heading2 | BlockPayload::Heading3
        )
    }
}

/// One content unit within a page or toggle.
///
/// The common envelope (`id`, `content`, `alignment`) is shared by every
/// variant; `payload` carries the variant-specific data. `content` holds rich
/// inline HTML for text blocks, the header text for toggles, and the raw
/// source for code blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(skip)]
    pub id: BlockId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(flatten)]
    pub payload: BlockPayload,
}

/// Envelope `content` value identifying hierarchical list records.
pub const LIST_CONTENT_TAG: &str = "hierarchical-list";

impl Block {
    pub fn new(payload: BlockPayload, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::default(),
            content: content.into(),
            alignment: Alignment::Left,
            payload,
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockPayload::Paragraph, content)
    }

    pub fn heading(depth: u8, content: impl Into<String>) -> Self {
        let payload = match depth {
            1 => BlockPayload::Heading1,
            2 => BlockPayload::Heading2,
            _ => BlockPayload::Heading3,
        };
        Self::new(payload, content)
    }

    pub fn unordered_list(items: Vec<ListItem>) -> Self {
        Self::new(
            BlockPayload::UnorderedList { list_items: items },
            LIST_CONTENT_TAG,
        )
    }

    pub fn ordered_list(items: Vec<ListItem>) -> Self {
        Self::new(
            BlockPayload::OrderedList { list_items: items },
            LIST_CONTENT_TAG,
        )
    }

    pub fn toggle(header: impl Into<String>, nested: Vec<Block>) -> Self {
        Self::new(
            BlockPayload::Toggle {
                nested_blocks: nested,
            },
            header,
        )
    }

    pub fn code(language: CodeLanguage, source: impl Into<String>) -> Self {
        Self::new(BlockPayload::Code { language }, source)
    }

    pub fn image(source_uri: impl Into<String>, alt_text: Option<String>) -> Self {
        Self::new(
            BlockPayload::Image {
                media_type: MediaType::Image,
                source_uri: source_uri.into(),
                alt_text,
            },
            "",
        )
    }

    pub fn video(source_uri: impl Into<String>) -> Self {
        Self::new(
            BlockPayload::Video {
                media_type: MediaType::Video,
                source_uri: source_uri.into(),
            },
            "",
        )
    }

    pub fn pdf(source_uri: impl Into<String>) -> Self {
        Self::new(
            BlockPayload::Pdf {
                media_type: MediaType::Pdf,
                source_uri: source_uri.into(),
            },
            "",
        )
    }

    pub fn link(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            BlockPayload::Link {
                url: url.into(),
                title: title.into(),
            },
            "",
        )
    }

    pub fn external_embed(source_url: impl Into<String>) -> Self {
        Self::new(
            BlockPayload::ExternalEmbed {
                source_url: source_url.into(),
                width: default_embed_width(),
                height: default_embed_height(),
            },
            "",
        )
    }

    pub fn index() -> Self {
        Self::new(BlockPayload::Index, "")
    }

    pub fn table_of_contents() -> Self {
        Self::new(BlockPayload::TableOfContents, "")
    }

    /// The persisted/exported `type` tag of this block.
    pub fn type_name(&self) -> &'static str {
        self.payload.type_name()
    }

    /// Child blocks if this is a toggle, empty otherwise.
    pub fn nested(&self) -> &[Block] {
        match &self.payload {
            BlockPayload::Toggle { nested_blocks } => nested_blocks,
            _ => &[],
        }
    }

    pub(crate) fn set_id(&mut self, id: BlockId) {
        self.id = id;
    }
}
