//! End-to-end checks that exported HTML imports back to the same blocks.

use pageforge_engine::models::{Alignment, Block, BlockPayload, CodeLanguage, ListItem, RunMode};
use pageforge_engine::store::DocumentStore;
use pageforge_engine::{export_page, import_page};
use pretty_assertions::assert_eq;

/// Exports `blocks` as a standalone page and imports the result back,
/// comparing the persisted (id-free) form of both sides.
fn assert_round_trips(blocks: Vec<Block>) {
    let expected = serde_json::to_value(&blocks).unwrap();

    let mut store = DocumentStore::new("Round Trip");
    let id = store.active_id().clone();
    store.replace_page_blocks(&id, blocks).unwrap();

    let html = export_page(store.active_page(), &store, true);
    let imported = import_page(&html, "round_trip.html").unwrap();

    assert_eq!(serde_json::to_value(&imported.content).unwrap(), expected);
}

#[test]
fn text_blocks_round_trip() {
    assert_round_trips(vec![
        Block::paragraph("plain text"),
        Block::paragraph("rich <strong>inline</strong> <em>markup</em>"),
        Block::heading(1, "Top"),
        Block::heading(2, "Middle"),
        Block::heading(3, "Small <code>code</code>"),
    ]);
}

#[test]
fn alignment_round_trips() {
    let mut centered = Block::paragraph("centered");
    centered.alignment = Alignment::Center;
    let mut right = Block::heading(2, "right");
    right.alignment = Alignment::Right;
    assert_round_trips(vec![centered, right]);
}

#[test]
fn lists_round_trip_with_levels() {
    assert_round_trips(vec![
        Block::unordered_list(vec![
            ListItem::new(0, "alpha"),
            ListItem::new(1, "beta <em>styled</em>"),
            ListItem::new(2, "gamma"),
            ListItem::new(0, "delta"),
        ]),
        Block::ordered_list(vec![
            ListItem::new(0, "first"),
            ListItem::new(1, "nested"),
            ListItem::new(0, "second"),
        ]),
    ]);
}

#[test]
fn toggles_round_trip_recursively() {
    assert_round_trips(vec![Block::toggle(
        "outer",
        vec![
            Block::paragraph("inside"),
            Block::toggle(
                "inner",
                vec![Block::toggle("deepest", vec![Block::heading(3, "buried")])],
            ),
        ],
    )]);
}

#[test]
fn empty_toggle_round_trips() {
    assert_round_trips(vec![Block::toggle("nothing inside", vec![])]);
}

#[test]
fn code_round_trips_with_special_characters() {
    assert_round_trips(vec![
        Block::code(CodeLanguage::Python, "if a < b and b > c:\n    print('&')"),
        Block::code(CodeLanguage::Sql, "select * from t where x < 3"),
    ]);
}

#[test]
fn media_blocks_round_trip() {
    assert_round_trips(vec![
        Block::image("https://example.com/pic.png", Some("a picture".into())),
        Block::image("relative.png", None),
        Block::video("https://example.com/movie.mp4"),
        Block::pdf("https://example.com/paper.pdf"),
        Block::link("https://example.com", "Example site"),
    ]);
}

#[test]
fn empty_media_sources_round_trip_as_empty() {
    assert_round_trips(vec![
        Block::image("", None),
        Block::video(""),
        Block::pdf(""),
        Block::external_embed(""),
    ]);
}

#[test]
fn external_embed_round_trips_original_url() {
    // The iframe shows the rewritten embed URL, but the data attributes keep
    // the address the user pasted.
    let mut embed = Block::external_embed("https://docs.google.com/document/d/abc123/edit");
    if let BlockPayload::ExternalEmbed { width, height, .. } = &mut embed.payload {
        *width = "80%".to_string();
        *height = "600px".to_string();
    }
    assert_round_trips(vec![embed]);
}

#[test]
fn live_code_round_trips_all_three_sources() {
    assert_round_trips(vec![Block::new(
        BlockPayload::LiveCode {
            html_source: "<p class=\"demo\">hello</p>".into(),
            css_source: ".demo { color: red; }\n.demo:hover { color: blue; }".into(),
            js_source: "document.querySelector('.demo').textContent = 'hi';".into(),
            run_mode: RunMode::JsOnly,
            auto_run: true,
            width: "100%".into(),
            height: "240px".into(),
        },
        "",
    )]);
}

#[test]
fn derived_blocks_round_trip_as_placeholders() {
    assert_round_trips(vec![Block::index(), Block::table_of_contents()]);
}

#[test]
fn heading_and_list_scenario_exports_and_reimports() {
    let blocks = vec![
        Block::heading(1, "Intro"),
        Block::unordered_list(vec![
            ListItem::new(0, "A"),
            ListItem::new(1, "B"),
            ListItem::new(0, "C"),
        ]),
    ];
    let expected = serde_json::to_value(&blocks).unwrap();

    let mut store = DocumentStore::new("Scenario");
    let id = store.active_id().clone();
    store.replace_page_blocks(&id, blocks).unwrap();
    let html = export_page(store.active_page(), &store, true);

    assert!(html.contains("<h1 id=\"heading-0\""));
    assert!(html.contains(">\u{2022}</span>"));
    assert!(html.contains(">\u{25E6}</span>"));

    let imported = import_page(&html, "scenario.html").unwrap();
    assert_eq!(serde_json::to_value(&imported.content).unwrap(), expected);
}

#[test]
fn page_title_and_emoji_survive_export() {
    let mut store = DocumentStore::new("My Notes");
    let id = store.active_id().clone();
    store.get_page_mut(&id).unwrap().emoji = Some("\u{1F4D3}".to_string());
    store
        .replace_page_blocks(&id, vec![Block::paragraph("x")])
        .unwrap();

    let html = export_page(store.active_page(), &store, true);
    let imported = import_page(&html, "my_notes.html").unwrap();

    assert_eq!(imported.title, "My Notes");
    assert_eq!(imported.emoji.as_deref(), Some("\u{1F4D3}"));
}
