//! Companion files bundled alongside multi-page export archives.

/// Name of the bundled stylesheet.
pub const STYLESHEET_NAME: &str = "styles.css";

/// Name of the bundled script.
pub const SCRIPT_NAME: &str = "exported.js";

/// Stylesheet shared by every exported page.
pub const STYLESHEET: &str = r#"* { box-sizing: border-box; }

body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    line-height: 1.6;
    color: #37352f;
    background: #ffffff;
}

.exported-app { display: flex; min-height: 100vh; }
.exported-nav {
    width: 240px;
    flex-shrink: 0;
    padding: 16px;
    background: #f7f6f3;
    border-right: 1px solid #e9e9e7;
}
.exported-nav ul { list-style: none; margin: 0; padding-left: 12px; }
.nav-link { color: #37352f; text-decoration: none; }
.nav-link:hover { text-decoration: underline; }
.exported-main { flex: 1; max-width: 900px; margin: 0 auto; padding: 32px 48px; }

.cover-area img { width: 100%; max-height: 240px; object-fit: cover; border-radius: 4px; }
.title-section { display: flex; align-items: center; gap: 12px; margin: 16px 0; }
.page-emoji { font-size: 40px; }
.page-title { margin: 0; font-size: 40px; }
.breadcrumb { font-size: 14px; color: #787774; margin-bottom: 16px; }
.breadcrumb a { color: #787774; }

.align-left { text-align: left; }
.align-center { text-align: center; }
.align-right { text-align: right; }
.align-justify { text-align: justify; }

.block { margin: 4px 0; }
.block-content { min-height: 1.2em; }

ul::marker, ol::marker, li::marker { content: none; }
.exported-list-item { display: flex; gap: 8px; }
.exported-list-item[data-level="1"] { margin-left: 24px; }
.exported-list-item[data-level="2"] { margin-left: 48px; }
.exported-list-item[data-level="3"] { margin-left: 72px; }
.exported-list-item[data-level="4"] { margin-left: 96px; }
.exported-list-item[data-level="5"] { margin-left: 120px; }
.exported-list-marker { flex-shrink: 0; }

.toggle-header { cursor: pointer; font-weight: 500; }
.toggle-header::before { content: "\25B8\00a0"; }
.toggle-block.open > .toggle-header::before { content: "\25BE\00a0"; }
.toggle-block:not(.open) > .toggle-content { display: none; }

.code-block { border: 1px solid #e9e9e7; border-radius: 6px; overflow: hidden; margin: 8px 0; }
.code-header {
    display: flex;
    justify-content: space-between;
    padding: 6px 12px;
    background: #f7f6f3;
    font-size: 12px;
    color: #787774;
}
.code-content pre { margin: 0; padding: 12px; overflow-x: auto; background: #fbfbfa; }

.media-block { margin: 8px 0; }
.media-content img, .media-content iframe { max-width: 100%; border: none; }
.media-content iframe { width: 100%; min-height: 360px; }
.media-placeholder {
    padding: 24px;
    text-align: center;
    color: #9b9a97;
    background: #f7f6f3;
    border-radius: 6px;
}

.link-block {
    display: block;
    padding: 12px;
    border: 1px solid #e9e9e7;
    border-radius: 6px;
    text-decoration: none;
    color: inherit;
}
.link-title { font-weight: 500; }
.link-url { font-size: 12px; color: #787774; }

.external-block-export { border: 1px solid #e9e9e7; border-radius: 6px; overflow: hidden; }
.external-header-export {
    background: #f7f6f3;
    padding: 8px 12px;
    border-bottom: 1px solid #e9e9e7;
    font-size: 12px;
    color: #787774;
}
.external-content-export { height: calc(100% - 32px); }
.external-content-export iframe { width: 100%; height: 100%; border: none; }

.index-block, .toc-block { border: 1px solid #e9e9e7; border-radius: 6px; padding: 12px; margin: 8px 0; }
.index-header, .toc-header { font-weight: 600; margin-bottom: 8px; }
.index-item.subpage { margin-left: 20px; }
.index-item a, .toc-item { color: #37352f; display: block; padding: 2px 0; }
.toc-h2 { margin-left: 20px; }
.toc-h3 { margin-left: 40px; }
.empty-page { color: #9b9a97; }
"#;

/// Script shared by every exported page: toggle folding and smooth scrolling
/// for table-of-contents anchors.
pub const SCRIPT: &str = r#"document.addEventListener('DOMContentLoaded', function () {
    document.querySelectorAll('.toggle-header').forEach(function (header) {
        header.addEventListener('click', function () {
            header.closest('.toggle-block').classList.toggle('open');
        });
    });

    document.querySelectorAll('.toc-item').forEach(function (item) {
        item.addEventListener('click', function (event) {
            var target = document.querySelector(item.getAttribute('href'));
            if (target) {
                event.preventDefault();
                target.scrollIntoView({ behavior: 'smooth', block: 'start' });
            }
        });
    });
});
"#;
