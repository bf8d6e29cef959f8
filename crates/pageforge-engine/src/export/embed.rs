//! Rewrites share URLs of known services into their embeddable form.

use regex::Regex;
use std::sync::OnceLock;

fn doc_id_regex(kind: &'static str, cell: &'static OnceLock<Regex>) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(&format!(r"/{kind}/d/([a-zA-Z0-9_-]+)")).expect("invalid embed regex")
    })
}

/// Converts a pasted URL to one an `<iframe>` will actually render.
///
/// Google Docs/Sheets/Slides/Drive, YouTube, and Vimeo links get rewritten;
/// anything else is passed through unchanged and tried as a direct embed.
pub fn convert_to_embed_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    static DOCUMENT: OnceLock<Regex> = OnceLock::new();
    static SPREADSHEET: OnceLock<Regex> = OnceLock::new();
    static PRESENTATION: OnceLock<Regex> = OnceLock::new();
    static DRIVE_FILE: OnceLock<Regex> = OnceLock::new();

    if url.contains("docs.google.com/document")
        && let Some(caps) = doc_id_regex("document", &DOCUMENT).captures(url)
    {
        return format!(
            "https://docs.google.com/document/d/{}/edit?usp=sharing&embedded=true",
            &caps[1]
        );
    }
    if url.contains("docs.google.com/spreadsheets")
        && let Some(caps) = doc_id_regex("spreadsheets", &SPREADSHEET).captures(url)
    {
        return format!(
            "https://docs.google.com/spreadsheets/d/{}/edit?usp=sharing&embedded=true",
            &caps[1]
        );
    }
    if url.contains("docs.google.com/presentation")
        && let Some(caps) = doc_id_regex("presentation", &PRESENTATION).captures(url)
    {
        return format!(
            "https://docs.google.com/presentation/d/{}/edit?usp=sharing&embedded=true",
            &caps[1]
        );
    }
    if url.contains("drive.google.com/file")
        && let Some(caps) = doc_id_regex("file", &DRIVE_FILE).captures(url)
    {
        return format!("https://drive.google.com/file/d/{}/preview", &caps[1]);
    }

    if url.contains("youtu.be/") {
        let id = url
            .split("youtu.be/")
            .nth(1)
            .unwrap_or("")
            .split('?')
            .next()
            .unwrap_or("");
        return format!("https://www.youtube.com/embed/{id}");
    }
    if url.contains("youtube.com/watch")
        && let Some(id) = url.split("v=").nth(1)
    {
        let id = id.split('&').next().unwrap_or("");
        return format!("https://www.youtube.com/embed/{id}");
    }

    if url.contains("vimeo.com/")
        && let Some(id) = url.split("vimeo.com/").nth(1)
    {
        return format!("https://player.vimeo.com/video/{id}");
    }

    url.to_string()
}
