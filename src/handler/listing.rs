//! Directory listing page
//!
//! Rendered when a directory has no index file and listing is enabled.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write;
use std::path::Path;
use tokio::fs;

/// Characters escaped in an href path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'\'');

/// One entry of a listing
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read directory entries, sorted by name
///
/// Names that are not valid UTF-8 are skipped.
pub async fn read_entries(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push(ListingEntry { name, is_dir });
    }

    entries.sort();
    Ok(entries)
}

/// Render the listing page for `url_path`
pub fn render_listing(url_path: &str, entries: &[ListingEntry]) -> String {
    let title = escape_html(url_path);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n<body>\n<h1>Index of {title}</h1>\n<pre>\n"
    );

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<a href=\"{}{suffix}\">{}{suffix}</a>",
            utf8_percent_encode(&entry.name, SEGMENT),
            escape_html(&entry.name),
        );
    }

    html.push_str("</pre>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
