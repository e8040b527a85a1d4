//! Helpers that make untrusted item fields safe to display.

use url::Url;

/// Inert link target used when a URL is missing or unsafe.
pub const PLACEHOLDER_HREF: &str = "#";

/// Shown when a name is empty after cleaning.
pub const UNNAMED: &str = "Unnamed";

/// Bucket for names that do not start with A-Z.
pub const OTHER_LETTER: char = '#';

const QUOTE_CHARS: &[char] = &[
    '"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}',
];

/// Strip surrounding quote-like characters and whitespace. May return "".
pub fn clean_name(raw: &str) -> &str {
    raw.trim_matches(|c: char| QUOTE_CHARS.contains(&c) || c.is_whitespace())
}

/// Name as shown on a card, never empty.
pub fn display_name(raw: &str) -> &str {
    match clean_name(raw) {
        "" => UNNAMED,
        name => name,
    }
}

/// Resolve `raw` against `origin` and keep it only when the scheme is http or https.
pub fn sanitize_url(raw: Option<&str>, origin: &Url) -> String {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return PLACEHOLDER_HREF.to_string();
    };

    match origin.join(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.into(),
        Ok(url) => {
            tracing::debug!(scheme = url.scheme(), "rejected link scheme");
            PLACEHOLDER_HREF.to_string()
        }
        Err(_) => PLACEHOLDER_HREF.to_string(),
    }
}

pub fn is_placeholder(href: &str) -> bool {
    href == PLACEHOLDER_HREF
}

/// Escape text for insertion into markup, including attribute values.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quick-jump bucket for a name: its uppercase first letter, or [`OTHER_LETTER`].
pub fn jump_letter(raw_name: &str) -> Option<char> {
    let first = clean_name(raw_name).chars().next()?;
    let upper = first.to_ascii_uppercase();
    Some(if upper.is_ascii_uppercase() {
        upper
    } else {
        OTHER_LETTER
    })
}

/// The quick-jump alphabet: A-Z followed by the catch-all bucket.
pub fn jump_alphabet() -> impl Iterator<Item = char> {
    ('A'..='Z').chain(std::iter::once(OTHER_LETTER))
}

/// Anchor-friendly slug: whitespace runs become '-', lowercased.
pub fn slug(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
