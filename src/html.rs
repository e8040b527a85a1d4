//! Static HTML export of a [`View`].
//!
//! Produces a self-contained page. Every piece of item text goes through
//! [`escape_text`] and every link through the sanitized `href` on the card.

use std::fmt::Write;

use crate::loader::LoadError;
use crate::sanitize::{escape_text, OTHER_LETTER};
use crate::view::{CardView, GroupView, View};

pub const NO_RESULTS_MESSAGE: &str = "No items found. Try a different search.";

/// Render a full page for the given view.
pub fn render_page(view: &View, title: &str) -> String {
    let list = if view.is_empty() {
        muted(NO_RESULTS_MESSAGE)
    } else {
        view.groups.iter().map(render_group).collect()
    };

    page(
        title,
        &render_tabs(view),
        &render_az_bar(view),
        &escape_text(&view.counter),
        &list,
    )
}

/// Page shown when the directory could not be loaded: no tabs, no list.
pub fn render_error_page(title: &str) -> String {
    page(title, "", "", "", &muted(LoadError::USER_MESSAGE))
}

fn page(title: &str, tabs: &str, az_bar: &str, counter: &str, list: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <nav id="categoryTabs" class="tabs" role="tablist">{tabs}</nav>
        <nav id="azBar" class="az-bar">{az_bar}</nav>
        <p id="itemCount" class="muted">{counter}</p>
    </header>
    <main id="list" class="list">{list}</main>
</body>
</html>
"#,
        title = escape_text(title),
        css = inline_css(),
    )
}

fn muted(message: &str) -> String {
    format!(r#"<p class="muted empty">{}</p>"#, escape_text(message))
}

fn render_tabs(view: &View) -> String {
    let mut out = String::new();
    for tab in &view.tabs {
        let _ = write!(
            out,
            r#"<button type="button" role="tab" class="tab{active}" data-category="{category}" aria-selected="{selected}"{disabled}>{label} <span class="tab-count">{count}</span></button>"#,
            active = if tab.active { " active" } else { "" },
            category = escape_text(&tab.label),
            selected = tab.active,
            disabled = if tab.disabled { " disabled" } else { "" },
            label = escape_text(&tab.label),
            count = tab.count,
        );
    }
    out
}

fn render_az_bar(view: &View) -> String {
    let mut out = String::new();
    for letter in &view.letters {
        let aria = if letter.letter == OTHER_LETTER {
            "numbers and symbols".to_string()
        } else {
            letter.letter.to_string()
        };
        let _ = write!(
            out,
            r#"<button type="button" class="az-letter{has}" data-letter="{l}" aria-label="Jump to {aria}"{disabled}>{l}</button>"#,
            has = if letter.has_items { " has-items" } else { "" },
            l = escape_text(&letter.letter.to_string()),
            disabled = if letter.has_items { "" } else { " disabled" },
        );
    }
    out
}

fn render_group(group: &GroupView) -> String {
    let mut out = format!(
        r#"<h2 class="category-heading" id="{}">{}</h2>"#,
        escape_text(&group.anchor),
        escape_text(&group.category)
    );
    for section in &group.sections {
        if let Some(heading) = &section.heading {
            if section.popular {
                let _ = write!(
                    out,
                    r#"<h3 class="section-heading popular-heading"><span class="star-icon">★</span> {}</h3>"#,
                    escape_text(heading)
                );
            } else {
                let _ = write!(
                    out,
                    r#"<h3 class="section-heading">{}</h3>"#,
                    escape_text(heading)
                );
            }
        }
        for card in &section.cards {
            out.push_str(&render_card(card));
        }
    }
    out
}

fn render_card(card: &CardView) -> String {
    let mut classes = String::from("card");
    if card.popular {
        classes.push_str(" popular");
    }
    if card.inactive {
        classes.push_str(" inactive");
    }

    let verified = if card.verified {
        r#" <span class="verified-icon" title="Verified link">✓</span>"#
    } else {
        ""
    };
    let description = card
        .description
        .as_deref()
        .map(|d| format!(r#"<p class="description">{}</p>"#, escape_text(d)))
        .unwrap_or_default();
    let tags = card.tags();
    let tags = if tags.is_empty() {
        String::new()
    } else {
        let spans: String = tags
            .iter()
            .map(|t| format!(r#"<span class="tag">{}</span>"#, escape_text(t)))
            .collect();
        format!(r#"<div class="tags">{spans}</div>"#)
    };

    format!(
        r#"<article class="{classes}" data-index="{index}"><h3><a href="{href}" target="_blank" rel="noopener noreferrer">{name}</a>{verified}</h3>{description}{tags}</article>"#,
        index = card.index,
        href = escape_text(&card.href),
        name = escape_text(&card.name),
    )
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.5; color: #111827; background: #fff; padding: 2rem; }
header { margin-bottom: 1.5rem; }
h1 { font-size: 1.75rem; margin-bottom: 1rem; }
.tabs, .az-bar { display: flex; flex-wrap: wrap; gap: 0.25rem; margin-bottom: 0.75rem; }
.tab, .az-letter { border: 1px solid #d1d5db; background: #f9fafb; border-radius: 6px; padding: 0.25rem 0.6rem; cursor: pointer; }
.tab.active { background: #111827; color: #fff; }
.tab:disabled, .az-letter:disabled { opacity: 0.4; cursor: default; }
.az-letter.has-items { font-weight: 600; }
.tab-count { font-size: 0.75rem; color: #6b7280; }
.list { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 0.75rem; }
.category-heading, .section-heading, .empty { grid-column: 1 / -1; }
.category-heading { margin-top: 1.5rem; border-bottom: 2px solid #e5e7eb; }
.section-heading { font-size: 0.95rem; color: #6b7280; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 0.75rem; }
.card.popular { border-color: #f59e0b; }
.card.inactive { opacity: 0.6; }
.card h3 { font-size: 1rem; }
.verified-icon { color: #16a34a; }
.description { color: #374151; font-size: 0.9rem; margin-top: 0.25rem; }
.tags { display: flex; flex-wrap: wrap; gap: 0.25rem; margin-top: 0.5rem; }
.tag { font-size: 0.75rem; background: #f3f4f6; border-radius: 4px; padding: 0 0.4rem; }
.muted { color: #6b7280; }
.empty { text-align: center; padding: 40px; }
"#
}
