use anyhow::{bail, Result};
use serde::Serialize;

use super::{suggest, Context};
use crate::data::Item;
use crate::sanitize::{display_name, sanitize_url};

#[derive(Serialize)]
struct ItemDetail {
    name: String,
    category: String,
    link: String,
    description: Option<String>,
    sector: Option<String>,
    country: Option<String>,
    owner: Option<String>,
    domains: Vec<String>,
    year: Option<i64>,
    popular: bool,
    status: Option<String>,
}

pub fn item(ctx: &Context, name: &str, json: bool) -> Result<()> {
    let items = ctx.load()?;

    let Some(item) = find(&items, name) else {
        let suggestions = suggest(name, items.iter().map(|i| display_name(&i.name)), 3);
        if suggestions.is_empty() {
            bail!("Item '{}' not found", name);
        }
        bail!(
            "Item '{}' not found. Did you mean: {}?",
            name,
            suggestions.join(", ")
        );
    };

    let detail = ItemDetail {
        name: display_name(&item.name).to_string(),
        category: item.category_key().to_string(),
        link: sanitize_url(item.url.as_deref(), &ctx.origin),
        description: item.description().map(str::to_string),
        sector: item.sector().map(str::to_string),
        country: item.country().map(str::to_string),
        owner: item.owner().map(str::to_string),
        domains: item.domains.clone(),
        year: item.year,
        popular: item.popular,
        status: item.status.clone(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        print_detail(&detail);
    }

    Ok(())
}

/// First item whose display name matches, ignoring case.
fn find<'a>(items: &'a [Item], name: &str) -> Option<&'a Item> {
    let needle = display_name(name).to_lowercase();
    items
        .iter()
        .find(|i| display_name(&i.name).to_lowercase() == needle)
}

fn print_detail(d: &ItemDetail) {
    let title = if d.popular {
        format!("{} ★", d.name)
    } else {
        d.name.clone()
    };
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    println!();
    println!("Category:    {}", d.category);
    println!("Link:        {}", d.link);
    if let Some(status) = &d.status {
        println!("Status:      {}", status);
    }
    println!();

    if let Some(description) = &d.description {
        println!("{}", textwrap::fill(description, 72));
        println!();
    }

    println!("Details");
    println!("-------");
    println!("Sector:      {}", d.sector.as_deref().unwrap_or("-"));
    println!("Country:     {}", d.country.as_deref().unwrap_or("-"));
    println!("Owner:       {}", d.owner.as_deref().unwrap_or("-"));
    if !d.domains.is_empty() {
        println!("Domains:     {}", d.domains.join(", "));
    }
    if let Some(year) = d.year {
        println!("Founded:     {}", year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ignores_case_and_quotes() {
        let items = vec![
            Item {
                name: "\u{201C}Neovim\u{201D}".into(),
                ..Default::default()
            },
            Item {
                name: "GitHub".into(),
                ..Default::default()
            },
        ];
        assert_eq!(find(&items, "neovim").map(|i| i.name.as_str()), Some("\u{201C}Neovim\u{201D}"));
        assert_eq!(find(&items, "GITHUB").map(|i| i.name.as_str()), Some("GitHub"));
        assert!(find(&items, "gitlab").is_none());
    }
}
