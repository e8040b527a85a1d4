use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use serde::Serialize;

use super::{Context, FilterArgs};
use crate::facets::Facets;
use crate::view::View;

#[derive(Serialize)]
struct SearchResult {
    name: String,
    category: String,
    description: String,
    link: Option<String>,
}

pub fn search(ctx: &Context, query: &str, json: bool) -> Result<()> {
    let items = ctx.load()?;
    let facets = Facets::build(&items);
    let filters = FilterArgs {
        query: Some(query.to_string()),
        ..Default::default()
    };
    let state = filters.to_state(&facets, &ctx.config);
    let view = View::build(&items, &facets, &state, &ctx.view_options());

    let results: Vec<SearchResult> = view
        .groups
        .iter()
        .flat_map(|g| {
            g.sections
                .iter()
                .flat_map(|s| s.cards.iter())
                .map(move |c| SearchResult {
                    name: c.name.clone(),
                    category: g.category.clone(),
                    description: c.description.clone().unwrap_or_default(),
                    link: c.verified.then(|| c.href.clone()),
                })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        if results.is_empty() {
            println!("No items found matching '{}'", query);
            return Ok(());
        }

        println!("Found {} items matching '{}':\n", results.len(), query);

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Name", "Category", "Description", "Link"]);

        for result in results {
            table.add_row(vec![
                result.name,
                result.category,
                textwrap::fill(&result.description, 50),
                result.link.unwrap_or_else(|| "-".into()),
            ]);
        }

        println!("{table}");
    }

    Ok(())
}
