use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use serde::Serialize;

use super::Context;
use crate::facets::Facets;

#[derive(Serialize)]
struct FacetsOutput<'a> {
    total: usize,
    categories: Vec<CategoryCount>,
    sectors: &'a [String],
    countries: &'a [String],
    owners: Vec<String>,
    domains: &'a [String],
}

#[derive(Serialize)]
struct CategoryCount {
    name: String,
    count: usize,
}

pub fn facets(ctx: &Context, json: bool) -> Result<()> {
    let items = ctx.load()?;
    let facets = Facets::build(&items);

    let output = FacetsOutput {
        total: facets.total,
        categories: facets
            .tab_categories()
            .into_iter()
            .map(|name| CategoryCount {
                count: facets.category_count(&name),
                name,
            })
            .collect(),
        sectors: &facets.sectors,
        countries: &facets.countries,
        owners: facets
            .owner_choices()
            .iter()
            .map(ToString::to_string)
            .collect(),
        domains: &facets.domains,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Category", "Items"]);
    for category in &output.categories {
        table.add_row(vec![category.name.clone(), category.count.to_string()]);
    }
    println!("{table}\n");

    for (label, values) in [
        ("Sectors", output.sectors),
        ("Countries", output.countries),
        ("Owners", output.owners.as_slice()),
        ("Domains", output.domains),
    ] {
        println!("{} ({})", label, values.len());
        if !values.is_empty() {
            println!("{}", textwrap::indent(&textwrap::fill(&values.join(", "), 76), "  "));
        }
    }
    println!("\n{} items total", output.total);

    Ok(())
}
