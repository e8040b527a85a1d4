use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};

use super::{Context, FilterArgs};
use crate::facets::Facets;
use crate::html::NO_RESULTS_MESSAGE;
use crate::view::{GroupView, View};

pub fn list(ctx: &Context, filters: &FilterArgs, json: bool) -> Result<()> {
    let items = ctx.load()?;
    let facets = Facets::build(&items);
    let state = filters.to_state(&facets, &ctx.config);
    let view = View::build(&items, &facets, &state, &ctx.view_options());

    if json {
        println!("{}", serde_json::to_string_pretty(&view.groups)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("{}", NO_RESULTS_MESSAGE);
        return Ok(());
    }

    println!("{}\n", view.counter);
    for group in &view.groups {
        println!("{} ({})", group.category, group.count);
        println!("{table}\n", table = group_table(group));
    }

    Ok(())
}

/// One table per category; section headings become separator rows.
pub(super) fn group_table(group: &GroupView) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Name", "Sector", "Country", "Owner", "Domains", "Link"]);

    for section in &group.sections {
        if let Some(heading) = &section.heading {
            let heading = if section.popular {
                format!("★ {}", heading)
            } else {
                heading.clone()
            };
            table.add_row(vec![heading]);
        }
        for card in &section.cards {
            let mut name = card.name.clone();
            if card.inactive {
                name.push_str(" (inactive)");
            }
            table.add_row(vec![
                name,
                card.sector.clone().unwrap_or_else(|| "-".into()),
                card.country.clone().unwrap_or_else(|| "-".into()),
                card.owner.clone().unwrap_or_else(|| "-".into()),
                card.domains.join(", "),
                if card.verified {
                    card.href.clone()
                } else {
                    "-".into()
                },
            ]);
        }
    }

    table
}
