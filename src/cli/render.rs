use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Context, FilterArgs};
use crate::facets::Facets;
use crate::html::{render_error_page, render_page};
use crate::loader::LoadError;
use crate::view::View;

const PAGE_TITLE: &str = "Tech Directory";

pub fn render(ctx: &Context, filters: &FilterArgs, out: Option<&Path>) -> Result<()> {
    let page = match ctx.try_load() {
        Ok(items) => {
            let facets = Facets::build(&items);
            let state = filters.to_state(&facets, &ctx.config);
            let view = View::build(&items, &facets, &state, &ctx.view_options());
            tracing::info!(showing = view.showing, total = view.total, "rendered page");
            render_page(&view, PAGE_TITLE)
        }
        Err(e) => {
            tracing::error!(source = %ctx.source, error = %e, "failed to load directory");
            eprintln!("{}", LoadError::USER_MESSAGE);
            render_error_page(PAGE_TITLE)
        }
    };

    match out {
        Some(path) => {
            std::fs::write(path, page)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", page),
    }

    Ok(())
}
