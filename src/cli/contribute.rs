use std::io::IsTerminal;

use anyhow::{bail, Context as _, Result};
use chrono::Utc;
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input};

use super::Context;
use crate::contribute::{self, ContributionStore, StorageError, Submission};
use crate::facets::Facets;

#[derive(Args, Debug, Clone, Default)]
pub struct ContributeArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    /// Contact email (optional)
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Never prompt; missing fields are left empty
    #[arg(long)]
    pub no_input: bool,
    /// Save locally without sending to the configured relay
    #[arg(long)]
    pub no_relay: bool,
}

pub fn contribute(ctx: &Context, args: &ContributeArgs) -> Result<()> {
    let interactive = !args.no_input && std::io::stdin().is_terminal();
    let theme = ColorfulTheme::default();

    let name = field(&theme, interactive, "Site name", &args.name, false)?;
    let url = field(&theme, interactive, "Site URL (https://...)", &args.url, false)?;
    let category = match &args.category {
        Some(category) => category.clone(),
        None if interactive => prompt_category(ctx, &theme)?,
        None => String::new(),
    };
    let description = field(&theme, interactive, "Description", &args.description, true)?;
    let owner = field(&theme, interactive, "Owner", &args.owner, true)?;
    let email = field(&theme, interactive, "Contact email", &args.email, true)?;
    let notes = field(&theme, interactive, "Notes", &args.notes, true)?;

    let submission = Submission::new(
        &name,
        &url,
        &category,
        &description,
        &owner,
        &email,
        &notes,
        Utc::now(),
    );
    if let Err(e) = submission.validate() {
        bail!("{}", e);
    }

    let store = ContributionStore::new(ctx.config.store_path().ok_or(StorageError::NoDataDir)?);
    if let Err(e) = store.append(&submission) {
        // Keep what was typed so it can be resubmitted.
        eprintln!("{}", serde_json::to_string_pretty(&submission)?);
        return Err(e).context("Failed to save contribution");
    }
    println!(
        "{} Thanks! Saved \"{}\" to {}",
        style("✓").green(),
        submission.site_name,
        store.path().display()
    );

    if let Some(endpoint) = ctx.config.relay_url().filter(|_| !args.no_relay) {
        match contribute::relay(endpoint, &submission) {
            Ok(()) => println!("{} Sent to {}", style("✓").green(), endpoint),
            Err(e) => eprintln!("{} {}", style("!").yellow(), relay_failure(endpoint, &e)),
        }
    }

    Ok(())
}

/// The one line shown when relaying fails; the local save already happened.
fn relay_failure(endpoint: &str, error: &anyhow::Error) -> String {
    format!(
        "Could not send to {} ({}). Your contribution is saved locally.",
        endpoint, error
    )
}

fn field(
    theme: &ColorfulTheme,
    interactive: bool,
    prompt: &str,
    value: &Option<String>,
    optional: bool,
) -> Result<String> {
    if let Some(value) = value {
        return Ok(value.clone());
    }
    if !interactive {
        return Ok(String::new());
    }
    let input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(optional)
        .interact_text()?;
    Ok(input)
}

/// Pick from the categories in the loaded directory, or type a new one.
fn prompt_category(ctx: &Context, theme: &ColorfulTheme) -> Result<String> {
    let categories = match ctx.try_load() {
        Ok(items) => Facets::build(&items).categories,
        Err(e) => {
            tracing::debug!(error = %e, "no categories to offer");
            Vec::new()
        }
    };
    if categories.is_empty() {
        return Ok(Input::<String>::with_theme(theme)
            .with_prompt("Category")
            .interact_text()?);
    }

    let mut choices = categories.clone();
    choices.push("Other...".to_string());
    let picked = FuzzySelect::with_theme(theme)
        .with_prompt("Category")
        .items(&choices)
        .default(0)
        .interact()?;

    match categories.get(picked) {
        Some(category) => Ok(category.clone()),
        None => Ok(Input::<String>::with_theme(theme)
            .with_prompt("New category")
            .interact_text()?),
    }
}
