mod check;
mod cli;
mod config;
mod contribute;
mod data;
mod debounce;
mod facets;
mod html;
mod loader;
mod logging;
mod query;
mod sanitize;
#[cfg(test)]
mod test_server;
mod tui;
mod view;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use check::LinkCheckOptions;
use cli::contribute::ContributeArgs;
use cli::{Context, FilterArgs};
use config::Config;

#[derive(Parser)]
#[command(name = "technova")]
#[command(about = "TUI/CLI browser for a categorized directory of tools and companies")]
#[command(version)]
struct Cli {
    /// Data source: a JSON file path or an http(s) URL
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List items grouped by category
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search items by name or description
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show detailed information about an item
    Show {
        /// Item name (case-insensitive)
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories, sectors, countries, owners and domains
    Facets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the directory as a static HTML page
    Render {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Report data quality and unsafe links
    Check {
        /// Also request every link and report unreachable ones
        #[arg(long)]
        reachability: bool,
        /// Per-request timeout in seconds for --reachability
        #[arg(long, default_value_t = 10, requires = "reachability")]
        timeout: u64,
        /// Concurrent requests for --reachability
        #[arg(long, default_value_t = 20, requires = "reachability")]
        workers: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest a new site for the directory
    Contribute(ContributeArgs),
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_target = if cli.command.is_none() {
        logging::LogTarget::tui_default()
    } else {
        logging::LogTarget::Stderr
    };
    logging::init(&log_target);

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "technova", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = Context::new(cli.data, Config::load()?)?;
    tracing::debug!(source = %ctx.source, origin = %ctx.origin, "starting");

    match cli.command {
        Some(Commands::List { filters, json }) => cli::list::list(&ctx, &filters, json)?,
        Some(Commands::Search { query, json }) => cli::search::search(&ctx, &query, json)?,
        Some(Commands::Show { name, json }) => cli::show::item(&ctx, &name, json)?,
        Some(Commands::Facets { json }) => cli::facets::facets(&ctx, json)?,
        Some(Commands::Render { filters, out }) => {
            cli::render::render(&ctx, &filters, out.as_deref())?
        }
        Some(Commands::Check {
            reachability,
            timeout,
            workers,
            json,
        }) => {
            let links = reachability.then(|| LinkCheckOptions {
                timeout: Duration::from_secs(timeout),
                workers,
            });
            if cli::check::check(&ctx, links.as_ref(), json)? {
                std::process::exit(2);
            }
        }
        Some(Commands::Contribute(args)) => cli::contribute::contribute(&ctx, &args)?,
        Some(Commands::Completions { .. }) => {}
        None => tui::run(ctx.try_load(), ctx.view_options(), &ctx.config)?,
    }

    Ok(())
}
