use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use console::style;

use super::Context;
use crate::check::{check_links, CheckReport, Issue, LinkCheckOptions, LinkStatus};

/// Print the data report. Returns true when link or markup safety issues were found.
pub fn check(ctx: &Context, links: Option<&LinkCheckOptions>, json: bool) -> Result<bool> {
    let items = ctx.load()?;
    let mut report = CheckReport::build(&items, &ctx.origin);
    if let Some(options) = links {
        eprintln!("Checking {} links...", items.len());
        report.links = Some(check_links(&items, &ctx.origin, options)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.has_security_issues());
    }

    println!("{}", style("Summary").bold());
    println!("  Items:       {}", report.total);
    println!("  Categories:  {}", report.categories);
    println!("  Popular:     {}", report.popular);
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Category", "Items"]);
    for (category, count) in &report.top_categories {
        table.add_row(vec![category.clone(), count.to_string()]);
    }
    println!("{}", style("Top categories").bold());
    println!("{table}\n");

    println!("{}", style("Data quality").bold());
    print_names("Duplicate names", &report.duplicates);
    print_names("Missing URL", &report.missing_url);
    print_names("Missing category", &report.missing_category);
    print_names("Missing description", &report.missing_description);
    if report.empty_names > 0 {
        println!("  {} Empty names: {}", style("!").yellow(), report.empty_names);
    }
    println!();

    println!("{}", style("Safety").bold());
    print_issues("Unsafe URLs", &report.unsafe_urls);
    print_issues("Markup in text", &report.markup);

    if let Some(links) = &report.links {
        print_reachability(&report, links.len());
    }

    if report.has_security_issues() {
        println!(
            "\n{} {} safety issue(s) found",
            style("✗").red().bold(),
            report.security_issue_count()
        );
    } else {
        println!("\n{} No safety issues found", style("✓").green().bold());
    }

    Ok(report.has_security_issues())
}

fn print_names(label: &str, names: &[String]) {
    if names.is_empty() {
        println!("  {} {}: none", style("✓").green(), label);
        return;
    }
    println!("  {} {}: {}", style("!").yellow(), label, names.len());
    for name in names.iter().take(10) {
        println!("      {}", name);
    }
    if names.len() > 10 {
        println!("      ... and {} more", names.len() - 10);
    }
}

fn print_issues(label: &str, issues: &[Issue]) {
    if issues.is_empty() {
        println!("  {} {}: none", style("✓").green(), label);
        return;
    }
    println!("  {} {}: {}", style("✗").red(), label, issues.len());
    for issue in issues {
        println!("      #{} {}: {}", issue.index, issue.name, issue.detail);
    }
}

fn print_reachability(report: &CheckReport, checked: usize) {
    println!();
    println!("{}", style("Reachability").bold());
    let broken: Vec<_> = report.broken_links().collect();
    if broken.is_empty() {
        println!("  {} All {} links reachable", style("✓").green(), checked);
    } else {
        println!("  {} {} of {} links broken", style("✗").red(), broken.len(), checked);

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Name", "Status", "URL", "Error"]);
        for link in broken {
            table.add_row(vec![
                link.name.clone(),
                link.status.label(),
                link.url.clone(),
                link.error.clone().unwrap_or_default(),
            ]);
        }
        println!("{table}");
    }

    let redirects = report
        .links
        .iter()
        .flatten()
        .filter(|l| l.status == LinkStatus::Redirect);
    for link in redirects {
        println!(
            "  {} {} -> {}",
            style("→").yellow(),
            link.url,
            link.final_url.as_deref().unwrap_or("-")
        );
    }
}
