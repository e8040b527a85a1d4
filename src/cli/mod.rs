pub mod check;
pub mod contribute;
pub mod facets;
pub mod list;
pub mod render;
pub mod search;
pub mod show;

use anyhow::{Context as _, Result};
use clap::Args;
use console::style;
use url::Url;

use crate::config::Config;
use crate::data::Item;
use crate::facets::{Facets, OwnerSelection};
use crate::loader::{self, LoadError};
use crate::query::{FilterState, SortKey, Tab};
use crate::view::ViewOptions;

/// Minimum Jaro-Winkler score for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub source: String,
    pub config: Config,
    pub origin: Url,
}

impl Context {
    pub fn new(source: Option<String>, config: Config) -> Result<Self> {
        let origin = config.origin()?;
        let source = source.unwrap_or_else(|| config.data.source.clone());
        Ok(Self {
            source,
            config,
            origin,
        })
    }

    pub fn try_load(&self) -> Result<Vec<Item>, LoadError> {
        loader::load(&self.source)
    }

    pub fn load(&self) -> Result<Vec<Item>> {
        self.try_load().context(LoadError::USER_MESSAGE)
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            origin: self.origin.clone(),
            sub_grouping: self.config.display.sub_grouping,
        }
    }
}

/// Filter flags shared by `list` and `render`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search over name and description
    #[arg(long, short)]
    pub query: Option<String>,
    /// Category tab ("All" for every category)
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub sector: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long, conflicts_with = "unowned")]
    pub owner: Option<String>,
    /// Only items without an owner
    #[arg(long)]
    pub unowned: bool,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,
}

impl FilterArgs {
    pub fn to_state(&self, facets: &Facets, config: &Config) -> FilterState {
        let mut state = FilterState::with_sort(self.sort.unwrap_or(config.display.default_sort));
        state.query = self.query.clone().unwrap_or_default();

        let categories = facets.tab_categories();
        let tab = self
            .category
            .as_deref()
            .or(config.display.default_tab.as_deref())
            .map(|label| Tab::resolve(label, &categories))
            .unwrap_or_default();
        if let Tab::Category(category) = &tab {
            warn_unknown("category", category, &categories);
        }
        state.tab = tab;

        state.sector = self.sector.clone();
        state.country = self.country.clone();
        state.domain = self.domain.clone();
        state.owner = if self.unowned {
            Some(OwnerSelection::Unowned)
        } else {
            self.owner.clone().map(OwnerSelection::Named)
        };

        for (facet, value, known) in [
            ("sector", &state.sector, &facets.sectors),
            ("country", &state.country, &facets.countries),
            ("domain", &state.domain, &facets.domains),
        ] {
            if let Some(value) = value {
                warn_unknown(facet, value, known);
            }
        }
        if let Some(OwnerSelection::Named(owner)) = &state.owner {
            warn_unknown("owner", owner, &facets.owners);
        }

        state
    }
}

/// Facet values are exact matches; point out near misses.
fn warn_unknown(facet: &str, value: &str, known: &[String]) {
    if known.iter().any(|k| k == value) {
        return;
    }
    let hint = suggest(value, known.iter().map(String::as_str), 1)
        .into_iter()
        .next()
        .map(|s| format!(" Did you mean '{}'?", s))
        .unwrap_or_default();
    eprintln!(
        "{} no {} named '{}'.{}",
        style("warning:").yellow().bold(),
        facet,
        value,
        hint
    );
}

/// Closest candidates by Jaro-Winkler similarity, best first.
pub fn suggest<'a>(
    needle: &str,
    candidates: impl Iterator<Item = &'a str>,
    limit: usize,
) -> Vec<&'a str> {
    let needle = needle.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .map(|c| (strsim::jaro_winkler(&needle, &c.to_lowercase()), c))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facets() -> Facets {
        let items = vec![Item {
            name: "Acme".into(),
            category: Some("Tools".into()),
            sector: Some("Energy".into()),
            owner: Some("Acme Corp".into()),
            ..Default::default()
        }];
        Facets::build(&items)
    }

    #[test]
    fn test_filter_args_to_state() {
        let args = FilterArgs {
            query: Some("acme".into()),
            category: Some("Tools".into()),
            sector: Some("Energy".into()),
            sort: Some(SortKey::Country),
            ..Default::default()
        };
        let state = args.to_state(&facets(), &Config::default());
        assert_eq!(state.query, "acme");
        assert_eq!(state.tab, Tab::Category("Tools".into()));
        assert_eq!(state.sector.as_deref(), Some("Energy"));
        assert_eq!(state.sort, SortKey::Country);
        assert_eq!(state.owner, None);
    }

    #[test]
    fn test_unowned_flag() {
        let args = FilterArgs {
            unowned: true,
            ..Default::default()
        };
        let state = args.to_state(&facets(), &Config::default());
        assert_eq!(state.owner, Some(OwnerSelection::Unowned));

        let args = FilterArgs {
            owner: Some("Acme Corp".into()),
            ..Default::default()
        };
        let state = args.to_state(&facets(), &Config::default());
        assert_eq!(state.owner, Some(OwnerSelection::Named("Acme Corp".into())));
    }

    #[test]
    fn test_default_tab_from_config() {
        let mut config = Config::default();
        config.display.default_tab = Some("Tools".into());
        let state = FilterArgs::default().to_state(&facets(), &config);
        assert_eq!(state.tab, Tab::Category("Tools".into()));

        let args = FilterArgs {
            category: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(args.to_state(&facets(), &config).tab, Tab::All);
    }

    #[test]
    fn test_category_named_all_is_selectable() {
        let items = vec![Item {
            name: "Acme".into(),
            category: Some("All".into()),
            ..Default::default()
        }];
        let facets = Facets::build(&items);
        let args = FilterArgs {
            category: Some("All".into()),
            ..Default::default()
        };
        assert_eq!(
            args.to_state(&facets, &Config::default()).tab,
            Tab::Category("All".into())
        );
    }

    #[test]
    fn test_suggest() {
        let names = ["GitHub", "GitLab", "Figma"];
        assert_eq!(suggest("githb", names.into_iter(), 1), vec!["GitHub"]);
        assert!(suggest("zzzzzz", names.into_iter(), 3).is_empty());
    }
}
