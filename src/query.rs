use std::cmp::Ordering;
use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::Item;
use crate::facets::OwnerSelection;
use crate::sanitize::clean_name;

/// Section label for items without a domain under domain sub-grouping.
pub const OTHER_DOMAIN: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    All,
    Category(String),
}

impl Tab {
    /// Parse a tab label; "All" (any case) or blank selects every category.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case("all") {
            Tab::All
        } else {
            Tab::Category(label.to_string())
        }
    }

    /// Like [`Tab::parse`], but an exact category name wins, so a category
    /// literally named "All" stays selectable.
    pub fn resolve(label: &str, categories: &[String]) -> Self {
        let trimmed = label.trim();
        if categories.iter().any(|c| c == trimmed) {
            Tab::Category(trimmed.to_string())
        } else {
            Tab::parse(label)
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tab::All => "All",
            Tab::Category(category) => category,
        }
    }

    fn matches(&self, item: &Item) -> bool {
        match self {
            Tab::All => true,
            Tab::Category(category) => item.category_key() == category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    Country,
    Domain,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::NameAsc => SortKey::NameDesc,
            SortKey::NameDesc => SortKey::Country,
            SortKey::Country => SortKey::Domain,
            SortKey::Domain => SortKey::NameAsc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::NameAsc => "name ↑",
            SortKey::NameDesc => "name ↓",
            SortKey::Country => "country",
            SortKey::Domain => "domain",
        }
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match self {
            SortKey::NameAsc => locale_cmp(clean_name(&a.name), clean_name(&b.name)),
            SortKey::NameDesc => locale_cmp(clean_name(&b.name), clean_name(&a.name)),
            SortKey::Country => locale_cmp(
                a.country().unwrap_or_default(),
                b.country().unwrap_or_default(),
            ),
            SortKey::Domain => locale_cmp(
                a.primary_domain().unwrap_or_default(),
                b.primary_domain().unwrap_or_default(),
            ),
        }
    }
}

/// How a category's items are split into sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SubGrouping {
    None,
    /// "Most Popular" first, then "More".
    #[default]
    Popular,
    /// One section per primary domain, only while a single category is selected.
    Domain,
}

/// Filter state owned by the front end. Created with defaults, changed only by user input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub query: String,
    pub tab: Tab,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub owner: Option<OwnerSelection>,
    pub domain: Option<String>,
    pub sort: SortKey,
}

impl FilterState {
    pub fn with_sort(sort: SortKey) -> Self {
        Self {
            sort,
            ..Default::default()
        }
    }

    /// Restore every filter to its default, keeping `sort` as the configured default.
    pub fn reset(&mut self, default_sort: SortKey) {
        *self = Self::with_sort(default_sort);
    }

    pub fn is_filtered(&self) -> bool {
        !self.query.trim().is_empty()
            || self.tab != Tab::All
            || self.sector.is_some()
            || self.country.is_some()
            || self.owner.is_some()
            || self.domain.is_some()
    }

    /// Every predicate except the category tab.
    fn matches_facets(&self, item: &Item, needle: &str) -> bool {
        if let Some(sector) = &self.sector {
            if item.sector() != Some(sector.as_str()) {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if item.country() != Some(country.as_str()) {
                return false;
            }
        }
        if let Some(owner) = &self.owner {
            if !owner.matches(item.owner()) {
                return false;
            }
        }
        if let Some(domain) = &self.domain {
            if !item.domains.iter().any(|d| d == domain) {
                return false;
            }
        }
        needle.is_empty() || item.search_text().contains(needle)
    }
}

/// Positions into the loaded item list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Items passing every filter except the category tab.
    pub counts_base: Vec<usize>,
    /// `counts_base` narrowed to the selected tab.
    pub visible: Vec<usize>,
}

impl QueryResult {
    /// Matching items per resolved category, from `counts_base`.
    pub fn counts_by_category(&self, items: &[Item]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for &i in &self.counts_base {
            *counts.entry(items[i].category_key().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

pub fn query(items: &[Item], state: &FilterState) -> QueryResult {
    let needle = state.query.trim().to_lowercase();

    let counts_base: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| state.matches_facets(item, &needle))
        .map(|(i, _)| i)
        .collect();

    let visible = counts_base
        .iter()
        .copied()
        .filter(|&i| state.tab.matches(&items[i]))
        .collect();

    QueryResult {
        counts_base,
        visible,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// The whole group, no sub-heading.
    All,
    Popular,
    More,
    Domain(String),
}

impl SectionKind {
    pub fn heading(&self) -> Option<&str> {
        match self {
            SectionKind::All => None,
            SectionKind::Popular => Some("Most Popular"),
            SectionKind::More => Some("More"),
            SectionKind::Domain(domain) => Some(domain),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub items: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub category: String,
    pub sections: Vec<Section>,
}

impl Group {
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Sort `visible` with the active comparator (stable), then partition by category.
///
/// Under `Tab::All` groups are ordered by category name; with a specific tab
/// only that category's group is produced.
pub fn group_and_sort(
    items: &[Item],
    visible: &[usize],
    tab: &Tab,
    sort: SortKey,
    sub_grouping: SubGrouping,
) -> Vec<Group> {
    let mut ordered = visible.to_vec();
    ordered.sort_by(|&a, &b| sort.compare(&items[a], &items[b]));

    let mut by_category: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for i in ordered {
        by_category
            .entry(items[i].category_key())
            .or_default()
            .push(i);
    }

    let single = match tab {
        Tab::All => None,
        Tab::Category(category) => Some(category.as_str()),
    };

    by_category
        .into_iter()
        .filter(|(category, _)| single.is_none_or(|wanted| wanted == *category))
        .map(|(category, members)| Group {
            category: category.to_string(),
            sections: split_sections(items, members, sub_grouping, single.is_some()),
        })
        .collect()
}

fn split_sections(
    items: &[Item],
    members: Vec<usize>,
    sub_grouping: SubGrouping,
    single_category: bool,
) -> Vec<Section> {
    match sub_grouping {
        SubGrouping::Popular => {
            let (popular, more): (Vec<usize>, Vec<usize>) =
                members.into_iter().partition(|&i| items[i].popular);
            [(SectionKind::Popular, popular), (SectionKind::More, more)]
                .into_iter()
                .filter(|(_, items)| !items.is_empty())
                .map(|(kind, items)| Section { kind, items })
                .collect()
        }
        SubGrouping::Domain if single_category => {
            let mut by_domain: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            let mut other = Vec::new();
            for i in members {
                match items[i].primary_domain() {
                    Some(domain) => by_domain.entry(domain).or_default().push(i),
                    None => other.push(i),
                }
            }
            let mut sections: Vec<Section> = by_domain
                .into_iter()
                .map(|(domain, items)| Section {
                    kind: SectionKind::Domain(domain.to_string()),
                    items,
                })
                .collect();
            if !other.is_empty() {
                sections.push(Section {
                    kind: SectionKind::Domain(OTHER_DOMAIN.to_string()),
                    items: other,
                });
            }
            sections
        }
        SubGrouping::None | SubGrouping::Domain => vec![Section {
            kind: SectionKind::All,
            items: members,
        }],
    }
}

/// Case-folded comparison with lowercase ordered before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: &str) -> Item {
        Item {
            name: name.into(),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    fn names(items: &[Item], indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| items[i].name.clone()).collect()
    }

    #[test]
    fn test_resolve_prefers_exact_category() {
        let categories = vec!["All".to_string(), "Tools".to_string()];
        assert_eq!(Tab::resolve("All", &categories), Tab::Category("All".into()));
        assert_eq!(Tab::resolve("all", &categories), Tab::All);
        assert_eq!(Tab::resolve(" Tools ", &categories), Tab::Category("Tools".into()));
        assert_eq!(Tab::resolve("All", &[]), Tab::All);

        let items = vec![item("Alpha", "All"), item("Beta", "Tools")];
        let state = FilterState {
            tab: Tab::resolve("All", &categories),
            ..Default::default()
        };
        let result = query(&items, &state);
        assert_eq!(names(&items, &result.visible), vec!["Alpha"]);
    }

    fn indices(group: &Group) -> Vec<usize> {
        group.sections.iter().flat_map(|s| s.items.iter().copied()).collect()
    }

    fn scenario() -> Vec<Item> {
        vec![
            item("Zeta", "Tools"),
            item("Alpha", "Tools"),
            item("Beta", "Apps"),
        ]
    }

    #[test]
    fn test_all_tab_groups_alphabetically() {
        let items = scenario();
        let state = FilterState::default();
        let result = query(&items, &state);
        let groups = group_and_sort(
            &items,
            &result.visible,
            &state.tab,
            state.sort,
            SubGrouping::None,
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Apps");
        assert_eq!(
            names(&items, &indices(&groups[0])),
            vec!["Beta"]
        );
        assert_eq!(groups[1].category, "Tools");
        assert_eq!(
            names(&items, &indices(&groups[1])),
            vec!["Alpha", "Zeta"]
        );
    }

    #[test]
    fn test_search_narrows_counts_base() {
        let items = scenario();
        let state = FilterState {
            query: "zet".into(),
            ..Default::default()
        };
        let result = query(&items, &state);
        assert_eq!(names(&items, &result.visible), vec!["Zeta"]);

        let counts = result.counts_by_category(&items);
        assert_eq!(counts.get("Tools"), Some(&1));
        assert_eq!(counts.get("Apps"), None);
    }

    #[test]
    fn test_tab_does_not_shrink_counts_base() {
        let items = scenario();
        let state = FilterState {
            tab: Tab::Category("Apps".into()),
            ..Default::default()
        };
        let result = query(&items, &state);
        assert_eq!(result.counts_base.len(), 3);
        assert_eq!(names(&items, &result.visible), vec!["Beta"]);
        assert!(result.visible.iter().all(|i| result.counts_base.contains(i)));
    }

    #[test]
    fn test_visible_is_counts_base_filtered_by_category() {
        let items = scenario();
        for tab in [Tab::All, Tab::parse("Tools"), Tab::parse("Apps"), Tab::parse("Nope")] {
            let state = FilterState {
                query: "a".into(),
                tab: tab.clone(),
                ..Default::default()
            };
            let result = query(&items, &state);
            let expected: Vec<usize> = result
                .counts_base
                .iter()
                .copied()
                .filter(|&i| tab.matches(&items[i]))
                .collect();
            assert_eq!(result.visible, expected);
        }
    }

    #[test]
    fn test_blank_query_is_no_filter() {
        let items = scenario();
        let state = FilterState {
            query: "   ".into(),
            ..Default::default()
        };
        assert_eq!(query(&items, &state).visible.len(), 3);
    }

    #[test]
    fn test_query_matches_description_case_insensitively() {
        let mut items = scenario();
        items[2].description = Some("A Streaming APP".into());
        let state = FilterState {
            query: "streaming app".into(),
            ..Default::default()
        };
        assert_eq!(names(&items, &query(&items, &state).visible), vec!["Beta"]);
    }

    #[test]
    fn test_unowned_sentinel() {
        let mut items = scenario();
        items[0].owner = Some("Acme".into());

        let unowned = FilterState {
            owner: Some(OwnerSelection::Unowned),
            ..Default::default()
        };
        assert_eq!(names(&items, &query(&items, &unowned).visible), vec!["Alpha", "Beta"]);

        let acme = FilterState {
            owner: Some(OwnerSelection::Named("Acme".into())),
            ..Default::default()
        };
        assert_eq!(names(&items, &query(&items, &acme).visible), vec!["Zeta"]);
    }

    #[test]
    fn test_facet_filters_are_conjunctive() {
        let mut items = scenario();
        items[0].sector = Some("Software".into());
        items[0].country = Some("Sweden".into());
        items[1].sector = Some("Software".into());
        items[1].country = Some("France".into());
        items[1].domains = vec!["AI".into()];

        let state = FilterState {
            sector: Some("Software".into()),
            country: Some("France".into()),
            ..Default::default()
        };
        assert_eq!(names(&items, &query(&items, &state).visible), vec!["Alpha"]);

        let state = FilterState {
            domain: Some("AI".into()),
            ..Default::default()
        };
        assert_eq!(names(&items, &query(&items, &state).visible), vec!["Alpha"]);
    }

    #[test]
    fn test_unknown_facet_value_matches_nothing() {
        let items = scenario();
        let state = FilterState {
            sector: Some("Nonexistent".into()),
            ..Default::default()
        };
        let result = query(&items, &state);
        assert!(result.counts_base.is_empty());
        assert!(result.visible.is_empty());
    }

    #[test]
    fn test_name_sort_reverses_and_stays_stable() {
        let items = vec![
            item("Delta", "T"),
            item("", "T"),
            item("alpha", "T"),
            item("Same", "T"),
            item("Charlie", "T"),
            item("Same", "T"),
            item("\"\"", "T"),
        ];
        let all: Vec<usize> = (0..items.len()).collect();

        let mut asc = all.clone();
        asc.sort_by(|&a, &b| SortKey::NameAsc.compare(&items[a], &items[b]));
        let mut desc = all.clone();
        desc.sort_by(|&a, &b| SortKey::NameDesc.compare(&items[a], &items[b]));

        // Equal (and empty) names keep input order in both directions.
        assert_eq!(asc, vec![1, 6, 2, 4, 0, 3, 5]);
        assert_eq!(desc, vec![3, 5, 0, 4, 2, 1, 6]);
    }

    #[test]
    fn test_country_sort_puts_missing_first() {
        let mut items = vec![item("A", "T"), item("B", "T"), item("C", "T")];
        items[0].country = Some("Sweden".into());
        items[2].country = Some("Canada".into());
        let groups = group_and_sort(&items, &[0, 1, 2], &Tab::All, SortKey::Country, SubGrouping::None);
        assert_eq!(
            names(&items, &indices(&groups[0])),
            vec!["B", "C", "A"]
        );
    }

    #[test]
    fn test_domain_sort_uses_first_domain() {
        let mut items = vec![item("A", "T"), item("B", "T"), item("C", "T")];
        items[0].domains = vec!["Zoo".into(), "Alpha".into()];
        items[1].domains = vec!["Middle".into()];
        let groups = group_and_sort(&items, &[0, 1, 2], &Tab::All, SortKey::Domain, SubGrouping::None);
        assert_eq!(
            names(&items, &indices(&groups[0])),
            vec!["C", "B", "A"]
        );
    }

    #[test]
    fn test_popular_sections() {
        let mut items = scenario();
        items[0].popular = true;
        let groups = group_and_sort(&items, &[0, 1, 2], &Tab::All, SortKey::NameAsc, SubGrouping::Popular);

        let tools = &groups[1];
        assert_eq!(tools.sections.len(), 2);
        assert_eq!(tools.sections[0].kind, SectionKind::Popular);
        assert_eq!(names(&items, &tools.sections[0].items), vec!["Zeta"]);
        assert_eq!(tools.sections[1].kind, SectionKind::More);
        assert_eq!(names(&items, &tools.sections[1].items), vec!["Alpha"]);

        let apps = &groups[0];
        assert_eq!(apps.sections.len(), 1);
        assert_eq!(apps.sections[0].kind, SectionKind::More);
    }

    #[test]
    fn test_domain_sections_only_for_single_category() {
        let mut items = scenario();
        items[0].domains = vec!["Cloud".into()];

        let all = group_and_sort(&items, &[0, 1, 2], &Tab::All, SortKey::NameAsc, SubGrouping::Domain);
        assert!(all.iter().all(|g| g.sections.len() == 1 && g.sections[0].kind == SectionKind::All));

        let tools = Tab::Category("Tools".into());
        let single = group_and_sort(&items, &[0, 1], &tools, SortKey::NameAsc, SubGrouping::Domain);
        assert_eq!(single.len(), 1);
        let kinds: Vec<_> = single[0].sections.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Domain("Cloud".into()),
                SectionKind::Domain(OTHER_DOMAIN.into())
            ]
        );
    }

    #[test]
    fn test_uncategorized_tab_matches_missing_category() {
        let mut items = scenario();
        items.push(Item {
            name: "Loose".into(),
            ..Default::default()
        });
        let state = FilterState {
            tab: Tab::parse("Uncategorized"),
            ..Default::default()
        };
        assert_eq!(names(&items, &query(&items, &state).visible), vec!["Loose"]);
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("", "a"), Ordering::Less);
        assert_eq!(locale_cmp("Same", "Same"), Ordering::Equal);
    }

    #[test]
    fn test_sort_key_cycle() {
        let start = SortKey::NameAsc;
        assert_eq!(start.next(), SortKey::NameDesc);
        assert_eq!(start.next().next().next().next(), SortKey::NameAsc);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = FilterState {
            query: "x".into(),
            tab: Tab::parse("Apps"),
            sector: Some("Media".into()),
            sort: SortKey::Domain,
            ..Default::default()
        };
        assert!(state.is_filtered());
        state.reset(SortKey::NameAsc);
        assert_eq!(state, FilterState::default());
        assert!(!state.is_filtered());
    }
}
