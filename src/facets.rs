use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::data::{Item, UNCATEGORIZED};

/// A selectable owner value. `Unowned` matches items with no owner set and
/// can never collide with a real owner string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerSelection {
    Unowned,
    Named(String),
}

impl OwnerSelection {
    pub fn label(&self) -> &str {
        match self {
            Self::Unowned => "(no owner)",
            Self::Named(owner) => owner,
        }
    }

    pub fn matches(&self, owner: Option<&str>) -> bool {
        match (self, owner) {
            (Self::Unowned, None) => true,
            (Self::Named(wanted), Some(owner)) => wanted == owner,
            _ => false,
        }
    }
}

impl fmt::Display for OwnerSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distinct values of every filterable field, derived once from the loaded set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub sectors: Vec<String>,
    pub countries: Vec<String>,
    pub owners: Vec<String>,
    pub domains: Vec<String>,
    /// Items per resolved category over the whole set, `Uncategorized` included.
    pub counts_by_category: BTreeMap<String, usize>,
    pub total: usize,
}

impl Facets {
    pub fn build(items: &[Item]) -> Self {
        let mut categories = BTreeSet::new();
        let mut sectors = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut owners = BTreeSet::new();
        let mut domains = BTreeSet::new();
        let mut counts_by_category = BTreeMap::new();

        for item in items {
            insert_present(&mut categories, item.category.as_deref());
            insert_present(&mut sectors, item.sector.as_deref());
            insert_present(&mut countries, item.country.as_deref());
            insert_present(&mut owners, item.owner.as_deref());
            for domain in &item.domains {
                insert_present(&mut domains, Some(domain));
            }
            *counts_by_category
                .entry(item.category_key().to_string())
                .or_insert(0) += 1;
        }

        Self {
            categories: categories.into_iter().collect(),
            sectors: sectors.into_iter().collect(),
            countries: countries.into_iter().collect(),
            owners: owners.into_iter().collect(),
            domains: domains.into_iter().collect(),
            counts_by_category,
            total: items.len(),
        }
    }

    /// Category values offered as tabs: every named category, plus
    /// `Uncategorized` when some item lacks a category.
    pub fn tab_categories(&self) -> Vec<String> {
        let mut tabs = self.categories.clone();
        if self.counts_by_category.contains_key(UNCATEGORIZED)
            && !tabs.iter().any(|c| c == UNCATEGORIZED)
        {
            tabs.push(UNCATEGORIZED.to_string());
            tabs.sort();
        }
        tabs
    }

    /// Owner choices with the unowned sentinel first.
    pub fn owner_choices(&self) -> Vec<OwnerSelection> {
        std::iter::once(OwnerSelection::Unowned)
            .chain(self.owners.iter().cloned().map(OwnerSelection::Named))
            .collect()
    }

    pub fn category_count(&self, category: &str) -> usize {
        self.counts_by_category.get(category).copied().unwrap_or(0)
    }
}

fn insert_present(set: &mut BTreeSet<String>, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        set.insert(value.to_string());
    }
}
