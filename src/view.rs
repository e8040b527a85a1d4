//! Pure "filter state -> view model" step shared by the terminal UI, the CLI
//! and the HTML export.

use serde::Serialize;
use url::Url;

use crate::data::Item;
use crate::facets::Facets;
use crate::query::{self, FilterState, SectionKind, SubGrouping, Tab};
use crate::sanitize::{self, display_name, is_placeholder, jump_alphabet, jump_letter};

#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Base URL relative item links are resolved against.
    pub origin: Url,
    pub sub_grouping: SubGrouping,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    /// Position of the item in the loaded list.
    pub index: usize,
    pub name: String,
    pub href: String,
    pub verified: bool,
    pub description: Option<String>,
    pub popular: bool,
    pub inactive: bool,
    pub year: Option<i64>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub owner: Option<String>,
    pub domains: Vec<String>,
    #[serde(skip)]
    pub letter: Option<char>,
}

impl CardView {
    fn from_item(index: usize, item: &Item, origin: &Url) -> Self {
        let href = sanitize::sanitize_url(item.url.as_deref(), origin);
        Self {
            index,
            name: display_name(&item.name).to_string(),
            verified: !is_placeholder(&href),
            href,
            description: item.description().map(str::to_string),
            popular: item.popular,
            inactive: item.is_inactive(),
            year: item.year,
            sector: item.sector().map(str::to_string),
            country: item.country().map(str::to_string),
            owner: item.owner().map(str::to_string),
            domains: item.domains.clone(),
            letter: jump_letter(display_name(&item.name)),
        }
    }

    /// Year, sector, country and domains in display order.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(year) = self.year {
            tags.push(year.to_string());
        }
        tags.extend(self.sector.iter().cloned());
        tags.extend(self.country.iter().cloned());
        tags.extend(self.domains.iter().cloned());
        tags
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: Option<String>,
    pub popular: bool,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub category: String,
    pub anchor: String,
    pub count: usize,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabView {
    pub label: String,
    pub count: usize,
    pub disabled: bool,
    pub active: bool,
    #[serde(skip)]
    pub tab: Tab,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LetterView {
    pub letter: char,
    pub has_items: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub groups: Vec<GroupView>,
    pub tabs: Vec<TabView>,
    pub letters: Vec<LetterView>,
    pub showing: usize,
    pub total: usize,
    pub counter: String,
}

impl View {
    pub fn build(items: &[Item], facets: &Facets, state: &FilterState, options: &ViewOptions) -> Self {
        let result = query::query(items, state);
        let groups = query::group_and_sort(
            items,
            &result.visible,
            &state.tab,
            state.sort,
            options.sub_grouping,
        );
        tracing::debug!(
            counts_base = result.counts_base.len(),
            visible = result.visible.len(),
            groups = groups.len(),
            "refreshed view"
        );

        let groups: Vec<GroupView> = groups
            .into_iter()
            .map(|group| GroupView {
                anchor: format!("cat-{}", sanitize::slug(&group.category)),
                count: group.item_count(),
                sections: group
                    .sections
                    .into_iter()
                    .map(|section| SectionView {
                        heading: section.kind.heading().map(str::to_string),
                        popular: section.kind == SectionKind::Popular,
                        cards: section
                            .items
                            .into_iter()
                            .map(|i| CardView::from_item(i, &items[i], &options.origin))
                            .collect(),
                    })
                    .collect(),
                category: group.category,
            })
            .collect();

        let counts = result.counts_by_category(items);
        let mut tabs = vec![TabView {
            label: Tab::All.label().to_string(),
            count: result.counts_base.len(),
            disabled: false,
            active: state.tab == Tab::All,
            tab: Tab::All,
        }];
        tabs.extend(facets.tab_categories().into_iter().map(|category| {
            let count = counts.get(&category).copied().unwrap_or(0);
            let tab = Tab::Category(category.clone());
            TabView {
                label: category,
                count,
                disabled: count == 0,
                active: state.tab == tab,
                tab,
            }
        }));

        let present: Vec<char> = groups
            .iter()
            .flat_map(|g| g.sections.iter())
            .flat_map(|s| s.cards.iter())
            .filter_map(|c| c.letter)
            .collect();
        let letters = jump_alphabet()
            .map(|letter| LetterView {
                letter,
                has_items: present.contains(&letter),
            })
            .collect();

        Self {
            groups,
            tabs,
            letters,
            showing: result.visible.len(),
            total: items.len(),
            counter: counter_text(result.visible.len(), items.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Cards in rendered order.
    pub fn cards(&self) -> impl Iterator<Item = &CardView> {
        self.groups
            .iter()
            .flat_map(|g| g.sections.iter())
            .flat_map(|s| s.cards.iter())
    }

    pub fn card_count(&self) -> usize {
        self.cards().count()
    }

    /// Rendered position of the first card in the given quick-jump bucket.
    pub fn first_card_with_letter(&self, letter: char) -> Option<usize> {
        let letter = letter.to_ascii_uppercase();
        self.cards().position(|c| c.letter == Some(letter))
    }

    pub fn active_tab_index(&self) -> usize {
        self.tabs.iter().position(|t| t.active).unwrap_or(0)
    }
}

pub fn counter_text(showing: usize, total: usize) -> String {
    if showing == total {
        format!("Showing {} items", total)
    } else {
        format!("Showing {} of {} items", showing, total)
    }
}
