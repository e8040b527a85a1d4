use std::time::Instant;

use ratatui::widgets::ListState;

use crate::config::Config;
use crate::data::Item;
use crate::debounce::Debouncer;
use crate::facets::{Facets, OwnerSelection};
use crate::query::{FilterState, SortKey, Tab};
use crate::sanitize::is_placeholder;
use crate::view::{CardView, View, ViewOptions};

/// Page size for page up/down navigation
const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    /// Waiting for a quick-jump letter.
    Jump,
}

#[derive(Debug)]
pub enum Message {
    Quit,
    NextTab,
    PrevTab,
    NextItem,
    PrevItem,
    FirstItem,
    LastItem,
    PageDown,
    PageUp,
    EnterSearch,
    ExitSearch,
    SearchInput(char),
    SearchBackspace,
    ClearSearch,
    CycleSort,
    CycleSector,
    CycleCountry,
    CycleOwner,
    CycleDomain,
    Reset,
    EnterJump,
    JumpTo(char),
    CancelJump,
    ToggleHelp,
    ScrollHelpDown,
    ScrollHelpUp,
    // Side effects handled in the main loop
    OpenUrl,
    CopyUrl,
}

/// One line of the list pane.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Group { category: String, count: usize },
    Section { heading: String, popular: bool },
    /// Position into the view's cards.
    Card(usize),
}

pub struct App {
    items: Vec<Item>,
    pub facets: Facets,
    pub state: FilterState,
    options: ViewOptions,
    default_sort: SortKey,
    pub view: View,
    rows: Vec<Row>,
    /// Set when the directory failed to load; replaces the list.
    pub load_error: Option<String>,
    pub mode: Mode,
    pub selected: usize,
    pub list_state: ListState,
    pub search_debounce: Debouncer,
    pub status_message: Option<String>,
    pub show_help: bool,
    pub help_scroll: u16,
}

impl App {
    pub fn new(items: Vec<Item>, options: ViewOptions, config: &Config) -> Self {
        let facets = Facets::build(&items);
        let default_sort = config.display.default_sort;
        let mut state = FilterState::with_sort(default_sort);
        if let Some(tab) = &config.display.default_tab {
            state.tab = Tab::resolve(tab, &facets.tab_categories());
        }
        let view = View::build(&items, &facets, &state, &options);

        let mut app = Self {
            items,
            facets,
            state,
            options,
            default_sort,
            view,
            rows: Vec::new(),
            load_error: None,
            mode: Mode::Normal,
            selected: 0,
            list_state: ListState::default(),
            search_debounce: Debouncer::new(config.debounce()),
            status_message: None,
            show_help: false,
            help_scroll: 0,
        };
        app.rebuild_rows();
        app.select(0);
        app
    }

    /// An app with nothing loaded that shows `message` in place of the list.
    pub fn failed(message: &str, options: ViewOptions, config: &Config) -> Self {
        let mut app = Self::new(Vec::new(), options, config);
        app.load_error = Some(message.to_string());
        app
    }

    pub fn update(&mut self, msg: Message) -> bool {
        match msg {
            Message::Quit => return false,
            Message::NextTab => self.step_tab(true),
            Message::PrevTab => self.step_tab(false),
            Message::NextItem => self.select(self.selected.saturating_add(1)),
            Message::PrevItem => self.select(self.selected.saturating_sub(1)),
            Message::FirstItem => self.select(0),
            Message::LastItem => self.select(usize::MAX),
            Message::PageDown => self.select(self.selected.saturating_add(PAGE_SIZE)),
            Message::PageUp => self.select(self.selected.saturating_sub(PAGE_SIZE)),
            Message::EnterSearch => {
                self.mode = Mode::Search;
            }
            Message::ExitSearch => {
                self.mode = Mode::Normal;
            }
            Message::SearchInput(c) => {
                self.state.query.push(c);
                self.search_debounce.schedule(Instant::now());
            }
            Message::SearchBackspace => {
                self.state.query.pop();
                self.search_debounce.schedule(Instant::now());
            }
            Message::ClearSearch => {
                self.search_debounce.cancel();
                if !self.state.query.is_empty() {
                    self.state.query.clear();
                    self.refresh();
                }
            }
            Message::CycleSort => {
                self.state.sort = self.state.sort.next();
                self.refresh();
            }
            Message::CycleSector => {
                self.state.sector = cycle(&self.state.sector, &self.facets.sectors);
                self.refresh();
            }
            Message::CycleCountry => {
                self.state.country = cycle(&self.state.country, &self.facets.countries);
                self.refresh();
            }
            Message::CycleOwner => {
                self.state.owner = cycle(&self.state.owner, &self.facets.owner_choices());
                self.refresh();
            }
            Message::CycleDomain => {
                self.state.domain = cycle(&self.state.domain, &self.facets.domains);
                self.refresh();
            }
            Message::Reset => {
                self.search_debounce.cancel();
                self.state.reset(self.default_sort);
                self.refresh();
            }
            Message::EnterJump => {
                self.mode = Mode::Jump;
            }
            Message::JumpTo(letter) => {
                self.mode = Mode::Normal;
                match self.view.first_card_with_letter(letter) {
                    Some(position) => self.select(position),
                    None => self.set_status(format!("No items starting with {}", letter)),
                }
            }
            Message::CancelJump => {
                self.mode = Mode::Normal;
            }
            Message::ToggleHelp => {
                self.show_help = !self.show_help;
                self.help_scroll = 0;
            }
            Message::ScrollHelpDown => {
                self.help_scroll = self.help_scroll.saturating_add(1);
            }
            Message::ScrollHelpUp => {
                self.help_scroll = self.help_scroll.saturating_sub(1);
            }
            Message::OpenUrl | Message::CopyUrl => {}
        }
        true
    }

    /// Run a pending debounced search once its quiet period has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.search_debounce.fire_if_due(now) {
            self.refresh();
        }
    }

    /// Recompute the view from the current filter state.
    pub fn refresh(&mut self) {
        self.view = View::build(&self.items, &self.facets, &self.state, &self.options);
        self.rebuild_rows();
        self.select(self.selected);
    }

    fn rebuild_rows(&mut self) {
        let mut rows = Vec::new();
        let mut position = 0;
        for group in &self.view.groups {
            rows.push(Row::Group {
                category: group.category.clone(),
                count: group.count,
            });
            for section in &group.sections {
                if let Some(heading) = &section.heading {
                    rows.push(Row::Section {
                        heading: heading.clone(),
                        popular: section.popular,
                    });
                }
                for _ in &section.cards {
                    rows.push(Row::Card(position));
                    position += 1;
                }
            }
        }
        self.rows = rows;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn select(&mut self, position: usize) {
        let count = self.view.card_count();
        self.selected = position.min(count.saturating_sub(1));
        let row = self
            .rows
            .iter()
            .position(|r| *r == Row::Card(self.selected));
        self.list_state.select(row);
    }

    fn step_tab(&mut self, forward: bool) {
        let current = self.view.active_tab_index();
        let candidates: Box<dyn Iterator<Item = usize>> = if forward {
            Box::new(current + 1..self.view.tabs.len())
        } else {
            Box::new((0..current).rev())
        };
        let next = candidates
            .into_iter()
            .find(|&i| !self.view.tabs[i].disabled);

        if let Some(i) = next {
            self.state.tab = self.view.tabs[i].tab.clone();
            self.selected = 0;
            self.refresh();
        }
    }

    pub fn current_card(&self) -> Option<&CardView> {
        self.view.cards().nth(self.selected)
    }

    /// Sanitized link of the selected card, if it has a usable one.
    pub fn current_link(&self) -> Option<String> {
        self.current_card()
            .map(|c| c.href.clone())
            .filter(|href| !is_placeholder(href))
    }

    pub fn owner_label(&self) -> String {
        self.state
            .owner
            .as_ref()
            .map(OwnerSelection::to_string)
            .unwrap_or_else(|| "any".to_string())
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some(msg);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

/// Advance an optional selection through `values`: none -> first -> ... -> last -> none.
fn cycle<T: Clone + PartialEq>(current: &Option<T>, values: &[T]) -> Option<T> {
    match current {
        None => values.first().cloned(),
        Some(value) => values
            .iter()
            .position(|v| v == value)
            .and_then(|i| values.get(i + 1))
            .cloned(),
    }
}
