//! Search, filter, sort and pagination for the public school listing.
//!
//! Everything here is a pure function of the fetched records and the current
//! [`ListingState`]; the page is re-derived on every state change.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{Board, SchoolRecord};

/// Number of schools shown per listing page.
pub const PAGE_SIZE: usize = 6;

/// A dropdown choice that is either "all" or one concrete value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected.to_lowercase() == value.to_lowercase(),
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::from(value.as_str())
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        match value {
            Selection::All => "all".to_string(),
            Selection::Only(value) => value,
        }
    }
}

/// Ordering criterion picked by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Rating,
    Name,
    City,
    Established,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Rating,
        SortKey::Name,
        SortKey::City,
        SortKey::Established,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Rating => "rating",
            SortKey::Name => "name",
            SortKey::City => "city",
            SortKey::Established => "established",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Rating => "Highest Rated",
            SortKey::Name => "Name (A-Z)",
            SortKey::City => "City",
            SortKey::Established => "Newest First",
        }
    }

    /// Comparator for `sort_by`. Used with a stable sort, so ties keep input order.
    pub fn compare(self, a: &SchoolRecord, b: &SchoolRecord) -> Ordering {
        match self {
            SortKey::Rating => b
                .overall_rating()
                .partial_cmp(&a.overall_rating())
                .unwrap_or(Ordering::Equal),
            SortKey::Name => compare_text(&a.name, &b.name),
            SortKey::City => compare_text(&a.city, &b.city),
            SortKey::Established => b.established_year().cmp(&a.established_year()),
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownSortKey(trimmed.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}' (expected rating, name, city or established)")]
pub struct UnknownSortKey(pub String);

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// User-controlled listing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingState {
    pub search_query: String,
    pub selected_city: Selection,
    pub selected_board: Selection,
    pub sort_key: SortKey,
    pub current_page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            selected_city: Selection::All,
            selected_board: Selection::All,
            sort_key: SortKey::Rating,
            current_page: 1,
        }
    }
}

impl ListingState {
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.search_query {
            self.search_query = query;
            self.current_page = 1;
        }
    }

    pub fn select_city(&mut self, city: impl Into<Selection>) {
        let city = city.into();
        if city != self.selected_city {
            self.selected_city = city;
            self.current_page = 1;
        }
    }

    pub fn select_board(&mut self, board: impl Into<Selection>) {
        let board = board.into();
        if board != self.selected_board {
            self.selected_board = board;
            self.current_page = 1;
        }
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        if sort_key != self.sort_key {
            self.sort_key = sort_key;
            self.current_page = 1;
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = (self.current_page + 1).min(total_pages.max(1));
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_query.is_empty()
            || !self.selected_city.is_all()
            || !self.selected_board.is_all()
    }

    /// Back to the defaults: empty query, all cities, all boards, rating order.
    pub fn clear_filters(&mut self) {
        *self = Self::default();
    }

    /// The filter predicate: query on name or city, plus city and board selections.
    pub fn matches(&self, record: &SchoolRecord) -> bool {
        let query = self.search_query.to_lowercase();
        let matches_search = query.is_empty()
            || record.name.to_lowercase().contains(&query)
            || record.city.to_lowercase().contains(&query);

        matches_search
            && self.selected_city.matches(&record.city)
            && self.selected_board.matches(record.board.label())
    }
}

/// One rendered page of the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub records: Vec<SchoolRecord>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub current_page: usize,
    /// 1-based position of the first shown record, 0 when nothing matched.
    pub range_start: usize,
    pub range_end: usize,
}

impl ListingPage {
    pub fn summary(&self) -> String {
        format!(
            "Showing {}-{} of {} schools",
            self.range_start, self.range_end, self.total_filtered
        )
    }
}

pub fn total_pages(filtered: usize) -> usize {
    filtered.div_ceil(PAGE_SIZE).max(1)
}

/// Filter, sort and slice `records` for the given state.
///
/// A requested page beyond the last one is clamped so the result always
/// describes a page that exists.
pub fn derive_page(records: &[SchoolRecord], state: &ListingState) -> ListingPage {
    let mut filtered: Vec<&SchoolRecord> = records
        .iter()
        .filter(|record| state.matches(record))
        .collect();
    filtered.sort_by(|a, b| state.sort_key.compare(a, b));

    let total_filtered = filtered.len();
    let total_pages = total_pages(total_filtered);
    let current_page = state.current_page.clamp(1, total_pages);
    let start = (current_page - 1) * PAGE_SIZE;

    let records: Vec<SchoolRecord> = filtered
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    let (range_start, range_end) = if records.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + records.len())
    };

    ListingPage {
        records,
        total_filtered,
        total_pages,
        current_page,
        range_start,
        range_end,
    }
}

/// Distinct boards present in `records`, in first-seen order.
pub fn available_boards(records: &[SchoolRecord]) -> Vec<Board> {
    let mut boards = Vec::new();
    for record in records {
        if !boards.contains(&record.board) {
            boards.push(record.board);
        }
    }
    boards
}
