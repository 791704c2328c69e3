// library.rs: Which records the card list shows, and in what order.
//
// Two independent paths produce the visible list:
//   - the simple path: category tab + free-text search + sort dropdown
//   - the advanced path: the advanced-filters form (type checkboxes, year
//     and rating ranges, completion floor, order-by + direction)
// Both are pure functions of their arguments and return borrowed records in
// their new order; nothing is copied or mutated.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::completion_percent;
use crate::models::{MediaDetails, MediaRecord, MediaType};
use crate::settings::EnabledTypes;

// ---------------------------------------------------------------------------
// Simple path
// ---------------------------------------------------------------------------

/// The category tab above the card list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(MediaType),
}

impl CategoryFilter {
    pub fn matches(&self, record: &MediaRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => record
                .media_type()
                .is_some_and(|t| selected.aliases().contains(&t)),
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        match key.as_str() {
            "all" => Ok(CategoryFilter::All),
            other => MediaType::parse(other)
                .map(CategoryFilter::Only)
                .ok_or_else(|| format!("unknown category filter: {other}")),
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Only(t) => t.as_str().to_string(),
        }
    }
}

/// The sort dropdown. Keys match the values the web client stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "title-asc")]
    TitleAsc,
    #[serde(rename = "title-desc")]
    TitleDesc,
    #[serde(rename = "rating-desc")]
    RatingDesc,
    #[serde(rename = "rating-asc")]
    RatingAsc,
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "date-asc")]
    DateAsc,
}

/// Everything the simple path depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    pub filter: CategoryFilter,
    pub search: String,
    pub sort:   Option<SortOrder>,
}

/// The records the card list shows for `query`.
///
/// Stages, in order: drop disabled categories, apply the category tab, apply
/// the search term (skipped when blank), sort. With the "all" tab, no search
/// and no sort this returns every enabled record in its original order.
pub fn visible_records<'a>(
    all: &'a [MediaRecord],
    enabled: &EnabledTypes,
    query: &ViewQuery,
) -> Vec<&'a MediaRecord> {
    let term = query.search.trim().to_lowercase();

    let mut visible: Vec<&MediaRecord> = all
        .iter()
        .filter(|r| is_enabled(r, enabled))
        .filter(|r| query.filter.matches(r))
        .filter(|r| term.is_empty() || matches_search(r, &term))
        .collect();

    if let Some(order) = query.sort {
        sort_records(&mut visible, order);
    }

    debug!(total = all.len(), visible = visible.len(), filter = ?query.filter, sort = ?query.sort, "filtered media");
    visible
}

fn is_enabled(record: &MediaRecord, enabled: &EnabledTypes) -> bool {
    record.media_type().is_some_and(|t| enabled.admits(t))
}

/// Case-insensitive substring match on the title or the type key.
/// `term` must already be lower-cased.
fn matches_search(record: &MediaRecord, term: &str) -> bool {
    record.title.to_lowercase().contains(term) || record.type_key().to_lowercase().contains(term)
}

/// Stable sort by one of the dropdown orders.
pub fn sort_records(records: &mut [&MediaRecord], order: SortOrder) {
    // RUST NOTE: `sort_by` is a stable merge sort, so records with equal
    // keys keep their relative order.
    match order {
        SortOrder::TitleAsc   => records.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOrder::TitleDesc  => records.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortOrder::RatingDesc => records.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero())),
        SortOrder::RatingAsc  => records.sort_by(|a, b| a.rating_or_zero().total_cmp(&b.rating_or_zero())),
        SortOrder::DateDesc   => records.sort_by(|a, b| compare_dates(a.consumed_on(), b.consumed_on(), SortDirection::Desc)),
        SortOrder::DateAsc    => records.sort_by(|a, b| compare_dates(a.consumed_on(), b.consumed_on(), SortDirection::Asc)),
    }
}

/// Case-insensitive title order; on a case-only difference lower case comes
/// first, as a locale collation would.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Dated records first, in the requested direction; missing or unparseable
/// dates always last.
pub(crate) fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Advanced path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// "Order by" choices of the advanced form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancedSortKey {
    Title,
    Rating,
    ConsumedDate,
    Completion,
    HoursPlayed,
}

impl AdvancedSortKey {
    /// Some orders only make sense for some types: hours played needs games,
    /// completion needs a type with a natural percentage.
    pub fn applies_to(&self, selected: &[MediaType]) -> bool {
        let needs: &[MediaType] = match self {
            AdvancedSortKey::HoursPlayed => &[MediaType::Games],
            AdvancedSortKey::Completion => {
                &[MediaType::Games, MediaType::Books, MediaType::Mangas, MediaType::Comics]
            }
            _ => return true,
        };
        needs.iter().any(|t| selected.contains(t))
    }
}

/// The advanced-filters form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedFilter {
    /// Selected types; empty means every type. Movies and animations also
    /// select animated movies.
    pub types:          Vec<MediaType>,
    pub year_from:      Option<i32>,
    pub year_to:        Option<i32>,
    pub rating_min:     f64,
    pub rating_max:     f64,
    /// Minimum completion percentage, see [`completion_percent`].
    pub completion_min: f64,
    pub order_by:       Option<AdvancedSortKey>,
    pub direction:      SortDirection,
}

impl Default for AdvancedFilter {
    fn default() -> Self {
        AdvancedFilter {
            types:          Vec::new(),
            year_from:      None,
            year_to:        None,
            rating_min:     0.0,
            rating_max:     10.0,
            completion_min: 0.0,
            order_by:       None,
            direction:      SortDirection::default(),
        }
    }
}

impl AdvancedFilter {
    /// The order to apply: `order_by` unless it does not apply to the
    /// selected types.
    pub fn effective_order(&self) -> Option<AdvancedSortKey> {
        self.order_by.filter(|key| key.applies_to(&self.types))
    }

    fn expanded_types(&self) -> BTreeSet<MediaType> {
        self.types
            .iter()
            .flat_map(|t| t.aliases().iter().copied())
            .collect()
    }

    /// Records without a rating or without a readable date are not excluded
    /// by the rating and year ranges.
    fn matches(&self, record: &MediaRecord, wanted: &BTreeSet<MediaType>) -> bool {
        let Some(media_type) = record.media_type() else {
            return false;
        };
        if !wanted.is_empty() && !wanted.contains(&media_type) {
            return false;
        }

        if let Some(year) = record.consumed_year() {
            if self.year_from.is_some_and(|from| year < from) || self.year_to.is_some_and(|to| year > to) {
                return false;
            }
        }

        if let Some(rating) = record.rating {
            if rating < self.rating_min || rating > self.rating_max {
                return false;
            }
        }

        completion_percent(record) >= self.completion_min
    }
}

/// The records the card list shows for the advanced form.
///
/// Disabled categories are dropped first, as on the simple path.
pub fn advanced_records<'a>(
    all: &'a [MediaRecord],
    enabled: &EnabledTypes,
    filter: &AdvancedFilter,
) -> Vec<&'a MediaRecord> {
    let wanted = filter.expanded_types();

    let mut visible: Vec<&MediaRecord> = all
        .iter()
        .filter(|r| is_enabled(r, enabled))
        .filter(|r| filter.matches(r, &wanted))
        .collect();

    if let Some(key) = filter.effective_order() {
        sort_advanced(&mut visible, key, filter.direction);
    }

    debug!(total = all.len(), visible = visible.len(), order = ?filter.effective_order(), "advanced filter applied");
    visible
}

fn sort_advanced(records: &mut [&MediaRecord], key: AdvancedSortKey, direction: SortDirection) {
    match key {
        AdvancedSortKey::Title => records.sort_by(|a, b| {
            direction.apply(compare_titles(&a.title, &b.title))
        }),
        AdvancedSortKey::Rating => records.sort_by(|a, b| {
            direction.apply(a.rating_or_zero().total_cmp(&b.rating_or_zero()))
        }),
        AdvancedSortKey::ConsumedDate => records.sort_by(|a, b| {
            compare_dates(a.consumed_on(), b.consumed_on(), direction)
        }),
        AdvancedSortKey::Completion => records.sort_by(|a, b| {
            direction.apply(completion_percent(a).total_cmp(&completion_percent(b)))
        }),
        AdvancedSortKey::HoursPlayed => records.sort_by(|a, b| {
            direction.apply(hours_played(a).total_cmp(&hours_played(b)))
        }),
    }
}

fn hours_played(record: &MediaRecord) -> f64 {
    match &record.details {
        MediaDetails::Games(game) => game.hours_played.unwrap_or(0.0),
        _ => 0.0,
    }
}
