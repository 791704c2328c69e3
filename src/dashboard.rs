// dashboard.rs: Chart-ready series for the dashboard.
//
// `build_dashboard` filters the input by the selected categories once, then
// derives every series from that filtered set. Only `category_options` (the
// checkbox list itself) looks at the unfiltered input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::{game_platinum, is_in_progress};
use crate::library::{compare_dates, SortDirection};
use crate::models::{MediaDetails, MediaRecord, MediaType, RecordId, WatchProgress};

/// How many unfinished items the "media not completed" card shows.
pub const INCOMPLETE_LIMIT: usize = 6;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A generic type → count pair used for chart data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub media_type: MediaType,
    pub count:      u32,
}

/// One entry of the dashboard category checkbox list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub media_type: MediaType,
    pub count:      u32,
    pub selected:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year:  i32,
    pub count: u32,
}

/// Mutually exclusive: beaten wins over online, online over not completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatusBreakdown {
    pub beaten:        u32,
    pub online:        u32,
    pub not_completed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrophySummary {
    /// Sum of obtained trophies, not capped by totals.
    pub obtained: u64,
    pub platinum: u32,
}

/// Best-effort estimate of time spent, in hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSpent {
    pub hours: f64,
}

impl TimeSpent {
    pub fn days(&self) -> f64 {
        self.hours / 24.0
    }

    /// "12h 30min"
    pub fn hours_label(&self) -> String {
        let hours = if self.hours.is_finite() { self.hours.max(0.0) } else { 0.0 };
        let whole = hours.floor();
        let minutes = ((hours - whole) * 60.0).round();
        format!("{}h {}min", whole as u64, minutes as u64)
    }

    /// "1.5d"
    pub fn days_label(&self) -> String {
        format!("{:.1}d", self.days())
    }
}

/// What an unfinished item shows next to its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressLabel {
    Pages { read: Option<u32>, total: Option<u32> },
    Volumes { read: Option<u32>, total: Option<u32> },
    Trophies { obtained: Option<u32>, total: Option<u32> },
    Episodes { watched: Option<u32>, total: Option<u32> },
    Seasons { watched: Option<u32>, total: Option<u32> },
    NotCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteEntry {
    /// 1-based position in the list.
    pub rank:          usize,
    pub id:            RecordId,
    pub title:         String,
    pub media_type:    MediaType,
    pub consumed_date: Option<String>,
    pub progress:      ProgressLabel,
}

/// Unfinished media, most recently consumed first, at most [`INCOMPLETE_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncompleteList {
    pub entries: Vec<IncompleteEntry>,
}

impl IncompleteList {
    /// The two-column layout: even positions on the left, odd on the right.
    pub fn columns(&self) -> [Vec<&IncompleteEntry>; 2] {
        let mut columns: [Vec<&IncompleteEntry>; 2] = [Vec::new(), Vec::new()];
        for (i, entry) in self.entries.iter().enumerate() {
            columns[i % 2].push(entry);
        }
        columns
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSeries {
    pub total_items:      usize,
    pub category_options: Vec<CategoryOption>,
    /// Index = rounded rating, 0..=10.
    pub rating_histogram: [u32; 11],
    pub category_counts:  Vec<CountEntry>,
    pub amount_read:      Vec<CountEntry>,
    pub yearly_timeline:  Vec<YearCount>,
    pub has_games:        bool,
    pub game_status:      GameStatusBreakdown,
    pub trophies:         TrophySummary,
    pub time_spent:       TimeSpent,
    pub incomplete:       IncompleteList,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build every dashboard series from `records`, restricted to `selected`.
pub fn build_dashboard<'a, I>(records: I, selected: &[MediaType]) -> DashboardSeries
where
    I: IntoIterator<Item = &'a MediaRecord>,
{
    let records: Vec<&MediaRecord> = records.into_iter().collect();
    let filtered: Vec<&MediaRecord> = records
        .iter()
        .copied()
        .filter(|r| r.media_type().is_some_and(|t| selected.contains(&t)))
        .collect();

    let series = DashboardSeries {
        total_items:      filtered.len(),
        category_options: category_options(&records, selected),
        rating_histogram: rating_histogram(&filtered),
        category_counts:  category_counts(&filtered),
        amount_read:      amount_read(&filtered, selected),
        yearly_timeline:  yearly_timeline(&filtered),
        has_games:        filtered.iter().any(|r| r.media_type() == Some(MediaType::Games)),
        game_status:      game_status(&filtered),
        trophies:         trophy_summary(&filtered),
        time_spent:       TimeSpent { hours: filtered.iter().map(|r| estimated_hours(r)).sum() },
        incomplete:       incomplete_list(&filtered),
    };

    debug!(
        input = records.len(),
        selected = series.total_items,
        incomplete = series.incomplete.entries.len(),
        "built dashboard series"
    );
    series
}

/// Per-type counts in canonical order; absent types are left out.
fn count_by_type(records: &[&MediaRecord]) -> BTreeMap<MediaType, u32> {
    let mut counts = BTreeMap::new();
    for media_type in records.iter().filter_map(|r| r.media_type()) {
        *counts.entry(media_type).or_insert(0) += 1;
    }
    counts
}

fn category_options(records: &[&MediaRecord], selected: &[MediaType]) -> Vec<CategoryOption> {
    count_by_type(records)
        .into_iter()
        .map(|(media_type, count)| CategoryOption {
            media_type,
            count,
            selected: selected.contains(&media_type),
        })
        .collect()
}

fn category_counts(records: &[&MediaRecord]) -> Vec<CountEntry> {
    // RUST NOTE: BTreeMap iterates in key order, and MediaType's Ord is the
    // canonical display order.
    count_by_type(records)
        .into_iter()
        .map(|(media_type, count)| CountEntry { media_type, count })
        .collect()
}

/// Missing ratings land in bucket 0; ratings that round outside 0..=10 are dropped.
fn rating_histogram(records: &[&MediaRecord]) -> [u32; 11] {
    let mut buckets = [0u32; 11];
    for record in records {
        let rating = record.rating.unwrap_or(0.0);
        if !rating.is_finite() {
            continue;
        }
        // round half up
        let bucket = (rating + 0.5).floor();
        if (0.0..=10.0).contains(&bucket) {
            buckets[bucket as usize] += 1;
        }
    }
    buckets
}

/// Books read to the last page, mangas and comics with any volume read.
/// A book without page counts is not counted as read.
fn amount_read(records: &[&MediaRecord], selected: &[MediaType]) -> Vec<CountEntry> {
    let mut books = 0;
    let mut mangas = 0;
    let mut comics = 0;
    for record in records {
        match &record.details {
            MediaDetails::Books(p) if p.read.is_some() && p.read == p.total => books += 1,
            MediaDetails::Mangas(v) if v.read.unwrap_or(0) > 0 => mangas += 1,
            MediaDetails::Comics(v) if v.read.unwrap_or(0) > 0 => comics += 1,
            _ => {}
        }
    }

    [(MediaType::Books, books), (MediaType::Mangas, mangas), (MediaType::Comics, comics)]
        .into_iter()
        .filter(|(media_type, count)| *count > 0 && selected.contains(media_type))
        .map(|(media_type, count)| CountEntry { media_type, count })
        .collect()
}

/// Records per calendar year, ascending; years without records are absent.
fn yearly_timeline(records: &[&MediaRecord]) -> Vec<YearCount> {
    let mut years: BTreeMap<i32, u32> = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.consumed_year()) {
        *years.entry(year).or_insert(0) += 1;
    }
    years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

fn game_status(records: &[&MediaRecord]) -> GameStatusBreakdown {
    let mut status = GameStatusBreakdown::default();
    for record in records {
        if let MediaDetails::Games(game) = &record.details {
            if game.beaten {
                status.beaten += 1;
            } else if game.online {
                status.online += 1;
            } else {
                status.not_completed += 1;
            }
        }
    }
    status
}

fn trophy_summary(records: &[&MediaRecord]) -> TrophySummary {
    let mut summary = TrophySummary::default();
    for record in records {
        if let MediaDetails::Games(game) = &record.details {
            summary.obtained += u64::from(game.trophies_obtained.unwrap_or(0));
            if game_platinum(game) {
                summary.platinum += 1;
            }
        }
    }
    summary
}

/// Hours spent on one record, by type-specific rule of thumb:
/// books 25 pages/hour, half an hour per manga or comic volume (180 pages
/// per volume for page-counted entries), 45 minutes per series episode (10
/// episodes per season), 20 minutes per animation episode (12 per season).
pub fn estimated_hours(record: &MediaRecord) -> f64 {
    match &record.details {
        MediaDetails::Movies(runtime) | MediaDetails::AnimatedMovies(runtime) => runtime.hours(),
        MediaDetails::Games(game) => game.hours_played.unwrap_or(0.0),
        MediaDetails::Books(pages) => f64::from(pages.read.unwrap_or(0)) / 25.0,
        MediaDetails::Mangas(volumes) | MediaDetails::Comics(volumes) => {
            let read = match volumes.read {
                Some(read) if read > 0 => f64::from(read),
                _ => volumes.pages_read.map_or(0.0, |pages| f64::from(pages) / 180.0),
            };
            read * 0.5
        }
        MediaDetails::Series(watch) => episodes_watched(watch, 10) * 0.75,
        MediaDetails::Animations(watch) => episodes_watched(watch, 12) * 0.33,
        MediaDetails::Unknown(_) => 0.0,
    }
}

fn episodes_watched(watch: &WatchProgress, per_season: u32) -> f64 {
    match watch {
        WatchProgress::Episodes { watched, .. } => f64::from(watched.unwrap_or(0)),
        WatchProgress::Seasons { watched, .. } => {
            f64::from(watched.unwrap_or(0)) * f64::from(per_season)
        }
    }
}

fn incomplete_list(records: &[&MediaRecord]) -> IncompleteList {
    let mut unfinished: Vec<&MediaRecord> = records
        .iter()
        .copied()
        .filter(|r| is_in_progress(r))
        .collect();
    unfinished.sort_by(|a, b| compare_dates(a.consumed_on(), b.consumed_on(), SortDirection::Desc));

    let entries = unfinished
        .into_iter()
        .take(INCOMPLETE_LIMIT)
        .enumerate()
        .filter_map(|(i, record)| {
            Some(IncompleteEntry {
                rank:          i + 1,
                id:            record.id.clone(),
                title:         record.title.clone(),
                media_type:    record.media_type()?,
                consumed_date: record.consumed_date.clone(),
                progress:      progress_label(record),
            })
        })
        .collect();

    IncompleteList { entries }
}

fn progress_label(record: &MediaRecord) -> ProgressLabel {
    match &record.details {
        MediaDetails::Books(p) => ProgressLabel::Pages { read: p.read, total: p.total },
        MediaDetails::Mangas(v) | MediaDetails::Comics(v) => {
            ProgressLabel::Volumes { read: v.read, total: v.total }
        }
        MediaDetails::Games(game) if (game.online && game.has_trophy_gap()) || game.beaten => {
            ProgressLabel::Trophies { obtained: game.trophies_obtained, total: game.trophies_total }
        }
        MediaDetails::Series(watch) | MediaDetails::Animations(watch) => match watch {
            WatchProgress::Episodes { watched, total } => {
                ProgressLabel::Episodes { watched: *watched, total: *total }
            }
            WatchProgress::Seasons { watched, total } => {
                ProgressLabel::Seasons { watched: *watched, total: *total }
            }
        },
        _ => ProgressLabel::NotCompleted,
    }
}

/// The favourite media card. Ids are compared as strings, since the stored
/// favourite id is always a string.
pub fn find_favorite<'a>(records: &'a [MediaRecord], favorite_id: &str) -> Option<&'a MediaRecord> {
    records.iter().find(|r| r.id.to_string() == favorite_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameProgress, PageProgress, Runtime, VolumeProgress};
    use pretty_assertions::assert_eq;

    fn movie(id: i64) -> MediaRecord {
        MediaRecord::new(id, format!("movie {id}"), MediaDetails::Movies(Runtime::Minutes(Some(120.0))))
    }

    fn game(id: i64, beaten: bool, online: bool, obtained: u32, total: u32) -> MediaRecord {
        MediaRecord::new(
            id,
            format!("game {id}"),
            MediaDetails::Games(GameProgress {
                hours_played: Some(10.0),
                online,
                beaten,
                trophies_obtained: Some(obtained),
                trophies_total: Some(total),
            }),
        )
    }

    fn book(id: i64, read: u32, total: u32) -> MediaRecord {
        MediaRecord::new(id, format!("book {id}"), MediaDetails::Books(PageProgress { read: Some(read), total: Some(total) }))
    }

    #[test]
    fn histogram_rounds_and_drops_out_of_range() {
        let records = vec![
            movie(1).with_rating(7.5),
            movie(2).with_rating(7.4),
            movie(3),
            movie(4).with_rating(11.0),
            movie(5).with_rating(-3.0),
            movie(6).with_rating(10.0),
        ];
        let series = build_dashboard(&records, &[MediaType::Movies]);
        assert_eq!(series.rating_histogram, [1, 0, 0, 0, 0, 0, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn selection_filters_every_series() {
        let records = vec![movie(1), book(2, 10, 100), game(3, false, false, 0, 0)];
        let series = build_dashboard(&records, &[MediaType::Books]);
        assert_eq!(series.total_items, 1);
        assert_eq!(series.category_counts, vec![CountEntry { media_type: MediaType::Books, count: 1 }]);
        assert!(!series.has_games);
        assert_eq!(series.game_status, GameStatusBreakdown::default());
        // The checkbox list still lists every type present.
        assert_eq!(
            series.category_options,
            vec![
                CategoryOption { media_type: MediaType::Movies, count: 1, selected: false },
                CategoryOption { media_type: MediaType::Games, count: 1, selected: false },
                CategoryOption { media_type: MediaType::Books, count: 1, selected: true },
            ]
        );
    }

    #[test]
    fn category_counts_follow_display_order_and_skip_absent_types() {
        let records = vec![book(1, 1, 2), movie(2), book(3, 1, 2)];
        let series = build_dashboard(&records, &MediaType::ALL);
        assert_eq!(
            series.category_counts,
            vec![
                CountEntry { media_type: MediaType::Movies, count: 1 },
                CountEntry { media_type: MediaType::Books, count: 2 },
            ]
        );
    }

    #[test]
    fn timeline_is_sparse_and_ascending() {
        let records = vec![
            movie(1).with_consumed_date("2024-02-01"),
            movie(2).with_consumed_date("2019-05-05"),
            movie(3).with_consumed_date("2024-11-30"),
            movie(4).with_consumed_date("garbage"),
        ];
        let series = build_dashboard(&records, &[MediaType::Movies]);
        assert_eq!(
            series.yearly_timeline,
            vec![YearCount { year: 2019, count: 1 }, YearCount { year: 2024, count: 2 }]
        );
    }

    #[test]
    fn game_status_precedence_and_trophies() {
        let records = vec![
            game(1, true, true, 10, 10),
            game(2, false, true, 3, 50),
            game(3, false, false, 0, 0),
            game(4, true, false, 60, 40),
        ];
        let series = build_dashboard(&records, &[MediaType::Games]);
        assert_eq!(series.game_status, GameStatusBreakdown { beaten: 2, online: 1, not_completed: 1 });
        assert_eq!(series.trophies, TrophySummary { obtained: 73, platinum: 1 });
        assert!(series.has_games);
    }

    #[test]
    fn time_spent_per_type() {
        let records = vec![
            movie(1),                                            // 2h
            game(2, false, false, 0, 0),                         // 10h
            book(3, 250, 300),                                   // 10h
            MediaRecord::new(4, "m", MediaDetails::Mangas(VolumeProgress { read: Some(4), total: None, pages_read: None })), // 2h
            MediaRecord::new(5, "c", MediaDetails::Comics(VolumeProgress { read: None, total: None, pages_read: Some(360) })), // 1h
            MediaRecord::new(6, "s", MediaDetails::Series(WatchProgress::Seasons { watched: Some(2), total: Some(3) })), // 15h
            MediaRecord::new(7, "a", MediaDetails::Animations(WatchProgress::Episodes { watched: Some(100), total: None })), // 33h
        ];
        let series = build_dashboard(&records, &MediaType::ALL);
        assert!((series.time_spent.hours - 73.0).abs() < 1e-9, "{}", series.time_spent.hours);
        assert_eq!(series.time_spent.hours_label(), "73h 0min");
        assert_eq!(series.time_spent.days_label(), "3.0d");
    }

    #[test]
    fn time_labels() {
        assert_eq!(TimeSpent { hours: 12.5 }.hours_label(), "12h 30min");
        assert_eq!(TimeSpent { hours: 36.0 }.days_label(), "1.5d");
        assert_eq!(TimeSpent { hours: 0.0 }.hours_label(), "0h 0min");
    }

    #[test]
    fn incomplete_list_is_recent_first_capped_and_split() {
        let records: Vec<MediaRecord> = (1..=8)
            .map(|i| book(i, 1, 100).with_consumed_date(format!("2024-01-{:02}", i)))
            .chain([movie(9).with_consumed_date("2024-12-31"), book(10, 100, 100)])
            .collect();
        let series = build_dashboard(&records, &MediaType::ALL);

        let ids: Vec<String> = series.incomplete.entries.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["8", "7", "6", "5", "4", "3"]);
        assert_eq!(series.incomplete.entries[0].rank, 1);
        assert_eq!(series.incomplete.entries[0].progress, ProgressLabel::Pages { read: Some(1), total: Some(100) });

        let [left, right] = series.incomplete.columns();
        let left: Vec<usize> = left.iter().map(|e| e.rank).collect();
        let right: Vec<usize> = right.iter().map(|e| e.rank).collect();
        assert_eq!(left, vec![1, 3, 5]);
        assert_eq!(right, vec![2, 4, 6]);
    }

    #[test]
    fn game_progress_labels() {
        assert_eq!(
            progress_label(&game(1, false, true, 3, 10)),
            ProgressLabel::Trophies { obtained: Some(3), total: Some(10) }
        );
        assert_eq!(
            progress_label(&game(2, true, false, 3, 10)),
            ProgressLabel::Trophies { obtained: Some(3), total: Some(10) }
        );
        assert_eq!(progress_label(&game(3, false, false, 0, 0)), ProgressLabel::NotCompleted);
    }

    #[test]
    fn amount_read_counts_only_selected_positive_types() {
        let records = vec![
            book(1, 300, 300),
            book(2, 299, 300),
            MediaRecord::new(3, "m", MediaDetails::Mangas(VolumeProgress { read: Some(1), total: Some(9), pages_read: None })),
            MediaRecord::new(4, "c", MediaDetails::Comics(VolumeProgress { read: Some(0), total: Some(9), pages_read: None })),
        ];
        let series = build_dashboard(&records, &[MediaType::Books, MediaType::Mangas, MediaType::Comics]);
        assert_eq!(
            series.amount_read,
            vec![
                CountEntry { media_type: MediaType::Books, count: 1 },
                CountEntry { media_type: MediaType::Mangas, count: 1 },
            ]
        );

        let series = build_dashboard(&records, &[MediaType::Mangas]);
        assert_eq!(series.amount_read, vec![CountEntry { media_type: MediaType::Mangas, count: 1 }]);
    }

    #[test]
    fn book_without_page_counts_is_not_read() {
        let records = vec![MediaRecord::new(1, "b", MediaDetails::Books(PageProgress { read: None, total: None }))];
        let series = build_dashboard(&records, &[MediaType::Books]);
        assert!(series.amount_read.is_empty());
    }

    #[test]
    fn huge_season_counts_do_not_overflow() {
        let records = crate::models::load_records(
            r#"[
                {"id": 1, "type": "animations", "title": "a", "use_episodes": false,
                 "seasons_watched": 400000000, "seasons_total": 400000000},
                {"id": 2, "type": "series", "title": "s", "use_episodes": false,
                 "seasons_watched": 4294967295, "seasons_total": 4294967295}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);

        let series = build_dashboard(&records, &[MediaType::Animations, MediaType::Series]);
        let expected = 400_000_000.0 * 12.0 * 0.33 + 4_294_967_295.0 * 10.0 * 0.75;
        assert!((series.time_spent.hours - expected).abs() / expected < 1e-9, "{}", series.time_spent.hours);
    }

    #[test]
    fn unreadable_dates_go_to_the_end_of_the_incomplete_list() {
        let records = vec![
            book(1, 1, 100).with_consumed_date("not a date"),
            book(2, 1, 100).with_consumed_date("2023-03-01"),
            book(3, 1, 100),
            book(4, 1, 100).with_consumed_date("2024-07-15"),
        ];
        let series = build_dashboard(&records, &[MediaType::Books]);
        let ids: Vec<String> = series.incomplete.entries.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn favourite_lookup_compares_ids_as_strings() {
        let records = vec![movie(41), movie(42)];
        assert_eq!(find_favorite(&records, "42").map(|r| r.title.as_str()), Some("movie 42"));
        assert!(find_favorite(&records, "7").is_none());
    }

    #[test]
    fn empty_selection_gives_empty_series() {
        let records = vec![movie(1), book(2, 1, 2)];
        let series = build_dashboard(&records, &[]);
        assert_eq!(series.total_items, 0);
        assert!(series.category_counts.is_empty());
        assert!(series.incomplete.is_empty());
        assert_eq!(series.time_spent.hours, 0.0);
    }
}
