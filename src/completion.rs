// completion.rs: Per-record completion rules.
//
// Everything here is a pure function of one record. Missing or malformed
// progress never panics and never counts as finished: a progress pair only
// completes when its total is present and greater than zero.

use crate::models::{GameProgress, MediaDetails, MediaRecord, WatchProgress};

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Whether a record counts as "completed" for its type.
///
/// Games report the `beaten` dimension here; trophies are tracked separately
/// by [`is_platinum`].
pub fn is_complete(record: &MediaRecord) -> bool {
    match &record.details {
        // Logging a movie means it was watched; there is no partial state.
        MediaDetails::Movies(_) | MediaDetails::AnimatedMovies(_) => true,
        // Series keep an older, lenient rule: any watched season counts.
        // Animations never had it.
        MediaDetails::Series(watch) => watch_complete(watch) || any_season_watched(watch),
        MediaDetails::Animations(watch) => watch_complete(watch),
        MediaDetails::Games(game) => game.beaten,
        // One page of slack: people rarely log the very last page.
        MediaDetails::Books(pages) => match (pages.read, pages.total) {
            (Some(read), Some(total)) if total > 0 => read.abs_diff(total) <= 1,
            _ => false,
        },
        MediaDetails::Mangas(volumes) | MediaDetails::Comics(volumes) => {
            reached(volumes.read, volumes.total)
        }
        MediaDetails::Unknown(_) => false,
    }
}

/// Every trophy of a game with a non-zero trophy total has been obtained.
pub fn is_platinum(record: &MediaRecord) -> bool {
    match &record.details {
        MediaDetails::Games(game) => game_platinum(game),
        _ => false,
    }
}

pub(crate) fn game_platinum(game: &GameProgress) -> bool {
    matches!(
        (game.trophies_obtained, game.trophies_total),
        (Some(obtained), Some(total)) if total > 0 && obtained == total
    )
}

fn watch_complete(watch: &WatchProgress) -> bool {
    match watch {
        WatchProgress::Episodes { watched, total } => reached(*watched, *total),
        WatchProgress::Seasons { watched, total } => reached(*watched, *total),
    }
}

fn any_season_watched(watch: &WatchProgress) -> bool {
    matches!(
        watch,
        WatchProgress::Seasons { watched: Some(w), total: Some(t) } if *t > 0 && *w > 0
    )
}

fn reached(progress: Option<u32>, total: Option<u32>) -> bool {
    matches!((progress, total), (Some(p), Some(t)) if t > 0 && p >= t)
}

/// Progress is below a known, non-zero total. Missing progress counts as 0.
fn below(progress: Option<u32>, total: Option<u32>) -> bool {
    match total {
        Some(total) if total > 0 => progress.unwrap_or(0) < total,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Still in progress (dashboard "not completed" list)
// ---------------------------------------------------------------------------

/// Whether a record belongs on the "media not completed" list.
///
/// Movies never do. Games are in progress when campaign or trophies are left:
/// online games only through a trophy gap, offline games when not beaten or
/// when beaten with trophies still missing.
pub fn is_in_progress(record: &MediaRecord) -> bool {
    match &record.details {
        MediaDetails::Books(pages) => below(pages.read, pages.total),
        MediaDetails::Mangas(volumes) | MediaDetails::Comics(volumes) => {
            below(volumes.read, volumes.total)
        }
        MediaDetails::Series(watch) | MediaDetails::Animations(watch) => match watch {
            WatchProgress::Episodes { watched, total } => below(*watched, *total),
            WatchProgress::Seasons { watched, total } => below(*watched, *total),
        },
        MediaDetails::Games(game) => {
            if game.online || game.beaten {
                game.has_trophy_gap()
            } else {
                true
            }
        }
        MediaDetails::Movies(_) | MediaDetails::AnimatedMovies(_) | MediaDetails::Unknown(_) => {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Percentages
// ---------------------------------------------------------------------------

/// Completion percentage used by the advanced filter and sort.
///
/// Games with trophies use the trophy ratio, books/mangas/comics with a total
/// use their read ratio. Everything else is 100, so a completion floor never
/// excludes it.
pub fn completion_percent(record: &MediaRecord) -> f64 {
    match &record.details {
        MediaDetails::Games(game) => ratio(game.trophies_obtained, game.trophies_total),
        MediaDetails::Books(pages) => ratio(pages.read, pages.total),
        MediaDetails::Mangas(volumes) | MediaDetails::Comics(volumes) => {
            ratio(volumes.read, volumes.total)
        }
        _ => 100.0,
    }
}

fn ratio(done: Option<u32>, total: Option<u32>) -> f64 {
    match total {
        Some(total) if total > 0 => f64::from(done.unwrap_or(0)) / f64::from(total) * 100.0,
        _ => 100.0,
    }
}

/// The rounded "NN%" badge shown on book, manga and comic cards.
/// `None` when there is nothing meaningful to show (no progress, no total).
pub fn completion_label(record: &MediaRecord) -> Option<String> {
    let (read, total) = match &record.details {
        MediaDetails::Books(pages) => (pages.read?, pages.total?),
        MediaDetails::Mangas(volumes) | MediaDetails::Comics(volumes) => (volumes.read?, volumes.total?),
        _ => return None,
    };
    if read == 0 || total == 0 {
        return None;
    }
    let percent = f64::from(read) / f64::from(total) * 100.0;
    Some(format!("{}%", percent.round()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageProgress, Runtime, VolumeProgress};

    fn record(details: MediaDetails) -> MediaRecord {
        MediaRecord::new(1, "t", details)
    }

    fn seasons(watched: Option<u32>, total: Option<u32>) -> WatchProgress {
        WatchProgress::Seasons { watched, total }
    }

    fn episodes(watched: Option<u32>, total: Option<u32>) -> WatchProgress {
        WatchProgress::Episodes { watched, total }
    }

    fn game(beaten: bool, online: bool, obtained: Option<u32>, total: Option<u32>) -> MediaRecord {
        record(MediaDetails::Games(GameProgress {
            hours_played: None,
            online,
            beaten,
            trophies_obtained: obtained,
            trophies_total: total,
        }))
    }

    fn book(read: Option<u32>, total: Option<u32>) -> MediaRecord {
        record(MediaDetails::Books(PageProgress { read, total }))
    }

    fn manga(read: Option<u32>, total: Option<u32>) -> MediaRecord {
        record(MediaDetails::Mangas(VolumeProgress { read, total, pages_read: None }))
    }

    #[test]
    fn movies_are_always_complete() {
        assert!(is_complete(&record(MediaDetails::Movies(Runtime::Minutes(None)))));
        assert!(is_complete(&record(MediaDetails::AnimatedMovies(Runtime::Minutes(Some(80.0))))));
    }

    #[test]
    fn series_keep_the_any_season_rule_animations_do_not() {
        let partial = seasons(Some(1), Some(3));
        assert!(is_complete(&record(MediaDetails::Series(partial.clone()))));
        assert!(!is_complete(&record(MediaDetails::Animations(partial))));

        assert!(!is_complete(&record(MediaDetails::Series(seasons(Some(0), Some(3))))));
        assert!(is_complete(&record(MediaDetails::Animations(seasons(Some(3), Some(3))))));
    }

    #[test]
    fn episodes_mode_needs_all_episodes() {
        assert!(!is_complete(&record(MediaDetails::Series(episodes(Some(11), Some(12))))));
        assert!(is_complete(&record(MediaDetails::Series(episodes(Some(12), Some(12))))));
        assert!(is_complete(&record(MediaDetails::Animations(episodes(Some(24), Some(24))))));
    }

    #[test]
    fn zero_or_missing_totals_never_complete() {
        assert!(!is_complete(&record(MediaDetails::Series(seasons(Some(2), None)))));
        assert!(!is_complete(&record(MediaDetails::Series(seasons(Some(2), Some(0))))));
        assert!(!is_complete(&record(MediaDetails::Animations(episodes(Some(0), Some(0))))));
        assert!(!is_complete(&book(Some(0), Some(0))));
        assert!(!is_complete(&book(Some(1), None)));
        assert!(!is_complete(&manga(Some(3), Some(0))));
        assert!(!is_platinum(&game(false, false, Some(0), Some(0))));
    }

    #[test]
    fn books_allow_one_page_of_slack() {
        assert!(is_complete(&book(Some(199), Some(200))));
        assert!(is_complete(&book(Some(200), Some(200))));
        assert!(!is_complete(&book(Some(198), Some(200))));
        assert!(!is_complete(&book(None, Some(200))));
    }

    #[test]
    fn games_track_beaten_and_platinum_separately() {
        let g = game(true, false, Some(10), Some(10));
        assert!(is_complete(&g));
        assert!(is_platinum(&g));

        let g = game(false, true, Some(50), Some(50));
        assert!(!is_complete(&g));
        assert!(is_platinum(&g));

        assert!(!is_platinum(&game(true, false, Some(9), Some(10))));
        assert!(!is_platinum(&game(true, false, None, Some(10))));
    }

    #[test]
    fn in_progress_games() {
        // online, trophies left
        assert!(is_in_progress(&game(false, true, Some(3), Some(10))));
        // online, nothing left
        assert!(!is_in_progress(&game(false, true, Some(10), Some(10))));
        assert!(!is_in_progress(&game(false, true, None, None)));
        // offline, not beaten
        assert!(is_in_progress(&game(false, false, None, None)));
        // offline, beaten with trophy gap
        assert!(is_in_progress(&game(true, false, Some(5), Some(10))));
        // offline, beaten, platinum
        assert!(!is_in_progress(&game(true, false, Some(10), Some(10))));
    }

    #[test]
    fn in_progress_reading_and_watching() {
        assert!(is_in_progress(&book(Some(10), Some(200))));
        assert!(!is_in_progress(&book(Some(200), Some(200))));
        assert!(!is_in_progress(&book(Some(10), None)));
        assert!(is_in_progress(&manga(Some(2), Some(5))));
        assert!(is_in_progress(&record(MediaDetails::Series(seasons(Some(1), Some(3))))));
        assert!(!is_in_progress(&record(MediaDetails::Animations(episodes(Some(12), Some(12))))));
        assert!(!is_in_progress(&record(MediaDetails::Movies(Runtime::Minutes(Some(90.0))))));
    }

    #[test]
    fn completion_percent_defaults_to_full() {
        assert_eq!(completion_percent(&game(false, false, Some(5), Some(20))), 25.0);
        assert_eq!(completion_percent(&game(false, false, Some(5), Some(0))), 100.0);
        assert_eq!(completion_percent(&book(Some(50), Some(200))), 25.0);
        assert_eq!(completion_percent(&manga(None, Some(4))), 0.0);
        assert_eq!(completion_percent(&manga(Some(2), None)), 100.0);
        assert_eq!(completion_percent(&record(MediaDetails::Series(seasons(Some(1), Some(4))))), 100.0);
    }

    #[test]
    fn card_badge() {
        assert_eq!(completion_label(&book(Some(1), Some(3))), Some("33%".to_string()));
        assert_eq!(completion_label(&manga(Some(5), Some(5))), Some("100%".to_string()));
        assert_eq!(completion_label(&book(Some(0), Some(3))), None);
        assert_eq!(completion_label(&book(Some(3), None)), None);
        assert_eq!(completion_label(&game(true, false, Some(1), Some(2))), None);
    }
}
