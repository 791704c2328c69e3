// achievements.rs: Completion counts and achievement points.
//
// Each enabled category has an ascending ladder of milestones. Every
// milestone reached is worth a fixed number of points; the scan stops at
// the first milestone not reached.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::completion::{game_platinum, is_complete};
use crate::models::{MediaDetails, MediaRecord, MediaType};
use crate::settings::EnabledTypes;

pub const POINTS_PER_THRESHOLD: u32 = 1000;

const MOVIE_THRESHOLDS: &[u32] = &[10, 25, 50, 75, 100, 150, 200, 300, 500, 1000, 2000, 5000, 10000];
const SERIES_THRESHOLDS: &[u32] = &[5, 10, 25, 50, 75, 100, 150, 200, 300, 500, 1000, 2000, 5000, 10000];
const GAME_THRESHOLDS: &[u32] = &[10, 25, 50, 75, 100, 150, 200, 300, 500, 1000, 2000, 5000, 10000];
const PLATINUM_THRESHOLDS: &[u32] = &[5, 10, 20, 30, 50, 75, 100, 150, 200, 300, 500, 1000, 2000, 5000, 10000];
const READING_THRESHOLDS: &[u32] = &[5, 10, 25, 50, 100, 150, 200, 300, 500, 1000, 2000, 5000, 10000];

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// An achievement counter. Games have two: beaten and platinum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Movies,
    Series,
    Animations,
    Games,
    Platinum,
    Books,
    Mangas,
    Comics,
}

impl AchievementCategory {
    pub const ALL: [AchievementCategory; 8] = [
        AchievementCategory::Movies,
        AchievementCategory::Series,
        AchievementCategory::Animations,
        AchievementCategory::Games,
        AchievementCategory::Platinum,
        AchievementCategory::Books,
        AchievementCategory::Mangas,
        AchievementCategory::Comics,
    ];

    /// The milestone ladder, ascending.
    pub fn thresholds(&self) -> &'static [u32] {
        match self {
            AchievementCategory::Movies => MOVIE_THRESHOLDS,
            AchievementCategory::Series | AchievementCategory::Animations => SERIES_THRESHOLDS,
            AchievementCategory::Games => GAME_THRESHOLDS,
            AchievementCategory::Platinum => PLATINUM_THRESHOLDS,
            AchievementCategory::Books | AchievementCategory::Mangas | AchievementCategory::Comics => {
                READING_THRESHOLDS
            }
        }
    }

    /// Whether this counter takes part in scoring. Platinum follows the
    /// games setting, not a setting of its own.
    pub fn is_scored(&self, enabled: &EnabledTypes) -> bool {
        let gate = match self {
            AchievementCategory::Movies => MediaType::Movies,
            AchievementCategory::Series => MediaType::Series,
            AchievementCategory::Animations => MediaType::Animations,
            AchievementCategory::Games | AchievementCategory::Platinum => MediaType::Games,
            AchievementCategory::Books => MediaType::Books,
            AchievementCategory::Mangas => MediaType::Mangas,
            AchievementCategory::Comics => MediaType::Comics,
        };
        enabled.contains(gate)
    }
}

/// Points earned by `count` on `thresholds`: one award per milestone reached,
/// stopping at the first one missed.
pub fn ladder_points(count: u32, thresholds: &[u32]) -> u32 {
    thresholds
        .iter()
        .take_while(|&&threshold| count >= threshold)
        .count() as u32
        * POINTS_PER_THRESHOLD
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStats {
    pub movies:       u32,
    pub series:       u32,
    pub animations:   u32,
    pub games:        u32,
    pub platinum:     u32,
    pub books:        u32,
    pub mangas:       u32,
    pub comics:       u32,
    pub total_points: u32,
}

impl AchievementStats {
    pub fn count(&self, category: AchievementCategory) -> u32 {
        match category {
            AchievementCategory::Movies => self.movies,
            AchievementCategory::Series => self.series,
            AchievementCategory::Animations => self.animations,
            AchievementCategory::Games => self.games,
            AchievementCategory::Platinum => self.platinum,
            AchievementCategory::Books => self.books,
            AchievementCategory::Mangas => self.mangas,
            AchievementCategory::Comics => self.comics,
        }
    }

    fn bump(&mut self, category: AchievementCategory) {
        let counter = match category {
            AchievementCategory::Movies => &mut self.movies,
            AchievementCategory::Series => &mut self.series,
            AchievementCategory::Animations => &mut self.animations,
            AchievementCategory::Games => &mut self.games,
            AchievementCategory::Platinum => &mut self.platinum,
            AchievementCategory::Books => &mut self.books,
            AchievementCategory::Mangas => &mut self.mangas,
            AchievementCategory::Comics => &mut self.comics,
        };
        *counter += 1;
    }

    /// Tooltip sections for every scored category, in display order.
    pub fn progress(&self, enabled: &EnabledTypes) -> Vec<AchievementProgress> {
        AchievementCategory::ALL
            .into_iter()
            .filter(|c| c.is_scored(enabled))
            .map(|category| AchievementProgress::new(category, self.count(category)))
            .collect()
    }
}

/// Count completed records per category and score them.
///
/// Records of disabled or unknown types are skipped. An animated movie is
/// one record but two memberships: it adds to movies when movies is enabled
/// and to animations when animations is enabled, independently. The result
/// does not depend on the order of `records`.
pub fn compute_stats(records: &[MediaRecord], enabled: &EnabledTypes) -> AchievementStats {
    let mut stats = AchievementStats::default();

    for record in records {
        let Some(media_type) = record.media_type() else {
            trace!(id = %record.id, type_key = record.type_key(), "unknown media type, not counted");
            continue;
        };
        if media_type != MediaType::AnimatedMovies && !enabled.contains(media_type) {
            continue;
        }

        match &record.details {
            MediaDetails::AnimatedMovies(_) => {
                if enabled.contains(MediaType::Movies) {
                    stats.bump(AchievementCategory::Movies);
                }
                if enabled.contains(MediaType::Animations) {
                    stats.bump(AchievementCategory::Animations);
                }
            }
            MediaDetails::Games(game) => {
                if game.beaten {
                    stats.bump(AchievementCategory::Games);
                }
                if game_platinum(game) {
                    stats.bump(AchievementCategory::Platinum);
                }
            }
            _ if is_complete(record) => {
                let category = match media_type {
                    MediaType::Movies => AchievementCategory::Movies,
                    MediaType::Series => AchievementCategory::Series,
                    MediaType::Animations => AchievementCategory::Animations,
                    MediaType::Books => AchievementCategory::Books,
                    MediaType::Mangas => AchievementCategory::Mangas,
                    MediaType::Comics => AchievementCategory::Comics,
                    // handled above
                    MediaType::AnimatedMovies | MediaType::Games => continue,
                };
                stats.bump(category);
            }
            _ => {}
        }
    }

    stats.total_points = AchievementCategory::ALL
        .into_iter()
        .filter(|c| c.is_scored(enabled))
        .map(|c| ladder_points(stats.count(c), c.thresholds()))
        .sum();

    debug!(records = records.len(), points = stats.total_points, "computed achievement stats");
    stats
}

// ---------------------------------------------------------------------------
// Tooltip progress
// ---------------------------------------------------------------------------

/// One "12/25 movies watched" line of the achievements tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub category:  AchievementCategory,
    pub current:   u32,
    /// First milestone above `current`, or the last one once all are reached.
    pub next_goal: u32,
    /// `current` capped at `next_goal`.
    pub shown:     u32,
    pub percent:   u32,
}

impl AchievementProgress {
    pub fn new(category: AchievementCategory, current: u32) -> Self {
        let thresholds = category.thresholds();
        let next_goal = thresholds
            .iter()
            .copied()
            .find(|&t| current < t)
            .or_else(|| thresholds.last().copied())
            .unwrap_or(0);

        let percent = if next_goal == 0 {
            100
        } else {
            let raw = (f64::from(current) / f64::from(next_goal) * 100.0).round();
            raw.min(100.0) as u32
        };

        AchievementProgress {
            category,
            current,
            next_goal,
            shown: current.min(next_goal),
            percent,
        }
    }
}
