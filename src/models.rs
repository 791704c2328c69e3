// models.rs: All data types for a logged media item.
//
// RUST NOTE: the web client stores every record as one flat JSON object whose
// optional fields depend on `type`. Here that shape becomes a tagged union:
// `MediaDetails` has one variant per type and each variant carries only the
// progress fields that make sense for it. The flat JSON shape still exists
// (see raw.rs) but only at the serde boundary.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::raw::RawRecord;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The eight media categories.
///
/// The declaration order is the canonical display order, so the derived
/// `Ord` can be used directly when sorting or when building a `BTreeSet`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movies,
    Series,
    Animations,
    AnimatedMovies, // dual membership: movies + animations
    Games,
    Books,
    Mangas,
    Comics,
}

impl MediaType {
    /// Every type, in canonical display order.
    pub const ALL: [MediaType; 8] = [
        MediaType::Movies,
        MediaType::Series,
        MediaType::Animations,
        MediaType::AnimatedMovies,
        MediaType::Games,
        MediaType::Books,
        MediaType::Mangas,
        MediaType::Comics,
    ];

    /// The key used in stored records and settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movies         => "movies",
            MediaType::Series         => "series",
            MediaType::Animations     => "animations",
            MediaType::AnimatedMovies => "animated_movies",
            MediaType::Games          => "games",
            MediaType::Books          => "books",
            MediaType::Mangas         => "mangas",
            MediaType::Comics         => "comics",
        }
    }

    /// Parse a stored key. Unknown keys yield `None` and are ignored by callers.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movies"          => Some(MediaType::Movies),
            "series"          => Some(MediaType::Series),
            "animations"      => Some(MediaType::Animations),
            "animated_movies" => Some(MediaType::AnimatedMovies),
            "games"           => Some(MediaType::Games),
            "books"           => Some(MediaType::Books),
            "mangas"          => Some(MediaType::Mangas),
            "comics"          => Some(MediaType::Comics),
            _                 => None,
        }
    }

    /// Types matched when this type is selected in a filter.
    /// Selecting movies or animations also selects animated movies.
    pub fn aliases(&self) -> &'static [MediaType] {
        match self {
            MediaType::Movies         => &[MediaType::Movies, MediaType::AnimatedMovies],
            MediaType::Animations     => &[MediaType::Animations, MediaType::AnimatedMovies],
            MediaType::Series         => &[MediaType::Series],
            MediaType::AnimatedMovies => &[MediaType::AnimatedMovies],
            MediaType::Games          => &[MediaType::Games],
            MediaType::Books          => &[MediaType::Books],
            MediaType::Mangas         => &[MediaType::Mangas],
            MediaType::Comics         => &[MediaType::Comics],
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record identifier: numeric in local exports, an opaque document id otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n)  => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Type-specific progress
// ---------------------------------------------------------------------------

/// Running time of a movie, entered either as minutes or as hours + minutes.
#[derive(Debug, Clone, PartialEq)]
pub enum Runtime {
    Minutes(Option<f64>),
    HoursMinutes {
        hours:   Option<f64>,
        minutes: Option<f64>,
    },
}

impl Runtime {
    pub fn hours(&self) -> f64 {
        match self {
            Runtime::Minutes(minutes) => minutes.unwrap_or(0.0) / 60.0,
            Runtime::HoursMinutes { hours, minutes } => {
                hours.unwrap_or(0.0) + minutes.unwrap_or(0.0) / 60.0
            }
        }
    }
}

/// Series and animations track either episodes or seasons, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchProgress {
    Episodes {
        watched: Option<u32>,
        total:   Option<u32>,
    },
    Seasons {
        watched: Option<u32>,
        total:   Option<u32>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameProgress {
    pub hours_played:      Option<f64>,
    pub online:            bool,
    pub beaten:            bool,
    pub trophies_obtained: Option<u32>,
    pub trophies_total:    Option<u32>,
}

impl GameProgress {
    /// Trophies are tracked and not all of them are obtained yet.
    pub fn has_trophy_gap(&self) -> bool {
        match (self.trophies_obtained, self.trophies_total) {
            (obtained, Some(total)) if total > 0 => obtained.unwrap_or(0) < total,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageProgress {
    pub read:  Option<u32>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeProgress {
    pub read:       Option<u32>,
    pub total:      Option<u32>,
    /// Older manga/comic entries counted pages instead of volumes.
    pub pages_read: Option<u32>,
}

/// The progress-field group of a record, selected by its type.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaDetails {
    Movies(Runtime),
    AnimatedMovies(Runtime),
    Series(WatchProgress),
    Animations(WatchProgress),
    Games(GameProgress),
    Books(PageProgress),
    Mangas(VolumeProgress),
    Comics(VolumeProgress),
    /// A `type` this version does not know. Kept so the record survives a
    /// load/save cycle, ignored by every aggregate.
    Unknown(String),
}

impl MediaDetails {
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            MediaDetails::Movies(_)         => Some(MediaType::Movies),
            MediaDetails::AnimatedMovies(_) => Some(MediaType::AnimatedMovies),
            MediaDetails::Series(_)         => Some(MediaType::Series),
            MediaDetails::Animations(_)     => Some(MediaType::Animations),
            MediaDetails::Games(_)          => Some(MediaType::Games),
            MediaDetails::Books(_)          => Some(MediaType::Books),
            MediaDetails::Mangas(_)         => Some(MediaType::Mangas),
            MediaDetails::Comics(_)         => Some(MediaType::Comics),
            MediaDetails::Unknown(_)        => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Core media record
// ---------------------------------------------------------------------------

/// One logged media item.
///
/// (De)serializes through the flat shape the web client stores, see
/// [`RawRecord`]; loose values (numbers as strings, nulls, negative counts)
/// are absorbed there and show up here as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecord", into = "RawRecord")]
pub struct MediaRecord {
    pub id:            RecordId,
    pub title:         String,
    pub rating:        Option<f64>,       // 0.0 – 10.0
    pub consumed_date: Option<String>,    // "YYYY-MM-DD"
    pub cover_img:     Option<String>,    // opaque blob reference
    pub details:       MediaDetails,
}

impl MediaRecord {
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>, details: MediaDetails) -> Self {
        MediaRecord {
            id: id.into(),
            title: title.into(),
            rating: None,
            consumed_date: None,
            cover_img: None,
            details,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_consumed_date(mut self, date: impl Into<String>) -> Self {
        self.consumed_date = Some(date.into());
        self
    }

    pub fn media_type(&self) -> Option<MediaType> {
        self.details.media_type()
    }

    /// The stored `type` key, including keys this version does not know.
    pub fn type_key(&self) -> &str {
        match &self.details {
            MediaDetails::Unknown(key) => key,
            details => details.media_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    /// Missing ratings count as 0 wherever ratings are compared.
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.filter(|r| r.is_finite()).unwrap_or(0.0)
    }

    /// `consumed_date` as a calendar date; `None` when absent or unparseable.
    pub fn consumed_on(&self) -> Option<NaiveDate> {
        self.consumed_date.as_deref().and_then(parse_date)
    }

    pub fn consumed_year(&self) -> Option<i32> {
        self.consumed_on().map(|d| d.year())
    }

    /// Progress must not exceed its total. Only checked when the total is
    /// non-zero, the same rule the add and edit forms apply.
    pub fn validate(&self) -> Result<()> {
        let Some(media_type) = self.media_type() else {
            return Ok(());
        };
        let check = |field: &'static str, value: Option<u32>, total: Option<u32>| -> Result<()> {
            match (value, total) {
                (Some(value), Some(total)) if total > 0 && value > total => Err(Error::Validation {
                    media_type,
                    field,
                    value,
                    total,
                }),
                _ => Ok(()),
            }
        };

        match &self.details {
            MediaDetails::Games(g) => check("trophies_obtained", g.trophies_obtained, g.trophies_total),
            MediaDetails::Books(b) => check("pages_read", b.read, b.total),
            MediaDetails::Series(w) | MediaDetails::Animations(w) => match w {
                WatchProgress::Episodes { watched, total } => check("episodes_watched", *watched, *total),
                WatchProgress::Seasons { watched, total } => check("seasons_watched", *watched, *total),
            },
            MediaDetails::Mangas(v) | MediaDetails::Comics(v) => check("volume_read", v.read, v.total),
            _ => Ok(()),
        }
    }
}

/// Parse a consumed date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read a JSON array of records as exported by the web client.
///
/// Entries that cannot be read at all (no id, no type, not an object) are
/// skipped with a warning instead of failing the whole collection; records
/// of differing shape are expected to coexist.
pub fn load_records(json: &str) -> Result<Vec<MediaRecord>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = entries.len();

    let records: Vec<MediaRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(index, %error, "skipping unreadable media record");
                None
            }
        })
        .collect();

    debug!(loaded = records.len(), skipped = total - records.len(), "loaded media records");
    Ok(records)
}
