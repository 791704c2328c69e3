// raw.rs: The flat JSON shape records are stored in.
//
// The web client writes form values as they come: numbers are often strings
// ("12"), empty inputs become null, flags may be "true". Older entries use
// `playtime` for games and `volume_total` for mangas/comics. Everything here
// deserializes leniently and `From<RawRecord> for MediaRecord` picks the one
// progress group that matches the record's type.

use serde::{Deserialize, Serialize};

use crate::models::{
    GameProgress, MediaDetails, MediaRecord, MediaType, PageProgress, RecordId, Runtime,
    VolumeProgress, WatchProgress,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub consumed_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,

    // games
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub hours_played: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing)]
    pub playtime: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub beaten: Option<bool>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub trophies_obtained: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub trophies_total: Option<f64>,

    // series / animations
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub use_episodes: Option<bool>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub episodes_watched: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub episodes_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub seasons_watched: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub seasons_total: Option<f64>,

    // books (and legacy manga/comic page counts)
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub pages_read: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub pages_total: Option<f64>,

    // mangas / comics
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub volume_read: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub volume_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing)]
    pub volume_total: Option<f64>,

    // movies / animated movies
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub use_hours: Option<bool>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub duration_only_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::write_number", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

impl RawRecord {
    fn empty(id: RecordId, media_type: String) -> Self {
        RawRecord {
            id,
            media_type,
            title: None,
            rating: None,
            consumed_date: None,
            cover_img: None,
            hours_played: None,
            playtime: None,
            online: None,
            beaten: None,
            trophies_obtained: None,
            trophies_total: None,
            use_episodes: None,
            episodes_watched: None,
            episodes_total: None,
            seasons_watched: None,
            seasons_total: None,
            pages_read: None,
            pages_total: None,
            volume_read: None,
            volume_amount: None,
            volume_total: None,
            use_hours: None,
            duration_only_minutes: None,
            duration_hours: None,
            duration_minutes: None,
        }
    }

    fn runtime(&self) -> Runtime {
        let hours_minutes = Runtime::HoursMinutes {
            hours:   non_negative(self.duration_hours),
            minutes: non_negative(self.duration_minutes),
        };
        match self.use_hours {
            Some(true) => hours_minutes,
            _ if self.duration_only_minutes.is_some() => {
                Runtime::Minutes(non_negative(self.duration_only_minutes))
            }
            _ if self.duration_hours.is_some() || self.duration_minutes.is_some() => hours_minutes,
            _ => Runtime::Minutes(None),
        }
    }

    fn watch(&self) -> WatchProgress {
        if self.use_episodes == Some(true) {
            WatchProgress::Episodes {
                watched: count(self.episodes_watched),
                total:   count(self.episodes_total),
            }
        } else {
            WatchProgress::Seasons {
                watched: count(self.seasons_watched),
                total:   count(self.seasons_total),
            }
        }
    }

    fn game(&self) -> GameProgress {
        GameProgress {
            hours_played:      non_negative(self.playtime.or(self.hours_played)),
            online:            self.online.unwrap_or(false),
            beaten:            self.beaten.unwrap_or(false),
            trophies_obtained: count(self.trophies_obtained),
            trophies_total:    count(self.trophies_total),
        }
    }

    fn volumes(&self) -> VolumeProgress {
        VolumeProgress {
            read:       count(self.volume_read),
            total:      count(self.volume_total.or(self.volume_amount)),
            pages_read: count(self.pages_read),
        }
    }
}

/// A count must be a non-negative whole number; anything else is treated as absent.
fn count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|n| *n >= 0.0)
}

impl From<RawRecord> for MediaRecord {
    fn from(raw: RawRecord) -> Self {
        let details = match MediaType::parse(&raw.media_type) {
            Some(MediaType::Movies)         => MediaDetails::Movies(raw.runtime()),
            Some(MediaType::AnimatedMovies) => MediaDetails::AnimatedMovies(raw.runtime()),
            Some(MediaType::Series)         => MediaDetails::Series(raw.watch()),
            Some(MediaType::Animations)     => MediaDetails::Animations(raw.watch()),
            Some(MediaType::Games)          => MediaDetails::Games(raw.game()),
            Some(MediaType::Books)          => MediaDetails::Books(PageProgress {
                read:  count(raw.pages_read),
                total: count(raw.pages_total),
            }),
            Some(MediaType::Mangas)         => MediaDetails::Mangas(raw.volumes()),
            Some(MediaType::Comics)         => MediaDetails::Comics(raw.volumes()),
            None                            => MediaDetails::Unknown(raw.media_type.clone()),
        };

        MediaRecord {
            id:            raw.id,
            title:         raw.title.unwrap_or_default(),
            rating:        raw.rating,
            consumed_date: raw.consumed_date,
            cover_img:     raw.cover_img,
            details,
        }
    }
}

impl From<MediaRecord> for RawRecord {
    fn from(record: MediaRecord) -> Self {
        let type_key = record.type_key().to_string();
        let mut raw = RawRecord::empty(record.id, type_key);
        raw.title = Some(record.title);
        raw.rating = record.rating;
        raw.consumed_date = record.consumed_date;
        raw.cover_img = record.cover_img;

        let as_f64 = |n: Option<u32>| n.map(f64::from);

        match record.details {
            MediaDetails::Movies(runtime) | MediaDetails::AnimatedMovies(runtime) => match runtime {
                Runtime::Minutes(minutes) => {
                    raw.use_hours = Some(false);
                    raw.duration_only_minutes = minutes;
                }
                Runtime::HoursMinutes { hours, minutes } => {
                    raw.use_hours = Some(true);
                    raw.duration_hours = hours;
                    raw.duration_minutes = minutes;
                }
            },
            MediaDetails::Series(watch) | MediaDetails::Animations(watch) => match watch {
                WatchProgress::Episodes { watched, total } => {
                    raw.use_episodes = Some(true);
                    raw.episodes_watched = as_f64(watched);
                    raw.episodes_total = as_f64(total);
                }
                WatchProgress::Seasons { watched, total } => {
                    raw.use_episodes = Some(false);
                    raw.seasons_watched = as_f64(watched);
                    raw.seasons_total = as_f64(total);
                }
            },
            MediaDetails::Games(g) => {
                raw.hours_played = g.hours_played;
                raw.online = Some(g.online);
                raw.beaten = Some(g.beaten);
                raw.trophies_obtained = as_f64(g.trophies_obtained);
                raw.trophies_total = as_f64(g.trophies_total);
            }
            MediaDetails::Books(p) => {
                raw.pages_read = as_f64(p.read);
                raw.pages_total = as_f64(p.total);
            }
            MediaDetails::Mangas(v) | MediaDetails::Comics(v) => {
                raw.volume_read = as_f64(v.read);
                raw.volume_amount = as_f64(v.total);
                raw.pages_read = as_f64(v.pages_read);
            }
            MediaDetails::Unknown(_) => {}
        }
        raw
    }
}

/// Tolerant field deserializers for hand-entered form values.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Numbers, numeric strings; anything else (or a non-finite value) is `None`.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        let n = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(n.filter(|n| n.is_finite()))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Whole numbers are written back as integers so "12" does not become "12.0".
    pub fn write_number<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => s.serialize_i64(*n as i64),
            Some(n) => s.serialize_f64(*n),
            None => s.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> MediaRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn form_strings_become_numbers() {
        let record = parse(json!({
            "id": "doc1", "type": "games", "title": "Bloodborne",
            "hours_played": "82.5", "online": "false", "beaten": true,
            "trophies_obtained": "34", "trophies_total": "34"
        }));
        assert_eq!(
            record.details,
            MediaDetails::Games(GameProgress {
                hours_played: Some(82.5),
                online: false,
                beaten: true,
                trophies_obtained: Some(34),
                trophies_total: Some(34),
            })
        );
    }

    #[test]
    fn negative_and_garbage_counts_are_absent() {
        let record = parse(json!({
            "id": 3, "type": "books", "title": "Odd",
            "pages_read": -4, "pages_total": "lots"
        }));
        assert_eq!(record.details, MediaDetails::Books(PageProgress { read: None, total: None }));
    }

    #[test]
    fn legacy_keys_are_honoured() {
        let manga = parse(json!({
            "id": 4, "type": "mangas", "title": "Berserk",
            "volume_read": 10, "volume_total": 41, "volume_amount": 40
        }));
        let MediaDetails::Mangas(v) = manga.details else { panic!("expected manga") };
        assert_eq!(v.total, Some(41));

        let game = parse(json!({ "id": 5, "type": "games", "title": "Hades", "playtime": 30, "hours_played": 12 }));
        let MediaDetails::Games(g) = game.details else { panic!("expected game") };
        assert_eq!(g.hours_played, Some(30.0));
    }

    #[test]
    fn sub_mode_flags_select_the_progress_group() {
        let series = parse(json!({
            "id": 6, "type": "series", "title": "Dark",
            "use_episodes": "true", "episodes_watched": 8, "episodes_total": 26,
            "seasons_watched": 1, "seasons_total": 3
        }));
        assert_eq!(
            series.details,
            MediaDetails::Series(WatchProgress::Episodes { watched: Some(8), total: Some(26) })
        );

        let movie = parse(json!({ "id": 7, "type": "movies", "title": "Heat", "duration_only_minutes": "170" }));
        assert_eq!(movie.details, MediaDetails::Movies(Runtime::Minutes(Some(170.0))));

        let movie = parse(json!({
            "id": 8, "type": "animated_movies", "title": "Akira",
            "use_hours": true, "duration_hours": 2, "duration_minutes": 4
        }));
        assert_eq!(
            movie.details,
            MediaDetails::AnimatedMovies(Runtime::HoursMinutes { hours: Some(2.0), minutes: Some(4.0) })
        );
    }

    #[test]
    fn serializes_back_to_the_flat_shape() {
        let record = MediaRecord::new(
            9,
            "Watchmen",
            MediaDetails::Comics(VolumeProgress { read: Some(6), total: Some(12), pages_read: None }),
        )
        .with_rating(9.0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 9, "type": "comics", "title": "Watchmen", "rating": 9,
                "volume_read": 6, "volume_amount": 12
            })
        );
    }

    #[test]
    fn unknown_type_keeps_its_key() {
        let record = parse(json!({ "id": "x", "type": "podcasts", "title": "Radiolab" }));
        assert_eq!(record.details, MediaDetails::Unknown("podcasts".into()));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "podcasts");
    }
}
