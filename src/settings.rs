// settings.rs: Settings persisted by the web client.
//
// The core only reads these. They arrive as the JSON object the settings
// subsystem keeps (camelCase keys) and are passed explicitly into every
// aggregation instead of being read from global storage.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::library::SortOrder;
use crate::models::MediaType;

// ---------------------------------------------------------------------------
// Enabled categories
// ---------------------------------------------------------------------------

/// The set of categories switched on in settings.
///
/// Stored as a list of keys; keys this version does not know are dropped
/// when reading. An empty set is valid and simply yields empty results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct EnabledTypes(BTreeSet<MediaType>);

impl EnabledTypes {
    pub fn new() -> Self {
        EnabledTypes(BTreeSet::new())
    }

    pub fn contains(&self, media_type: MediaType) -> bool {
        self.0.contains(&media_type)
    }

    /// Whether records of `media_type` are shown at all. Animated movies
    /// show up as soon as movies, animations or animated movies is enabled.
    pub fn admits(&self, media_type: MediaType) -> bool {
        match media_type {
            MediaType::AnimatedMovies => {
                self.contains(MediaType::Movies)
                    || self.contains(MediaType::Animations)
                    || self.contains(MediaType::AnimatedMovies)
            }
            other => self.contains(other),
        }
    }

    pub fn insert(&mut self, media_type: MediaType) -> bool {
        self.0.insert(media_type)
    }

    pub fn remove(&mut self, media_type: MediaType) -> bool {
        self.0.remove(&media_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Enabled types in canonical display order.
    pub fn iter(&self) -> impl Iterator<Item = MediaType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<MediaType> for EnabledTypes {
    fn from_iter<I: IntoIterator<Item = MediaType>>(iter: I) -> Self {
        EnabledTypes(iter.into_iter().collect())
    }
}

impl From<Vec<String>> for EnabledTypes {
    fn from(keys: Vec<String>) -> Self {
        keys.iter().filter_map(|k| MediaType::parse(k)).collect()
    }
}

impl From<EnabledTypes> for Vec<String> {
    fn from(types: EnabledTypes) -> Self {
        types.iter().map(|t| t.as_str().to_string()).collect()
    }
}

/// Which categories are ticked in the dashboard category list.
pub type CategorySelection = BTreeMap<MediaType, bool>;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub active_media_types: EnabledTypes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_media_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sort: Option<SortOrder>,
    /// Dashboard selection remembered for each disabled category, restored
    /// when the category is enabled again.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub saved_filter_states: BTreeMap<MediaType, CategorySelection>,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The set the web client enables on first run. Never substituted
    /// automatically: an empty set stays empty.
    pub fn default_types() -> EnabledTypes {
        MediaType::ALL
            .into_iter()
            .filter(|t| *t != MediaType::AnimatedMovies)
            .collect()
    }

    /// Save a new set of enabled categories.
    ///
    /// Every category leaving the set remembers the current dashboard
    /// selection; every category coming back gets its remembered selection
    /// merged into the returned one (and forgotten). Fails without touching
    /// anything when `new_types` is empty.
    pub fn apply_active_types(
        &mut self,
        new_types: EnabledTypes,
        selection: &CategorySelection,
    ) -> Result<CategorySelection> {
        if new_types.is_empty() {
            return Err(Error::NoMediaTypeSelected);
        }

        let disabled: Vec<MediaType> = self
            .active_media_types
            .iter()
            .filter(|t| !new_types.contains(*t))
            .collect();
        let enabled: Vec<MediaType> = new_types
            .iter()
            .filter(|t| !self.active_media_types.contains(*t))
            .collect();

        for media_type in &disabled {
            self.saved_filter_states.insert(*media_type, selection.clone());
        }

        let mut restored = selection.clone();
        for media_type in &enabled {
            if let Some(saved) = self.saved_filter_states.remove(media_type) {
                restored.extend(saved);
            }
        }

        debug!(?disabled, ?enabled, "active media types changed");
        self.active_media_types = new_types;
        Ok(restored)
    }
}
