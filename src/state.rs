// state.rs: The in-memory state behind one client session.
//
// Holds the record collection, the settings and the current view controls,
// and keeps the rules that tie the controls together: switching the category
// tab clears the search and the advanced form, picking a dropdown sort
// discards the advanced form, applying the advanced form resets the dropdown.

use tracing::{debug, info};

use crate::achievements::{compute_stats, AchievementProgress, AchievementStats};
use crate::dashboard::{build_dashboard, find_favorite, DashboardSeries};
use crate::error::Result;
use crate::library::{advanced_records, visible_records, AdvancedFilter, CategoryFilter, SortOrder, ViewQuery};
use crate::models::{load_records, MediaRecord, MediaType, RecordId};
use crate::settings::{CategorySelection, EnabledTypes, Settings};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    records:   Vec<MediaRecord>,
    settings:  Settings,
    query:     ViewQuery,
    advanced:  Option<AdvancedFilter>,
    /// Dashboard checkboxes the user has touched. Types not in here are ticked.
    selection: CategorySelection,
}

impl AppState {
    pub fn new(records: Vec<MediaRecord>, settings: Settings) -> Self {
        let query = ViewQuery { sort: settings.current_sort, ..ViewQuery::default() };
        AppState { records, settings, query, advanced: None, selection: CategorySelection::new() }
    }

    /// Build the state from the stored records list and settings object.
    pub fn from_json(records_json: &str, settings_json: &str) -> Result<Self> {
        let records = load_records(records_json)?;
        let settings = Settings::from_json(settings_json)?;
        info!(records = records.len(), enabled = settings.active_media_types.len(), "session loaded");
        Ok(AppState::new(records, settings))
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn advanced(&self) -> Option<&AdvancedFilter> {
        self.advanced.as_ref()
    }

    // -----------------------------------------------------------------------
    // View controls
    // -----------------------------------------------------------------------

    pub fn select_filter(&mut self, filter: CategoryFilter) {
        self.query.filter = filter;
        self.query.search.clear();
        self.advanced = None;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
    }

    /// Pick a dropdown order. The choice is remembered in the settings.
    pub fn set_sort(&mut self, order: Option<SortOrder>) {
        self.query.sort = order;
        self.settings.current_sort = order;
        self.advanced = None;
    }

    pub fn apply_advanced(&mut self, filter: AdvancedFilter) {
        debug!(types = ?filter.types, order = ?filter.order_by, "advanced filter applied");
        self.query.sort = None;
        self.settings.current_sort = None;
        self.advanced = Some(filter);
    }

    pub fn clear_advanced(&mut self) {
        self.advanced = None;
    }

    /// The card list, through the advanced form when one is applied.
    pub fn visible(&self) -> Vec<&MediaRecord> {
        let enabled = &self.settings.active_media_types;
        match &self.advanced {
            Some(filter) => advanced_records(&self.records, enabled, filter),
            None => visible_records(&self.records, enabled, &self.query),
        }
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    pub fn achievements(&self) -> AchievementStats {
        compute_stats(&self.records, &self.settings.active_media_types)
    }

    pub fn achievement_progress(&self) -> Vec<AchievementProgress> {
        self.achievements().progress(&self.settings.active_media_types)
    }

    /// Dashboard series over the enabled records and the ticked categories.
    pub fn dashboard(&self) -> DashboardSeries {
        let enabled = &self.settings.active_media_types;
        let records = self
            .records
            .iter()
            .filter(|r| r.media_type().is_some_and(|t| enabled.admits(t)));

        let selected: Vec<MediaType> = MediaType::ALL
            .into_iter()
            .filter(|t| self.selection.get(t).copied().unwrap_or(true))
            .collect();

        build_dashboard(records, &selected)
    }

    pub fn set_dashboard_category(&mut self, media_type: MediaType, selected: bool) {
        self.selection.insert(media_type, selected);
    }

    pub fn favorite(&self) -> Option<&MediaRecord> {
        let id = self.settings.favorite_media_id.as_deref()?;
        find_favorite(&self.records, id)
    }

    pub fn set_favorite(&mut self, id: Option<&RecordId>) {
        self.settings.favorite_media_id = id.map(ToString::to_string);
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Insert a record, or replace the one with the same id.
    pub fn upsert(&mut self, record: MediaRecord) -> Result<()> {
        record.validate()?;
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                debug!(id = %record.id, "record updated");
                *existing = record;
            }
            None => {
                debug!(id = %record.id, "record added");
                self.records.push(record);
            }
        }
        Ok(())
    }

    /// Remove a record. Returns `false` when no record had that id.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        let removed = self.records.len() != before;
        if removed && self.settings.favorite_media_id.as_deref() == Some(id.to_string().as_str()) {
            self.settings.favorite_media_id = None;
        }
        removed
    }

    /// Save a new set of enabled categories, carrying the dashboard
    /// selection across as [`Settings::apply_active_types`] describes.
    pub fn apply_settings(&mut self, new_types: EnabledTypes) -> Result<()> {
        self.selection = self.settings.apply_active_types(new_types, &self.selection)?;
        Ok(())
    }
}
