// lib.rs: Crate root.
//
// medialog computes everything the media tracker shows from the stored
// records: completion, achievements, the filtered card list and the
// dashboard series. Storage, rendering and the catalog lookups stay in the
// client; this crate only reads what they produce.
//
// RUST NOTE: the library emits `tracing` events but never installs a
// subscriber. The embedding binary decides where they go.

pub mod achievements;
pub mod completion;
pub mod dashboard;
pub mod error;
pub mod library;
pub mod models;
pub mod settings;
pub mod state;

mod raw;

pub use achievements::{compute_stats, AchievementCategory, AchievementProgress, AchievementStats};
pub use completion::{completion_percent, is_complete, is_in_progress, is_platinum};
pub use dashboard::{build_dashboard, find_favorite, DashboardSeries};
pub use error::{Error, Result};
pub use library::{advanced_records, visible_records, AdvancedFilter, CategoryFilter, SortOrder, ViewQuery};
pub use models::{load_records, MediaDetails, MediaRecord, MediaType, RecordId};
pub use settings::{EnabledTypes, Settings};
pub use state::AppState;
