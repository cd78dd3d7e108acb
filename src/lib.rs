//! tidyfold - sort a folder's files by type and set duplicates aside
//!
//! This library lists the regular files directly inside a folder, classifies
//! them by extension, detects byte-identical duplicates by content hash, and
//! moves each file into `<root>/<category>/` or `<root>/duplicates/`.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod fingerprint;
pub mod logging;
pub mod output;
pub mod picker;
pub mod report;

pub use config::{CompiledConfig, ConfigError, OrganizerConfig};
pub use file_category::{Category, FileMapper, Grouping};
pub use file_organizer::{OrganizeError, Organizer};
pub use picker::{FixedPicker, FolderPicker, PickerError};
pub use report::{Action, Report, ReportEntry};

pub use cli::{Args, Outcome, run_cli, run_with};
