//! The outcome of one organize run.

use crate::file_category::Category;
use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What happened to one scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Moved into its category (or extension) folder.
    MovedToCategory { folder: String, destination: PathBuf },
    /// Content matched a file placed earlier in the run.
    MovedToDuplicates {
        destination: PathBuf,
        original: PathBuf,
    },
    /// Left in place. `error` describes why.
    SkippedError { error: String },
}

/// Per-file line of a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub source: PathBuf,
    pub category: Category,
    #[serde(flatten)]
    pub action: Action,
}

impl ReportEntry {
    pub fn destination(&self) -> Option<&Path> {
        match &self.action {
            Action::MovedToCategory { destination, .. }
            | Action::MovedToDuplicates { destination, .. } => Some(destination),
            Action::SkippedError { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.action, Action::SkippedError { .. })
    }
}

/// Files that share a fingerprint. `kept` is where the original ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub fingerprint: Fingerprint,
    pub size: u64,
    pub kept: PathBuf,
    pub duplicates: Vec<PathBuf>,
}

/// Everything an organize run did, in traversal order.
///
/// In a dry run the destinations are the ones a real run would use, but
/// nothing on disk has changed.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub entries: Vec<ReportEntry>,
    /// Only groups with at least one duplicate.
    pub duplicate_groups: Vec<DuplicateGroup>,
    /// Regular files left alone because a filter excluded them.
    pub excluded: Vec<PathBuf>,
}

impl Report {
    pub fn new(root: PathBuf, dry_run: bool) -> Self {
        Self {
            root,
            started_at: Utc::now(),
            dry_run,
            entries: Vec::new(),
            duplicate_groups: Vec::new(),
            excluded: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of files moved into each destination folder, sorted by folder.
    pub fn folder_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            if let Action::MovedToCategory { folder, .. } = &entry.action {
                *counts.entry(folder.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn moved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, Action::MovedToCategory { .. }))
            .count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, Action::MovedToDuplicates { .. }))
            .count()
    }

    /// Skipped files with their error messages.
    pub fn errors(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().filter_map(|e| match &e.action {
            Action::SkippedError { error } => Some((e.source.as_path(), error.as_str())),
            _ => None,
        })
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(ReportEntry::is_error)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
