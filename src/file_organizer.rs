/// The organizer engine.
///
/// A run lists the regular files directly under a root folder, classifies
/// each one, sets content duplicates aside and moves everything else into
/// a per-category subdirectory. Files are handled one at a time in file name
/// order. A failure on one file is recorded in the [`Report`] and the run
/// moves on to the next file.
use crate::config::{CompiledConfig, CompiledFilters, Layout};
use crate::file_category::{Category, FileMapper, Grouping};
use crate::fingerprint::Fingerprint;
use crate::report::{Action, DuplicateGroup, Report, ReportEntry};
use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs::{self, DirEntry, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Errors that can occur during file organization.
///
/// Only [`OrganizeError::InvalidPath`] ends a run. Every other variant is
/// tied to one file and ends up in the report as a skipped entry.
#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    /// The root folder is missing, not a directory, or cannot be listed.
    #[error("invalid folder {}: {source}", .path.display())]
    InvalidPath { path: PathBuf, source: io::Error },
    /// Failed to create a destination directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its destination.
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// Failed to read a file to compute its fingerprint.
    #[error("failed to read {} for duplicate check: {source}", .path.display())]
    FingerprintFailed { path: PathBuf, source: io::Error },
    /// The file cannot be opened or its metadata cannot be read.
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// One regular file found directly under the root.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    /// Lower-cased, without the dot.
    pub extension: Option<String>,
    pub size: u64,
    fingerprint: Option<Fingerprint>,
}

impl FileEntry {
    fn from_dir_entry(entry: &DirEntry) -> io::Result<Self> {
        let metadata = entry.metadata()?;
        Ok(Self::new(entry.path(), metadata.len()))
    }

    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty());
        Self {
            path,
            name,
            extension,
            size,
            fingerprint: None,
        }
    }

    fn file_name(&self) -> &OsStr {
        self.path
            .file_name()
            .unwrap_or_else(|| OsStr::new(&self.name))
    }

    /// Returns the content fingerprint, hashing the file on first use.
    pub fn fingerprint(&mut self) -> io::Result<&Fingerprint> {
        let fingerprint = match self.fingerprint.take() {
            Some(fp) => fp,
            None => Fingerprint::of_file(&self.path)?,
        };
        Ok(self.fingerprint.insert(fingerprint))
    }
}

/// A child of the root whose type or metadata could not be read.
#[derive(Debug)]
struct Unlisted {
    path: PathBuf,
    source: io::Error,
}

/// Result of listing the root.
#[derive(Debug, Default)]
struct Listing {
    files: Vec<FileEntry>,
    unlisted: Vec<Unlisted>,
    excluded: Vec<PathBuf>,
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum Progress<'a> {
    /// The root was listed; `total` files will be processed.
    Scanned { total: usize },
    /// One file has been handled.
    Processed(&'a ReportEntry),
}

/// Picks the first free name for `file_name` inside `dir`.
///
/// `report.pdf` becomes `report_1.pdf`, then `report_2.pdf`, and so on.
/// Names without an extension get the suffix appended at the end.
pub fn resolve_destination(
    dir: &Path,
    file_name: &OsStr,
    is_taken: impl Fn(&Path) -> bool,
) -> PathBuf {
    let candidate = dir.join(file_name);
    if !is_taken(&candidate) {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().unwrap_or(file_name);
    let extension = as_path.extension();

    (1u64..)
        .map(|n| {
            let mut name = OsString::from(stem);
            name.push(format!("_{n}"));
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }
            dir.join(name)
        })
        .find(|candidate| !is_taken(candidate))
        .unwrap_or(candidate)
}

/// Fails with [`OrganizeError::InvalidPath`] unless `root` is a listable directory.
pub fn validate_root(root: &Path) -> OrganizeResult<()> {
    let invalid = |source: io::Error| OrganizeError::InvalidPath {
        path: root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(root).map_err(invalid)?;
    if !metadata.is_dir() {
        return Err(invalid(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a directory",
        )));
    }
    fs::read_dir(root).map_err(invalid)?;
    Ok(())
}

/// Per-run bookkeeping.
#[derive(Default)]
struct RunState {
    /// How many scanned files have each size.
    size_counts: HashMap<u64, usize>,
    /// Fingerprint of every placed original, pointing into `groups`.
    originals: HashMap<Fingerprint, usize>,
    groups: Vec<DuplicateGroup>,
    /// Destinations handed out so far. A dry run moves nothing, so the
    /// filesystem alone cannot tell which names are spoken for.
    reserved: HashSet<PathBuf>,
}

impl RunState {
    fn size_is_shared(&self, size: u64) -> bool {
        self.size_counts.get(&size).copied().unwrap_or(0) > 1
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.reserved.contains(path) || fs::symlink_metadata(path).is_ok()
    }
}

/// Organizes the files of a folder into category subdirectories.
///
/// # Examples
///
/// ```no_run
/// use tidyfold::file_organizer::Organizer;
/// use std::path::Path;
///
/// let report = Organizer::default().organize(Path::new("/home/user/Downloads"))?;
/// println!("moved {} files", report.moved_count());
/// # Ok::<(), tidyfold::file_organizer::OrganizeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Organizer {
    filters: CompiledFilters,
    mapper: FileMapper,
    layout: Layout,
    dry_run: bool,
}

impl Organizer {
    pub fn new(config: CompiledConfig) -> Self {
        Self {
            filters: config.filters,
            mapper: config.mapper,
            layout: config.layout,
            dry_run: false,
        }
    }

    /// When set, every decision is made and reported but no file is touched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Organizes `root` and returns what happened to each file.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidPath`] if `root` cannot be listed.
    /// Per-file failures never surface here; they are in the report.
    pub fn organize(&self, root: &Path) -> OrganizeResult<Report> {
        self.organize_with_progress(root, |_| {})
    }

    /// Same as [`Organizer::organize`], calling `on_progress` as work advances.
    pub fn organize_with_progress<F>(&self, root: &Path, mut on_progress: F) -> OrganizeResult<Report>
    where
        F: FnMut(Progress<'_>),
    {
        let listing = self.scan(root)?;
        info!(
            root = %root.display(),
            files = listing.files.len(),
            unreadable = listing.unlisted.len(),
            excluded = listing.excluded.len(),
            dry_run = self.dry_run,
            "starting organize run"
        );
        on_progress(Progress::Scanned {
            total: listing.files.len() + listing.unlisted.len(),
        });

        let mut report = Report::new(root.to_path_buf(), self.dry_run);
        report.excluded = listing.excluded;

        // Entries that could not even be inspected are reported as skipped.
        for unlisted in listing.unlisted {
            report.entries.push(self.unlisted_entry(unlisted));
            if let Some(last) = report.entries.last() {
                on_progress(Progress::Processed(last));
            }
        }

        let mut state = RunState::default();
        for entry in &listing.files {
            *state.size_counts.entry(entry.size).or_insert(0) += 1;
        }

        for mut entry in listing.files {
            let record = self.process(root, &mut entry, &mut state);
            report.entries.push(record);
            if let Some(last) = report.entries.last() {
                on_progress(Progress::Processed(last));
            }
        }

        report.duplicate_groups = state
            .groups
            .into_iter()
            .filter(|g| !g.duplicates.is_empty())
            .collect();

        info!(
            moved = report.moved_count(),
            duplicates = report.duplicate_count(),
            skipped = report.errors().count(),
            "organize run finished"
        );
        Ok(report)
    }

    /// Lists the regular files directly under `root`, sorted by name.
    ///
    /// A failure while listing the folder itself is fatal, since nothing has
    /// been moved yet. A child whose type or metadata cannot be read is kept
    /// so the run can report it.
    fn scan(&self, root: &Path) -> OrganizeResult<Listing> {
        validate_root(root)?;
        let invalid = |source: io::Error| OrganizeError::InvalidPath {
            path: root.to_path_buf(),
            source,
        };
        let dir = fs::read_dir(root).map_err(invalid)?;

        let mut listing = Listing::default();

        for item in dir {
            let item = item.map_err(invalid)?;

            // DirEntry::file_type does not follow symlinks.
            match item.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => {
                    debug!(path = %item.path().display(), "not a regular file, ignored");
                    continue;
                }
                Err(source) => {
                    listing.unlisted.push(Unlisted {
                        path: item.path(),
                        source,
                    });
                    continue;
                }
            }

            if !self.filters.should_include(&item.file_name().to_string_lossy()) {
                debug!(path = %item.path().display(), "excluded by filter");
                listing.excluded.push(item.path());
                continue;
            }

            match FileEntry::from_dir_entry(&item) {
                Ok(entry) => listing.files.push(entry),
                Err(source) => listing.unlisted.push(Unlisted {
                    path: item.path(),
                    source,
                }),
            }
        }

        listing.files.sort_by(|a, b| a.path.cmp(&b.path));
        listing.unlisted.sort_by(|a, b| a.path.cmp(&b.path));
        listing.excluded.sort();
        Ok(listing)
    }

    fn unlisted_entry(&self, unlisted: Unlisted) -> ReportEntry {
        let entry = FileEntry::new(unlisted.path, 0);
        let error = OrganizeError::Unreadable {
            path: entry.path.clone(),
            source: unlisted.source,
        };
        warn!(path = %entry.path.display(), error = %error, "skipping file");
        ReportEntry {
            category: self.mapper.categorize(entry.extension.as_deref(), None),
            source: entry.path,
            action: Action::SkippedError {
                error: error.to_string(),
            },
        }
    }

    fn process(&self, root: &Path, entry: &mut FileEntry, state: &mut RunState) -> ReportEntry {
        let category = self.classify(entry);
        let action = match self.place(root, entry, category, state) {
            Ok(action) => action,
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "skipping file");
                Action::SkippedError {
                    error: e.to_string(),
                }
            }
        };

        ReportEntry {
            source: entry.path.clone(),
            category,
            action,
        }
    }

    fn classify(&self, entry: &FileEntry) -> Category {
        let category = self.mapper.categorize(entry.extension.as_deref(), None);
        if category != Category::Other || !self.layout.sniff_content {
            return category;
        }

        match infer::get_from_path(&entry.path) {
            Ok(Some(kind)) => {
                debug!(path = %entry.path.display(), mime = kind.mime_type(), "sniffed content type");
                self.mapper
                    .categorize(entry.extension.as_deref(), Some(kind.mime_type()))
            }
            Ok(None) => category,
            Err(e) => {
                debug!(path = %entry.path.display(), error = %e, "content sniffing failed");
                category
            }
        }
    }

    /// Folder name under the root for a non-duplicate file.
    fn folder_for(&self, entry: &FileEntry, category: Category) -> String {
        match self.layout.grouping {
            Grouping::Category => category.dir_name().to_string(),
            Grouping::Extension => match &entry.extension {
                Some(ext) => self.extension_folder(ext),
                None => self.layout.no_extension_dir.clone(),
            },
        }
    }

    /// An extension folder never shares a name with the duplicates or
    /// no-extension folder; a clashing name gets `_ext` appended.
    fn extension_folder(&self, ext: &str) -> String {
        let reserved = |name: &str| {
            name.eq_ignore_ascii_case(&self.layout.duplicates_dir)
                || name.eq_ignore_ascii_case(&self.layout.no_extension_dir)
        };
        let mut folder = ext.to_string();
        while reserved(&folder) {
            folder.push_str("_ext");
        }
        folder
    }

    fn place(
        &self,
        root: &Path,
        entry: &mut FileEntry,
        category: Category,
        state: &mut RunState,
    ) -> OrganizeResult<Action> {
        // Moving only needs directory permissions, so a file nobody can read
        // would otherwise be renamed without complaint.
        File::open(&entry.path).map_err(|source| OrganizeError::Unreadable {
            path: entry.path.clone(),
            source,
        })?;

        // A file with a size no other file has cannot be a duplicate.
        let fingerprint = if self.layout.dedupe && state.size_is_shared(entry.size) {
            match entry.fingerprint() {
                Ok(fp) => Some(fp.clone()),
                Err(source) => {
                    return Err(OrganizeError::FingerprintFailed {
                        path: entry.path.clone(),
                        source,
                    });
                }
            }
        } else {
            None
        };

        if let Some(fp) = &fingerprint
            && let Some(&group) = state.originals.get(fp)
        {
            let dir = root.join(&self.layout.duplicates_dir);
            let destination = self.move_into(&dir, entry, state)?;
            let group = &mut state.groups[group];
            group.duplicates.push(destination.clone());
            debug!(
                path = %entry.path.display(),
                original = %group.kept.display(),
                "duplicate content"
            );
            return Ok(Action::MovedToDuplicates {
                destination,
                original: group.kept.clone(),
            });
        }

        let folder = self.folder_for(entry, category);
        let destination = self.move_into(&root.join(&folder), entry, state)?;

        // Only a file that actually got placed becomes the original of its group.
        if let Some(fp) = fingerprint {
            state.originals.insert(fp.clone(), state.groups.len());
            state.groups.push(DuplicateGroup {
                fingerprint: fp,
                size: entry.size,
                kept: destination.clone(),
                duplicates: Vec::new(),
            });
        }

        Ok(Action::MovedToCategory {
            folder,
            destination,
        })
    }

    /// Moves `entry` into `dir` under a free name and returns the new path.
    fn move_into(
        &self,
        dir: &Path,
        entry: &FileEntry,
        state: &mut RunState,
    ) -> OrganizeResult<PathBuf> {
        self.ensure_dir(dir)?;

        let destination = resolve_destination(dir, entry.file_name(), |p| state.is_taken(p));
        if !self.dry_run {
            fs::rename(&entry.path, &destination).map_err(|source| {
                OrganizeError::FileMoveFailure {
                    from: entry.path.clone(),
                    to: destination.clone(),
                    source,
                }
            })?;
        }

        debug!(
            from = %entry.path.display(),
            to = %destination.display(),
            dry_run = self.dry_run,
            "moved file"
        );
        state.reserved.insert(destination.clone());
        Ok(destination)
    }

    fn ensure_dir(&self, dir: &Path) -> OrganizeResult<()> {
        if dir.is_dir() {
            return Ok(());
        }

        if self.dry_run {
            // Mirror the failure a real run would hit.
            if fs::symlink_metadata(dir).is_ok() {
                return Err(OrganizeError::DirectoryCreationFailed {
                    path: dir.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "a file with this name is in the way",
                    ),
                });
            }
            return Ok(());
        }

        fs::create_dir_all(dir).map_err(|source| OrganizeError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        info!(path = %dir.display(), "created directory");
        Ok(())
    }
}
