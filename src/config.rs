//! Organizer configuration.
//!
//! Configuration is read from a TOML file and never written back. It covers
//! three concerns:
//! - which files in the root are considered at all (filters)
//! - extra extension to category mappings
//! - destination layout (duplicates folder, grouping, dedupe, sniffing)
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! include_hidden = true
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [categories]
//! images = ["raw", "cr2"]
//!
//! [layout]
//! duplicates_dir = "duplicates"
//! grouping = "category"
//! no_extension_dir = "_no_extension_"
//! dedupe = true
//! sniff_content = false
//! ```

use crate::file_category::{Category, FileMapper, Grouping};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// Invalid regex pattern provided.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// A `[categories]` key does not name a known category folder.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    /// A layout folder name is empty or not a single path component.
    #[error("invalid folder name '{0}': must be a single path component")]
    InvalidFolderName(String),
    /// Two layout folders, or a layout folder and a category folder, share a name.
    #[error("folder name '{0}' is used for more than one purpose")]
    FolderClash(String),
    /// IO error while reading configuration.
    #[error("failed to read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Top-level configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    pub filters: FilterRules,
    /// Extra extensions per category, keyed by category folder name.
    pub categories: BTreeMap<String, Vec<String>>,
    pub layout: Layout,
}

/// Which files of the root take part in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files starting with "." are organized. Defaults to true.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist, overrides exclude rules.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_include_hidden() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include_hidden: default_include_hidden(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving files out of organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. ".DS_Store").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, case-insensitive, without the dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Where organized files end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Folder under the root that receives duplicates.
    pub duplicates_dir: String,
    pub grouping: Grouping,
    /// Folder for extensionless files when grouping by extension.
    pub no_extension_dir: String,
    /// Detect content duplicates. When off every file goes to its category.
    pub dedupe: bool,
    /// Sniff file content when the extension is unknown or missing.
    pub sniff_content: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            duplicates_dir: "duplicates".to_string(),
            grouping: Grouping::Category,
            no_extension_dir: "_no_extension_".to_string(),
            dedupe: true,
            sniff_content: false,
        }
    }
}

impl Layout {
    fn validate(&self) -> Result<(), ConfigError> {
        for name in [&self.duplicates_dir, &self.no_extension_dir] {
            validate_folder_name(name)?;
        }

        let clashes_with_category = Category::ALL
            .iter()
            .any(|c| c.dir_name().eq_ignore_ascii_case(&self.duplicates_dir));
        if clashes_with_category
            || self
                .duplicates_dir
                .eq_ignore_ascii_case(&self.no_extension_dir)
        {
            return Err(ConfigError::FolderClash(self.duplicates_dir.clone()));
        }
        Ok(())
    }
}

fn validate_folder_name(name: &str) -> Result<(), ConfigError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(ConfigError::InvalidFolderName(name.to_string()));
    }
    Ok(())
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.tidyfoldrc.toml` in the current directory
    /// 3. Look for `~/.config/tidyfold/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".tidyfoldrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("tidyfold")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validates the configuration and builds the immutable values the
    /// organizer runs with.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns, unknown category names, or
    /// layout folder names that are not a single path component.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        self.layout.validate()?;

        let mut mapper = FileMapper::default();
        for (category_name, extensions) in &self.categories {
            let category = Category::from_dir_name(category_name)
                .ok_or_else(|| ConfigError::UnknownCategory(category_name.clone()))?;
            for ext in extensions {
                mapper.add_extension_mapping(ext, category);
            }
        }

        Ok(CompiledConfig {
            filters: CompiledFilters::new(self.filters)?,
            mapper,
            layout: self.layout,
        })
    }
}

/// Configuration ready for use by [`crate::file_organizer::Organizer`].
#[derive(Debug, Clone, Default)]
pub struct CompiledConfig {
    pub filters: CompiledFilters,
    pub mapper: FileMapper,
    pub layout: Layout,
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        Ok(Self {
            include_hidden: rules.include_hidden,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes: compile_regexes(&rules.exclude.regex)?,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Filters that let every file through.
    pub fn allow_all() -> Self {
        Self {
            include_hidden: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Check if a file of the root takes part in organization.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter
    /// 3. Exact filename match
    /// 4. File extension match
    /// 5. Glob pattern match
    /// 6. Regex pattern match
    /// 7. Default: include
    pub fn should_include(&self, file_name: &str) -> bool {
        if self.include_patterns.iter().any(|p| p.matches(file_name)) {
            return true;
        }

        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if let Some(ext) = Path::new(file_name).extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|r| r.is_match(file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::allow_all()
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

fn compile_regexes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}
