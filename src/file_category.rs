/// Extension-based file classification.
///
/// Every regular file is put in exactly one [`Category`]. The lookup table is
/// held by a [`FileMapper`] value that the organizer owns, so tests and
/// configuration can build their own table instead of sharing a global one.
///
/// # Examples
///
/// ```
/// use tidyfold::file_category::{Category, FileMapper};
///
/// let mapper = FileMapper::default();
/// assert_eq!(mapper.categorize(Some("JPG"), None), Category::Image);
/// assert_eq!(mapper.categorize(Some("flac"), None), Category::Audio);
/// assert_eq!(mapper.categorize(None, None), Category::Other);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A broad file category.
///
/// Each category owns one destination folder directly under the organized root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Image files (PNG, JPG, GIF, etc.)
    Image,
    /// Audio files (MP3, WAV, FLAC, etc.)
    Audio,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
    /// Document files (PDF, DOCX, TXT, etc.)
    Document,
    /// Archive files (ZIP, RAR, 7Z, etc.)
    Archive,
    /// Source code and structured text (Rust, Python, JSON, etc.)
    Code,
    /// Spreadsheet files (XLSX, CSV, ODS, etc.)
    Spreadsheet,
    /// Presentation files (PPTX, ODP, etc.)
    Presentation,
    /// Font files (TTF, OTF, WOFF, etc.)
    Font,
    /// Unknown extension or no extension at all
    Other,
}

impl Category {
    /// All categories, in the order they are listed in summaries.
    pub const ALL: [Category; 10] = [
        Category::Image,
        Category::Audio,
        Category::Video,
        Category::Document,
        Category::Archive,
        Category::Code,
        Category::Spreadsheet,
        Category::Presentation,
        Category::Font,
        Category::Other,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidyfold::file_category::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "images");
    /// assert_eq!(Category::Other.dir_name(), "other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Audio => "audio",
            Category::Video => "videos",
            Category::Document => "documents",
            Category::Archive => "archives",
            Category::Code => "code",
            Category::Spreadsheet => "spreadsheets",
            Category::Presentation => "presentations",
            Category::Font => "fonts",
            Category::Other => "other",
        }
    }

    /// Looks a category up by its directory name, ignoring case.
    ///
    /// Used when configuration files add extensions to a category.
    pub fn from_dir_name(name: &str) -> Option<Category> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }
}

/// How destination folders are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// `<root>/<category dir>`, e.g. `images/`.
    #[default]
    Category,
    /// `<root>/<extension>`, e.g. `jpg/`, with extensionless files in a
    /// dedicated folder.
    Extension,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tif", "tiff", "ico", "heic", "heif",
];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "opus"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "flv", "wmv", "webm", "3gp", "m4v"];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "txt", "doc", "docx", "html", "htm", "md", "rtf", "odt", "epub",
];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz", "zst"];
const CODE_EXTENSIONS: &[&str] = &[
    "py", "java", "c", "cpp", "h", "hpp", "js", "ts", "rs", "go", "sh", "bash", "json", "xml",
    "yaml", "yml", "toml",
];
const SPREADSHEET_EXTENSIONS: &[&str] = &["csv", "tsv", "xls", "xlsx", "ods"];
const PRESENTATION_EXTENSIONS: &[&str] = &["ppt", "pptx", "odp", "key"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "woff", "woff2"];

// Only consulted when content sniffing is enabled.
const MIME_PREFIXES: &[(&str, Category)] = &[
    ("image/", Category::Image),
    ("audio/", Category::Audio),
    ("video/", Category::Video),
    ("font/", Category::Font),
];
const MIME_TYPES: &[(&str, Category)] = &[
    ("application/pdf", Category::Document),
    ("application/rtf", Category::Document),
    ("application/epub+zip", Category::Document),
    ("application/msword", Category::Document),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Category::Document,
    ),
    ("application/vnd.oasis.opendocument.text", Category::Document),
    ("application/zip", Category::Archive),
    ("application/vnd.rar", Category::Archive),
    ("application/x-7z-compressed", Category::Archive),
    ("application/x-tar", Category::Archive),
    ("application/gzip", Category::Archive),
    ("application/x-bzip2", Category::Archive),
    ("application/x-xz", Category::Archive),
    ("application/zstd", Category::Archive),
    ("application/vnd.ms-excel", Category::Spreadsheet),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Category::Spreadsheet,
    ),
    ("application/vnd.oasis.opendocument.spreadsheet", Category::Spreadsheet),
    ("application/vnd.ms-powerpoint", Category::Presentation),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        Category::Presentation,
    ),
    ("application/vnd.oasis.opendocument.presentation", Category::Presentation),
    ("application/font-woff", Category::Font),
];

/// Maps file extensions (and, for sniffed content, MIME types) to categories.
///
/// Lookups are case-insensitive. A mapper is built once per run and never
/// mutated while files are being processed.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, Category>,
    mime_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a mapper with the built-in extension table.
    pub fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
            mime_map: HashMap::new(),
        };

        let tables = [
            (IMAGE_EXTENSIONS, Category::Image),
            (AUDIO_EXTENSIONS, Category::Audio),
            (VIDEO_EXTENSIONS, Category::Video),
            (DOCUMENT_EXTENSIONS, Category::Document),
            (ARCHIVE_EXTENSIONS, Category::Archive),
            (CODE_EXTENSIONS, Category::Code),
            (SPREADSHEET_EXTENSIONS, Category::Spreadsheet),
            (PRESENTATION_EXTENSIONS, Category::Presentation),
            (FONT_EXTENSIONS, Category::Font),
        ];
        for (extensions, category) in tables {
            for ext in extensions {
                mapper.add_extension_mapping(ext, category);
            }
        }
        for (mime, category) in MIME_TYPES {
            mapper.mime_map.insert(mime.to_string(), *category);
        }

        mapper
    }

    /// Adds or overrides a file extension mapping.
    ///
    /// A leading dot is ignored, so `".RAW"` and `"raw"` are the same key.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        let key = ext.trim().trim_start_matches('.').to_lowercase();
        if !key.is_empty() {
            self.extension_map.insert(key, category);
        }
    }

    /// Maps a file extension to a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidyfold::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.extension_to_category("PDF"), Some(Category::Document));
    /// assert_eq!(mapper.extension_to_category("nope"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Maps a sniffed MIME type to a category.
    pub fn mime_to_category(&self, mime_type: &str) -> Option<Category> {
        let mime = mime_type.to_lowercase();
        if let Some(category) = self.mime_map.get(&mime) {
            return Some(*category);
        }
        MIME_PREFIXES
            .iter()
            .find(|(prefix, _)| mime.starts_with(prefix))
            .map(|(_, category)| *category)
    }

    /// Determines the category of a file.
    ///
    /// The extension decides when it is known. A MIME type, if one was
    /// sniffed, is only consulted for unknown or missing extensions. Anything
    /// left over is [`Category::Other`].
    pub fn categorize(&self, ext: Option<&str>, mime_type: Option<&str>) -> Category {
        if let Some(extension) = ext
            && let Some(category) = self.extension_to_category(extension)
        {
            return category;
        }

        if let Some(mime) = mime_type
            && let Some(category) = self.mime_to_category(mime)
        {
            return category;
        }

        Category::Other
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dir_names_are_unique() {
        let mut names: Vec<_> = Category::ALL.iter().map(|c| c.dir_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn test_from_dir_name_round_trips() {
        for category in Category::ALL {
            assert_eq!(Category::from_dir_name(category.dir_name()), Some(category));
        }
        assert_eq!(Category::from_dir_name(" Images "), Some(Category::Image));
        assert_eq!(Category::from_dir_name("pictures"), None);
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.extension_to_category("jpg"), Some(Category::Image));
        assert_eq!(mapper.extension_to_category("JPG"), Some(Category::Image));
        assert_eq!(mapper.extension_to_category("Mp3"), Some(Category::Audio));
        assert_eq!(mapper.extension_to_category("rs"), Some(Category::Code));
    }

    #[test]
    fn test_unknown_and_missing_extensions_are_other() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.categorize(Some("xyz"), None), Category::Other);
        assert_eq!(mapper.categorize(None, None), Category::Other);
        assert_eq!(mapper.categorize(Some(""), None), Category::Other);
    }

    #[test]
    fn test_extension_wins_over_mime() {
        let mapper = FileMapper::default();
        assert_eq!(
            mapper.categorize(Some("txt"), Some("image/png")),
            Category::Document
        );
    }

    #[test]
    fn test_mime_used_for_unknown_extension() {
        let mapper = FileMapper::default();
        assert_eq!(
            mapper.categorize(Some("bin"), Some("image/png")),
            Category::Image
        );
        assert_eq!(
            mapper.categorize(None, Some("application/pdf")),
            Category::Document
        );
        assert_eq!(
            mapper.categorize(None, Some("application/x-unknown")),
            Category::Other
        );
    }

    #[test]
    fn test_custom_mapping_normalizes_key() {
        let mut mapper = FileMapper::default();
        mapper.add_extension_mapping(".RAW", Category::Image);
        mapper.add_extension_mapping("txt", Category::Code);

        assert_eq!(mapper.extension_to_category("raw"), Some(Category::Image));
        assert_eq!(mapper.extension_to_category("txt"), Some(Category::Code));
    }

    #[test]
    fn test_grouping_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            grouping: Grouping,
        }
        let parsed: Wrapper = toml::from_str("grouping = \"extension\"").unwrap();
        assert_eq!(parsed.grouping, Grouping::Extension);
        assert_eq!(Grouping::default(), Grouping::Category);
    }
}
