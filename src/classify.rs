//! File type classification from path extensions.
//!
//! Maps a file path to one of a closed set of semantic categories
//! ([`FileType`]). Classification is a pure function of the extension;
//! file content is never inspected.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Semantic category of a file, derived from its extension.
///
/// This is a pure value type with no instance identity. Unknown or
/// missing extensions map to [`FileType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Text and office documents (pdf, docx, txt, ...)
    Document,
    /// Raster and vector images (jpg, png, svg, ...)
    Image,
    /// Video containers (mp4, mkv, mov, ...)
    Video,
    /// Audio files (mp3, flac, wav, ...)
    Audio,
    /// Compressed archives and disk images (zip, tar, dmg, ...)
    Archive,
    /// Executables and application bundles (app, exe, ...)
    Application,
    /// Everything else
    Other,
}

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "md", "pages", "numbers",
    "key", "odt", "ods", "odp", "csv", "epub",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif", "svg", "raw", "cr2",
    "nef", "ico", "psd",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "m4a", "wma", "aiff", "opus", "mid",
];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar", "dmg", "iso", "tgz", "zst",
];

const APPLICATION_EXTENSIONS: &[&str] = &["app", "exe", "msi", "pkg", "deb", "rpm", "appimage"];

impl FileType {
    /// Classify a path by its extension.
    ///
    /// Matching is case-insensitive. Paths without an extension, or with
    /// an unrecognized one, classify as [`FileType::Other`].
    ///
    /// # Example
    ///
    /// ```
    /// use diskscout::classify::FileType;
    /// use std::path::Path;
    ///
    /// assert_eq!(FileType::from_path(Path::new("/tmp/photo.JPG")), FileType::Image);
    /// assert_eq!(FileType::from_path(Path::new("/tmp/notes")), FileType::Other);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Other;
        };
        Self::from_extension(&ext.to_ascii_lowercase())
    }

    /// Classify a lowercase extension string.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        if DOCUMENT_EXTENSIONS.contains(&ext) {
            Self::Document
        } else if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Self::Audio
        } else if ARCHIVE_EXTENSIONS.contains(&ext) {
            Self::Archive
        } else if APPLICATION_EXTENSIONS.contains(&ext) {
            Self::Application
        } else {
            Self::Other
        }
    }

    /// All categories, in display order.
    #[must_use]
    pub fn all() -> &'static [FileType] {
        &[
            Self::Document,
            Self::Image,
            Self::Video,
            Self::Audio,
            Self::Archive,
            Self::Application,
            Self::Other,
        ]
    }

    /// Human-readable name of the category.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Archive => "Archive",
            Self::Application => "Application",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
