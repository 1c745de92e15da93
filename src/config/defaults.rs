//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default icon size in the grid (px)
pub const DEFAULT_ICON_SIZE: u32 = 64;

/// Width reserved per grid cell, including margins (px)
pub const DEFAULT_GRID_ITEM_WIDTH: f32 = 120.0;

/// Bounding box for generated thumbnails (px)
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 256;

/// Upper bound on thumbnail worker threads when not configured
pub const DEFAULT_MAX_THUMBNAIL_WORKERS: usize = 4;

/// Group names with fixed positions in the grouped view
pub const FOLDERS_GROUP: &str = "Folders";
pub const OTHER_GROUP: &str = "Other";

/// Category table used when the config file doesn't override it.
/// Extensions are stored with a leading dot and compared case-insensitively.
pub const DEFAULT_FILE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico", ".tiff"],
    ),
    (
        "Videos",
        &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpg"],
    ),
    (
        "Audio",
        &[".mp3", ".flac", ".wav", ".ogg", ".aac", ".m4a", ".wma", ".opus"],
    ),
    (
        "Documents",
        &[".pdf", ".doc", ".docx", ".txt", ".odt", ".rtf", ".md", ".tex"],
    ),
    (
        "Archives",
        &[".zip", ".tar", ".gz", ".rar", ".7z", ".bz2", ".xz", ".tgz"],
    ),
    (
        "Code",
        &[
            ".rs", ".py", ".js", ".ts", ".c", ".cpp", ".java", ".go", ".rb", ".php", ".html",
            ".css",
        ],
    ),
];
