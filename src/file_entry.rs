//! Directory entries as delivered by the scan collaborator, plus the
//! type-based icon fallback used when no thumbnail is available.

use std::path::{Path, PathBuf};

/// Raster formats the thumbnail pipeline accepts (lowercase, no dot)
pub const THUMBNAIL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// One row of a directory listing. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path; unique key for selection and caching
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub formatted_date: String,
    pub formatted_size: String,
}

impl FileEntry {
    /// Build an entry whose display name is the path's final component
    pub fn new(
        path: impl Into<PathBuf>,
        is_dir: bool,
        formatted_date: impl Into<String>,
        formatted_size: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            name,
            is_dir,
            formatted_date: formatted_date.into(),
            formatted_size: formatted_size.into(),
        }
    }

    /// Lowercased extension, empty when there is none
    pub fn extension(&self) -> String {
        extension_lowercase(&self.path)
    }

    /// Whether this entry is routed through the thumbnail pipeline
    pub fn is_thumbnail_candidate(&self) -> bool {
        !self.is_dir && THUMBNAIL_EXTENSIONS.contains(&self.extension().as_str())
    }

    /// Type icon shown when no thumbnail is available
    pub fn icon_key(&self) -> IconKey {
        IconKey::for_path(&self.path, self.is_dir)
    }
}

fn extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Glyph family for the fallback icon; the host maps keys to artwork
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconKey {
    Folder,
    Image,
    Video,
    Audio,
    File,
}

impl IconKey {
    pub fn for_path(path: &Path, is_dir: bool) -> Self {
        if is_dir {
            return IconKey::Folder;
        }
        match extension_lowercase(path).as_str() {
            "png" | "jpg" | "jpeg" | "webp" => IconKey::Image,
            "mp4" | "mkv" | "webm" => IconKey::Video,
            "mp3" | "wav" | "ogg" => IconKey::Audio,
            _ => IconKey::File,
        }
    }

    /// Icon name in the host's icon set
    pub fn name(self) -> &'static str {
        match self {
            IconKey::Folder => "folder",
            IconKey::Image => "image",
            IconKey::Video => "video",
            IconKey::Audio => "audio",
            IconKey::File => "file",
        }
    }
}
