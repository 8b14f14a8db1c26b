//! Local inventory scanning: recursive media enumeration and fingerprinting

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

use crate::error::{Result, SyncError};

/// Extensions treated as media files, images and common video containers.
const MEDIA_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "heic", "ico", "tiff", "tif", "webp", "raw", "3gp", "3g2",
    "asf", "avi", "divx", "m2t", "m2ts", "m4v", "mkv", "mmv", "mod", "mov", "mp4", "mpg", "mts",
    "tod", "wmv",
];

/// Scan-time description of one media file. Not persisted; consumed
/// immediately by reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File name with extension
    pub filename: String,
    /// File name without extension
    pub stem: String,
    /// Directory relative to the scan root
    pub relative_dir: PathBuf,
    /// Album title derived from the relative directory
    pub album_title: String,
    /// md5 content hash, lowercase hex
    pub hash: String,
}

/// Flatten a scan-relative directory into an album title: path separators
/// become `" - "`, so deeper nesting collapses into one flat album name.
///
/// Files directly under the scan root map to the title `"."`. The mapping is
/// lossy when a directory name itself contains `" - "`; restore inverts only
/// the first occurrence.
pub fn album_title_for(relative_dir: &Path) -> String {
    let parts: Vec<&str> = relative_dir
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join(" - ")
    }
}

/// Recursive scanner over a single photo-source root.
pub struct MediaScanner;

impl MediaScanner {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate and fingerprint every media file under `root`.
    ///
    /// Any enumeration or read error fails the whole scan; files are never
    /// silently dropped.
    pub async fn scan(&self, root: &Path) -> Result<Vec<FileInfo>> {
        if !root.exists() {
            return Err(SyncError::scan_error(root, "Directory does not exist"));
        }
        if !root.is_dir() {
            return Err(SyncError::scan_error(root, "Path is not a directory"));
        }

        let mut infos = Vec::new();

        for entry in WalkDir::new(root) {
            let entry =
                entry.map_err(|e| SyncError::scan_error(root, format!("Walk error: {}", e)))?;

            if !entry.file_type().is_file() || !is_media_file(entry.path()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).map_err(|e| {
                SyncError::scan_error(path, format!("Failed to create relative path: {}", e))
            })?;

            let filename = match relative.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    return Err(SyncError::scan_error(path, "File name is not valid UTF-8"));
                }
            };
            let stem = relative
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&filename)
                .to_string();
            let relative_dir = relative.parent().unwrap_or(Path::new("")).to_path_buf();

            infos.push(FileInfo {
                path: path.to_path_buf(),
                filename,
                stem,
                album_title: album_title_for(&relative_dir),
                relative_dir,
                hash: compute_md5(path).await?,
            });
        }

        Ok(infos)
    }
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            MEDIA_EXTENSIONS.iter().any(|m| *m == ext)
        })
        .unwrap_or(false)
}

/// Streaming md5 over the file contents, no full-file buffering.
async fn compute_md5(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| SyncError::hash_error(path, format!("Failed to open file: {}", e)))?;

    let mut context = md5::Context::new();
    let mut buffer = vec![0; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .await
            .map_err(|e| SyncError::hash_error(path, format!("Failed to read file: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}
