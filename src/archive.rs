//! ZIP packaging of a finished playlist directory
//!
//! Entries are stored relative to the packaged directory, with forward slashes, so
//! extracting the archive recreates the directory's contents at the extraction root.

use crate::error::{Error, Result};
use crate::types::PackagedArchive;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// MIME type of every packaged archive
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Packs directories into ZIP archives
pub struct ZipPackager;

impl ZipPackager {
    /// Zip every file under `source_dir` into `archive_path`
    ///
    /// Returns the archive path. Any failure (unreadable source, unwritable target)
    /// is reported as [`Error::Packaging`].
    pub fn package(source_dir: &Path, archive_path: &Path) -> Result<PathBuf> {
        debug!(?source_dir, ?archive_path, "packaging directory");

        let file = std::fs::File::create(archive_path)
            .map_err(|e| Error::packaging(archive_path, format!("failed to create archive: {}", e)))?;
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .large_file(true);

        let mut files = 0usize;
        for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::packaging(archive_path, format!("failed to walk {}: {}", source_dir.display(), e))
            })?;
            let Some(name) = entry_name(source_dir, entry.path()) else {
                warn!(path = ?entry.path(), "skipping entry outside the packaged directory");
                continue;
            };

            if entry.file_type().is_dir() {
                writer
                    .add_directory(name, options)
                    .map_err(|e| Error::packaging(archive_path, e))?;
                continue;
            }

            writer
                .start_file(name, options)
                .map_err(|e| Error::packaging(archive_path, e))?;
            let mut source = std::fs::File::open(entry.path()).map_err(|e| {
                Error::packaging(archive_path, format!("failed to read {}: {}", entry.path().display(), e))
            })?;
            std::io::copy(&mut source, &mut writer)
                .map_err(|e| Error::packaging(archive_path, e))?;
            files += 1;
        }

        let mut file = writer
            .finish()
            .map_err(|e| Error::packaging(archive_path, e))?;
        file.flush()
            .map_err(|e| Error::packaging(archive_path, e))?;

        info!(?archive_path, files, "archive written");
        Ok(archive_path.to_path_buf())
    }

    /// Load a finished archive into memory for hand-off
    pub fn read_archive(archive_path: &Path) -> Result<PackagedArchive> {
        let bytes = std::fs::read(archive_path)
            .map_err(|e| Error::packaging(archive_path, format!("failed to read archive: {}", e)))?;
        let filename = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::packaging(archive_path, "archive path has no file name"))?;

        Ok(PackagedArchive {
            filename,
            content_type: ZIP_CONTENT_TYPE,
            bytes,
        })
    }

    /// Extract an archive into `dest_dir`, returning the extracted file paths
    ///
    /// Entries whose names would escape `dest_dir` are skipped.
    pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
        let file = std::fs::File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| Error::packaging(archive_path, format!("failed to read ZIP archive: {}", e)))?;
        std::fs::create_dir_all(dest_dir)?;

        let mut extracted = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| Error::packaging(archive_path, format!("failed to read ZIP entry: {}", e)))?;
            let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
                warn!("skipping entry with unsafe path");
                continue;
            };
            let target = dest_dir.join(relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = std::fs::File::create(&target)?;
            std::io::copy(&mut entry, &mut out)?;
            extracted.push(target);
        }

        Ok(extracted)
    }
}

/// Archive entry name for `path`: relative to `root`, forward slashes
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
