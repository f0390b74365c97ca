//! Packing a finished output folder into a single archive

use flate2::{write::GzEncoder, Compression};
use levelr_core::{LevelError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tar::Builder;
use walkdir::WalkDir;

/// Archive path for `output_dir`: a sibling named `<folder>.tar.gz`
pub fn archive_path_for(output_dir: &Path) -> Result<PathBuf> {
    let name = output_dir.file_name().ok_or_else(|| {
        LevelError::archive(format!("{} has no folder name", output_dir.display()))
    })?;
    let mut archive_name = name.to_os_string();
    archive_name.push(".tar.gz");
    Ok(output_dir.with_file_name(archive_name))
}

/// Write every file under `output_dir` into `<output_dir>.tar.gz`
///
/// Entry paths are relative to `output_dir`. Returns the archive path.
pub fn archive_output_tree(output_dir: &Path) -> Result<PathBuf> {
    if !output_dir.is_dir() {
        return Err(LevelError::archive(format!(
            "can't find output folder: {}",
            output_dir.display()
        )));
    }

    let archive_path = archive_path_for(output_dir)?;
    let file = fs::File::create(&archive_path)
        .map_err(|e| LevelError::archive(format!("{}: {}", archive_path.display(), e)))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    let mut count = 0_usize;
    for entry in WalkDir::new(output_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| LevelError::archive(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = entry
            .path()
            .strip_prefix(output_dir)
            .map_err(|e| LevelError::archive(e.to_string()))?;
        let mut source = fs::File::open(entry.path())?;
        builder
            .append_file(rel_path, &mut source)
            .map_err(|e| LevelError::archive(format!("{}: {}", rel_path.display(), e)))?;
        count += 1;
    }

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|e| LevelError::archive(e.to_string()))?;

    tracing::info!("Archived {} files to {}", count, archive_path.display());
    Ok(archive_path)
}
