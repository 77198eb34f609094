//! Extension packaging
//!
//! Compresses the current output directory into a single zip archive, built
//! in memory and streamed back as a download. Entries are walked in sorted
//! order so the same directory always produces the same entry listing.

use crate::error::ForgeError;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive every file under `dir` into a zip held in memory.
///
/// Fails with a descriptive error when the directory does not exist — there
/// is nothing to package until a build has succeeded.
pub fn archive_directory(dir: &Path) -> Result<Vec<u8>, ForgeError> {
    if !dir.is_dir() {
        return Err(ForgeError::Packaging(format!(
            "nothing to package: {} does not exist; forge an extension first",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for path in &files {
            let name = path
                .strip_prefix(dir)
                .map_err(|e| ForgeError::Packaging(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");

            writer
                .start_file(name, options)
                .map_err(|e| ForgeError::Packaging(format!("failed to start entry: {}", e)))?;
            let bytes = std::fs::read(path)?;
            writer
                .write_all(&bytes)
                .map_err(|e| ForgeError::Packaging(format!("failed to write entry: {}", e)))?;
        }

        writer
            .finish()
            .map_err(|e| ForgeError::Packaging(format!("failed to finalize archive: {}", e)))?;
    }

    let archive = buffer.into_inner();
    info!(
        "Packaged {} files into a {} byte archive",
        files.len(),
        archive.len()
    );
    Ok(archive)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ForgeError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
