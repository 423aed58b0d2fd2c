//! Stage artifact I/O.
//!
//! Artifacts are the only channel between stages, so reads distinguish a
//! missing predecessor output from other I/O failures, and writes go through
//! a sibling temp file plus rename so a reader never sees half a file.

use crate::error::{HarvestError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read a UTF-8 text artifact.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => HarvestError::MissingArtifact {
            path: path.to_path_buf(),
        },
        _ => HarvestError::Io(e),
    })
}

/// Read and decode a JSON artifact.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = read_text(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write a text artifact in one step, creating the parent directory.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Encode a value as pretty JSON and write it as one artifact.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    write_text(path, &contents)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
