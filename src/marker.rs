//! Completion marker written once a version has been fully verified.

use std::path::Path;

use chrono::{DateTime, TimeZone};

/// Reads the marker, returning its timestamp text if present.
///
/// # Errors
///
/// Returns an error if the marker exists but cannot be read.
pub fn read_marker(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Writes the marker atomically (write tmp + rename).
///
/// # Errors
///
/// Returns an error if the marker cannot be written.
pub fn write_marker<Tz>(path: &Path, at: &DateTime<Tz>) -> std::io::Result<()>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let tmp_path = path.with_extension("txt.tmp");
    std::fs::write(&tmp_path, at.format("%Y-%m-%d %H:%M:%S%.6f").to_string())?;
    std::fs::rename(&tmp_path, path)
}
