use chrono::Local;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `<dir>/<YYYYMMDD>_<stem>.json`
pub fn dump_path(dir: &Path, stem: &str) -> PathBuf {
    let date = Local::now().format("%Y%m%d");
    dir.join(format!("{}_{}.json", date, stem))
}

/// Write `value` as pretty JSON under a date-stamped name, creating `dir`.
pub fn save_json<T: Serialize + ?Sized>(dir: &Path, stem: &str, value: &T) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dump_path(dir, stem);
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    tracing::info!(path = %path.display(), "saved");
    Ok(path)
}
