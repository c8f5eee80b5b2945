use directories::BaseDirs;
use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};

pub(crate) fn get_main_dir() -> Result<PathBuf> {
    let base_dir = BaseDirs::new()
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "No home directory found"))?;
    let user_data_dir: &Path = base_dir.data_dir();
    let package_root: PathBuf = user_data_dir.join("virus_hunt");
    if !package_root.exists() {
        std::fs::create_dir_all(&package_root)?;
    }
    Ok(package_root)
}

pub(crate) fn get_log_dir() -> Result<PathBuf> {
    let log_dir = get_main_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}
