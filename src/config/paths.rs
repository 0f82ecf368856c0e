use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that overrides the platform config directory.
pub const CONFIG_DIR_ENV: &str = "SIEVERS_DOM_CONFIG_DIR";

pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "Sievers").map(|d| d.config_dir().to_path_buf())
}
