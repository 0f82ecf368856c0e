use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::paths;
use crate::model::profile::CapabilityProfile;

const PROFILES_FILE: &str = "profiles.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No configuration directory available")]
    NoConfigDir,
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed profiles file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn profiles_path() -> Result<PathBuf, StoreError> {
    paths::config_dir()
        .map(|d| d.join(PROFILES_FILE))
        .ok_or(StoreError::NoConfigDir)
}

pub fn load_profiles() -> Result<Vec<CapabilityProfile>, StoreError> {
    load_profiles_from(&profiles_path()?)
}

pub fn save_profiles(profiles: &[CapabilityProfile]) -> Result<(), StoreError> {
    save_profiles_to(&profiles_path()?, profiles)
}

/// Reads a profiles file; a missing file holds no profiles.
pub fn load_profiles_from(path: &Path) -> Result<Vec<CapabilityProfile>, StoreError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let profiles: Vec<CapabilityProfile> =
        serde_json::from_str(&data).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(count = profiles.len(), path = %path.display(), "loaded profiles");
    Ok(profiles)
}

pub fn save_profiles_to(path: &Path, profiles: &[CapabilityProfile]) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let data = serde_json::to_string_pretty(profiles).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(io_error)?;
    debug!(count = profiles.len(), path = %path.display(), "saved profiles");
    Ok(())
}

pub fn find_profile<'a>(profiles: &'a [CapabilityProfile], name: &str) -> Option<&'a CapabilityProfile> {
    profiles.iter().find(|profile| profile.name == name)
}
