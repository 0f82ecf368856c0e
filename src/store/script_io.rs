use std::path::Path;

use crate::sieve::document::normalize_line_endings;
use crate::sieve::error::SieveError;

pub fn load_script(path: &Path) -> Result<String, std::io::Error> {
    std::fs::read_to_string(path)
}

pub fn save_script(path: &Path, text: &str) -> Result<(), std::io::Error> {
    std::fs::write(path, text)
}

/// Reads a script and brings it to CRLF line endings.
pub fn load_normalized(path: &Path) -> Result<String, ScriptError> {
    let text = load_script(path)?;
    Ok(normalize_line_endings(&text)?.into_owned())
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sieve(#[from] SieveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_normalized_converts_every_line_ending() {
        let dir = std::env::temp_dir().join(format!("sievers-dom-script-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("filter.sieve");
        save_script(&path, "keep;\nstop;\n").unwrap();
        assert_eq!(load_normalized(&path).unwrap(), "keep;\r\nstop;\r\n");
        save_script(&path, "keep;\r\nstop;\n").unwrap();
        assert_eq!(load_normalized(&path).unwrap(), "keep;\r\nstop;\r\n");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
