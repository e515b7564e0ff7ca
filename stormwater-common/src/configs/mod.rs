use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// A structure to hold environment settings. Backed by settings.json file in same directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: true,
            working_directory: String::new(),
        }
    }
}

/// Locates settings.json. Plugin binaries are usually launched from a
/// `plugins` sub-directory, in which case the parent directory is used.
fn settings_file() -> Result<PathBuf, Error> {
    let mut dir = std::env::current_dir()?;
    if dir.ends_with("plugins") {
        dir.pop();
    }
    Ok(dir.join("settings.json"))
}

pub fn get_configs() -> Result<Configs, Error> {
    read_configs(&settings_file()?)
}

/// Reads the settings from `config_file`. A missing file yields the defaults;
/// a file that can't be parsed is an error.
pub fn read_configs(config_file: &Path) -> Result<Configs, Error> {
    match fs::read_to_string(config_file) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", config_file.display(), e),
            )
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Configs::default()),
        Err(e) => Err(e),
    }
}
