use crate::error::{RenamerError, Result};
use crate::tags::{self, Tag};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FORMAT: &str = "{YYYY} - {Jabbr} - {A3etal} - {T}";
const SETTINGS_FILE: &str = "settings.json";
const USER_ABBREVIATIONS_FILE: &str = "user_abbreviations.txt";

/// Persisted defaults, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub format: String,
    pub max_length_authors: usize,
    pub max_length_filename: usize,
    pub check_subfolders: bool,
    pub verbose: bool,
    pub abbreviation_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            format: DEFAULT_FORMAT.to_string(),
            max_length_authors: 80,
            max_length_filename: 250,
            check_subfolders: false,
            verbose: true,
            abbreviation_file: None,
        }
    }
}

impl Settings {
    /// `$HOME/.config/pdf-renamer`, or the working directory when no home is set.
    pub fn config_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config").join("pdf-renamer"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join(SETTINGS_FILE)
    }

    /// Loads settings from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            RenamerError::Settings(format!("could not parse {:?}: {}", path, e))
        })?;
        debug!("Loaded settings from {:?}: {:?}", path, settings);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Stored settings as default values in {:?}", path);
        Ok(())
    }

    pub fn user_abbreviations_path(&self) -> PathBuf {
        self.abbreviation_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join(USER_ABBREVIATIONS_FILE))
    }

    /// Validates the settings into the read-only configuration of a run.
    pub fn to_config(&self) -> Result<RenameConfig> {
        if self.max_length_authors == 0 {
            return Err(RenamerError::Settings(
                "max_length_authors must be a positive integer".to_string(),
            ));
        }
        if self.max_length_filename == 0 {
            return Err(RenamerError::Settings(
                "max_length_filename must be a positive integer".to_string(),
            ));
        }

        let tags = tags::validate(&self.format)?;
        Ok(RenameConfig {
            format: self.format.clone(),
            tags,
            max_length_authors: self.max_length_authors,
            max_length_filename: self.max_length_filename,
            check_subfolders: self.check_subfolders,
        })
    }
}

/// Everything the renaming pipeline needs to know, fixed for a whole run.
#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub format: String,
    pub tags: Vec<Tag>,
    pub max_length_authors: usize,
    pub max_length_filename: usize,
    pub check_subfolders: bool,
}

#[cfg(test)]
impl RenameConfig {
    pub fn with_format(format: &str) -> Result<Self> {
        Settings {
            format: format.to_string(),
            ..Settings::default()
        }
        .to_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let settings = Settings::load(&tmp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("nested").join("settings.json");
        let settings = Settings {
            format: "{T} ({YYYY})".to_string(),
            max_length_authors: 20,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("settings.json");
        fs::write(&path, r#"{"max_length_filename": 100}"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.max_length_filename, 100);
        assert_eq!(settings.format, DEFAULT_FORMAT);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(RenamerError::Settings(_))
        ));
    }

    #[test]
    fn test_to_config_validates() {
        let config = Settings::default().to_config().unwrap();
        assert_eq!(
            config.tags,
            vec![Tag::Year, Tag::JournalAbbr, Tag::Authors3EtAl, Tag::Title]
        );

        let bad_format = Settings {
            format: "{nope}".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            bad_format.to_config(),
            Err(RenamerError::InvalidFormat(_))
        ));

        let zero = Settings {
            max_length_filename: 0,
            ..Settings::default()
        };
        assert!(matches!(zero.to_config(), Err(RenamerError::Settings(_))));
    }
}
