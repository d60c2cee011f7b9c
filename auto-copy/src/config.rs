//! Mirror configuration and its JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MirrorError, Result};

/// File name used when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "autoCopyConfig.json";

/// What to watch and where to mirror it.
///
/// Loaded once at startup and shared read-only with the router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    /// Directory whose tree is watched.
    #[serde(default)]
    pub folder_to_track: PathBuf,

    /// Substrings; any event path containing one of them is not mirrored.
    #[serde(default)]
    pub ignore_list: Vec<String>,

    /// Destination directories, processed in this order.
    #[serde(default)]
    pub copy_to: Vec<PathBuf>,
}

/// Result of looking for the config file on disk.
#[derive(Debug)]
pub enum ConfigLoad {
    /// The file existed and passed validation.
    Loaded(MirrorConfig),

    /// The file was missing; an empty template was written at this path.
    TemplateCreated(PathBuf),
}

impl MirrorConfig {
    /// Create a config tracking `folder` with no ignores or destinations.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder_to_track: folder.into(),
            ..Default::default()
        }
    }

    /// Add an ignore substring.
    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_list.push(pattern.into());
        self
    }

    /// Add a destination directory.
    pub fn copy_to(mut self, destination: impl Into<PathBuf>) -> Self {
        self.copy_to.push(destination.into());
        self
    }

    /// Load the config at `path`, writing a template instead if it is missing.
    pub fn load_or_create(path: &Path) -> Result<ConfigLoad> {
        if !path.is_file() {
            info!("Config file not found, creating one");
            Self::default().write(path)?;
            return Ok(ConfigLoad::TemplateCreated(path.to_path_buf()));
        }

        let config = Self::read(path)?;
        config.validate()?;
        info!("Config file loaded");
        Ok(ConfigLoad::Loaded(config))
    }

    /// Parse the config at `path` without validating it.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config as pretty JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject configs that cannot be run.
    pub fn validate(&self) -> Result<()> {
        if self.folder_to_track.as_os_str().is_empty() {
            return Err(MirrorError::Config(
                "Please set the folder to track in the config file".to_string(),
            ));
        }

        if self.copy_to.is_empty() {
            return Err(MirrorError::Config(
                "Please set the folder to copy to in the config file".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if a path matches the ignore list.
    ///
    /// Matching is a plain substring test over the whole path, so an entry such
    /// as `"log"` also matches any parent directory whose name contains it.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.ignore_list
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let config = MirrorConfig::new("/watch")
            .ignore("tmp")
            .copy_to("/backup1")
            .copy_to("/backup2");

        assert_eq!(config.folder_to_track, Path::new("/watch"));
        assert_eq!(config.ignore_list, vec!["tmp".to_string()]);
        assert_eq!(
            config.copy_to,
            vec![PathBuf::from("/backup1"), PathBuf::from("/backup2")]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parses_camel_case_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "folderToTrack": "/watch",
                "ignoreList": ["tmp", ".git"],
                "copyTo": ["/backup1", "/backup2"]
            }"#,
        )
        .unwrap();

        let config = MirrorConfig::read(&path).unwrap();
        assert_eq!(
            config,
            MirrorConfig::new("/watch")
                .ignore("tmp")
                .ignore(".git")
                .copy_to("/backup1")
                .copy_to("/backup2")
        );
    }

    #[test]
    fn test_missing_file_creates_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/autoCopyConfig.json");

        let load = MirrorConfig::load_or_create(&path).unwrap();
        assert!(matches!(load, ConfigLoad::TemplateCreated(ref p) if p == &path));

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "folderToTrack": "", "ignoreList": [], "copyTo": [] })
        );
    }

    #[test]
    fn test_template_is_rejected_until_edited() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("autoCopyConfig.json");

        MirrorConfig::load_or_create(&path).unwrap();
        let err = MirrorConfig::load_or_create(&path).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("folder to track"));
    }

    #[test]
    fn test_empty_destinations_rejected() {
        let err = MirrorConfig::new("/watch").validate().unwrap_err();
        assert!(err.to_string().contains("folder to copy to"));
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("autoCopyConfig.json");
        fs::write(&path, "{ not json").unwrap();

        let err = MirrorConfig::load_or_create(&path).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ignore_is_substring_match() {
        let config = MirrorConfig::new("/watch").ignore("tmp").ignore("log");

        assert!(config.is_ignored(Path::new("/watch/scratch.tmp")));
        assert!(config.is_ignored(Path::new("/watch/tmpdir/notes.txt")));
        assert!(config.is_ignored(Path::new("/home/logan/watch/notes.txt")));
        assert!(!config.is_ignored(Path::new("/watch/notes.txt")));
    }
}
