//! Settings document loader.

use super::error::{ConfigError, ConfigResult};
use super::types::{ConfigDocument, CONFIG_VERSION};
use std::fs;
use std::path::Path;
use tracing::info;

/// Reads, creates and upgrades the JSON settings document.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the JSON is malformed.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ConfigDocument> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.load_str(&content)
    }

    /// Load a document from a JSON string and normalize it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn load_str(&self, content: &str) -> ConfigResult<ConfigDocument> {
        let mut document: ConfigDocument = serde_json::from_str(content)?;
        document.normalize();
        Ok(document)
    }

    /// Load the document, writing defaults when it does not exist yet.
    ///
    /// A document saved by another version gets the current version and is
    /// written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if writing the new or upgraded document fails.
    pub fn load_or_create<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ConfigDocument> {
        let path = path.as_ref();

        if !path.exists() {
            let mut document = ConfigDocument::default();
            document.normalize();
            self.save(&document, path)?;
            info!(path = %path.display(), "Saved new configuration file");
            return Ok(document);
        }

        let mut document = self.load(path)?;
        if !document.is_current() {
            let previous = std::mem::replace(&mut document.version, CONFIG_VERSION.to_string());
            self.save(&document, path)?;
            info!(
                path = %path.display(),
                from = %previous,
                to = CONFIG_VERSION,
                "Saved upgraded configuration file"
            );
        }

        Ok(document)
    }

    /// Save a document to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save<P: AsRef<Path>>(&self, document: &ConfigDocument, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(document).map_err(ConfigError::Serialize)?;

        let write_error = |e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, content).map_err(write_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_string() {
        let loader = ConfigLoader::new();
        let document = loader
            .load_str(r#"{"settings": {"level": "warn"}, "file": {"rotation_keep": 250}}"#)
            .unwrap();

        assert_eq!(document.settings.level, "warn");
        assert_eq!(document.file.rotation_keep, 100);
    }

    #[test]
    fn test_load_malformed() {
        let loader = ConfigLoader::new();
        assert!(matches!(
            loader.load_str(r#"{"settings": {"level": "#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            loader.load_str(r#"{"file": {"buffer_size": "many"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let loader = ConfigLoader::new();
        let result = loader.load("/nonexistent/path/config.json");
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eventlog").join("config.json");

        let loader = ConfigLoader::new();
        let document = loader.load_or_create(&path).unwrap();
        assert_eq!(document, ConfigDocument::default());
        assert!(path.exists());

        let reloaded = loader.load(&path).unwrap();
        assert_eq!(reloaded, document);
    }

    #[test]
    fn test_load_or_create_upgrades_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"version": "0.0.1", "file": {"append": true}}"#).unwrap();

        let loader = ConfigLoader::new();
        let document = loader.load_or_create(&path).unwrap();
        assert!(document.is_current());
        assert!(document.file.append);

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["version"], CONFIG_VERSION);
        assert_eq!(saved["file"]["append"], true);
    }

    #[test]
    fn test_load_or_create_keeps_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let loader = ConfigLoader::new();
        assert!(matches!(loader.load_or_create(&path), Err(ConfigError::Parse(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");

        let mut document = ConfigDocument::default();
        document.settings.host_name = "saved-host".to_string();

        let loader = ConfigLoader::new();
        loader.save(&document, &path).unwrap();

        let loaded = loader.load(&path).unwrap();
        assert_eq!(loaded.settings.host_name, "saved-host");
    }
}
