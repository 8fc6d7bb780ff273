use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding persisted habit collections
    pub data_dir: PathBuf,
    /// Account service settings and session state
    pub auth: AuthConfig,
    /// Path the configuration was loaded from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

/// Account service settings and the active session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the account service, e.g. https://account.example.com/v1
    pub endpoint: Option<String>,
    /// Project identifier on the account service
    pub project: Option<String>,
    /// User id of the active session
    pub user_id: Option<String>,
    /// Secret of the active session
    #[serde(skip_serializing)]
    pub session: Option<String>,
}

impl AuthConfig {
    /// Whether the account service can be reached at all.
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.project.is_some()
    }

    /// Whether a session is stored.
    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some() && self.session.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recate");
        Self {
            data_dir,
            auth: AuthConfig::default(),
            config_file: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
            config.config_file = Some(path);
        }

        // Apply environment variable overrides
        if let Ok(data_dir) = std::env::var("RECATE_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(endpoint) = std::env::var("RECATE_AUTH_ENDPOINT") {
            config.auth.endpoint = Some(endpoint);
        }
        if let Ok(project) = std::env::var("RECATE_AUTH_PROJECT") {
            config.auth.project = Some(project);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/recate/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recate")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data_dir.ends_with("recate"));
        assert!(config.auth.endpoint.is_none());
        assert!(!config.auth.is_logged_in());
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.config_file.is_none());
        assert!(config.data_dir.ends_with("recate"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/path/habits").unwrap();
        writeln!(file, "auth:").unwrap();
        writeln!(file, "  endpoint: https://account.example.com/v1").unwrap();
        writeln!(file, "  project: demo").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/path/habits"));
        assert!(config.auth.is_configured());
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /from/file").unwrap();

        // Set env var
        std::env::set_var("RECATE_DATA_DIR", "/from/env");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/from/env"));

        // Clean up
        std::env::remove_var("RECATE_DATA_DIR");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_session_secret_is_not_serialized() {
        let mut config = Config::default();
        config.auth.user_id = Some("u1".to_string());
        config.auth.session = Some("top-secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("top-secret"));
    }
}
