//! Account commands for the recate CLI.
//!
//! Register, log in, log out, and show the session status. The session
//! (user id + secret) is stored in the config file and selects which
//! habit collection the other commands operate on.

use clap::{Args, Subcommand};
use std::io::{self, Write};
use std::path::Path;

use crate::account::{AccountClient, AccountError};
use crate::config::Config;

/// Account session commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Create a new account and log in
    Register,
    /// Log in with email and password
    Login,
    /// End the current session
    Logout,
    /// Show authentication status
    Status,
}

impl AuthCommand {
    pub async fn run(&self, config: &Config) -> Result<(), AuthError> {
        match &self.command {
            AuthSubcommand::Register => register(config).await,
            AuthSubcommand::Login => login(config).await,
            AuthSubcommand::Logout => logout(config).await,
            AuthSubcommand::Status => status(config),
        }
    }
}

/// Errors that can occur during authentication
#[derive(Debug)]
pub enum AuthError {
    /// I/O error
    IoError(io::Error),
    /// Account service error
    AccountError(AccountError),
    /// Config file error
    ConfigError(String),
    /// No session is stored
    NotLoggedIn,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::IoError(e) => write!(f, "I/O error: {}", e),
            AuthError::AccountError(e) => write!(f, "{}", e),
            AuthError::ConfigError(e) => write!(f, "Config error: {}", e),
            AuthError::NotLoggedIn => write!(f, "Not logged in."),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<io::Error> for AuthError {
    fn from(e: io::Error) -> Self {
        AuthError::IoError(e)
    }
}

impl From<AccountError> for AuthError {
    fn from(e: AccountError) -> Self {
        AuthError::AccountError(e)
    }
}

fn client(config: &Config) -> Result<AccountClient, AuthError> {
    match (&config.auth.endpoint, &config.auth.project) {
        (Some(endpoint), Some(project)) => Ok(AccountClient::new(endpoint, project)),
        _ => Err(AccountError::NotConfigured.into()),
    }
}

/// Prompt for a single line on stdin.
fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn prompt_credentials() -> Result<(String, String), AuthError> {
    let email = prompt("Email")?;
    if email.is_empty() {
        return Err(AuthError::IoError(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Email cannot be empty",
        )));
    }
    let password = prompt("Password")?;
    Ok((email, password))
}

/// Create an account, then open a session with the same credentials.
async fn register(config: &Config) -> Result<(), AuthError> {
    let client = client(config)?;
    let (email, password) = prompt_credentials()?;
    let name = prompt("Name (optional)")?;
    let name = if name.is_empty() { None } else { Some(name) };

    client.register(&email, &password, name.as_deref()).await?;
    open_session(&client, config, &email, &password).await?;
    println!("Account created");
    Ok(())
}

/// Interactive login flow
async fn login(config: &Config) -> Result<(), AuthError> {
    let client = client(config)?;
    let (email, password) = prompt_credentials()?;

    open_session(&client, config, &email, &password).await?;
    println!("Welcome back. You are logged in");
    Ok(())
}

async fn open_session(
    client: &AccountClient,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<(), AuthError> {
    let session = client.login(email, password).await?;
    let account = client.current(&session.secret).await?;
    tracing::debug!("opened session {} for account {}", session.id, account.id);

    let config_path = config
        .config_file
        .clone()
        .unwrap_or_else(Config::default_config_path);
    save_session(&session.user_id, &session.secret, &config_path)?;

    let who = if account.name.is_empty() {
        &account.email
    } else {
        &account.name
    };
    println!("Authenticated as {}", who);
    Ok(())
}

/// End the remote session and clear the stored one.
async fn logout(config: &Config) -> Result<(), AuthError> {
    let secret = config.auth.session.clone().ok_or(AuthError::NotLoggedIn)?;

    let client = client(config)?;
    client.logout(&secret).await?;

    let config_path = config
        .config_file
        .clone()
        .unwrap_or_else(Config::default_config_path);
    clear_session(&config_path)?;

    println!("Logged out");
    Ok(())
}

/// Show authentication status
fn status(config: &Config) -> Result<(), AuthError> {
    if config.auth.is_logged_in() {
        let user = config.auth.user_id.as_ref().unwrap();
        let secret = config.auth.session.as_ref().unwrap();
        // Mask the secret for display
        let masked = if secret.len() > 8 {
            format!("{}...{}", &secret[..4], &secret[secret.len() - 4..])
        } else {
            "****".to_string()
        };
        println!("Logged in as {} (session: {})", user, masked);
    } else if config.auth.is_configured() {
        println!("Not logged in. Run 'recate auth login' to authenticate.");
    } else {
        println!("Not configured. Set auth.endpoint and auth.project in config.");
    }
    Ok(())
}

/// Save the session to the config file
fn save_session(user_id: &str, secret: &str, config_path: &Path) -> Result<(), AuthError> {
    edit_auth_section(config_path, |auth| {
        auth.insert(
            serde_yaml::Value::String("user_id".to_string()),
            serde_yaml::Value::String(user_id.to_string()),
        );
        auth.insert(
            serde_yaml::Value::String("session".to_string()),
            serde_yaml::Value::String(secret.to_string()),
        );
    })
}

/// Remove the session from the config file
fn clear_session(config_path: &Path) -> Result<(), AuthError> {
    if !config_path.exists() {
        return Ok(());
    }
    edit_auth_section(config_path, |auth| {
        auth.remove(serde_yaml::Value::String("user_id".to_string()));
        auth.remove(serde_yaml::Value::String("session".to_string()));
    })
}

/// Rewrite the `auth` section of the config file in place.
fn edit_auth_section(
    config_path: &Path,
    edit: impl FnOnce(&mut serde_yaml::Mapping),
) -> Result<(), AuthError> {
    // Read existing config or create new
    let mut config: serde_yaml::Value = if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| AuthError::ConfigError(e.to_string()))?;
        serde_yaml::from_str(&contents).map_err(|e| AuthError::ConfigError(e.to_string()))?
    } else {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    };

    let mapping = config
        .as_mapping_mut()
        .ok_or_else(|| AuthError::ConfigError("Invalid config format".to_string()))?;

    let auth_key = serde_yaml::Value::String("auth".to_string());
    if !mapping.contains_key(&auth_key) {
        mapping.insert(
            auth_key.clone(),
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        );
    }

    if let Some(auth) = mapping.get_mut(&auth_key) {
        if let Some(auth_mapping) = auth.as_mapping_mut() {
            edit(auth_mapping);
        }
    }

    // Create config directory if needed
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AuthError::ConfigError(e.to_string()))?;
    }

    // Write config
    let yaml = serde_yaml::to_string(&config).map_err(|e| AuthError::ConfigError(e.to_string()))?;
    std::fs::write(config_path, yaml).map_err(|e| AuthError::ConfigError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_session_preserves_other_settings() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "data_dir: /custom\nauth:\n  endpoint: https://account.example.com/v1\n",
        )
        .unwrap();

        save_session("u1", "tok", &config_path).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir, std::path::PathBuf::from("/custom"));
        assert_eq!(config.auth.endpoint.as_deref(), Some("https://account.example.com/v1"));
        assert_eq!(config.auth.user_id.as_deref(), Some("u1"));
        assert_eq!(config.auth.session.as_deref(), Some("tok"));
    }

    #[test]
    fn test_save_session_creates_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        save_session("u1", "tok", &config_path).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.auth.is_logged_in());
    }

    #[test]
    fn test_clear_session_removes_only_session_keys() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "auth:\n  endpoint: https://account.example.com/v1\n  project: demo\n",
        )
        .unwrap();
        save_session("u1", "tok", &config_path).unwrap();

        clear_session(&config_path).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.auth.is_configured());
        assert!(!config.auth.is_logged_in());
    }

    #[test]
    fn test_clear_session_without_config_file_is_noop() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        clear_session(&config_path).unwrap();

        assert!(!config_path.exists());
    }
}
