//! Client for the hosted account service that backs authentication.
//!
//! Covers the four calls the app makes: create an account, open an
//! email/password session, fetch the account behind a session, and delete
//! the session. Everything else about the service is out of scope.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

/// Header naming the project on the account service.
const PROJECT_HEADER: &str = "X-Account-Project";
/// Header carrying the session secret on session-scoped calls.
const SESSION_HEADER: &str = "X-Account-Session";

/// A user account on the account service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// An open email/password session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub secret: String,
}

/// Client for the account service.
#[derive(Debug, Clone)]
pub struct AccountClient {
    endpoint: String,
    project: String,
    http: reqwest::Client,
}

impl AccountClient {
    /// Creates a client for the given service endpoint and project.
    pub fn new(endpoint: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project: project.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Creates a new account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Account, AccountError> {
        let response = self
            .http
            .post(self.url("/account"))
            .header(PROJECT_HEADER, &self.project)
            .json(&serde_json::json!({
                "userId": Uuid::new_v4().to_string(),
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await
            .map_err(|e| AccountError::Http(e.to_string()))?;

        Self::decode(response).await
    }

    /// Opens an email/password session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let response = self
            .http
            .post(self.url("/account/sessions/email"))
            .header(PROJECT_HEADER, &self.project)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AccountError::Http(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetches the account behind a session secret.
    pub async fn current(&self, secret: &str) -> Result<Account, AccountError> {
        let response = self
            .http
            .get(self.url("/account"))
            .header(PROJECT_HEADER, &self.project)
            .header(SESSION_HEADER, secret)
            .send()
            .await
            .map_err(|e| AccountError::Http(e.to_string()))?;

        Self::decode(response).await
    }

    /// Deletes the current session.
    pub async fn logout(&self, secret: &str) -> Result<(), AccountError> {
        let response = self
            .http
            .delete(self.url("/account/sessions/current"))
            .header(PROJECT_HEADER, &self.project)
            .header(SESSION_HEADER, secret)
            .send()
            .await
            .map_err(|e| AccountError::Http(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::server_error(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AccountError> {
        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| AccountError::Http(e.to_string()))
    }

    async fn server_error(response: reqwest::Response) -> AccountError {
        let status = response.status().as_u16();
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => "Unknown error".to_string(),
        };
        AccountError::Server { status, message }
    }
}

/// Errors that can occur talking to the account service.
#[derive(Debug)]
pub enum AccountError {
    /// HTTP request error
    Http(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// Account service not configured
    NotConfigured,
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::Http(e) => write!(f, "HTTP error: {}", e),
            AccountError::Server { status, message } => {
                write!(f, "Server returned {}: {}", status, message)
            }
            AccountError::NotConfigured => {
                write!(
                    f,
                    "Account service not configured. Set auth.endpoint and auth.project in config."
                )
            }
        }
    }
}

impl std::error::Error for AccountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let client = AccountClient::new("https://account.example.com/v1/", "proj");
        assert_eq!(
            client.url("/account"),
            "https://account.example.com/v1/account"
        );
    }

    #[test]
    fn test_session_deserializes_from_service_payload() {
        let json = r#"{"id":"s1","userId":"u1","secret":"tok","expires":"2026-09-01"}"#;
        let session: Session = serde_json::from_str(json).unwrap();

        assert_eq!(session.id, "s1");
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.secret, "tok");
    }

    #[test]
    fn test_account_name_defaults_to_empty() {
        let json = r#"{"id":"u1","email":"a@b.c"}"#;
        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(account.name, "");
    }

    #[test]
    fn test_not_configured_message() {
        let err = AccountError::NotConfigured;
        assert!(err.to_string().contains("auth.endpoint"));
    }
}
