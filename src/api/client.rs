//! HTTP client for the vault daemon's command endpoint

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::commands::{GetPasswords, VaultCommand};
use crate::models::CredentialSnapshot;

/// Failure of a single command invocation
#[derive(Debug, Error)]
pub enum CommandError {
    /// The call never produced a daemon response, or the response body
    /// could not be read
    #[error("vault daemon call failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The daemon received the command and rejected it
    #[error("vault daemon rejected {command} (status {status}): {message}")]
    Command {
        command: &'static str,
        status: u16,
        message: String,
    },
}

/// Error body the daemon sends on a rejected command
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the vault daemon's local command endpoint
pub struct VaultClient {
    http_client: Client,
    daemon_url: String,
}

impl VaultClient {
    /// Create a new client for the given daemon URL
    pub fn new(daemon_url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .user_agent("Keyview/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        let daemon_url = daemon_url.into();
        Self {
            http_client,
            daemon_url: daemon_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the daemon URL this client talks to
    pub fn daemon_url(&self) -> &str {
        &self.daemon_url
    }

    fn command_url(&self, name: &str) -> String {
        format!("{}/commands/{}", self.daemon_url, name)
    }

    /// Invoke a registered command and deserialize its response.
    ///
    /// No retry, no deduplication: every call is one independent request,
    /// and overlapping invocations produce independent in-flight futures.
    pub async fn invoke<C: VaultCommand>(
        &self,
        request: &C::Request,
    ) -> Result<C::Response, CommandError> {
        let response = self
            .http_client
            .post(self.command_url(C::NAME))
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => "no error detail".to_string(),
            };
            return Err(CommandError::Command {
                command: C::NAME,
                status,
                message,
            });
        }

        Ok(response.json::<C::Response>().await?)
    }

    /// Fetch the current credential snapshot
    pub async fn fetch_credentials(&self) -> Result<CredentialSnapshot, CommandError> {
        self.invoke::<GetPasswords>(&()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_url_normalization() {
        let client = VaultClient::new("http://127.0.0.1:7656/");
        assert_eq!(client.daemon_url(), "http://127.0.0.1:7656");
    }

    #[test]
    fn test_command_url() {
        let client = VaultClient::new("http://127.0.0.1:7656");
        assert_eq!(
            client.command_url(GetPasswords::NAME),
            "http://127.0.0.1:7656/commands/get_passwords"
        );
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::Command {
            command: "get_passwords",
            status: 500,
            message: "vault is locked".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "vault daemon rejected get_passwords (status 500): vault is locked"
        );
    }
}
