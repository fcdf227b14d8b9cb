//! Pure Open Finance participant directory client.
//!
//! A minimal client for the participant directory API. The directory returns
//! every registered participant in a single JSON array; there is no paging.
//!
//! # Example
//!
//! ```rust,ignore
//! use directory_client::{DirectoryClient, Participant};
//!
//! let client = DirectoryClient::new(directory_client::SANDBOX_PARTICIPANTS_URL)?;
//!
//! let participants = client.fetch_participants().await?;
//! for (i, raw) in participants.iter().enumerate() {
//!     let participant = Participant::from_value(raw, i)?;
//!     println!("{:?}", participant.organisation_name()?);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{DirectoryError, Result};
pub use types::{ApiResource, AuthorisationServer, Participant, ShapeError};

use serde_json::Value;
use std::time::Duration;

/// Sandbox participants endpoint.
pub const SANDBOX_PARTICIPANTS_URL: &str =
    "https://data.sandbox.directory.openbankingbrasil.org.br/participants";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "opengo-rates-jobs/0.1";

pub struct DirectoryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl DirectoryClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Build a client whose requests give up after `timeout`.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the full participant set. One GET, no retry.
    pub async fn fetch_participants(&self) -> Result<Vec<Value>> {
        tracing::debug!(endpoint = %self.endpoint, "Fetching participants");

        let resp = self.client.get(&self.endpoint).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let participants = parse_participants(&body)?;
        tracing::debug!(count = participants.len(), "Fetched participants");

        Ok(participants)
    }
}

/// Parse a directory response body. The top level must be a JSON array.
pub fn parse_participants(body: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| DirectoryError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Err(DirectoryError::MalformedResponse(
            "expected an array of participants, found an object".to_string(),
        )),
        other => Err(DirectoryError::MalformedResponse(format!(
            "expected an array of participants, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_kept() {
        let client = DirectoryClient::new(SANDBOX_PARTICIPANTS_URL).unwrap();
        assert_eq!(client.endpoint(), SANDBOX_PARTICIPANTS_URL);
    }

    #[test]
    fn test_parse_array() {
        let participants = parse_participants(r#"[{"OrganisationId": "a"}, {}]"#).unwrap();
        assert_eq!(participants.len(), 2);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_participants("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_object() {
        let err = parse_participants(r#"{"participants": []}"#).unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedResponse(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_participants("<html>oops</html>").unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedResponse(_)));
    }
}
