//! Credentials injected by the CI server into trusted extensions.
//!
//! The server passes a JSON array of credential objects:
//!
//! ```json
//! [{"name": "github", "type": "github-api-token", "additionalProperties": {"token": "..."}}]
//! ```
//!
//! Only the token of the first entry is used.

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("failed unmarshalling injected {kind} api token credentials: {source}")]
    Json {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("no {kind} api token credentials have been injected")]
    Empty { kind: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTokenCredentials {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: ApiTokenProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTokenProperties {
    pub token: String,
}

/// Parse injected credentials JSON and return the first token.
///
/// `kind` names the credential type in error messages (`github`, `bitbucket`).
pub fn parse_api_token(json: &str, kind: &'static str) -> Result<String, CredentialsError> {
    log::info!("Unmarshalling injected {} api token credentials", kind);

    let credentials: Vec<ApiTokenCredentials> =
        serde_json::from_str(json).map_err(|source| CredentialsError::Json { kind, source })?;

    credentials
        .into_iter()
        .next()
        .map(|c| c.additional_properties.token)
        .ok_or(CredentialsError::Empty { kind })
}
