//! API key resolution for the chat app
//!
//! The key is looked up in the environment, then the config file, then the
//! system keyring. The first non-empty value wins.

use crate::config::ChatConfig;
use crate::error::{ChatboardError, Result};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const KEYRING_SERVICE: &str = "chatboard";
const KEYRING_USER: &str = "google_api_key";

/// Where a resolved key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The `GOOGLE_API_KEY` environment variable
    Environment,
    /// `chat.api_key` in the config file
    ConfigFile,
    /// The system keyring
    Keyring,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "environment ({})", API_KEY_ENV),
            Self::ConfigFile => write!(f, "config file"),
            Self::Keyring => write!(f, "system keyring"),
        }
    }
}

/// A secret API key
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting empty or whitespace-only values
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw key, for request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Resolve the API key from all configured sources
///
/// # Errors
///
/// Returns `ChatboardError::MissingCredentials` if no source yields a
/// non-empty key.
pub fn resolve_api_key(config: &ChatConfig) -> Result<(ApiKey, CredentialSource)> {
    resolve_api_key_with(config, keyring_api_key)
}

/// Resolve the API key, reading the keyring through `keyring`
pub fn resolve_api_key_with<F>(
    config: &ChatConfig,
    keyring: F,
) -> Result<(ApiKey, CredentialSource)>
where
    F: FnOnce() -> Option<String>,
{
    if let Some(key) = std::env::var(API_KEY_ENV).ok().and_then(ApiKey::new) {
        return Ok((key, CredentialSource::Environment));
    }

    if let Some(key) = config.api_key.clone().and_then(ApiKey::new) {
        return Ok((key, CredentialSource::ConfigFile));
    }

    if let Some(key) = keyring().and_then(ApiKey::new) {
        return Ok((key, CredentialSource::Keyring));
    }

    Err(ChatboardError::MissingCredentials(format!(
        "set {} or chat.api_key, or run `chatboard auth`",
        API_KEY_ENV
    ))
    .into())
}

/// Read the key from the keyring; any failure counts as "absent"
fn keyring_api_key() -> Option<String> {
    let entry = match keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!("Keyring not available: {}", e);
            return None;
        }
    };

    match entry.get_password() {
        Ok(password) => Some(password),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            tracing::warn!("Failed to read API key from keyring: {}", e);
            None
        }
    }
}

/// Store the API key in the system keyring
///
/// # Errors
///
/// Returns a validation error for an empty key, or the keyring error.
pub fn store_api_key(key: &str) -> Result<()> {
    let key = ApiKey::new(key)
        .ok_or_else(|| ChatboardError::Validation("API key cannot be empty".to_string()))?;

    let entry =
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(ChatboardError::Keyring)?;
    entry
        .set_password(key.expose())
        .map_err(ChatboardError::Keyring)?;

    tracing::info!("Stored API key in system keyring");
    Ok(())
}
