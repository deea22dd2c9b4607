//! Chat app startup and state
//!
//! At startup the app resolves the API key and checks that the configured
//! model is usable. If either step fails the app stays [`ChatApp::Unavailable`]
//! and never creates a session.

pub mod session;

pub use session::{ChatSession, SessionManager};

use crate::config::ChatConfig;
use crate::credentials::{resolve_api_key, ApiKey, CredentialSource};
use crate::error::{ChatboardError, Result};
use crate::providers::{create_provider, Provider};
use std::sync::Arc;
use std::time::Duration;

/// Why the chat app could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupFailure {
    /// No API key in any credential source
    MissingCredentials,
    /// The client could not be built or the model could not be verified
    ModelInit,
}

impl StartupFailure {
    /// The static message shown instead of the chat page
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => {
                "The API key is not configured. Set GOOGLE_API_KEY or chat.api_key in the \
                 config file, or store it with `chatboard auth`."
            }
            Self::ModelInit => {
                "The Gemini model could not be initialized. Check that the API key is valid."
            }
        }
    }
}

/// Running chat app: the provider plus its live sessions
pub struct ChatService {
    provider: Arc<dyn Provider>,
    sessions: SessionManager,
}

impl ChatService {
    /// Wrap a verified provider
    pub fn new(provider: Arc<dyn Provider>, session_ttl: Duration) -> Self {
        Self {
            sessions: SessionManager::new(provider.clone(), session_ttl),
            provider,
        }
    }

    /// Session registry
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Model the sessions talk to
    pub fn model(&self) -> String {
        self.provider.get_current_model()
    }
}

/// Chat app after startup
pub enum ChatApp {
    /// Credential and model are good; sessions can be served
    Ready(ChatService),
    /// Startup failed; only the static error is rendered
    Unavailable(StartupFailure),
}

impl ChatApp {
    /// Resolve the credential, build the Gemini client, and verify the model
    ///
    /// Never fails: startup errors are logged and turned into
    /// [`ChatApp::Unavailable`].
    pub async fn initialize(config: &ChatConfig) -> Self {
        Self::from_credentials(config, resolve_api_key(config)).await
    }

    /// Finish startup from an already resolved credential lookup
    pub async fn from_credentials(
        config: &ChatConfig,
        resolved: Result<(ApiKey, CredentialSource)>,
    ) -> Self {
        let api_key = match resolved {
            Ok((key, source)) => {
                tracing::info!("Loaded API key from {}", source);
                key
            }
            Err(e) => {
                tracing::error!("Failed to load API key: {:#}", e);
                return Self::Unavailable(StartupFailure::MissingCredentials);
            }
        };

        let provider: Arc<dyn Provider> = match create_provider(config, api_key) {
            Ok(p) => Arc::from(p),
            Err(e) => {
                tracing::error!("Failed to create Gemini client: {:#}", e);
                return Self::Unavailable(StartupFailure::ModelInit);
            }
        };

        Self::with_provider(provider, config).await
    }

    /// Finish startup with an already-built provider
    pub async fn with_provider(provider: Arc<dyn Provider>, config: &ChatConfig) -> Self {
        if config.verify_model {
            if let Err(e) = verify_model(provider.as_ref(), &config.model).await {
                tracing::error!("Model initialization failed: {:#}", e);
                return Self::Unavailable(StartupFailure::ModelInit);
            }
        }

        tracing::info!("Chat app ready with model {}", config.model);
        Self::Ready(ChatService::new(
            provider,
            Duration::from_secs(config.session_ttl_seconds),
        ))
    }

    /// The running service, if startup succeeded
    pub fn service(&self) -> Option<&ChatService> {
        match self {
            Self::Ready(service) => Some(service),
            Self::Unavailable(_) => None,
        }
    }
}

/// Check that `model` is listed by the provider and can generate content
pub async fn verify_model(provider: &dyn Provider, model: &str) -> Result<()> {
    let models = provider
        .list_models()
        .await
        .map_err(|e| ChatboardError::ModelInit(format!("could not list models: {:#}", e)))?;

    tracing::debug!("Provider lists {} models", models.len());

    let wanted = model.trim_start_matches("models/");
    match models.iter().find(|m| m.name == wanted) {
        Some(m) if m.supports_generate_content() => {
            tracing::info!("Verified model {} ({})", m.name, m.display_name);
            Ok(())
        }
        Some(_) => Err(ChatboardError::ModelInit(format!(
            "model {} does not support generateContent",
            wanted
        ))
        .into()),
        None => Err(ChatboardError::ModelInit(format!("model {} is not available", wanted)).into()),
    }
}
