//! Webhook Chat Gateway
//!
//! An OpenAI-compatible chat completion gateway in front of webhook-based
//! chat backends. Each configured model name maps to one backend webhook;
//! requests are translated between the two wire formats in both directions,
//! including a server-sent-event streaming mode.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;

pub use error::{AppError, Result};

use std::time::Duration;

use backend::{ModelRegistry, WebhookChatClient};
use config::Settings;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub registry: ModelRegistry,
    pub webhook: WebhookChatClient,
}

impl AppState {
    /// Build the shared state from loaded settings.
    ///
    /// Fails when the model mapping is unusable or the HTTP client cannot be
    /// constructed, so a misconfigured gateway never starts serving.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let registry = ModelRegistry::from_spec(&settings.models)?;
        let webhook = WebhookChatClient::new(Duration::from_secs(settings.webhook_timeout_secs))?;
        Ok(Self {
            settings,
            registry,
            webhook,
        })
    }
}
