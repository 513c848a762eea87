//! Backend integration: model registry and webhook chat client

pub mod registry;
pub mod webhook;

pub use registry::ModelRegistry;
pub use webhook::{WebhookChatClient, WebhookChatItem, WebhookChatRequest, WebhookItemStream};
