pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use telegram::TelegramClient;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("messaging API returned {status}: {description}")]
    Api { status: u16, description: String },
    #[error("photo not found: {0}")]
    MissingPhoto(PathBuf),
}

/// Delivery channel for check results.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()>;
    async fn send_photo(&self, chat_id: &str, photo: &Path, caption: Option<&str>) -> Result<()>;
}
