use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use crate::notify::{Notifier, NotifyError};

/// Telegram rejects photo captions longer than this.
pub const MAX_CAPTION_CHARS: usize = 1024;

const MESSAGE_TIMEOUT: Duration = Duration::from_secs(30);
const PHOTO_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client for `sendMessage` and `sendPhoto`.
pub struct TelegramClient {
    client: Client,
    api_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(client: Client, api_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.endpoint("sendMessage"))
            .json(&payload)
            .timeout(MESSAGE_TIMEOUT)
            .send()
            .await
            .context("Failed to send Telegram message")?;

        check_response(response, "sendMessage").await
    }

    async fn send_photo(&self, chat_id: &str, photo: &Path, caption: Option<&str>) -> Result<()> {
        if !photo.exists() {
            return Err(NotifyError::MissingPhoto(photo.to_path_buf()).into());
        }

        let bytes = tokio::fs::read(photo)
            .await
            .with_context(|| format!("Failed to read {}", photo.display()))?;
        let file_name = photo
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "screenshot.png".to_string());

        let mut form = Form::new().text("chat_id", chat_id.to_string());
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            form = form.text("caption", truncate_caption(caption));
        }
        form = form.part("photo", Part::bytes(bytes).file_name(file_name).mime_str("image/png")?);

        let response = self
            .client
            .post(self.endpoint("sendPhoto"))
            .multipart(form)
            .timeout(PHOTO_TIMEOUT)
            .send()
            .await
            .context("Failed to send Telegram photo")?;

        check_response(response, "sendPhoto").await
    }
}

async fn check_response(response: Response, method: &str) -> Result<()> {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let parsed = serde_json::from_str::<ApiResponse>(&body).ok();

    if status.is_success() && parsed.as_ref().map_or(false, |r| r.ok) {
        info!("Telegram {} delivered", method);
        return Ok(());
    }

    let description = parsed.and_then(|r| r.description).unwrap_or(body);
    error!("Telegram {} failed with status {}: {}", method, status, description);
    Err(NotifyError::Api {
        status: status.as_u16(),
        description,
    }
    .into())
}

/// Cut `caption` to the API limit on a char boundary, marking the cut with an ellipsis.
pub fn truncate_caption(caption: &str) -> String {
    if caption.chars().count() <= MAX_CAPTION_CHARS {
        return caption.to_string();
    }
    let mut truncated: String = caption.chars().take(MAX_CAPTION_CHARS - 1).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok_body() -> serde_json::Value {
        json!({ "ok": true, "result": { "message_id": 1 } })
    }

    #[tokio::test]
    async fn send_message_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(json!({ "chat_id": "42", "text": "hola" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let telegram = TelegramClient::new(Client::new(), server.uri(), "123:abc");
        telegram.send_message("42", "hola").await.unwrap();
    }

    #[tokio::test]
    async fn send_photo_uploads_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendPhoto"))
            .and(body_string_contains("name=\"photo\""))
            .and(body_string_contains("Mejor precio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let photo = std::env::temp_dir().join(format!("price-watch-upload-{}.png", std::process::id()));
        std::fs::write(&photo, b"fake png bytes").unwrap();

        let telegram = TelegramClient::new(Client::new(), server.uri(), "123:abc");
        let result = telegram.send_photo("42", &photo, Some("Mejor precio: S/ 499.90")).await;
        std::fs::remove_file(&photo).unwrap();

        result.unwrap();
    }

    #[tokio::test]
    async fn api_errors_carry_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "ok": false, "description": "Bad Request: chat not found" })),
            )
            .mount(&server)
            .await;

        let telegram = TelegramClient::new(Client::new(), server.uri(), "123:abc");
        let err = telegram.send_message("42", "hola").await.unwrap_err();

        match err.downcast_ref::<NotifyError>() {
            Some(NotifyError::Api { status, description }) => {
                assert_eq!(*status, 400);
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_photo_is_reported_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(0)
            .mount(&server)
            .await;

        let telegram = TelegramClient::new(Client::new(), server.uri(), "123:abc");
        let err = telegram
            .send_photo("42", Path::new("/nonexistent/shot.png"), None)
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<NotifyError>(), Some(NotifyError::MissingPhoto(_))));
    }

    #[test]
    fn long_captions_are_truncated() {
        let short = "Umbral: S/ 549.90";
        assert_eq!(truncate_caption(short), short);

        let long = "ñ".repeat(MAX_CAPTION_CHARS + 10);
        let truncated = truncate_caption(&long);
        assert_eq!(truncated.chars().count(), MAX_CAPTION_CHARS);
        assert!(truncated.ends_with('…'));
    }
}
