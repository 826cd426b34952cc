use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_QUERY: &str = "Nike Dunk Low Retro";
pub const DEFAULT_THRESHOLD: f64 = 549.90;
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_SITE_URL: &str = "https://www.nike.com.pe";
pub const DEFAULT_SITE_NAME: &str = "Nike Perú";
pub const DEFAULT_TARGET_PHRASES: &str = "nike dunk low retro,zapatillas para hombre";
pub const DEFAULT_KEYWORD_TOKENS: &str = "dunk,low,retro";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must both be set")]
    MissingCredentials,
    #[error("threshold must be a finite, non-negative number (got {0})")]
    InvalidThreshold(f64),
    #[error(transparent)]
    Source(#[from] ::config::ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub query: String,
    pub threshold: f64,
    pub telegram: TelegramConfig,
    pub site: SiteConfig,
    pub send_screenshot_always: bool,
    pub check_interval_seconds: Option<u64>,
    pub chrome_bin: Option<String>,
    pub target_phrases: Vec<String>,
    pub keyword_tokens: Vec<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub home_url: String,
}

/// Flat view of the environment; every key maps 1:1 to an upper-case env var.
#[derive(Debug, Deserialize)]
struct RawSettings {
    query: String,
    threshold: f64,
    telegram_bot_token: Option<String>,
    telegram_chat_id: Option<String>,
    telegram_api_url: String,
    send_screenshot_always: bool,
    check_interval_seconds: Option<u64>,
    chrome_bin: Option<String>,
    target_phrases: String,
    keyword_tokens: String,
    site_url: String,
    site_name: String,
    user_agent: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let builder =
            ::config::Config::builder().add_source(Environment::default().try_parsing(true));
        Self::from_builder(builder)
    }

    /// Applies defaults underneath whatever sources `builder` already carries.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let raw: RawSettings = builder
            .set_default("query", DEFAULT_QUERY)?
            .set_default("threshold", DEFAULT_THRESHOLD)?
            .set_default("telegram_api_url", DEFAULT_TELEGRAM_API_URL)?
            .set_default("send_screenshot_always", false)?
            .set_default("target_phrases", DEFAULT_TARGET_PHRASES)?
            .set_default("keyword_tokens", DEFAULT_KEYWORD_TOKENS)?
            .set_default("site_url", DEFAULT_SITE_URL)?
            .set_default("site_name", DEFAULT_SITE_NAME)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .build()?
            .try_deserialize()?;

        let bot_token = non_empty(raw.telegram_bot_token);
        let chat_id = non_empty(raw.telegram_chat_id);
        let (Some(bot_token), Some(chat_id)) = (bot_token, chat_id) else {
            return Err(ConfigError::MissingCredentials);
        };

        if !raw.threshold.is_finite() || raw.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(raw.threshold));
        }

        Ok(Config {
            query: raw.query.trim().to_string(),
            threshold: raw.threshold,
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                api_url: raw.telegram_api_url.trim_end_matches('/').to_string(),
            },
            site: SiteConfig {
                name: raw.site_name,
                home_url: raw.site_url.trim_end_matches('/').to_string(),
            },
            send_screenshot_always: raw.send_screenshot_always,
            // 0 means "run once", same as leaving it unset
            check_interval_seconds: raw.check_interval_seconds.filter(|secs| *secs > 0),
            chrome_bin: non_empty(raw.chrome_bin),
            target_phrases: split_list(&raw.target_phrases),
            keyword_tokens: split_list(&raw.keyword_tokens),
            user_agent: raw.user_agent,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    let builder = ::config::Config::builder()
        .set_override("telegram_bot_token", "TOKEN")
        .and_then(|b| b.set_override("telegram_chat_id", "42"))
        .expect("valid overrides");
    Config::from_builder(builder).expect("test config")
}
