use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

use crate::scrapers::Screenshot;

const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(60);
// Headless Chrome only captures the viewport, so it is made tall enough to
// hold the whole results grid.
const WINDOW_SIZE: &str = "1366,4000";

/// Shoots page screenshots with a headless Chrome/Chromium binary.
#[derive(Debug, Clone)]
pub struct ChromeScreenshotter {
    chrome_bin: String,
}

impl ChromeScreenshotter {
    pub fn new(chrome_bin: impl Into<String>) -> Self {
        Self {
            chrome_bin: chrome_bin.into(),
        }
    }

    pub async fn capture(&self, url: &str) -> Result<Screenshot> {
        let path = temp_screenshot_path();
        // Owning the path up front means a failed run still cleans up after itself
        let screenshot = Screenshot::new(path.clone());

        info!("Taking screenshot of {}", url);
        let status = timeout(
            SCREENSHOT_TIMEOUT,
            Command::new(&self.chrome_bin)
                .args(chrome_args(&path, url))
                .kill_on_drop(true)
                .status(),
        )
        .await
        .context("Chrome screenshot timed out")?
        .with_context(|| format!("Failed to launch {}", self.chrome_bin))?;

        if !status.success() {
            bail!("{} exited with {}", self.chrome_bin, status);
        }
        if !path.exists() {
            bail!("{} did not write {}", self.chrome_bin, path.display());
        }

        Ok(screenshot)
    }
}

fn chrome_args(path: &Path, url: &str) -> Vec<String> {
    vec![
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--hide-scrollbars".to_string(),
        "--lang=es-PE".to_string(),
        format!("--window-size={}", WINDOW_SIZE),
        format!("--screenshot={}", path.display()),
        url.to_string(),
    ]
}

fn temp_screenshot_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "price-watch-{}-{}.png",
        std::process::id(),
        Utc::now().timestamp_millis()
    ))
}
