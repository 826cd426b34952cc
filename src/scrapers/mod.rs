use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::Fragment;

mod nike;
mod screenshot;

pub use nike::NikeScraper;
pub use screenshot::ChromeScreenshotter;

/// Everything the check needs from one rendered results page.
#[derive(Debug)]
pub struct PageCapture {
    pub page_url: String,
    pub fragments: Vec<Fragment>,
    pub screenshot: Option<Screenshot>,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, query: &str) -> Result<PageCapture>;
}

/// Temporary image file, removed from disk when dropped.
#[derive(Debug)]
pub struct Screenshot {
    path: PathBuf,
}

impl Screenshot {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Screenshot {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Could not remove screenshot {}: {}", self.path.display(), e);
        }
    }
}
