pub mod report;
pub mod select;

pub use select::select_best;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::config::Config;
use crate::models::Item;
use crate::notify::Notifier;
use crate::parsers::{extract_items, required_terms};
use crate::scrapers::{PageRenderer, Screenshot};

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    NoResults,
    Checked { best: Item, below_threshold: bool },
}

/// One full check: render the search page, rank prices and notify.
///
/// The screenshot, if any, is deleted before returning, whether or not the
/// notifications went through.
pub async fn run_check(
    config: &Config,
    renderer: &dyn PageRenderer,
    notifier: &dyn Notifier,
) -> Result<CheckOutcome> {
    let capture = renderer.render(&config.query).await?;
    let screenshot = capture.screenshot;
    let chat_id = config.telegram.chat_id.as_str();

    let terms = required_terms(&config.query, &config.keyword_tokens);
    let items = extract_items(&capture.fragments, &terms, &capture.page_url);
    info!(
        "Extracted {} priced items from {} blocks",
        items.len(),
        capture.fragments.len()
    );

    let Some(best) = select_best(&items, &config.target_phrases) else {
        let message = report::no_results_message(&config.query, &config.site.name, Utc::now());
        info!("No priced results for '{}'", config.query);
        notifier.send_message(chat_id, &message).await?;
        if let Some(screenshot) = &screenshot {
            notifier.send_photo(chat_id, screenshot.path(), Some(&message)).await?;
        }
        return Ok(CheckOutcome::NoResults);
    };

    let below_threshold = best.price < config.threshold;
    info!(
        "Best price S/ {:.2} for '{}' (threshold S/ {:.2})",
        best.price, best.name, config.threshold
    );

    let summary = report::summary(&config.query, &config.site.name, best, config.threshold, &items);

    if below_threshold {
        let alert = report::alert_message(best, config.threshold);
        notifier.send_message(chat_id, &alert).await?;
    }

    if config.send_screenshot_always || below_threshold {
        send_with_screenshot(notifier, chat_id, screenshot.as_ref(), &summary).await?;
    } else {
        notifier.send_message(chat_id, &summary).await?;
    }

    Ok(CheckOutcome::Checked {
        best: best.clone(),
        below_threshold,
    })
}

async fn send_with_screenshot(
    notifier: &dyn Notifier,
    chat_id: &str,
    screenshot: Option<&Screenshot>,
    caption: &str,
) -> Result<()> {
    match screenshot {
        Some(screenshot) => notifier.send_photo(chat_id, screenshot.path(), Some(caption)).await,
        // Without a screenshot the summary still goes out as text
        None => notifier.send_message(chat_id, caption).await,
    }
}
