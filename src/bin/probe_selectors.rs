//! Saves a live search results page and reports how many elements each
//! product-tile selector matches, for tuning the scraper against markup changes.
//!
//! Usage: `probe_selectors [query] [site_url]`

use anyhow::Result;
use reqwest::Client;
use scraper::{Html, Selector};
use std::fs;

const DEFAULT_QUERY: &str = "Nike Dunk Low Retro";
const DEFAULT_SITE_URL: &str = "https://www.nike.com.pe";
const SAMPLE_FILE: &str = "search_sample.html";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let site_url = args.next().unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

    let client = Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36")
        .cookie_store(true)
        .build()?;

    let search_url = format!(
        "{}/search?{}",
        site_url.trim_end_matches('/'),
        serde_urlencoded::to_string([("q", query.as_str())])?
    );

    println!("Fetching {} ...", search_url);
    let response = client.get(&search_url).send().await?;
    println!("Status: {}", response.status());
    let html = response.text().await?;
    fs::write(SAMPLE_FILE, &html)?;
    println!("Saved {} bytes to {}", html.len(), SAMPLE_FILE);

    let document = Html::parse_document(&html);

    let selectors = vec![
        "article.product",
        "article.product-card",
        ".product-card",
        ".product-grid__item",
        "li.product",
        "div.product-card",
        "div.product-tile",
        "div.productcell",
        "article",
    ];

    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            let count = document.select(&selector).count();
            println!("Selector '{}' matched {} elements", selector_str, count);
        }
    }

    let price_count = html.matches("S/").count();
    println!("\nPage text contains {} 'S/' price markers", price_count);

    Ok(())
}
