use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::models::Fragment;
use crate::parsers::clean_text;
use crate::scrapers::{ChromeScreenshotter, PageCapture, PageRenderer};
use crate::utils::http::fetch_with_retry;

/// Product tile selectors, most specific first. `article` is the catch-all.
const PRODUCT_SELECTORS: &[&str] = &[
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

pub struct NikeScraper {
    config: Arc<Config>,
    client: Client,
    screenshotter: Option<ChromeScreenshotter>,
}

impl NikeScraper {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        let screenshotter = config.chrome_bin.as_deref().map(ChromeScreenshotter::new);
        Self {
            config,
            client,
            screenshotter,
        }
    }
}

#[async_trait]
impl PageRenderer for NikeScraper {
    async fn render(&self, query: &str) -> Result<PageCapture> {
        let home_url = &self.config.site.home_url;
        info!("Navigating to {} and searching for: {}", home_url, query);

        // Only here for the session cookies
        if let Err(e) = fetch_with_retry(&self.client, home_url, 1).await {
            warn!("Home page unavailable, going straight to search: {}", e);
        }

        let response = match fetch_with_retry(&self.client, &search_url(home_url, query)?, 3).await {
            Ok(response) => response,
            Err(e) => {
                let widened = format!("nike {} hombre", query);
                warn!("Search failed ({:#}), retrying with '{}'", e, widened);
                fetch_with_retry(&self.client, &search_url(home_url, &widened)?, 3).await?
            }
        };

        let page_url = response.url().to_string();
        let html = response.text().await?;
        let fragments = extract_fragments(&html, &page_url)?;

        info!("Found {} product blocks on {}", fragments.len(), page_url);

        let screenshot = match &self.screenshotter {
            Some(shooter) => match shooter.capture(&page_url).await {
                Ok(screenshot) => Some(screenshot),
                Err(e) => {
                    warn!("Screenshot failed: {:#}", e);
                    None
                }
            },
            None => None,
        };

        Ok(PageCapture {
            page_url,
            fragments,
            screenshot,
        })
    }
}

fn search_url(home_url: &str, query: &str) -> Result<String> {
    let params = serde_urlencoded::to_string([("q", query)])?;
    Ok(format!("{}/search?{}", home_url, params))
}

/// Elements that start a new line of rendered text; everything else flows inline.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "section", "table", "td", "th", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Split a results page into one text fragment per product tile.
///
/// Text follows the tile's rendered lines: inline markup stays on the current
/// line, block elements and `<br>` break it. The link is the first `a[href]`
/// inside the tile resolved against `page_url`.
fn extract_fragments(html: &str, page_url: &str) -> Result<Vec<Fragment>> {
    let document = Html::parse_document(html);
    let product_selector = Selector::parse(&PRODUCT_SELECTORS.join(", "))
        .map_err(|_| anyhow::anyhow!("Failed to parse product selector"))?;
    let link_selector = Selector::parse("a[href]")
        .map_err(|_| anyhow::anyhow!("Failed to parse link selector"))?;
    let base = Url::parse(page_url).ok();

    let mut fragments = Vec::new();

    for element in document.select(&product_selector) {
        let text = rendered_lines(element).join("\n");

        if text.is_empty() {
            continue;
        }

        let href = element
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| match &base {
                Some(base) => base.join(href).ok().map(|u| u.to_string()),
                None => Some(href.to_string()),
            });

        fragments.push(Fragment::new(text, href.as_deref()));
    }

    Ok(fragments)
}

fn rendered_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_lines(element, &mut current, &mut lines);
    flush_line(&mut current, &mut lines);
    lines
}

fn collect_lines(element: ElementRef<'_>, current: &mut String, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            if name == "br" {
                flush_line(current, lines);
                continue;
            }

            let is_block = BLOCK_ELEMENTS.contains(&name);
            if is_block {
                flush_line(current, lines);
            }
            collect_lines(child_element, current, lines);
            if is_block {
                flush_line(current, lines);
            }
        } else if let Some(text) = child.value().as_text() {
            current.push_str(text);
        }
    }
}

fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = clean_text(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::monitor::select_best;
    use crate::parsers::extract_items;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_HTML: &str = r#"<html><body>
        <header><a href="/">Saltar al contenido</a></header>
        <div class="product-grid">
            <div class="product-card">
                <a href="/dunk-low-retro-panda">
                    <div class="product-card__title">Nike Dunk Low Retro</div>
                    <div class="product-card__subtitle">Zapatillas para hombre</div>
                </a>
                <div class="product-price">S/&nbsp;549,90</div>
            </div>
            <div class="product-card">
                <div class="product-card__title">Nike Dunk Low Retro SE</div>
                <div class="product-price">S/ 1.299,90</div>
            </div>
            <div class="product-card">   </div>
        </div>
    </body></html>"#;

    #[test]
    fn test_extract_fragments() {
        let page_url = "https://www.nike.com.pe/search?q=dunk";
        let fragments = extract_fragments(RESULTS_HTML, page_url).unwrap();

        assert_eq!(
            fragments,
            vec![
                Fragment {
                    text: "Nike Dunk Low Retro\nZapatillas para hombre\nS/ 549,90".to_string(),
                    href: Some("https://www.nike.com.pe/dunk-low-retro-panda".to_string()),
                },
                Fragment {
                    text: "Nike Dunk Low Retro SE\nS/ 1.299,90".to_string(),
                    href: None,
                },
            ]
        );
    }

    #[test]
    fn test_inline_markup_stays_on_one_line() {
        let html = r#"<div class="product-grid">
            <div class="product-card">
                <a href="/k"><h3>Nike Dunk Low Retro</h3></a>
                <p>Zapatillas para niños</p>
                <div class="product-price">S/ 299.90</div>
            </div>
            <div class="product-card">
                <a href="/m"><h3>Nike <span>Dunk Low Retro</span></h3></a>
                <p>Zapatillas para <b>hombre</b></p>
                <div class="product-price">S/ <strong>499</strong>.90<br>Envío gratis</div>
                <script>var tracking = "S/ 1";</script>
            </div>
        </div>"#;

        let fragments = extract_fragments(html, "https://www.nike.com.pe/search?q=dunk").unwrap();

        assert_eq!(
            fragments[1].text,
            "Nike Dunk Low Retro\nZapatillas para hombre\nS/ 499.90\nEnvío gratis"
        );

        let terms: Vec<String> = vec!["dunk".into(), "low".into(), "retro".into()];
        let items = extract_items(&fragments, &terms, "https://www.nike.com.pe/search?q=dunk");
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Nike Dunk Low Retro", "Nike Dunk Low Retro"]);

        let phrases: Vec<String> = vec!["nike dunk low retro".into(), "zapatillas para hombre".into()];
        let best = select_best(&items, &phrases).unwrap();
        assert_eq!(best.url, "https://www.nike.com.pe/m");
        assert_eq!(best.price, 499.90);
    }

    #[test]
    fn test_nested_tiles_each_become_fragments() {
        let html = r#"<article><div class="product-card"><a href="https://example.com/x">Dunk</a></div></article>"#;
        let fragments = extract_fragments(html, "not a url").unwrap();

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].href.as_deref(), Some("https://example.com/x"));
    }

    #[test]
    fn test_search_url_is_form_encoded() {
        assert_eq!(
            search_url("https://www.nike.com.pe", "Nike Dunk Low Retro").unwrap(),
            "https://www.nike.com.pe/search?q=Nike+Dunk+Low+Retro"
        );
    }

    fn scraper_for(server: &MockServer) -> NikeScraper {
        let mut config = test_config();
        config.site.home_url = server.uri();
        NikeScraper::new(Arc::new(config), Client::new())
    }

    #[tokio::test]
    async fn test_render_fetches_search_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Nike Dunk Low Retro"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let capture = scraper_for(&server).render("Nike Dunk Low Retro").await.unwrap();

        assert_eq!(capture.fragments.len(), 2);
        assert!(capture.page_url.ends_with("/search?q=Nike+Dunk+Low+Retro"));
        assert!(capture.screenshot.is_none());
    }

    #[tokio::test]
    async fn test_render_widens_query_after_failed_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Dunk Low"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "nike Dunk Low hombre"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let capture = scraper_for(&server).render("Dunk Low").await.unwrap();

        assert_eq!(capture.fragments.len(), 2);
    }
}
