use std::collections::HashSet;
use tracing::debug;

use crate::models::{Candidate, Fragment, Item};
use crate::parsers::{find_price_text, normalize_price};

/// Page chrome that shows up as the first line of non-product blocks.
const SKIP_LINK_LABEL: &str = "saltar al contenido";
const SEARCH_LABEL: &str = "buscar";

const MIN_TITLE_LEN: usize = 3;

/// Keep only the known keyword tokens that actually occur in the query.
pub fn required_terms(query: &str, known_keywords: &[String]) -> Vec<String> {
    let query_lower = query.to_lowercase();
    known_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty() && query_lower.contains(k.as_str()))
        .collect()
}

/// Turn raw page fragments into deduplicated items sorted by ascending price.
///
/// Fragments are rejected when they miss a required term, carry no `S/` price,
/// have a title that looks like page chrome, or have a price that does not
/// normalize. An empty result is a normal outcome.
pub fn extract_items(fragments: &[Fragment], required_terms: &[String], page_url: &str) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for fragment in fragments {
        let Some(candidate) = to_candidate(fragment, required_terms) else {
            continue;
        };

        if is_chrome_title(&candidate.title) {
            debug!("Skipping non-product block '{}'", candidate.title);
            continue;
        }

        let Some(price) = normalize_price(&candidate.raw_price_text) else {
            debug!("Unparseable price '{}' in '{}'", candidate.raw_price_text, candidate.title);
            continue;
        };

        let url = candidate.link.unwrap_or_else(|| page_url.to_string());

        if !seen.insert((candidate.title.clone(), price.to_bits(), url.clone())) {
            continue;
        }

        items.push(Item {
            name: candidate.title,
            price,
            url,
            description: candidate.full_text,
        });
    }

    // sort_by is stable, so equal prices keep page order
    items.sort_by(|a, b| a.price.total_cmp(&b.price));
    items
}

fn to_candidate(fragment: &Fragment, required_terms: &[String]) -> Option<Candidate> {
    let text = fragment.text.trim();
    let text_lower = text.to_lowercase();

    if required_terms.iter().any(|term| !text_lower.contains(term.as_str())) {
        return None;
    }

    let raw_price_text = find_price_text(text)?;
    let title = text.lines().next().unwrap_or_default().trim();

    Some(Candidate {
        title: title.to_string(),
        raw_price_text: raw_price_text.to_string(),
        link: fragment.href.clone().filter(|href| !href.is_empty()),
        full_text: text.to_string(),
    })
}

fn is_chrome_title(title: &str) -> bool {
    let title_lower = title.to_lowercase();
    title.chars().count() < MIN_TITLE_LEN
        || title_lower.contains(SKIP_LINK_LABEL)
        || title_lower == SEARCH_LABEL
}
