use serde::{Deserialize, Serialize};
use std::fmt;

use super::CURRENCY_MARKER;

/// One raw text block lifted from a rendered page, with the first link inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub href: Option<String>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            text: text.into(),
            href: href.map(str::to_string),
        }
    }
}

/// A fragment that passed the relevance filters but whose price is still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub raw_price_text: String,
    pub link: Option<String>,
    pub full_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: f64,
    pub url: String,
    /// Full fragment text, used for target-phrase matching.
    pub description: String,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2} — {}", CURRENCY_MARKER, self.price, self.name)
    }
}
