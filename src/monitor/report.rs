use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::models::{Item, CURRENCY_MARKER, EMOJI_CART, EMOJI_SEARCH, EMOJI_WARNING};

pub const TOP_ITEMS: usize = 5;

pub fn no_results_message(query: &str, site_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{} {} | Sin resultados con precio para '{}' en {}.",
        EMOJI_SEARCH,
        now.format("%Y-%m-%dT%H:%M:%S"),
        query,
        site_name
    )
}

pub fn alert_message(best: &Item, threshold: f64) -> String {
    format!(
        "{} ¡Bajó del umbral! {m} {:.2} < {m} {:.2}\n{}",
        EMOJI_WARNING,
        best.price,
        threshold,
        best.url,
        m = CURRENCY_MARKER
    )
}

/// Summary used both as plain message and as screenshot caption.
pub fn summary(query: &str, site_name: &str, best: &Item, threshold: f64, items: &[Item]) -> String {
    let mut text = format!(
        "{} Monitoreo {}\n\
         Consulta: {}\n\
         Mejor precio: {m} {:.2}\n\
         Umbral: {m} {:.2}\n\
         Producto: {}\n\
         Link: {}\n\n\
         Top {}:",
        EMOJI_CART,
        site_name,
        query,
        best.price,
        threshold,
        best.name,
        best.url,
        TOP_ITEMS,
        m = CURRENCY_MARKER
    );

    for item in items.iter().take(TOP_ITEMS) {
        // writing to a String cannot fail
        let _ = write!(text, "\n- {}", item);
    }

    text
}
