pub mod extract;
pub mod price;

pub use extract::*;
pub use price::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Nike&nbsp;Dunk \n  Low\tRetro "), "Nike Dunk Low Retro");
        assert_eq!(clean_text("Zapatillas &amp; más"), "Zapatillas & más");
        assert_eq!(clean_text(" \n "), "");
    }
}
