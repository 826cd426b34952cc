use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_TEXT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S/\s*[\d.,]+")
        .expect("Invalid price text regex")
});

static PRICE_DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S/\s*([\d.,]+)")
        .expect("Invalid price digits regex")
});

static DOT_THOUSANDS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\.\d{3}")
        .expect("Invalid thousands regex")
});

static COMMA_DECIMALS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",\d{2}$")
        .expect("Invalid decimals regex")
});

/// Find the first `S/`-prefixed price substring in a block of text
pub fn find_price_text(text: &str) -> Option<&str> {
    PRICE_TEXT_REGEX.find(text).map(|m| m.as_str())
}

/// Normalize a soles price such as `S/ 1.299,90` or `S/ 1,299.90` to a number.
///
/// Returns `None` when no price is present or the digits do not parse.
/// A lone dot without a comma (`S/ 1.234`) is read as a decimal point.
pub fn normalize_price(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let digits = PRICE_DIGITS_REGEX.captures(text)?.get(1)?.as_str();

    let normalized = if DOT_THOUSANDS_REGEX.is_match(digits) && COMMA_DECIMALS_REGEX.is_match(digits) {
        // 1.299,90
        digits.replace('.', "").replace(',', ".")
    } else {
        let ungrouped = if digits.matches('.').count() > 1 && !digits.contains(',') {
            digits.replace('.', "")
        } else {
            digits.to_string()
        };
        ungrouped.replace(',', "")
    };

    normalized.parse::<f64>().ok()
}
