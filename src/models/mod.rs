pub mod item;

pub use item::*;

pub const CURRENCY_MARKER: &str = "S/";

pub const EMOJI_CART: &str = "🛒";
pub const EMOJI_SEARCH: &str = "🔎";
pub const EMOJI_WARNING: &str = "⚠️";
