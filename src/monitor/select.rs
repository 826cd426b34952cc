use crate::models::Item;

/// Pick the cheapest item whose description mentions every target phrase,
/// falling back to the cheapest item overall.
///
/// `items` is expected in ascending price order, as produced by extraction.
pub fn select_best<'a>(items: &'a [Item], target_phrases: &[String]) -> Option<&'a Item> {
    let phrases: Vec<String> = target_phrases.iter().map(|p| p.to_lowercase()).collect();

    items
        .iter()
        .filter(|item| {
            let description = item.description.to_lowercase();
            phrases.iter().all(|p| description.contains(p.as_str()))
        })
        .min_by(|a, b| a.price.total_cmp(&b.price))
        .or_else(|| items.iter().min_by(|a, b| a.price.total_cmp(&b.price)))
}
