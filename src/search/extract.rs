//! Projections of a search result into prompt-ready text.

use serde_json::Value;

fn items(search_results: &Value) -> impl Iterator<Item = &Value> {
    search_results
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn field<'a>(item: &'a Value, name: &str) -> &'a str {
    item.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Each item's snippet, in result order.
pub fn extract_snippets(search_results: &Value) -> Vec<String> {
    items(search_results)
        .map(|item| field(item, "snippet").to_string())
        .collect()
}

/// Each item's snippet followed by a blank line and its link.
pub fn extract_full_texts(search_results: &Value) -> Vec<String> {
    items(search_results)
        .map(|item| format!("{}\n\n{}", field(item, "snippet"), field(item, "link")))
        .collect()
}
