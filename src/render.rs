//! Display formatting for tool results.
//!
//! Rendering is for the terminal only. What goes back into the
//! conversation is truncated separately, see [`truncate_chars`].

use serde_json::Value;

/// Maximum characters shown for a result that is not JSON.
pub const MAX_TEXT_CHARS: usize = 1000;
/// Maximum list elements shown before collapsing the rest.
pub const MAX_LIST_ITEMS: usize = 15;

/// Return at most `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turn a raw tool result into lines for display.
pub fn render(result: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(result) {
        Ok(Value::Array(items)) => render_list(&items),
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| value.to_string())
            .lines()
            .map(str::to_string)
            .collect(),
        Err(_) => truncate_chars(result, MAX_TEXT_CHARS)
            .lines()
            .map(str::to_string)
            .collect(),
    }
}

fn render_list(items: &[Value]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len().min(MAX_LIST_ITEMS) + 2);
    lines.push(format!("Found {} item(s):", items.len()));

    for item in items.iter().take(MAX_LIST_ITEMS) {
        lines.push(format!("  • {}", summarize(item)));
    }
    if items.len() > MAX_LIST_ITEMS {
        lines.push(format!("  ... and {} more", items.len() - MAX_LIST_ITEMS));
    }
    lines
}

/// One-line summary: `name`, else `kind`, else the element itself.
fn summarize(item: &Value) -> String {
    let label = ["name", "kind"]
        .iter()
        .find_map(|key| item.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| literal(item));

    match item.get("namespace").and_then(Value::as_str) {
        Some(ns) if !ns.is_empty() => format!("{} (namespace: {})", label, ns),
        _ => label,
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
