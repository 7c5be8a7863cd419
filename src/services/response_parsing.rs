use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fenced_block() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid fence pattern"))
}

fn leading_amount() -> &'static Regex {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    AMOUNT.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid amount pattern"))
}

/// Pull a JSON object out of free-form model output.
///
/// Models often wrap the payload in a fenced code block or surround it with
/// prose, so try the raw text, then the first fenced block, then the outermost
/// brace pair.
pub fn extract_json_object(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(value) = parse_object(trimmed) {
        return Some(value);
    }

    if let Some(captures) = fenced_block().captures(trimmed) {
        if let Some(value) = captures.get(1).and_then(|m| parse_object(m.as_str().trim())) {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&trimmed[start..=end])
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Non-empty trimmed strings from a JSON array, anything else is skipped.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A number, or the first amount written inside a string (`"250 INR"`, `"₹1,200"`).
pub fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => leading_amount()
            .find(text)
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok()),
        _ => None,
    }
}

/// A string field where `null` or a missing value reads as empty.
pub fn text_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
