//! Repair cascade for malformed, truncated, or markdown-wrapped JSON in LLM
//! responses. Shared by every stage that parses a raw completion, so the
//! cascade lives here rather than being duplicated per agent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CODE_FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?\s*").unwrap());
static CODE_FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").unwrap());
static SALVAGE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\s*"([^"]+)"\s*:\s*(\{[^}]*\}|"[^"]*"|\[[^\]]*\]|[^,}]+)"#).unwrap()
});

/// Strip markdown code fences and slice from the first `{` to the last `}`.
/// If no closing brace is found, returns everything from the first `{`
/// onward so later repair steps can attempt to close it.
pub fn extract_json_from_text(text: &str) -> Option<String> {
    let stripped = CODE_FENCE_CLOSE
        .replace(&CODE_FENCE_OPEN.replace(text, ""), "")
        .trim()
        .to_string();

    let start = stripped.find('{')?;
    match stripped.rfind('}') {
        Some(end) if end >= start => Some(stripped[start..=end].to_string()),
        _ => Some(stripped[start..].to_string()),
    }
}

struct BraceCounts {
    open_brace: usize,
    close_brace: usize,
    open_bracket: usize,
    close_bracket: usize,
}

fn count_braces(text: &str) -> BraceCounts {
    BraceCounts {
        open_brace: text.matches('{').count(),
        close_brace: text.matches('}').count(),
        open_bracket: text.matches('[').count(),
        close_bracket: text.matches(']').count(),
    }
}

/// Close unclosed strings, brackets, and braces in a truncated JSON
/// fragment.
pub fn repair_truncated_json(json_str: &str) -> String {
    let trimmed = json_str.trim_end();
    if trimmed.is_empty() {
        return "{}".to_string();
    }

    let mut repaired = trimmed.to_string();

    let quote_count = repaired.matches('"').count();
    if quote_count % 2 == 1 {
        if let Some(last_quote_idx) = repaired.rfind('"') {
            let remaining = repaired[last_quote_idx + 1..].trim();
            let starts_with_delim = remaining
                .chars()
                .next()
                .map(|c| matches!(c, ',' | '}' | ']'))
                .unwrap_or(false);
            if !remaining.is_empty() && !starts_with_delim {
                repaired.push('"');
            }
        }
    }

    let counts = count_braces(&repaired);
    if counts.open_bracket > counts.close_bracket {
        repaired.push_str(&"]".repeat(counts.open_bracket - counts.close_bracket));
    }
    let counts = count_braces(&repaired);
    if counts.open_brace > counts.close_brace {
        repaired.push_str(&"}".repeat(counts.open_brace - counts.close_brace));
    }

    repaired
}

/// Progressive-truncation last resort: drop content after the last complete
/// top-level comma, or failing that salvage just the first complete field.
fn truncate_progressively(repaired: &str) -> Option<Value> {
    if !repaired.trim_start().starts_with('{') {
        return None;
    }

    if let Some(last_comma_idx) = repaired.rfind(',') {
        if last_comma_idx > 0 {
            let truncated = format!("{}}}", &repaired[..last_comma_idx]);
            if let Ok(value) = serde_json::from_str(&truncated) {
                tracing::warn!("JSON parsed after aggressive truncation, some fields dropped");
                return Some(value);
            }
        }
    }

    if let Some(m) = SALVAGE_FIELD.find(repaired) {
        let salvaged = format!("{{{}}}", &m.as_str()[1..]);
        if let Ok(value) = serde_json::from_str(&salvaged) {
            tracing::warn!("JSON parsed from salvaged partial content, most fields missing");
            return Some(value);
        }
    }

    None
}

/// Parse JSON from a raw LLM completion, falling through four bounded
/// repair steps: direct parse, markdown/mixed-content extraction, truncated
/// structure closing, and progressive truncation / field salvage.
pub fn parse_json_with_repair(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        tracing::warn!("empty text passed to JSON parser");
        return None;
    }

    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let mut working = text.to_string();
    if let Some(extracted) = extract_json_from_text(text) {
        if let Ok(value) = serde_json::from_str(&extracted) {
            return Some(value);
        }
        working = extracted;
    }

    let repaired = repair_truncated_json(&working);
    if let Ok(value) = serde_json::from_str(&repaired) {
        tracing::info!("JSON parsed successfully after repair");
        return Some(value);
    }

    if let Some(value) = truncate_progressively(&repaired) {
        return Some(value);
    }

    tracing::error!(
        preview = %text.chars().take(200).collect::<String>(),
        "all JSON repair attempts failed"
    );
    None
}

/// Parse with repair, then verify the result is a JSON object carrying every
/// name in `required_fields`. Returns `None` on parse failure or missing
/// fields rather than a partially valid value.
pub fn safe_parse_llm_json(text: &str, required_fields: &[&str]) -> Option<Value> {
    let parsed = parse_json_with_repair(text)?;
    let obj = parsed.as_object()?;
    let missing: Vec<&str> = required_fields
        .iter()
        .filter(|f| !obj.contains_key(**f))
        .copied()
        .collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "parsed JSON missing required fields");
        return None;
    }
    Some(parsed)
}
