//! Lightweight, deterministic ambiguity rules that hint the Clarification
//! agent rather than replace its judgment. These are regex heuristics, not
//! an NLP model — the agent still makes the final call on what to ask.

use once_cell::sync::Lazy;
use regex::Regex;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(19|20)\d{2}").unwrap());
static RELATIVE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"今天|昨天|今年|去年|最近|本週|本月|上週|上個月|today|yesterday|this week|last week|recent").unwrap()
});

/// True when the query mentions neither an explicit year nor a relative
/// time marker — the signal the Clarification prompt's "規則檢測" line
/// reports upstream.
pub fn detect_time_ambiguity(query: &str) -> bool {
    !YEAR.is_match(query) && !RELATIVE_TIME.is_match(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_with_explicit_year_is_not_ambiguous() {
        assert!(!detect_time_ambiguity("蔡英文 2023 年兩岸政策"));
    }

    #[test]
    fn query_with_relative_time_marker_is_not_ambiguous() {
        assert!(!detect_time_ambiguity("台積電最近的營收"));
    }

    #[test]
    fn query_with_no_time_signal_is_ambiguous() {
        assert!(detect_time_ambiguity("momo 科技"));
    }
}
