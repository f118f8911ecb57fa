//! Ambiguity-detection prompt builder for the Clarification stage.

use chrono::{Duration, NaiveDate};

/// Builds the multi-dimension ambiguity detection prompt. Ported section by
/// section from the original ambiguity-detection prompt: core instructions,
/// ambiguity type catalog, judgment criteria, output schema, and worked
/// examples.
#[derive(Debug, Default)]
pub struct ClarificationPromptBuilder;

impl ClarificationPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_prompt(&self, query: &str, has_time_ambiguity: bool, today: NaiveDate) -> String {
        [
            self.core_instructions(query, has_time_ambiguity),
            self.ambiguity_types(),
            self.judgment_criteria(),
            self.output_format(today),
            self.examples(today),
        ]
        .join("\n\n")
    }

    fn core_instructions(&self, query: &str, has_time_ambiguity: bool) -> String {
        let time_status = if has_time_ambiguity {
            "需要時間澄清"
        } else {
            "無時間歧義"
        };
        format!(
            r#"你是一個新聞搜尋查詢歧義分析助手。請分析以下查詢是否存在歧義，並生成**多維度並行澄清問題**。

**語境**：這是一個新聞搜尋系統，用戶想找相關新聞報導。

使用者查詢：「{query}」

規則檢測：{time_status}

**核心指令 - 多維度並行檢測**：
我們希望在**單次交互**中解決所有可能的歧義。
如果查詢同時存在「時間不明」和「範圍過廣」的問題，請**務必同時返回**這兩個問題。
不要只返回其中一個，也不要分多次問。"#
        )
    }

    fn ambiguity_types(&self) -> &'static str {
        r#"請檢測以下三種歧義類型：

1. **時間歧義 (time)**：查詢涉及時間敏感的人物、政策、事件，但未指定時間範圍。
   必須提供「今天」和「最近一周」選項（對即時性查詢），以及「全面回顧」選項。
2. **範圍歧義 (scope)**：查詢過於廣泛，涵蓋多個新聞主題面向。必須提供「全面了解」選項。
3. **實體歧義 (entity)**：查詢中的實體有多個不同的對象（不同國家/組織/人物）。"#
    }

    fn judgment_criteria(&self) -> &'static str {
        r#"**判斷標準**：
- Time 與 Scope 經常並存，請同時列出
- 明確的專有名詞不澄清
- 每個問題提供 2-4 個具體選項 + 1 個「全面」選項
- 使用對話式語氣，問題要簡短清晰"#
    }

    fn output_format(&self, today: NaiveDate) -> String {
        let week_ago = today - Duration::days(7);
        let month_ago = today - Duration::days(30);
        format!(
            r#"請返回 JSON 格式（每個 option 必須包含 query_modifier 欄位，time 類型必須包含 time_range）：
{{
  "questions": [
    {{
      "clarification_type": "scope",
      "question": "...",
      "required": true,
      "options": [
        {{"label": "...", "intent": "...", "query_modifier": "..."}},
        {{"label": "全面了解", "intent": "comprehensive", "query_modifier": "", "is_comprehensive": true}}
      ]
    }}
  ]
}}

**time 類型的特殊要求**：每個 option 必須包含 `time_range: {{"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}}`。
今天的日期是：{today}
- 「今天」: {{"start": "{today}", "end": "{today}"}}
- 「最近一周」: {{"start": "{week_ago}", "end": "{today}"}}
- 「最近一個月」: {{"start": "{month_ago}", "end": "{today}"}}
- 「全面回顧」(is_comprehensive=true): 不需要 time_range

如果沒有歧義，返回：{{"questions": []}}"#
        )
    }

    fn examples(&self, today: NaiveDate) -> String {
        let week_ago = today - Duration::days(7);
        format!(
            r#"範例 - Time + Scope 並存：
查詢：「蔡英文兩岸政策」
{{
  "questions": [
    {{
      "clarification_type": "time",
      "question": "請問是指哪個時期？",
      "required": true,
      "options": [
        {{"label": "今天", "intent": "today", "query_modifier": "今天", "time_range": {{"start": "{today}", "end": "{today}"}}}},
        {{"label": "最近一周", "intent": "week", "query_modifier": "最近一周", "time_range": {{"start": "{week_ago}", "end": "{today}"}}}},
        {{"label": "全面回顧", "intent": "comprehensive_time", "query_modifier": "", "is_comprehensive": true}}
      ]
    }}
  ]
}}

範例 - 無歧義：
查詢：「台積電3nm製程良率」
{{"questions": []}}
理由：明確專有名詞，查詢已經具體到製程技術。

請針對上述查詢進行判斷。"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_query_and_today_marker() {
        let builder = ClarificationPromptBuilder::new();
        let today = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        let prompt = builder.build_prompt("蔡英文兩岸政策", true, today);
        assert!(prompt.contains("蔡英文兩岸政策"));
        assert!(prompt.contains("2026-07-27"));
        assert!(prompt.contains("全面回顧"));
    }
}
