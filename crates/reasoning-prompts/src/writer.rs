//! Writer prompt builder: long-form outline planning and final report
//! composition.

use reasoning_contracts::{ConfidenceLevel, CriticReview, CriticStatus, Mode, WriterPlan};

/// Drafts beyond this length are truncated before being embedded in the
/// planning prompt; the full draft is still used at compose time.
const PLANNING_TRUNCATION_CHARS: usize = 10_000;

#[derive(Debug, Default)]
pub struct WriterPromptBuilder;

impl WriterPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Critic status maps to a *suggested* confidence ceiling; the Writer
    /// may downgrade further but the prompt never asks it to upgrade past
    /// this level.
    pub fn map_status_to_confidence(&self, status: CriticStatus) -> ConfidenceLevel {
        status.to_confidence_level()
    }

    pub fn build_plan_prompt(&self, analyst_draft: &str, critic_review: &CriticReview, user_query: &str, target_length: u32) -> String {
        let draft_for_planning = if analyst_draft.chars().count() > PLANNING_TRUNCATION_CHARS {
            let truncated: String = analyst_draft.chars().take(PLANNING_TRUNCATION_CHARS).collect();
            format!("{truncated}\n\n[草稿已截斷，完整版本在撰寫階段會使用]")
        } else {
            analyst_draft.to_string()
        };

        format!(
            r#"你是報告規劃專家。

請根據以下內容設計一個 {target_length} 字的深度報告大綱：

### Analyst 草稿
{draft_for_planning}

### Critic 審查意見
{}

### 使用者查詢
{user_query}

---

## 任務

1. **核心論點識別**：從 Analyst 草稿中提取 3-5 個核心論點
2. **章節規劃**：為每個論點分配章節，估算字數分配
3. **證據分配**：標註每個章節應使用哪些引用來源

## 輸出格式

```json
{{
  "outline": "# 報告大綱\n\n## 第一章：...\n- 預估字數：400\n- 使用來源：[1], [2]",
  "estimated_length": {target_length},
  "key_arguments": ["論點 A", "論點 B", "論點 C"]
}}
```

**要求**：大綱必須清晰、邏輯連貫；字數分配合理；章節數量 3-5 章。"#,
            critic_review.critique
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn build_compose_prompt(
        &self,
        analyst_draft: &str,
        critic_review: &CriticReview,
        analyst_citations: &[i32],
        mode: Mode,
        user_query: &str,
        suggested_confidence: ConfidenceLevel,
        plan: Option<&WriterPlan>,
    ) -> String {
        if let Some(plan) = plan {
            format!(
                r#"你是報告撰寫專家。

請根據以下大綱撰寫完整報告（目標：{} 字）：

### 大綱
{}

### 可用素材
- Analyst 草稿：{analyst_draft}
- 關鍵論點：{}
- 可用引用（白名單）：{analyst_citations:?}

### 要求
1. 嚴格遵循大綱結構，每個章節充分展開
2. 所有引用必須來自白名單：{analyst_citations:?}
3. 提供具體證據和細節，避免空洞論述
4. 目標字數：{} 字（允許 ±10%）
5. 使用 Markdown 格式，包含章節標題（## 或 ###）

## 輸出格式（JSON）

```json
{{
  "final_report": "# 完整報告\n\n## 第一章...",
  "sources_used": [1, 3, 5],
  "confidence_level": "{suggested_confidence:?}",
  "methodology_note": "基於 {} 個來源，經過深度研究與多輪審查"
}}
```

**CRITICAL JSON 輸出要求**：輸出必須是完整、有效的 JSON；確保所有大括號與方括號正確配對；
確保所有字串值用雙引號包圍且正確閉合；不要截斷 JSON；若 final_report 過長，優先縮短報告長度
而非破壞 JSON 結構。"#,
                plan.estimated_length,
                plan.outline,
                plan.key_arguments.join(", "),
                plan.estimated_length,
                analyst_citations.len(),
            )
        } else {
            format!(
                r#"你是報告撰寫專家。

請根據以下內容撰寫一份 {mode} 模式的研究報告。

### 使用者查詢
{user_query}

### Analyst 草稿
{analyst_draft}

### Critic 審查意見
{}

### 建議信心等級（依 Critic 狀態推導，僅可下修不可上修）
{suggested_confidence:?}

### 可用引用（白名單）
{analyst_citations:?}

### 要求
1. 所有引用必須來自白名單：{analyst_citations:?}
2. 依 {mode} 模式的要求組織章節
3. 使用 Markdown 格式

## 輸出格式（JSON）

```json
{{
  "final_report": "...",
  "sources_used": [1, 3],
  "confidence_level": "{suggested_confidence:?}",
  "methodology_note": "..."
}}
```"#,
                critic_review.critique
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_contracts::CriticStatus;

    fn review() -> CriticReview {
        CriticReview {
            status: CriticStatus::Approve,
            critique: "solid draft".to_string(),
            suggestions: vec![],
            mode_compliance: true,
            logical_gaps: vec![],
            source_issues: vec![],
            structured_weaknesses: vec![],
        }
    }

    #[test]
    fn plan_prompt_truncates_long_drafts_for_planning() {
        let builder = WriterPromptBuilder::new();
        let long_draft: String = "x".repeat(PLANNING_TRUNCATION_CHARS + 500);
        let prompt = builder.build_plan_prompt(&long_draft, &review(), "q", 2000);
        assert!(prompt.contains("草稿已截斷"));
        assert!(prompt.len() < long_draft.len() + 2000);
    }

    #[test]
    fn compose_prompt_without_plan_embeds_whitelist() {
        let builder = WriterPromptBuilder::new();
        let prompt = builder.build_compose_prompt(
            "draft",
            &review(),
            &[1, 2, 3],
            Mode::Strict,
            "query",
            ConfidenceLevel::High,
            None,
        );
        assert!(prompt.contains("[1, 2, 3]"));
    }

    #[test]
    fn status_maps_to_confidence_without_upgrading() {
        let builder = WriterPromptBuilder::new();
        assert_eq!(
            builder.map_status_to_confidence(CriticStatus::Reject),
            ConfidenceLevel::Low
        );
    }
}
