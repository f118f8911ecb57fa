//! Chain-of-Verification prompt builder: claim extraction, claim
//! verification, and the verification summary appended to the Critic's
//! prompt.

use reasoning_contracts::{Claim, VerificationOutcome, VerificationStatus};

#[derive(Debug, Default)]
pub struct CoVPromptBuilder;

impl CoVPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_claim_extraction_prompt(&self, draft: &str) -> String {
        format!(
            r#"你是一個 **事實宣稱提取器 (Claim Extractor)**。

你的任務是從研究報告中提取所有**可驗證的事實宣稱**。

---

## 提取目標

請識別並提取以下類型的宣稱：number（數字）、date（日期）、person（人名）、
organization（機構名）、event（事件）、statistic（統計數據）、quote（引述）。

---

## 提取原則

1. **只提取可驗證的宣稱**，不提取主觀判斷。
2. **注意引用標記**：若宣稱後有 [N]，記錄對應的 `source_reference`。
3. **保留上下文**：在 `context` 欄位記錄宣稱前後的句子。
4. **不要重複**：相同的事實只提取一次。

---

## 輸出格式

請嚴格按照 ClaimsList schema 輸出 JSON：

```json
{{
  "claims": [
    {{"claim": "...", "claim_type": "number", "source_reference": 3, "context": "..."}}
  ],
  "extraction_notes": "共提取 X 個可驗證宣稱"
}}
```

---

## 待分析的草稿

{draft}

---

現在，請提取所有可驗證的事實宣稱。"#
        )
    }

    pub fn build_claim_verification_prompt(&self, claims: &[Claim], formatted_context: &str) -> String {
        let claims_str = claims
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let ref_suffix = c
                    .source_reference
                    .map(|r| format!(" (引用 [{r}])"))
                    .unwrap_or_default();
                format!("{}. [{:?}] {}{ref_suffix}", i + 1, c.claim_type, c.claim)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"你是一個 **事實驗證器 (Fact Verifier)**。

你的任務是驗證每個事實宣稱是否有來源支持。

---

## 驗證標準

- **VERIFIED**：來源中有明確支持此宣稱的內容（允許單位換算、日期格式差異等語意等價）。
- **UNVERIFIED**：來源中找不到支持此宣稱的內容（包含引用了 [N] 但該來源未提及此事實）。
- **CONTRADICTED**：來源中有明確反駁此宣稱的內容。
- **PARTIALLY_VERIFIED**：宣稱的部分內容有來源支持。

## 驗證原則

1. 嚴格比對：數字/日期必須一致（允許換算/格式差異），不要腦補或推測。
2. 驗證成功時記錄支持的來源 ID；驗證失敗時說明原因。
3. 保守判斷：不確定時傾向標記為 UNVERIFIED，只有明確矛盾才標記 CONTRADICTED。

---

## 待驗證的宣稱

{claims_str}

---

## 可用的來源資料

{formatted_context}

---

## 輸出格式

請嚴格按照 CoVVerificationOutput schema 輸出 JSON：

```json
{{
  "results": [
    {{"claim": "...", "status": "verified", "evidence": "...", "source_id": 3, "explanation": "...", "confidence": "high"}}
  ],
  "summary": "驗證結果摘要",
  "verified_count": 1,
  "unverified_count": 0,
  "contradicted_count": 0
}}
```

---

現在，請逐一驗證每個宣稱。"#
        )
    }

    /// Builds the CoV summary block appended to the Critic's prompt,
    /// including explicit escalation guidance.
    pub fn build_verification_summary_for_critic(&self, outcome: &VerificationOutcome) -> String {
        let issues: Vec<String> = outcome
            .results
            .iter()
            .filter_map(|r| match r.status {
                VerificationStatus::Unverified => {
                    Some(format!("- [未驗證] {}: {}", r.claim, r.explanation))
                }
                VerificationStatus::Contradicted => {
                    Some(format!("- [矛盾] {}: {}", r.claim, r.explanation))
                }
                _ => None,
            })
            .collect();

        let issues_str = if issues.is_empty() {
            "（無問題）".to_string()
        } else {
            issues.join("\n")
        };

        format!(
            r#"
---

## Chain of Verification (CoV) 驗證結果

事實宣稱驗證已完成，結果如下：

### 統計
- **已驗證**: {} 個
- **未驗證**: {} 個
- **矛盾**: {} 個

### 摘要
{}

### 發現的問題

{issues_str}

### 審查指引

根據 CoV 結果：
- 若有**矛盾**的宣稱 → 應考慮 **REJECT**
- 若有 3 個以上**未驗證**的宣稱 → 應考慮 **WARN**
- 請在 `logical_gaps` 中列出未驗證/矛盾的宣稱
- 請在 `suggestions` 中建議如何修正這些問題
"#,
            outcome.verified_count, outcome.unverified_count, outcome.contradicted_count, outcome.summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_contracts::{ClaimType, Confidence, VerificationResult};

    #[test]
    fn extraction_prompt_embeds_the_draft() {
        let builder = CoVPromptBuilder::new();
        let prompt = builder.build_claim_extraction_prompt("台積電 2024 年 Q1 營收達 5,926 億元");
        assert!(prompt.contains("台積電 2024 年 Q1 營收達 5,926 億元"));
    }

    #[test]
    fn critic_summary_includes_escalation_guidance_and_counts() {
        let builder = CoVPromptBuilder::new();
        let outcome = VerificationOutcome::from_results(vec![VerificationResult {
            claim: "x".to_string(),
            status: VerificationStatus::Contradicted,
            evidence: None,
            source_id: None,
            explanation: "refuted by source 2".to_string(),
            confidence: Confidence::High,
        }]);
        let summary = builder.build_verification_summary_for_critic(&outcome);
        assert!(summary.contains("REJECT"));
        assert!(summary.contains("矛盾"));
        assert!(summary.contains("refuted by source 2"));
    }

    #[test]
    fn claim_type_formats_into_verification_prompt() {
        let builder = CoVPromptBuilder::new();
        let claims = vec![Claim {
            claim: "5,926 億元".to_string(),
            claim_type: ClaimType::Number,
            source_reference: Some(3),
            context: String::new(),
        }];
        let prompt = builder.build_claim_verification_prompt(&claims, "source context");
        assert!(prompt.contains("5,926 億元"));
        assert!(prompt.contains("引用 [3]"));
    }
}
