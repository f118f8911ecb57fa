//! Critic review prompt builder.

use reasoning_contracts::{ArgumentNode, GapResolution, KnowledgeGraph, Mode};

#[derive(Debug, Default)]
pub struct CriticPromptBuilder;

impl CriticPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the Critic's review prompt. `cov_summary`, when present, is
    /// the block produced by [`crate::cov::CoVPromptBuilder::build_verification_summary_for_critic`]
    /// and is appended verbatim after the base review instructions.
    #[allow(clippy::too_many_arguments)]
    pub fn build_review_prompt(
        &self,
        draft: &str,
        query: &str,
        mode: Mode,
        argument_graph: Option<&[ArgumentNode]>,
        knowledge_graph: Option<&KnowledgeGraph>,
        enable_structured_weaknesses: bool,
        gap_resolutions: Option<&[GapResolution]>,
        cov_summary: Option<&str>,
    ) -> String {
        let mut sections = vec![format!(
            r#"You are a rigorous fact-checking and quality-review editor (the Critic).

Evaluate the following draft against the user's query and the active research mode.
Flag logical gaps, unsupported claims, and source-quality issues. Be skeptical by
default — your job is to catch problems the Analyst missed, not to rubber-stamp
the draft.

## Mode

Active mode: {mode}. In `strict` mode, any unresolved contradiction must result in
REJECT. In `discovery` and `monitor` modes, speculation is allowed but must be
clearly labeled as such.

## User query

{query}

## Draft under review

{draft}"#
        )];

        if let Some(graph) = argument_graph {
            let lines: Vec<String> = graph
                .iter()
                .map(|n| {
                    format!(
                        "- [{}] {} (confidence: {:?}, depends_on: {:?})",
                        n.node_id, n.claim, n.confidence, n.depends_on
                    )
                })
                .collect();
            sections.push(format!("## Argument graph\n\n{}", lines.join("\n")));
        }

        if let Some(kg) = knowledge_graph {
            let lines: Vec<String> = kg
                .triples
                .iter()
                .map(|t| format!("- {} --[{}]--> {}", t.subject, t.predicate, t.object))
                .collect();
            if !lines.is_empty() {
                sections.push(format!("## Knowledge graph\n\n{}", lines.join("\n")));
            }
        }

        if let Some(gaps) = gap_resolutions {
            if !gaps.is_empty() {
                let lines: Vec<String> = gaps
                    .iter()
                    .map(|g| {
                        format!(
                            "- {} (resolved by {:?}, confidence: {:?})",
                            g.gap_description, g.resolved_by, g.confidence
                        )
                    })
                    .collect();
                sections.push(format!(
                    "## Gap resolutions (Tier-6 fallback content, weight accordingly)\n\n{}",
                    lines.join("\n")
                ));
            }
        }

        if let Some(summary) = cov_summary {
            sections.push(summary.to_string());
        }

        let weakness_instructions = if enable_structured_weaknesses {
            r#"## Structured weaknesses

List every specific weakness as a `StructuredWeakness` entry: `node_id` (if it
traces to a specific argument node), `severity` (info | warning | critical),
`category`, `description`, and `suggested_fix`. Two or more `critical` entries
will auto-escalate the verdict to REJECT regardless of the status you choose."#
        } else {
            "Structured weaknesses are disabled for this run; leave that field empty."
        };
        sections.push(weakness_instructions.to_string());

        sections.push(
            r#"## Output format

Return JSON matching the CriticReview schema:

```json
{
  "status": "APPROVE | WARN | REJECT",
  "critique": "...",
  "suggestions": ["..."],
  "mode_compliance": true,
  "logical_gaps": ["..."],
  "source_issues": ["..."],
  "structured_weaknesses": []
}
```"#
                .to_string(),
        );

        sections.join("\n\n---\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_prompt_embeds_draft_query_and_mode() {
        let builder = CriticPromptBuilder::new();
        let prompt = builder.build_review_prompt(
            "the draft text",
            "the query text",
            Mode::Strict,
            None,
            None,
            true,
            None,
            None,
        );
        assert!(prompt.contains("the draft text"));
        assert!(prompt.contains("the query text"));
        assert!(prompt.contains("strict"));
        assert!(prompt.contains("StructuredWeakness"));
    }

    #[test]
    fn cov_summary_is_appended_when_present() {
        let builder = CriticPromptBuilder::new();
        let prompt = builder.build_review_prompt(
            "d", "q", Mode::Discovery, None, None, false, None, Some("COV BLOCK MARKER"),
        );
        assert!(prompt.contains("COV BLOCK MARKER"));
        assert!(prompt.contains("disabled for this run"));
    }
}
