//! Analyst prompt builder: synthesizes a research draft and argument graph
//! from the filtered, tier-enriched source set.

use reasoning_contracts::{Mode, SourceItem};

#[derive(Debug, Default)]
pub struct AnalystPromptBuilder;

impl AnalystPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_analysis_prompt(&self, query: &str, mode: Mode, sources: &[SourceItem]) -> String {
        let source_block = sources
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    "[{}] {} — {} ({})",
                    i + 1,
                    s.title,
                    s.description,
                    s.site
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let speculation_note = match mode {
            Mode::Strict => "Speculation is not permitted. Every claim must trace to a cited source.",
            Mode::Discovery | Mode::Monitor => {
                "Speculation is allowed when clearly labeled, but still prefer cited claims."
            }
        };

        format!(
            r#"You are the Analyst in a research pipeline. Synthesize the following sources
into a coherent draft answering the user's query, and produce an explicit
argument graph of your reasoning.

## User query

{query}

## Mode

{mode}. {speculation_note}

## Available sources

{source_block}

## Task

1. Write a draft that answers the query, citing sources by their bracketed
   index (e.g. "[2]").
2. Build an argument graph: one `ArgumentNode` per atomic claim, each with a
   `confidence` (low | medium | high), a `depends_on` list of the node ids
   it logically rests on (empty for axioms), and any `logic_warnings` you
   are already aware of.
3. List every source index you actually cited as `citations` — this is the
   authoritative whitelist; nothing downstream may cite outside it.
4. If a gap in the sources was filled using general knowledge or a web
   reference rather than a ranked source, record it as a `gap_resolutions`
   entry instead of inventing a citation.

## Output format

Return JSON matching the AnalystOutput schema:

```json
{{
  "draft": "...",
  "argument_graph": [
    {{"node_id": "n1", "claim": "...", "confidence": "high", "depends_on": []}}
  ],
  "citations": [1, 2],
  "gap_resolutions": []
}}
```"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_contracts::SourceItem as SI;

    #[test]
    fn strict_mode_forbids_speculation() {
        let builder = AnalystPromptBuilder::new();
        let sources = vec![SI::new("u", "t", "s")];
        let prompt = builder.build_analysis_prompt("q", Mode::Strict, &sources);
        assert!(prompt.contains("not permitted"));
    }
}
