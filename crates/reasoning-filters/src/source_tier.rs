//! Hard filter implementing tier-based source filtering and description
//! enrichment, ahead of the Analyst stage.

use std::collections::HashMap;

use reasoning_contracts::{
    LegacySourceTuple, Mode, ModeConfigs, RawSourceItem, ReasoningError, ReasoningMetadata,
    SourceItem, TierInfo, TIER_6, UNKNOWN_TIER,
};

/// Tier filter state: the `site -> (tier, type)` table loaded from
/// configuration.
pub struct SourceTierFilter {
    source_tiers: HashMap<String, TierInfo>,
}

const DISCOVERY_FALLBACK_MAX_TIER: i32 = 5;
const FALLBACK_WARNING: &str =
    "原始為 Strict 模式，但過濾後無來源，已自動切換為 Discovery 模式";

impl SourceTierFilter {
    pub fn new(source_tiers: HashMap<String, TierInfo>) -> Self {
        Self { source_tiers }
    }

    fn tier_info(&self, site: &str) -> (i32, String) {
        match self.source_tiers.get(site) {
            Some(info) => (info.tier, info.source_type.clone()),
            None => (UNKNOWN_TIER, "unknown".to_string()),
        }
    }

    pub fn tier(&self, site: &str) -> i32 {
        self.tier_info(site).0
    }

    /// Filter and enrich a batch of retrieved items for the given mode.
    ///
    /// Only `strict` mode drops items on tier; `discovery` and `monitor`
    /// enrich everything unconditionally, matching the upstream ranking
    /// pipeline's behavior of letting looser modes see the full candidate
    /// pool with tier metadata attached.
    ///
    /// When strict mode filters out every item, falls back to a
    /// discovery-equivalent pass (`tier <= 5`) and stamps each surviving
    /// item with a fallback warning. If that also yields nothing, returns
    /// [`ReasoningError::NoValidSources`].
    pub fn filter_and_enrich(
        &self,
        items: Vec<RawSourceItem>,
        mode: Mode,
        mode_configs: &ModeConfigs,
    ) -> Result<Vec<SourceItem>, ReasoningError> {
        let max_tier = mode_configs
            .get(mode)
            .map(|c| c.max_tier)
            .unwrap_or(DISCOVERY_FALLBACK_MAX_TIER);

        if mode != Mode::Strict {
            return Ok(items
                .into_iter()
                .map(|item| self.enrich(item, None))
                .collect());
        }

        let mut filtered: Vec<SourceItem> = Vec::new();
        for item in &items {
            let site = extract_site(item);
            let (tier, _) = self.tier_info(&site);
            if tier > max_tier || tier == UNKNOWN_TIER {
                continue;
            }
            filtered.push(self.enrich(item.clone(), None));
        }

        if filtered.is_empty() {
            tracing::warn!("strict mode filtered out all sources, falling back to discovery");
            for item in items {
                let site = extract_site(&item);
                let (tier, _) = self.tier_info(&site);
                if tier <= DISCOVERY_FALLBACK_MAX_TIER {
                    filtered.push(self.enrich(item, Some(FALLBACK_WARNING.to_string())));
                }
            }
            if filtered.is_empty() {
                return Err(ReasoningError::NoValidSources);
            }
        }

        Ok(filtered)
    }

    fn enrich(&self, item: RawSourceItem, fallback_warning: Option<String>) -> SourceItem {
        let mut source_item = normalize(item);
        let site = source_item.site.clone();
        let (tier, source_type) = self.tier_info(&site);

        let prefix = tier_prefix(tier, &source_type);
        source_item.description = format!("{prefix} {}", source_item.description)
            .trim()
            .to_string();

        source_item.reasoning_metadata = Some(ReasoningMetadata {
            tier,
            source_type,
            original_source: site,
            fallback_warning,
        });

        source_item
    }
}

fn extract_site(item: &RawSourceItem) -> String {
    match item {
        RawSourceItem::Structured(s) => s.site.trim().to_string(),
        RawSourceItem::Legacy(t) => t.site.trim().to_string(),
    }
}

fn normalize(item: RawSourceItem) -> SourceItem {
    match item {
        RawSourceItem::Structured(s) => s,
        RawSourceItem::Legacy(LegacySourceTuple {
            url,
            schema_json,
            title,
            site,
            ..
        }) => {
            let description = serde_json::from_str::<serde_json::Value>(&schema_json)
                .ok()
                .and_then(|v| v.get("description").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or_default();
            SourceItem {
                url,
                title,
                description,
                site,
                reasoning_metadata: None,
            }
        }
    }
}

fn tier_prefix(tier: i32, source_type: &str) -> String {
    if tier == UNKNOWN_TIER {
        "[Tier Unknown | unknown]".to_string()
    } else if tier == TIER_6 {
        format!("[Tier 6 | {source_type}]")
    } else {
        format!("[Tier {tier} | {source_type}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_contracts::SourceItem as SI;

    fn tiers() -> HashMap<String, TierInfo> {
        let mut m = HashMap::new();
        m.insert(
            "gov.example".to_string(),
            TierInfo {
                tier: 1,
                source_type: "official".to_string(),
            },
        );
        m.insert(
            "blog.example".to_string(),
            TierInfo {
                tier: 4,
                source_type: "digital".to_string(),
            },
        );
        m
    }

    #[test]
    fn strict_mode_drops_unknown_and_low_tier_sources() {
        let filter = SourceTierFilter::new(tiers());
        let items = vec![
            RawSourceItem::Structured(SI::new("u1", "t1", "gov.example")),
            RawSourceItem::Structured(SI::new("u2", "t2", "blog.example")),
            RawSourceItem::Structured(SI::new("u3", "t3", "unknown.example")),
        ];
        let configs = ModeConfigs::default();
        let out = filter
            .filter_and_enrich(items, Mode::Strict, &configs)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].site, "gov.example");
    }

    #[test]
    fn strict_mode_falls_back_to_discovery_when_empty() {
        let filter = SourceTierFilter::new(tiers());
        let items = vec![RawSourceItem::Structured(SI::new(
            "u1",
            "t1",
            "blog.example",
        ))];
        let configs = ModeConfigs::default();
        let out = filter
            .filter_and_enrich(items, Mode::Strict, &configs)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].reasoning_metadata.as_ref().unwrap().fallback_warning,
            Some(FALLBACK_WARNING.to_string())
        );
    }

    #[test]
    fn strict_mode_errors_when_nothing_survives_fallback() {
        let filter = SourceTierFilter::new(tiers());
        let items = vec![RawSourceItem::Structured(SI::new(
            "u1",
            "t1",
            "totally.unknown",
        ))];
        let configs = ModeConfigs::default();
        let result = filter.filter_and_enrich(items, Mode::Strict, &configs);
        assert!(matches!(result, Err(ReasoningError::NoValidSources)));
    }

    #[test]
    fn discovery_mode_keeps_unknown_tier_sources() {
        let filter = SourceTierFilter::new(tiers());
        let items = vec![RawSourceItem::Structured(SI::new(
            "u1",
            "t1",
            "totally.unknown",
        ))];
        let configs = ModeConfigs::default();
        let out = filter
            .filter_and_enrich(items, Mode::Discovery, &configs)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].reasoning_metadata.as_ref().unwrap().tier, UNKNOWN_TIER);
    }

    #[test]
    fn legacy_tuple_items_are_normalized_with_schema_description() {
        let filter = SourceTierFilter::new(tiers());
        let items = vec![RawSourceItem::Legacy(LegacySourceTuple {
            url: "u1".to_string(),
            schema_json: r#"{"description": "legacy desc"}"#.to_string(),
            title: "t1".to_string(),
            site: "gov.example".to_string(),
            vector: None,
        })];
        let configs = ModeConfigs::default();
        let out = filter
            .filter_and_enrich(items, Mode::Strict, &configs)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].description.ends_with("legacy desc"));
    }
}
