//! Resolution of oracle suggestions into concrete pairs.
//!
//! The oracle identifies Shopify items by platform id but Etsy items only
//! by free-text title, so Etsy sides are resolved through a [`NameMatcher`].
//! Suggestions are advisory: anything that cannot be resolved is dropped
//! without error and only counted.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ReconError;
use crate::match_set::MatchSet;
use crate::matcher::NameMatcher;
use crate::model::{PairProposal, Platform, StagingProduct};

// ---------------------------------------------------------------------------
// Oracle response
// ---------------------------------------------------------------------------

/// Suggested cross-platform link. `name` is the Etsy-side title.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkedSuggestion {
    #[serde(deserialize_with = "de_id")]
    pub s_id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub e_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShopifyOnlySuggestion {
    #[serde(deserialize_with = "de_id")]
    pub s_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EtsyOnlySuggestion {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub e_id: Option<String>,
    pub name: String,
}

/// The oracle's three suggestion lists, normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiSuggestions {
    pub linked: Vec<LinkedSuggestion>,
    pub shopify_only: Vec<ShopifyOnlySuggestion>,
    pub etsy_only: Vec<EtsyOnlySuggestion>,
}

#[derive(Deserialize)]
struct RawSuggestions {
    #[serde(default)]
    linked: Option<Vec<LinkedSuggestion>>,
    #[serde(default)]
    shopify_only: Option<Vec<ShopifyOnlySuggestion>>,
    #[serde(default)]
    etsy_only: Option<Vec<EtsyOnlySuggestion>>,
}

impl AiSuggestions {
    /// Normalize an oracle response body.
    ///
    /// Accepts a bare object or an array wrapping one. An empty array is an
    /// empty suggestion set; absent or null lists are empty lists.
    pub fn from_value(value: Value) -> Result<Self, ReconError> {
        let object = match value {
            Value::Object(_) => value,
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Ok(Self::default());
                }
                if items.len() > 1 {
                    log::warn!(
                        "oracle returned {} response objects; using the first",
                        items.len()
                    );
                }
                items.swap_remove(0)
            }
            other => {
                return Err(ReconError::MalformedResponse(format!(
                    "expected object or array, got {}",
                    json_kind(&other)
                )))
            }
        };

        if !object.is_object() {
            return Err(ReconError::MalformedResponse(format!(
                "array element is {}, expected object",
                json_kind(&object)
            )));
        }

        let raw: RawSuggestions = serde_json::from_value(object)
            .map_err(|e| ReconError::MalformedResponse(e.to_string()))?;

        Ok(Self {
            linked: raw.linked.unwrap_or_default(),
            shopify_only: raw.shopify_only.unwrap_or_default(),
            etsy_only: raw.etsy_only.unwrap_or_default(),
        })
    }

    pub fn from_json_str(input: &str) -> Result<Self, ReconError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ReconError::MalformedResponse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn len(&self) -> usize {
        self.linked.len() + self.shopify_only.len() + self.etsy_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            json_kind(&other)
        ))),
    }
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            json_kind(&other)
        ))),
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Proposals resolved from one oracle batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkOutcome {
    pub proposals: Vec<PairProposal>,
    /// Suggestions that referenced a missing, consumed or unmatchable item.
    pub dropped: usize,
}

/// Resolve oracle suggestions against the staged pools.
///
/// Items in `already_used` and items consumed earlier in the same batch are
/// never proposed again, so the oracle's own ordering decides conflicts.
pub fn resolve_ai_suggestions<M: NameMatcher>(
    suggestions: &AiSuggestions,
    shopify_pool: &[StagingProduct],
    etsy_pool: &[StagingProduct],
    already_used: &HashSet<String>,
    matcher: &M,
) -> LinkOutcome {
    let mut used_shopify = already_used.clone();
    let mut used_etsy = already_used.clone();
    let mut outcome = LinkOutcome::default();

    for suggestion in &suggestions.linked {
        let shopify = find_by_platform_id(shopify_pool, &suggestion.s_id, &used_shopify);
        let etsy = shopify.and_then(|_| matcher.find_best_match(&suggestion.name, etsy_pool, &used_etsy));
        match (shopify, etsy) {
            (Some(shopify), Some(etsy)) => {
                used_shopify.insert(shopify.id.clone());
                used_etsy.insert(etsy.id.clone());
                outcome.proposals.push(PairProposal::Linked {
                    shopify: shopify.clone(),
                    etsy: etsy.clone(),
                });
            }
            (found, _) => {
                log::debug!(
                    "dropping linked suggestion s_id={} name={:?}: {} side unresolved",
                    suggestion.s_id,
                    suggestion.name,
                    if found.is_none() { Platform::Shopify } else { Platform::Etsy },
                );
                outcome.dropped += 1;
            }
        }
    }

    for suggestion in &suggestions.shopify_only {
        match find_by_platform_id(shopify_pool, &suggestion.s_id, &used_shopify) {
            Some(item) => {
                used_shopify.insert(item.id.clone());
                outcome.proposals.push(PairProposal::Single {
                    platform: Platform::Shopify,
                    item: item.clone(),
                });
            }
            None => {
                log::debug!("dropping shopify_only suggestion s_id={}", suggestion.s_id);
                outcome.dropped += 1;
            }
        }
    }

    for suggestion in &suggestions.etsy_only {
        match matcher.find_best_match(&suggestion.name, etsy_pool, &used_etsy) {
            Some(item) => {
                used_etsy.insert(item.id.clone());
                outcome.proposals.push(PairProposal::Single {
                    platform: Platform::Etsy,
                    item: item.clone(),
                });
            }
            None => {
                log::debug!("dropping etsy_only suggestion name={:?}", suggestion.name);
                outcome.dropped += 1;
            }
        }
    }

    log::info!(
        "resolved {} of {} oracle suggestions ({} dropped)",
        outcome.proposals.len(),
        suggestions.len(),
        outcome.dropped
    );

    outcome
}

fn find_by_platform_id<'a>(
    pool: &'a [StagingProduct],
    platform_id: &str,
    used: &HashSet<String>,
) -> Option<&'a StagingProduct> {
    pool.iter().find(|item| {
        item.platform_id.as_deref() == Some(platform_id) && !used.contains(item.id.as_str())
    })
}

/// Pair ids created by [`apply_suggestions`] plus the dropped count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedSuggestions {
    pub created: Vec<String>,
    pub dropped: usize,
}

/// Resolve a batch against the set's current claims and merge it atomically.
pub fn apply_suggestions<M: NameMatcher>(
    set: &mut MatchSet,
    suggestions: &AiSuggestions,
    matcher: &M,
) -> Result<AppliedSuggestions, ReconError> {
    let outcome = resolve_ai_suggestions(
        suggestions,
        set.pool(Platform::Shopify),
        set.pool(Platform::Etsy),
        &set.claimed_ids(),
        matcher,
    );
    let created = set.merge(outcome.proposals)?;
    Ok(AppliedSuggestions {
        created,
        dropped: outcome.dropped,
    })
}

/// Link every unmatched Shopify item to its best unmatched Etsy counterpart
/// by name, in pool order. Returns the number of pairs created.
pub fn auto_pair_fuzzy<M: NameMatcher>(set: &mut MatchSet, matcher: &M) -> Result<usize, ReconError> {
    let mut used_etsy = set.claimed_ids();
    let mut proposals = Vec::new();

    for shopify in set.unmatched_for(Platform::Shopify, "") {
        if let Some(etsy) = matcher.find_best_match(&shopify.name, set.pool(Platform::Etsy), &used_etsy) {
            used_etsy.insert(etsy.id.clone());
            proposals.push(PairProposal::Linked {
                shopify: shopify.clone(),
                etsy: etsy.clone(),
            });
        }
    }

    let created = set.merge(proposals)?;
    log::info!("fuzzy auto-pairing linked {} item(s)", created.len());
    Ok(created.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::TokenOverlapMatcher;
    use serde_json::json;

    fn product(id: &str, platform_id: &str, name: &str, stock: i64) -> StagingProduct {
        let mut p = StagingProduct::new(id, name);
        p.platform_id = Some(platform_id.into());
        p.stock_quantity = Some(stock);
        p
    }

    fn pools() -> (Vec<StagingProduct>, Vec<StagingProduct>) {
        (
            vec![
                product("s1", "SP1", "Ceramic Vase", 10),
                product("s2", "SP2", "Red Mug", 3),
                product("s3", "SP3", "Gift Card", 0),
            ],
            vec![
                product("e1", "EP1", "Ceramic Vase Handmade", 4),
                product("e2", "EP2", "Red Mug", 5),
                product("e3", "EP3", "Knitted Blanket", 2),
            ],
        )
    }

    #[test]
    fn bare_object_and_wrapped_array_are_equivalent() {
        let body = json!({ "linked": [{ "s_id": "SP1", "e_id": "EP1", "name": "Ceramic Vase Handmade" }] });
        let a = AiSuggestions::from_value(body.clone()).unwrap();
        let b = AiSuggestions::from_value(json!([body])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.linked.len(), 1);
        assert!(a.shopify_only.is_empty());
    }

    #[test]
    fn missing_and_null_keys_are_empty() {
        let s = AiSuggestions::from_value(json!({ "linked": null })).unwrap();
        assert!(s.is_empty());
        let s = AiSuggestions::from_value(json!([])).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn numeric_ids_accepted() {
        let s = AiSuggestions::from_value(json!({
            "shopify_only": [{ "s_id": 4455, "name": "Gift Card" }],
            "etsy_only": [{ "e_id": 991, "name": "Knitted Blanket" }]
        }))
        .unwrap();
        assert_eq!(s.shopify_only[0].s_id, "4455");
        assert_eq!(s.etsy_only[0].e_id.as_deref(), Some("991"));
    }

    #[test]
    fn malformed_shapes_rejected() {
        for body in [json!("ok"), json!(42), json!([1]), json!({ "linked": "nope" }), json!({ "linked": [{ "name": "x" }] })] {
            let err = AiSuggestions::from_value(body).unwrap_err();
            assert!(matches!(err, ReconError::MalformedResponse(_)));
        }
        assert!(AiSuggestions::from_json_str("not json").is_err());
    }

    #[test]
    fn linked_requires_both_sides() {
        let (shopify, etsy) = pools();
        let suggestions = AiSuggestions {
            linked: vec![
                LinkedSuggestion { s_id: "SP1".into(), e_id: Some("EP1".into()), name: "Ceramic Vase Handmade".into() },
                LinkedSuggestion { s_id: "SP404".into(), e_id: None, name: "Red Mug".into() },
                LinkedSuggestion { s_id: "SP2".into(), e_id: None, name: "Garden Hose".into() },
            ],
            ..Default::default()
        };
        let out = resolve_ai_suggestions(&suggestions, &shopify, &etsy, &HashSet::new(), &TokenOverlapMatcher::default());
        assert_eq!(out.dropped, 2);
        assert_eq!(out.proposals.len(), 1);
        match &out.proposals[0] {
            PairProposal::Linked { shopify, etsy } => {
                assert_eq!(shopify.id, "s1");
                assert_eq!(etsy.id, "e1");
            }
            other => panic!("unexpected proposal {other:?}"),
        }
    }

    #[test]
    fn first_suggestion_consumes_item() {
        let (shopify, etsy) = pools();
        let suggestions = AiSuggestions {
            linked: vec![
                LinkedSuggestion { s_id: "SP2".into(), e_id: None, name: "Red Mug".into() },
                LinkedSuggestion { s_id: "SP2".into(), e_id: None, name: "Red Mug".into() },
            ],
            etsy_only: vec![EtsyOnlySuggestion { e_id: None, name: "Red Mug".into() }],
            ..Default::default()
        };
        let out = resolve_ai_suggestions(&suggestions, &shopify, &etsy, &HashSet::new(), &TokenOverlapMatcher::default());
        assert_eq!(out.proposals.len(), 1);
        assert_eq!(out.dropped, 2);
    }

    #[test]
    fn already_used_items_skipped() {
        let (shopify, etsy) = pools();
        let used: HashSet<String> = ["s3".to_string(), "e3".to_string()].into_iter().collect();
        let suggestions = AiSuggestions {
            shopify_only: vec![ShopifyOnlySuggestion { s_id: "SP3".into(), name: None }],
            etsy_only: vec![EtsyOnlySuggestion { e_id: Some("EP3".into()), name: "Knitted Blanket".into() }],
            ..Default::default()
        };
        let out = resolve_ai_suggestions(&suggestions, &shopify, &etsy, &used, &TokenOverlapMatcher::default());
        assert!(out.proposals.is_empty());
        assert_eq!(out.dropped, 2);
    }

    #[test]
    fn singles_resolved() {
        let (shopify, etsy) = pools();
        let suggestions = AiSuggestions {
            shopify_only: vec![ShopifyOnlySuggestion { s_id: "SP3".into(), name: Some("Gift Card".into()) }],
            etsy_only: vec![EtsyOnlySuggestion { e_id: Some("EP3".into()), name: "knitted blanket".into() }],
            ..Default::default()
        };
        let out = resolve_ai_suggestions(&suggestions, &shopify, &etsy, &HashSet::new(), &TokenOverlapMatcher::default());
        assert_eq!(out.dropped, 0);
        assert_eq!(
            out.proposals,
            vec![
                PairProposal::Single { platform: Platform::Shopify, item: shopify[2].clone() },
                PairProposal::Single { platform: Platform::Etsy, item: etsy[2].clone() },
            ]
        );
    }

    #[test]
    fn apply_merges_into_set() {
        let (shopify, etsy) = pools();
        let mut set = MatchSet::new(shopify, etsy);
        set.link_by_id("s2", "e2").unwrap();

        let suggestions = AiSuggestions::from_value(json!({
            "linked": [
                { "s_id": "SP1", "e_id": "EP1", "name": "Ceramic Vase Handmade" },
                { "s_id": "SP2", "e_id": "EP2", "name": "Red Mug" }
            ],
            "shopify_only": [{ "s_id": "SP3", "name": "Gift Card" }]
        }))
        .unwrap();

        let applied = apply_suggestions(&mut set, &suggestions, &TokenOverlapMatcher::default()).unwrap();
        assert_eq!(applied.created.len(), 2);
        assert_eq!(applied.dropped, 1);
        assert_eq!(set.pairs().len(), 3);
        assert_eq!(set.unmatched_for(Platform::Etsy, "").len(), 1);
    }

    #[test]
    fn fuzzy_auto_pairing() {
        let (shopify, etsy) = pools();
        let mut set = MatchSet::new(shopify, etsy);
        let created = auto_pair_fuzzy(&mut set, &TokenOverlapMatcher::default()).unwrap();
        // Vase and Mug pair up; Gift Card has no counterpart
        assert_eq!(created, 2);
        assert!(set.is_claimed("e1"));
        assert!(set.is_claimed("e2"));
        assert!(!set.is_claimed("s3"));
    }
}
