use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Shopify,
    Etsy,
}

impl Platform {
    /// The counterpart marketplace.
    pub fn other(self) -> Self {
        match self {
            Self::Shopify => Self::Etsy,
            Self::Etsy => Self::Shopify,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shopify => write!(f, "shopify"),
            Self::Etsy => write!(f, "etsy"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shopify" => Ok(Self::Shopify),
            "etsy" => Ok(Self::Etsy),
            other => Err(format!("unknown platform: {other} (expected shopify or etsy)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One product as staged from a single platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingProduct {
    /// Internal surrogate key. Unique within a session.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    /// Platform-native id (Shopify inventory item id, Etsy listing id).
    #[serde(default)]
    pub platform_id: Option<String>,
}

impl StagingProduct {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sku: None,
            price: None,
            image_url: None,
            stock_quantity: None,
            status: None,
            platform_id: None,
        }
    }

    /// Stock as seen by reconciliation; absent quantities count as 0.
    pub fn stock(&self) -> i64 {
        self.stock_quantity.unwrap_or(0)
    }

    /// Case-insensitive substring match against name or sku. Only the empty
    /// query matches everything; whitespace is matched literally.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self
                .sku
                .as_deref()
                .is_some_and(|sku| sku.to_lowercase().contains(&query))
    }
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

/// A correspondence between staged items.
///
/// Either both sides are populated (linked) or `single` names the only
/// populated side. Construction goes through [`MatchedPair::linked`] and
/// [`MatchedPair::single`], and deserialization re-checks the invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPair")]
pub struct MatchedPair {
    id: String,
    shopify: Option<StagingProduct>,
    etsy: Option<StagingProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    single: Option<Platform>,
}

#[derive(Deserialize)]
struct RawPair {
    id: String,
    #[serde(default)]
    shopify: Option<StagingProduct>,
    #[serde(default)]
    etsy: Option<StagingProduct>,
    #[serde(default)]
    single: Option<Platform>,
}

impl TryFrom<RawPair> for MatchedPair {
    type Error = ReconError;

    fn try_from(raw: RawPair) -> Result<Self, Self::Error> {
        match (raw.shopify, raw.etsy, raw.single) {
            (Some(shopify), Some(etsy), None) => Ok(Self::linked(raw.id, shopify, etsy)),
            (Some(item), None, Some(Platform::Shopify)) => {
                Ok(Self::single(raw.id, Platform::Shopify, item))
            }
            (None, Some(item), Some(Platform::Etsy)) => {
                Ok(Self::single(raw.id, Platform::Etsy, item))
            }
            (s, e, single) => Err(ReconError::InvalidPair(format!(
                "pair '{}': shopify={}, etsy={}, single={}",
                raw.id,
                s.is_some(),
                e.is_some(),
                single.map(|p| p.to_string()).unwrap_or_else(|| "none".into()),
            ))),
        }
    }
}

impl MatchedPair {
    pub fn linked(id: impl Into<String>, shopify: StagingProduct, etsy: StagingProduct) -> Self {
        Self {
            id: id.into(),
            shopify: Some(shopify),
            etsy: Some(etsy),
            single: None,
        }
    }

    pub fn single(id: impl Into<String>, platform: Platform, item: StagingProduct) -> Self {
        let (shopify, etsy) = match platform {
            Platform::Shopify => (Some(item), None),
            Platform::Etsy => (None, Some(item)),
        };
        Self {
            id: id.into(),
            shopify,
            etsy,
            single: Some(platform),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shopify(&self) -> Option<&StagingProduct> {
        self.shopify.as_ref()
    }

    pub fn etsy(&self) -> Option<&StagingProduct> {
        self.etsy.as_ref()
    }

    /// The platform of a single pair, `None` when linked.
    pub fn single_platform(&self) -> Option<Platform> {
        self.single
    }

    pub fn is_linked(&self) -> bool {
        self.single.is_none()
    }

    /// Internal ids of every item this pair claims.
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.shopify
            .iter()
            .chain(self.etsy.iter())
            .map(|item| item.id.as_str())
    }

    pub fn claims(&self, item_id: &str) -> bool {
        self.item_ids().any(|id| id == item_id)
    }
}

/// A pair produced by the linker or auto-pairing, before it receives an id.
#[derive(Debug, Clone, PartialEq)]
pub enum PairProposal {
    Linked {
        shopify: StagingProduct,
        etsy: StagingProduct,
    },
    Single {
        platform: Platform,
        item: StagingProduct,
    },
}

impl PairProposal {
    pub fn item_ids(&self) -> Vec<&str> {
        match self {
            Self::Linked { shopify, etsy } => vec![shopify.id.as_str(), etsy.id.as_str()],
            Self::Single { item, .. } => vec![item.id.as_str()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_defaults_missing_fields() {
        let json = r#"{"id":"s1","name":"Ceramic Vase"}"#;
        let item: StagingProduct = serde_json::from_str(json).unwrap();
        assert_eq!(item.stock(), 0);
        assert!(item.platform_id.is_none());
    }

    #[test]
    fn product_camel_case_fields() {
        let json = r#"{"id":"s1","name":"Vase","stockQuantity":7,"platformId":"SP1","imageUrl":null}"#;
        let item: StagingProduct = serde_json::from_str(json).unwrap();
        assert_eq!(item.stock(), 7);
        assert_eq!(item.platform_id.as_deref(), Some("SP1"));
    }

    #[test]
    fn search_matches_name_or_sku() {
        let mut item = StagingProduct::new("s1", "Red Mug");
        item.sku = Some("MUG-RED-01".into());
        assert!(item.matches_search("mug"));
        assert!(item.matches_search("red-01"));
        assert!(item.matches_search(""));
        assert!(!item.matches_search("vase"));
        assert!(item.matches_search("red mug"));
        assert!(!item.matches_search("   "));
    }

    #[test]
    fn pair_rejects_single_with_both_sides() {
        let json = r#"{
            "id": "p1",
            "shopify": {"id":"s1","name":"A"},
            "etsy": {"id":"e1","name":"A"},
            "single": "shopify"
        }"#;
        assert!(serde_json::from_str::<MatchedPair>(json).is_err());
    }

    #[test]
    fn pair_rejects_empty() {
        let json = r#"{"id": "p1"}"#;
        assert!(serde_json::from_str::<MatchedPair>(json).is_err());
    }

    #[test]
    fn single_pair_serializes_marker() {
        let pair = MatchedPair::single("p1", Platform::Etsy, StagingProduct::new("e1", "Scarf"));
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["single"], "etsy");
        assert!(json["shopify"].is_null());

        let back: MatchedPair = serde_json::from_value(json).unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn platform_parse() {
        assert_eq!("Shopify".parse::<Platform>().unwrap(), Platform::Shopify);
        assert!("amazon".parse::<Platform>().is_err());
        assert_eq!(Platform::Etsy.other(), Platform::Shopify);
    }
}
