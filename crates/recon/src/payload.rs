use serde::{Deserialize, Serialize};

use crate::model::Platform;
use crate::reconcile::ReconcileItem;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Stock of a linked pair, keyed by both platform-native ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedStock {
    pub shopify_id: Option<String>,
    pub etsy_id: Option<String>,
    pub shopify_stock: i64,
    pub etsy_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopifyStock {
    pub shopify_id: Option<String>,
    pub shopify_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtsyStock {
    pub etsy_id: Option<String>,
    pub etsy_stock: i64,
}

/// One snapshot, partitioned by pairing cardinality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockGroups {
    pub synced: Vec<LinkedStock>,
    pub shopify_only: Vec<ShopifyStock>,
    pub etsy_only: Vec<EtsyStock>,
}

impl StockGroups {
    pub fn len(&self) -> usize {
        self.synced.len() + self.shopify_only.len() + self.etsy_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Original and current snapshots with identical grouping and id fields,
/// so the receiver can diff them entry by entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub original_stocks: StockGroups,
    pub current_stocks: StockGroups,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub fn build_payload(items: &[ReconcileItem]) -> SyncPayload {
    let mut payload = SyncPayload::default();

    for item in items {
        let shopify_id = platform_id(item, Platform::Shopify);
        let etsy_id = platform_id(item, Platform::Etsy);

        match item.single {
            None => {
                payload.original_stocks.synced.push(LinkedStock {
                    shopify_id: shopify_id.clone(),
                    etsy_id: etsy_id.clone(),
                    shopify_stock: item.original_shopify_stock,
                    etsy_stock: item.original_etsy_stock,
                });
                payload.current_stocks.synced.push(LinkedStock {
                    shopify_id,
                    etsy_id,
                    shopify_stock: item.shopify_stock,
                    etsy_stock: item.etsy_stock,
                });
            }
            Some(Platform::Shopify) => {
                payload.original_stocks.shopify_only.push(ShopifyStock {
                    shopify_id: shopify_id.clone(),
                    shopify_stock: item.original_shopify_stock,
                });
                payload.current_stocks.shopify_only.push(ShopifyStock {
                    shopify_id,
                    shopify_stock: item.shopify_stock,
                });
            }
            Some(Platform::Etsy) => {
                payload.original_stocks.etsy_only.push(EtsyStock {
                    etsy_id: etsy_id.clone(),
                    etsy_stock: item.original_etsy_stock,
                });
                payload.current_stocks.etsy_only.push(EtsyStock {
                    etsy_id,
                    etsy_stock: item.etsy_stock,
                });
            }
        }
    }

    payload
}

fn platform_id(item: &ReconcileItem, platform: Platform) -> Option<String> {
    let side = match platform {
        Platform::Shopify => item.shopify.as_ref(),
        Platform::Etsy => item.etsy.as_ref(),
    }?;
    if side.platform_id.is_none() {
        log::warn!(
            "pair {}: {platform} item '{}' has no platform id",
            item.pair_id,
            side.id
        );
    }
    side.platform_id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchedPair, StagingProduct};
    use crate::reconcile::ReconcileSession;

    fn product(id: &str, platform_id: Option<&str>, stock: i64) -> StagingProduct {
        let mut p = StagingProduct::new(id, id);
        p.platform_id = platform_id.map(String::from);
        p.stock_quantity = Some(stock);
        p
    }

    fn session() -> ReconcileSession {
        ReconcileSession::from_pairs(&[
            MatchedPair::linked("p1", product("s1", Some("SP1"), 10), product("e1", Some("EP1"), 4)),
            MatchedPair::single("p2", Platform::Shopify, product("s2", Some("SP2"), 3)),
            MatchedPair::single("p3", Platform::Etsy, product("e3", None, 8)),
        ])
    }

    #[test]
    fn groups_by_cardinality() {
        let mut s = session();
        s.sync_one("p1").unwrap();
        s.edit("p3", Platform::Etsy, 6).unwrap();
        let payload = build_payload(s.items());

        assert_eq!(payload.original_stocks.synced.len(), 1);
        assert_eq!(payload.original_stocks.shopify_only.len(), 1);
        assert_eq!(payload.original_stocks.etsy_only.len(), 1);

        let orig = &payload.original_stocks.synced[0];
        assert_eq!((orig.shopify_stock, orig.etsy_stock), (10, 4));
        let cur = &payload.current_stocks.synced[0];
        assert_eq!((cur.shopify_stock, cur.etsy_stock), (4, 4));
        assert_eq!(cur.shopify_id.as_deref(), Some("SP1"));
        assert_eq!(cur.etsy_id.as_deref(), Some("EP1"));

        assert_eq!(payload.original_stocks.etsy_only[0].etsy_stock, 8);
        assert_eq!(payload.current_stocks.etsy_only[0].etsy_stock, 6);
        assert!(payload.current_stocks.etsy_only[0].etsy_id.is_none());
    }

    #[test]
    fn snapshots_mirror_shape() {
        let payload = build_payload(session().items());
        let json = serde_json::to_value(&payload).unwrap();
        let orig = json["original_stocks"].as_object().unwrap();
        let cur = json["current_stocks"].as_object().unwrap();
        assert_eq!(orig.keys().collect::<Vec<_>>(), cur.keys().collect::<Vec<_>>());
        for group in ["synced", "shopify_only", "etsy_only"] {
            let o = orig[group].as_array().unwrap();
            let c = cur[group].as_array().unwrap();
            assert_eq!(o.len(), c.len());
            for (a, b) in o.iter().zip(c) {
                let ak: Vec<_> = a.as_object().unwrap().keys().collect();
                let bk: Vec<_> = b.as_object().unwrap().keys().collect();
                assert_eq!(ak, bk);
            }
        }
        assert_eq!(json["current_stocks"]["shopify_only"][0]["shopify_id"], "SP2");
    }

    #[test]
    fn empty_items_empty_payload() {
        let payload = build_payload(&[]);
        assert!(payload.original_stocks.is_empty());
        assert!(payload.current_stocks.is_empty());
    }
}
