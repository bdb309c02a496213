use serde::Serialize;

use crate::error::ReconError;
use crate::match_set::MatchSet;
use crate::model::{MatchedPair, Platform, StagingProduct};
use crate::summary::{compute_summary, ReconSummary};

/// Which side of a linked pair currently holds more stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Excess {
    Shopify,
    Etsy,
    None,
}

impl std::fmt::Display for Excess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shopify => write!(f, "shopify"),
            Self::Etsy => write!(f, "etsy"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Editable stock state for one pair.
///
/// `original_*` is frozen when reconciliation starts and only `reset_all`
/// copies it back into the live values. The absent side of a single pair
/// is held at 0 and cannot be edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileItem {
    pub pair_id: String,
    pub shopify: Option<StagingProduct>,
    pub etsy: Option<StagingProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single: Option<Platform>,
    pub shopify_stock: i64,
    pub etsy_stock: i64,
    pub original_shopify_stock: i64,
    pub original_etsy_stock: i64,
}

impl ReconcileItem {
    pub fn from_pair(pair: &MatchedPair) -> Self {
        let shopify_stock = pair.shopify().map_or(0, StagingProduct::stock);
        let etsy_stock = pair.etsy().map_or(0, StagingProduct::stock);
        Self {
            pair_id: pair.id().to_string(),
            shopify: pair.shopify().cloned(),
            etsy: pair.etsy().cloned(),
            single: pair.single_platform(),
            shopify_stock,
            etsy_stock,
            original_shopify_stock: shopify_stock,
            original_etsy_stock: etsy_stock,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.single.is_none()
    }

    pub fn has_side(&self, platform: Platform) -> bool {
        match platform {
            Platform::Shopify => self.shopify.is_some(),
            Platform::Etsy => self.etsy.is_some(),
        }
    }

    pub fn stock(&self, platform: Platform) -> i64 {
        match platform {
            Platform::Shopify => self.shopify_stock,
            Platform::Etsy => self.etsy_stock,
        }
    }

    pub fn excess(&self) -> Excess {
        if !self.is_linked() {
            return Excess::None;
        }
        match self.shopify_stock.cmp(&self.etsy_stock) {
            std::cmp::Ordering::Greater => Excess::Shopify,
            std::cmp::Ordering::Less => Excess::Etsy,
            std::cmp::Ordering::Equal => Excess::None,
        }
    }

    /// Absolute stock gap of a linked pair; 0 for single pairs.
    pub fn diff(&self) -> u64 {
        if !self.is_linked() {
            return 0;
        }
        self.shopify_stock.abs_diff(self.etsy_stock)
    }

    /// Live stock differs from the snapshot on either side.
    pub fn is_changed(&self) -> bool {
        self.shopify_stock != self.original_shopify_stock
            || self.etsy_stock != self.original_etsy_stock
    }

    fn set_stock(&mut self, platform: Platform, value: i64) {
        match platform {
            Platform::Shopify => self.shopify_stock = value,
            Platform::Etsy => self.etsy_stock = value,
        }
    }

    /// Lower the higher side to the lower one. Returns whether anything moved.
    fn equalize(&mut self) -> bool {
        let target = self.shopify_stock.min(self.etsy_stock);
        let changed = self.shopify_stock != target || self.etsy_stock != target;
        self.shopify_stock = target;
        self.etsy_stock = target;
        changed
    }

    fn reset(&mut self) {
        self.shopify_stock = self.original_shopify_stock;
        self.etsy_stock = self.original_etsy_stock;
    }
}

/// Reconciliation state for every pair of a finalized match set, indexed by
/// pair id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileSession {
    items: Vec<ReconcileItem>,
}

impl ReconcileSession {
    /// Snapshot every pair's stock as both original and live value.
    pub fn from_pairs(pairs: &[MatchedPair]) -> Self {
        Self {
            items: pairs.iter().map(ReconcileItem::from_pair).collect(),
        }
    }

    pub fn from_match_set(set: &MatchSet) -> Self {
        Self::from_pairs(set.pairs())
    }

    pub fn items(&self) -> &[ReconcileItem] {
        &self.items
    }

    pub fn item(&self, pair_id: &str) -> Option<&ReconcileItem> {
        self.items.iter().find(|i| i.pair_id == pair_id)
    }

    /// Set one side's live stock, clamped at 0. The snapshot is untouched.
    pub fn edit(&mut self, pair_id: &str, platform: Platform, value: i64) -> Result<(), ReconError> {
        let item = self.item_mut(pair_id)?;
        if !item.has_side(platform) {
            return Err(ReconError::MissingSide {
                pair_id: pair_id.to_string(),
                platform,
            });
        }
        item.set_stock(platform, value.max(0));
        Ok(())
    }

    /// Equalize a linked pair to the lower of its two live stocks.
    /// Returns whether either side changed.
    pub fn sync_one(&mut self, pair_id: &str) -> Result<bool, ReconError> {
        let item = self.item_mut(pair_id)?;
        if !item.is_linked() {
            return Err(ReconError::NotLinked(pair_id.to_string()));
        }
        Ok(item.equalize())
    }

    /// Equalize every linked pair; single pairs are skipped.
    /// Returns the number of pairs that changed.
    pub fn sync_all(&mut self) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|i| i.is_linked()) {
            if item.equalize() {
                changed += 1;
            }
        }
        log::debug!("sync_all equalized {changed} pair(s)");
        changed
    }

    /// Discard all edits and syncs.
    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.reset();
        }
    }

    pub fn changed_items(&self) -> Vec<&ReconcileItem> {
        self.items.iter().filter(|i| i.is_changed()).collect()
    }

    pub fn summary(&self) -> ReconSummary {
        compute_summary(&self.items)
    }

    fn item_mut(&mut self, pair_id: &str) -> Result<&mut ReconcileItem, ReconError> {
        self.items
            .iter_mut()
            .find(|i| i.pair_id == pair_id)
            .ok_or_else(|| ReconError::UnknownPair(pair_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(id: &str, stock: Option<i64>) -> StagingProduct {
        let mut p = StagingProduct::new(id, id);
        p.stock_quantity = stock;
        p
    }

    fn session() -> ReconcileSession {
        ReconcileSession::from_pairs(&[
            MatchedPair::linked("p1", product("s1", Some(10)), product("e1", Some(4))),
            MatchedPair::linked("p2", product("s2", Some(2)), product("e2", None)),
            MatchedPair::single("p3", Platform::Shopify, product("s3", Some(7))),
            MatchedPair::linked("p4", product("s4", Some(5)), product("e4", Some(5))),
        ])
    }

    #[test]
    fn initialize_snapshots_stock() {
        let s = session();
        let p1 = s.item("p1").unwrap();
        assert_eq!((p1.shopify_stock, p1.etsy_stock), (10, 4));
        assert_eq!((p1.original_shopify_stock, p1.original_etsy_stock), (10, 4));

        let p2 = s.item("p2").unwrap();
        assert_eq!(p2.etsy_stock, 0);

        let p3 = s.item("p3").unwrap();
        assert_eq!((p3.shopify_stock, p3.etsy_stock), (7, 0));
    }

    #[test]
    fn excess_and_diff() {
        let s = session();
        assert_eq!(s.item("p1").unwrap().excess(), Excess::Shopify);
        assert_eq!(s.item("p1").unwrap().diff(), 6);
        assert_eq!(s.item("p2").unwrap().excess(), Excess::Shopify);
        assert_eq!(s.item("p3").unwrap().excess(), Excess::None);
        assert_eq!(s.item("p3").unwrap().diff(), 0);
        assert_eq!(s.item("p4").unwrap().excess(), Excess::None);
    }

    #[test]
    fn edit_clamps_and_keeps_snapshot() {
        let mut s = session();
        s.edit("p1", Platform::Etsy, 12).unwrap();
        assert_eq!(s.item("p1").unwrap().excess(), Excess::Etsy);
        s.edit("p1", Platform::Shopify, -3).unwrap();
        let p1 = s.item("p1").unwrap();
        assert_eq!(p1.shopify_stock, 0);
        assert_eq!(p1.original_shopify_stock, 10);
        assert_eq!(p1.original_etsy_stock, 4);
        assert!(p1.is_changed());
    }

    #[test]
    fn edit_missing_side_rejected() {
        let mut s = session();
        let err = s.edit("p3", Platform::Etsy, 5).unwrap_err();
        assert_eq!(err, ReconError::MissingSide { pair_id: "p3".into(), platform: Platform::Etsy });
        assert_eq!(s.edit("nope", Platform::Etsy, 5).unwrap_err(), ReconError::UnknownPair("nope".into()));
    }

    #[test]
    fn sync_one_reduces_higher_side() {
        let mut s = session();
        assert!(s.sync_one("p1").unwrap());
        let p1 = s.item("p1").unwrap();
        assert_eq!((p1.shopify_stock, p1.etsy_stock), (4, 4));
        assert_eq!(p1.diff(), 0);

        // Second call is a no-op
        assert!(!s.sync_one("p1").unwrap());
        assert_eq!(s.item("p1").unwrap().shopify_stock, 4);
    }

    #[test]
    fn sync_one_rejects_single() {
        let mut s = session();
        assert_eq!(s.sync_one("p3").unwrap_err(), ReconError::NotLinked("p3".into()));
    }

    #[test]
    fn sync_all_skips_singles() {
        let mut s = session();
        assert_eq!(s.sync_all(), 2);
        assert_eq!(s.item("p1").unwrap().shopify_stock, 4);
        assert_eq!(s.item("p2").unwrap().shopify_stock, 0);
        assert_eq!(s.item("p3").unwrap().shopify_stock, 7);
        assert_eq!(s.item("p4").unwrap().shopify_stock, 5);
        assert_eq!(s.changed_items().len(), 2);
    }

    #[test]
    fn reset_restores_snapshot() {
        let mut s = session();
        let before = s.clone();
        s.edit("p3", Platform::Shopify, 1).unwrap();
        s.sync_all();
        s.reset_all();
        assert_eq!(s, before);
        assert!(s.changed_items().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Edit(usize, bool, i64),
        Sync(usize),
        SyncAll,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4usize, any::<bool>(), -20i64..50).prop_map(|(i, shop, v)| Op::Edit(i, shop, v)),
            (0..4usize).prop_map(Op::Sync),
            Just(Op::SyncAll),
        ]
    }

    fn arb_session() -> impl Strategy<Value = ReconcileSession> {
        prop::collection::vec((prop::option::of(0i64..100), prop::option::of(0i64..100), any::<bool>()), 1..4)
            .prop_map(|rows| {
                let pairs: Vec<_> = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, (s, e, single))| {
                        if single {
                            MatchedPair::single(format!("p{i}"), Platform::Etsy, product(&format!("e{i}"), e))
                        } else {
                            MatchedPair::linked(format!("p{i}"), product(&format!("s{i}"), s), product(&format!("e{i}"), e))
                        }
                    })
                    .collect();
                ReconcileSession::from_pairs(&pairs)
            })
    }

    proptest! {
        #[test]
        fn reset_restores_exactly(mut s in arb_session(), ops in prop::collection::vec(arb_op(), 0..30)) {
            let snapshot = s.clone();
            for op in ops {
                let _ = match op {
                    Op::Edit(i, shop, v) => {
                        let platform = if shop { Platform::Shopify } else { Platform::Etsy };
                        s.edit(&format!("p{i}"), platform, v)
                    }
                    Op::Sync(i) => s.sync_one(&format!("p{i}")).map(|_| ()),
                    Op::SyncAll => {
                        s.sync_all();
                        Ok(())
                    }
                };
            }
            s.reset_all();
            prop_assert_eq!(s, snapshot);
        }

        #[test]
        fn sync_one_is_min_and_idempotent(mut s in arb_session()) {
            let ids: Vec<String> = s.items().iter().filter(|i| i.is_linked()).map(|i| i.pair_id.clone()).collect();
            for id in ids {
                let prev = s.item(&id).unwrap().clone();
                s.sync_one(&id).unwrap();
                let low = prev.shopify_stock.min(prev.etsy_stock);
                let now = s.item(&id).unwrap().clone();
                prop_assert_eq!(now.shopify_stock, low);
                prop_assert_eq!(now.etsy_stock, low);
                prop_assert!(!s.sync_one(&id).unwrap());
            }
        }
    }
}
