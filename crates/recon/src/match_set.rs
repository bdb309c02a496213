use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{MatchedPair, PairProposal, Platform, StagingProduct};

/// Bipartite pairing state for one session: both staged pools plus the
/// live pairs drawn from them.
///
/// No item id is ever claimed by more than one pair. Unmatched pools are
/// derived on every call and never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawMatchSet")]
pub struct MatchSet {
    shopify_pool: Vec<StagingProduct>,
    etsy_pool: Vec<StagingProduct>,
    pairs: Vec<MatchedPair>,
    next_id: u64,
}

#[derive(Deserialize)]
struct RawMatchSet {
    #[serde(default)]
    shopify_pool: Vec<StagingProduct>,
    #[serde(default)]
    etsy_pool: Vec<StagingProduct>,
    #[serde(default)]
    pairs: Vec<MatchedPair>,
    #[serde(default)]
    next_id: u64,
}

impl TryFrom<RawMatchSet> for MatchSet {
    type Error = ReconError;

    fn try_from(raw: RawMatchSet) -> Result<Self, Self::Error> {
        let mut set = MatchSet::new(raw.shopify_pool, raw.etsy_pool);
        set.next_id = raw.next_id;
        for pair in raw.pairs {
            if set.pair(pair.id()).is_some() {
                return Err(ReconError::InvalidPair(format!("duplicate pair id '{}'", pair.id())));
            }
            set.check_unclaimed(pair.item_ids())?;
            set.pairs.push(pair);
        }
        Ok(set)
    }
}

/// Counts for a match set at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub linked: usize,
    pub shopify_only: usize,
    pub etsy_only: usize,
    pub unmatched_shopify: usize,
    pub unmatched_etsy: usize,
}

impl MatchSet {
    pub fn new(shopify_pool: Vec<StagingProduct>, etsy_pool: Vec<StagingProduct>) -> Self {
        Self {
            shopify_pool,
            etsy_pool,
            pairs: Vec::new(),
            next_id: 0,
        }
    }

    pub fn pool(&self, platform: Platform) -> &[StagingProduct] {
        match platform {
            Platform::Shopify => &self.shopify_pool,
            Platform::Etsy => &self.etsy_pool,
        }
    }

    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    pub fn pair(&self, pair_id: &str) -> Option<&MatchedPair> {
        self.pairs.iter().find(|p| p.id() == pair_id)
    }

    pub fn is_claimed(&self, item_id: &str) -> bool {
        self.pairs.iter().any(|p| p.claims(item_id))
    }

    /// Ids of every item currently claimed by a pair.
    pub fn claimed_ids(&self) -> HashSet<String> {
        self.pairs
            .iter()
            .flat_map(|p| p.item_ids())
            .map(String::from)
            .collect()
    }

    /// Link a Shopify item with an Etsy item.
    pub fn add_pair(
        &mut self,
        shopify: StagingProduct,
        etsy: StagingProduct,
    ) -> Result<String, ReconError> {
        self.check_unclaimed([shopify.id.as_str(), etsy.id.as_str()])?;
        let id = self.fresh_id();
        self.pairs.push(MatchedPair::linked(id.clone(), shopify, etsy));
        Ok(id)
    }

    /// Record an item that exists on only one platform.
    pub fn add_single(
        &mut self,
        item: StagingProduct,
        platform: Platform,
    ) -> Result<String, ReconError> {
        self.check_unclaimed([item.id.as_str()])?;
        let id = self.fresh_id();
        self.pairs.push(MatchedPair::single(id.clone(), platform, item));
        Ok(id)
    }

    /// Delete a pair, returning its items to the unmatched pools.
    /// Unknown ids are a no-op.
    pub fn remove_pair(&mut self, pair_id: &str) -> Option<MatchedPair> {
        let idx = self.pairs.iter().position(|p| p.id() == pair_id)?;
        Some(self.pairs.remove(idx))
    }

    /// Link two pooled items by their internal ids.
    pub fn link_by_id(&mut self, shopify_id: &str, etsy_id: &str) -> Result<String, ReconError> {
        let shopify = self.pooled(Platform::Shopify, shopify_id)?.clone();
        let etsy = self.pooled(Platform::Etsy, etsy_id)?.clone();
        self.add_pair(shopify, etsy)
    }

    /// Mark a pooled item as single-platform by its internal id.
    pub fn single_by_id(&mut self, platform: Platform, item_id: &str) -> Result<String, ReconError> {
        let item = self.pooled(platform, item_id)?.clone();
        self.add_single(item, platform)
    }

    /// Pool items not claimed by any pair, optionally filtered by a
    /// case-insensitive substring of name or sku.
    pub fn unmatched_for(&self, platform: Platform, search: &str) -> Vec<&StagingProduct> {
        let claimed = self.claimed_ids();
        self.pool(platform)
            .iter()
            .filter(|item| !claimed.contains(item.id.as_str()))
            .filter(|item| item.matches_search(search))
            .collect()
    }

    /// Apply a batch of proposals all-or-nothing. On any duplicate claim the
    /// set is left exactly as it was.
    pub fn merge(&mut self, proposals: Vec<PairProposal>) -> Result<Vec<String>, ReconError> {
        let mut staged = self.clone();
        let mut created = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let id = match proposal {
                PairProposal::Linked { shopify, etsy } => staged.add_pair(shopify, etsy)?,
                PairProposal::Single { platform, item } => staged.add_single(item, platform)?,
            };
            created.push(id);
        }
        *self = staged;
        Ok(created)
    }

    pub fn stats(&self) -> MatchStats {
        let mut stats = MatchStats {
            linked: 0,
            shopify_only: 0,
            etsy_only: 0,
            unmatched_shopify: self.unmatched_for(Platform::Shopify, "").len(),
            unmatched_etsy: self.unmatched_for(Platform::Etsy, "").len(),
        };
        for pair in &self.pairs {
            match pair.single_platform() {
                None => stats.linked += 1,
                Some(Platform::Shopify) => stats.shopify_only += 1,
                Some(Platform::Etsy) => stats.etsy_only += 1,
            }
        }
        stats
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn check_unclaimed<'a>(
        &self,
        item_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ReconError> {
        for item_id in item_ids {
            if self.is_claimed(item_id) {
                return Err(ReconError::DuplicateClaim {
                    item_id: item_id.to_string(),
                });
            }
        }
        Ok(())
    }

    fn pooled(&self, platform: Platform, item_id: &str) -> Result<&StagingProduct, ReconError> {
        self.pool(platform)
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ReconError::UnknownItem {
                platform,
                item_id: item_id.to_string(),
            })
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("pair-{}", self.next_id);
            if self.pair(&id).is_none() {
                return id;
            }
        }
    }
}
