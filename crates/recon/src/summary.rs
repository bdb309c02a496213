use serde::Serialize;

use crate::model::Platform;
use crate::reconcile::ReconcileItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_pairs: usize,
    pub linked: usize,
    pub shopify_only: usize,
    pub etsy_only: usize,
    /// Linked pairs whose live stocks still differ.
    pub out_of_sync: usize,
    /// Pairs whose live stock differs from the snapshot.
    pub changed: usize,
    /// Sum of live stock gaps across linked pairs.
    pub total_excess: u64,
}

/// Compute summary statistics from reconcile items.
pub fn compute_summary(items: &[ReconcileItem]) -> ReconSummary {
    let mut summary = ReconSummary {
        total_pairs: items.len(),
        ..ReconSummary::default()
    };

    for item in items {
        match item.single {
            None => summary.linked += 1,
            Some(Platform::Shopify) => summary.shopify_only += 1,
            Some(Platform::Etsy) => summary.etsy_only += 1,
        }
        let diff = item.diff();
        if diff > 0 {
            summary.out_of_sync += 1;
            summary.total_excess = summary.total_excess.saturating_add(diff);
        }
        if item.is_changed() {
            summary.changed += 1;
        }
    }

    summary
}
