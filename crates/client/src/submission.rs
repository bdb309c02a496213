//! Sync submission envelope: the reconcile payload plus the identifiers the
//! receiver needs to deduplicate retries.

use serde::{Deserialize, Serialize};
use stocksync_recon::SyncPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSubmission {
    /// Unique per submission attempt; reused verbatim on retry.
    pub request_id: String,
    pub user_id: String,
    /// `blake3:<hex>` over the serialized payload.
    pub payload_hash: String,
    #[serde(flatten)]
    pub payload: SyncPayload,
}

impl SyncSubmission {
    /// Wrap a payload with a fresh request id.
    pub fn new(user_id: impl Into<String>, payload: SyncPayload) -> Result<Self, serde_json::Error> {
        Self::with_request_id(uuid::Uuid::new_v4().to_string(), user_id, payload)
    }

    pub fn with_request_id(
        request_id: impl Into<String>,
        user_id: impl Into<String>,
        payload: SyncPayload,
    ) -> Result<Self, serde_json::Error> {
        let payload_hash = hash_payload(&payload)?;
        Ok(Self {
            request_id: request_id.into(),
            user_id: user_id.into(),
            payload_hash,
            payload,
        })
    }

    /// True when the payload still hashes to `payload_hash`.
    pub fn verify(&self) -> bool {
        hash_payload(&self.payload).is_ok_and(|h| h == self.payload_hash)
    }
}

/// Compute blake3 hash of the payload's JSON encoding (with algorithm prefix).
pub fn hash_payload(payload: &SyncPayload) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(hash_bytes(&bytes))
}

/// Compute blake3 hash of bytes (with algorithm prefix).
pub fn hash_bytes(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data).to_hex())
}
