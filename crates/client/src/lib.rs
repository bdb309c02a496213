//! Boundary client: oracle auto-match and stock-sync submission.
//!
//! Blocking HTTP only. No retries; a failed call leaves caller state intact
//! and the user decides whether to resubmit.

mod client;
mod submission;

pub use client::{ClientError, ClientOptions, SyncClient, SyncReceipt, DEFAULT_TIMEOUT};
pub use submission::{hash_bytes, hash_payload, SyncSubmission};
