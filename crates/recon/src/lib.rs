//! `stocksync-recon`: cross-platform product matching and stock reconciliation.
//!
//! Pure engine crate: receives staged product lists, pairs them (manually,
//! by fuzzy name, or from oracle suggestions), equalizes stock across pairs
//! and builds the sync payload. No network or file IO.

pub mod config;
pub mod error;
pub mod linker;
pub mod match_set;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod payload;
pub mod reconcile;
pub mod summary;

pub use config::MatchConfig;
pub use error::ReconError;
pub use linker::{apply_suggestions, auto_pair_fuzzy, resolve_ai_suggestions, AiSuggestions};
pub use match_set::{MatchSet, MatchStats};
pub use matcher::{NameMatcher, TokenOverlapMatcher};
pub use model::{MatchedPair, PairProposal, Platform, StagingProduct};
pub use normalize::normalize;
pub use payload::{build_payload, SyncPayload};
pub use reconcile::{Excess, ReconcileItem, ReconcileSession};
pub use summary::ReconSummary;
