//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                                  |
//! |---------|------------------|----------------------------------------------|
//! | 0       | Universal        | Success                                      |
//! | 1       | Universal        | General error (unspecified)                  |
//! | 2       | Universal        | CLI usage error (bad args)                   |
//! | 3-4     | Universal        | File IO / parse errors                       |
//! | 10-19   | matching         | Match set and reconcile operation errors     |
//! | 20-29   | boundary         | Oracle / sync endpoint errors                |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use stocksync_client::ClientError;
use stocksync_recon::ReconError;

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed `--link`/`--set` values.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read or write an input/output file.
pub const EXIT_IO: u8 = 3;

/// Input file is not valid JSON/TOML or has the wrong shape.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Matching (10-19)
// =============================================================================

/// Operation rejected by the match set or reconcile session
/// (duplicate claim, unknown item or pair, sync on a single pair).
pub const EXIT_INVALID_OP: u8 = 10;

// =============================================================================
// Boundary (20-29)
// =============================================================================

/// Oracle or sync endpoint call failed (network, HTTP status, rejection,
/// malformed response). Local state is unchanged; safe to retry.
pub const EXIT_TRANSPORT: u8 = 20;

/// Endpoint URL or user id missing from settings.
pub const EXIT_NOT_CONFIGURED: u8 = 21;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::DuplicateClaim { .. }
        | ReconError::UnknownItem { .. }
        | ReconError::UnknownPair(_)
        | ReconError::NotLinked(_)
        | ReconError::MissingSide { .. } => EXIT_INVALID_OP,
        ReconError::InvalidPair(_)
        | ReconError::MalformedResponse(_)
        | ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_) => EXIT_PARSE,
    }
}

/// Map a ClientError to its exit code.
pub fn client_exit_code(err: &ClientError) -> u8 {
    if err.is_transport_failure() {
        EXIT_TRANSPORT
    } else {
        EXIT_NOT_CONFIGURED
    }
}
