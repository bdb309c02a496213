//! `stocksync reconcile`: equalize stock across pairs and submit the result.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use stocksync_client::{ClientError, SyncSubmission};
use stocksync_recon::{
    build_payload, Excess, Platform, ReconSummary, ReconcileItem, ReconcileSession, SyncPayload,
};

use crate::util::{load_match_set, pad_right, write_json};
use crate::{build_client, load_settings, require_user_id, CliError};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Saved match set
    #[arg(long)]
    matches: PathBuf,

    /// Set a live stock: PAIR:PLATFORM=N (repeatable, applied first)
    #[arg(long = "set", value_name = "PAIR:PLATFORM=N")]
    sets: Vec<String>,

    /// Lower the larger side of a linked pair to the smaller (repeatable)
    #[arg(long = "sync", value_name = "PAIR")]
    syncs: Vec<String>,

    /// Sync every linked pair
    #[arg(long)]
    sync_all: bool,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write the sync request body here
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Send the result to the sync endpoint
    #[arg(long)]
    submit: bool,

    /// Reuse the request id of an earlier failed submission
    #[arg(long, requires = "submit")]
    request_id: Option<String>,
}

#[derive(Serialize)]
struct ReconcileReport<'a> {
    summary: ReconSummary,
    items: &'a [ReconcileItem],
    payload: &'a SyncPayload,
}

pub fn cmd_reconcile(args: ReconcileArgs, settings_path: Option<&Path>) -> Result<(), CliError> {
    let edits = args
        .sets
        .iter()
        .map(|s| parse_set(s))
        .collect::<Result<Vec<_>, _>>()?;

    let set = load_match_set(&args.matches)?;
    let mut session = ReconcileSession::from_match_set(&set);

    for (pair_id, platform, value) in edits {
        session.edit(pair_id, platform, value).map_err(CliError::recon)?;
    }
    for pair_id in &args.syncs {
        if !session.sync_one(pair_id).map_err(CliError::recon)? {
            log::info!("{} already in sync", pair_id);
        }
    }
    if args.sync_all {
        let n = session.sync_all();
        log::info!("sync-all lowered {} pair(s)", n);
    }

    let payload = build_payload(session.items());

    if args.json {
        write_json(
            &ReconcileReport {
                summary: session.summary(),
                items: session.items(),
                payload: &payload,
            },
            None,
        )?;
    } else {
        print_table(session.items());
        print_summary(&session.summary());
    }

    if !args.submit {
        if let Some(path) = &args.output {
            write_json(&payload, Some(path.as_path()))?;
        }
        return Ok(());
    }

    let settings = load_settings(settings_path)?;
    let user_id = require_user_id(&settings)?;
    let submission = match args.request_id {
        Some(id) => SyncSubmission::with_request_id(id, user_id, payload),
        None => SyncSubmission::new(user_id, payload),
    }
    .map_err(|e| CliError::general(format!("cannot encode submission: {}", e)))?;

    if let Some(path) = &args.output {
        write_json(&submission, Some(path.as_path()))?;
    }

    let client = build_client(&settings)?;
    match client.submit_sync(&submission) {
        Ok(receipt) => {
            eprintln!(
                "submitted {}{}",
                submission.request_id,
                receipt.message.map(|m| format!(": {m}")).unwrap_or_default()
            );
            Ok(())
        }
        Err(e) => {
            let hint = retry_hint(&e, &submission.request_id);
            Err(CliError::client(e).with_hint(hint))
        }
    }
}

/// A malformed body after a 2xx means the receiver may already have applied
/// the sync; only the reused request id makes a retry safe.
fn retry_hint(err: &ClientError, request_id: &str) -> String {
    match err {
        ClientError::MalformedResponse(_) => format!(
            "outcome unknown; retry with --submit --request-id {request_id} so the receiver can deduplicate"
        ),
        _ => format!("nothing was applied; retry with --submit --request-id {request_id}"),
    }
}

fn parse_set(arg: &str) -> Result<(&str, Platform, i64), CliError> {
    let invalid = || {
        CliError::args(format!("invalid --set '{}'", arg)).with_hint("expected PAIR:PLATFORM=N")
    };
    let (target, value) = arg.split_once('=').ok_or_else(invalid)?;
    let (pair_id, platform) = target.split_once(':').ok_or_else(invalid)?;
    let platform: Platform = platform.trim().parse().map_err(|_| invalid())?;
    let value: i64 = value.trim().parse().map_err(|_| invalid())?;
    if pair_id.trim().is_empty() {
        return Err(invalid());
    }
    Ok((pair_id.trim(), platform, value))
}

// ============================================================================
// Human output
// ============================================================================

fn excess_label(item: &ReconcileItem) -> String {
    match item.single {
        Some(platform) => format!("{platform} only"),
        None => match item.excess() {
            Excess::None => "in sync".to_string(),
            side => format!("{side} +{}", item.diff()),
        },
    }
}

fn print_table(items: &[ReconcileItem]) {
    println!(
        "{}  {}  {}  {:>7}  {:>7}  {}",
        pad_right("PAIR", 10),
        pad_right("SHOPIFY", 24),
        pad_right("ETSY", 24),
        "S.STOCK",
        "E.STOCK",
        "EXCESS"
    );
    for item in items {
        let name = |p: Option<&stocksync_recon::StagingProduct>| {
            p.map(|p| p.name.clone()).unwrap_or_else(|| "-".to_string())
        };
        let stock = |platform: Platform| {
            if item.has_side(platform) {
                item.stock(platform).to_string()
            } else {
                "-".to_string()
            }
        };
        println!(
            "{}  {}  {}  {:>7}  {:>7}  {}{}",
            pad_right(&item.pair_id, 10),
            pad_right(&name(item.shopify.as_ref()), 24),
            pad_right(&name(item.etsy.as_ref()), 24),
            stock(Platform::Shopify),
            stock(Platform::Etsy),
            excess_label(item),
            if item.is_changed() { " *" } else { "" }
        );
    }
}

fn print_summary(summary: &ReconSummary) {
    println!();
    println!(
        "{} pair(s): {} linked, {} shopify-only, {} etsy-only",
        summary.total_pairs, summary.linked, summary.shopify_only, summary.etsy_only
    );
    println!(
        "{} out of sync (excess {}), {} changed",
        summary.out_of_sync, summary.total_excess, summary.changed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksync_recon::{MatchedPair, StagingProduct};

    fn product(id: &str, stock: i64) -> StagingProduct {
        let mut p = StagingProduct::new(id, id);
        p.stock_quantity = Some(stock);
        p
    }

    #[test]
    fn set_arg_forms() {
        assert_eq!(parse_set("pair-2:etsy=7").unwrap(), ("pair-2", Platform::Etsy, 7));
        assert_eq!(parse_set("pair-1:shopify=-3").unwrap(), ("pair-1", Platform::Shopify, -3));
        assert!(parse_set("pair-2=7").is_err());
        assert!(parse_set("pair-2:etsy=seven").is_err());
        assert!(parse_set(":etsy=1").is_err());
    }

    #[test]
    fn retry_hint_depends_on_failure() {
        let hint = retry_hint(&ClientError::MalformedResponse("eof".into()), "req-9");
        assert!(hint.starts_with("outcome unknown"));
        assert!(hint.contains("--request-id req-9"));

        let hint = retry_hint(&ClientError::Http(500, "boom".into()), "req-9");
        assert!(hint.starts_with("nothing was applied"));
        assert!(hint.contains("--request-id req-9"));
    }

    #[test]
    fn excess_labels() {
        let mut linked = ReconcileItem::from_pair(&MatchedPair::linked("p1", product("s1", 10), product("e1", 4)));
        assert_eq!(excess_label(&linked), "shopify +6");
        linked.shopify_stock = 4;
        assert_eq!(excess_label(&linked), "in sync");

        let single = ReconcileItem::from_pair(&MatchedPair::single("p2", Platform::Etsy, product("e2", 3)));
        assert_eq!(excess_label(&single), "etsy only");
    }
}
