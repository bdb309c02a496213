//! `stocksync match`, `pair` and `unmatched`: building and editing match sets.

use std::path::{Path, PathBuf};

use clap::Args;

use stocksync_recon::{
    apply_suggestions, auto_pair_fuzzy, AiSuggestions, MatchSet, Platform, TokenOverlapMatcher,
};

use crate::util::{load_match_config, load_match_set, load_products, pad_right, write_json};
use crate::{build_client, load_settings, require_user_id, CliError};

#[derive(Args)]
pub struct MatchArgs {
    /// Staged Shopify products (JSON array)
    #[arg(long)]
    shopify: PathBuf,

    /// Staged Etsy products (JSON array)
    #[arg(long)]
    etsy: PathBuf,

    /// Apply a saved oracle response
    #[arg(long, conflicts_with = "oracle")]
    suggestions: Option<PathBuf>,

    /// Ask the configured oracle for suggestions
    #[arg(long)]
    oracle: bool,

    /// Pair remaining items by name similarity
    #[arg(long)]
    fuzzy: bool,

    /// Match thresholds (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the match set here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PairArgs {
    /// Saved match set, edited in place
    #[arg(long)]
    matches: PathBuf,

    /// Link two items: SHOPIFY_ID=ETSY_ID (repeatable)
    #[arg(long = "link", value_name = "SHOPIFY_ID=ETSY_ID")]
    links: Vec<String>,

    /// Mark an item single-platform: PLATFORM:ID (repeatable)
    #[arg(long = "single", value_name = "PLATFORM:ID")]
    singles: Vec<String>,

    /// Remove a pair, returning its items to the pools (repeatable)
    #[arg(long = "remove", value_name = "PAIR")]
    removes: Vec<String>,
}

#[derive(Args)]
pub struct UnmatchedArgs {
    /// Saved match set
    #[arg(long)]
    matches: PathBuf,

    /// Which pool to list
    #[arg(long)]
    platform: Platform,

    /// Case-insensitive filter on name or SKU
    #[arg(long, default_value = "")]
    search: String,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,
}

// ============================================================================
// match
// ============================================================================

pub fn cmd_match(args: MatchArgs, settings_path: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(settings_path)?;
    let config = load_match_config(args.config.as_ref(), &settings)?;
    let matcher = TokenOverlapMatcher::new(config);

    let mut set = MatchSet::new(load_products(&args.shopify)?, load_products(&args.etsy)?);

    let suggestions = if let Some(path) = &args.suggestions {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
        Some(AiSuggestions::from_json_str(&data).map_err(CliError::recon)?)
    } else if args.oracle {
        let user_id = require_user_id(&settings)?;
        let client = build_client(&settings)?;
        Some(client.auto_match(&user_id).map_err(CliError::client)?)
    } else {
        None
    };

    if let Some(suggestions) = suggestions {
        let applied = apply_suggestions(&mut set, &suggestions, &matcher).map_err(CliError::recon)?;
        eprintln!(
            "suggestions: {} pair(s) created, {} dropped",
            applied.created.len(),
            applied.dropped
        );
    }

    if args.fuzzy {
        let created = auto_pair_fuzzy(&mut set, &matcher).map_err(CliError::recon)?;
        eprintln!("fuzzy: {} pair(s) created", created);
    }

    let stats = set.stats();
    eprintln!(
        "{} linked, {} shopify-only, {} etsy-only; unmatched: {} shopify, {} etsy",
        stats.linked, stats.shopify_only, stats.etsy_only, stats.unmatched_shopify, stats.unmatched_etsy
    );

    write_json(&set, args.output.as_deref())
}

// ============================================================================
// pair
// ============================================================================

pub fn cmd_pair(args: PairArgs) -> Result<(), CliError> {
    if args.links.is_empty() && args.singles.is_empty() && args.removes.is_empty() {
        return Err(CliError::args("nothing to do")
            .with_hint("pass at least one of --link, --single, --remove"));
    }

    // Parse everything before touching the set so a typo changes nothing
    let links = args
        .links
        .iter()
        .map(|s| parse_link(s))
        .collect::<Result<Vec<_>, _>>()?;
    let singles = args
        .singles
        .iter()
        .map(|s| parse_single(s))
        .collect::<Result<Vec<_>, _>>()?;

    let mut set = load_match_set(&args.matches)?;

    // Removals first so freed items can be re-linked in the same call
    for pair_id in &args.removes {
        match set.remove_pair(pair_id) {
            Some(pair) => println!("removed {}", pair.id()),
            None => log::warn!("no pair '{}' to remove", pair_id),
        }
    }
    for (shopify_id, etsy_id) in links {
        let id = set.link_by_id(shopify_id, etsy_id).map_err(CliError::recon)?;
        println!("{}  {} <-> {}", id, shopify_id, etsy_id);
    }
    for (platform, item_id) in singles {
        let id = set.single_by_id(platform, item_id).map_err(CliError::recon)?;
        println!("{}  {} ({} only)", id, item_id, platform);
    }

    write_json(&set, Some(args.matches.as_path()))
}

fn parse_link(arg: &str) -> Result<(&str, &str), CliError> {
    match arg.split_once('=') {
        Some((s, e)) if !s.trim().is_empty() && !e.trim().is_empty() => Ok((s.trim(), e.trim())),
        _ => Err(CliError::args(format!("invalid --link '{}'", arg))
            .with_hint("expected SHOPIFY_ID=ETSY_ID")),
    }
}

fn parse_single(arg: &str) -> Result<(Platform, &str), CliError> {
    let invalid = || {
        CliError::args(format!("invalid --single '{}'", arg)).with_hint("expected PLATFORM:ID")
    };
    let (platform, id) = arg.split_once(':').ok_or_else(invalid)?;
    let platform: Platform = platform.trim().parse().map_err(|_| invalid())?;
    if id.trim().is_empty() {
        return Err(invalid());
    }
    Ok((platform, id.trim()))
}

// ============================================================================
// unmatched
// ============================================================================

pub fn cmd_unmatched(args: UnmatchedArgs) -> Result<(), CliError> {
    let set = load_match_set(&args.matches)?;
    let items = set.unmatched_for(args.platform, &args.search);

    if args.json {
        return write_json(&items, None);
    }

    println!(
        "{}  {}  {}  {}",
        pad_right("ID", 12),
        pad_right("PLATFORM ID", 14),
        pad_right("NAME", 32),
        "STOCK"
    );
    for item in &items {
        println!(
            "{}  {}  {}  {}",
            pad_right(&item.id, 12),
            pad_right(item.platform_id.as_deref().unwrap_or("-"), 14),
            pad_right(&item.name, 32),
            item.stock()
        );
    }
    eprintln!("{} unmatched {} item(s)", items.len(), args.platform);
    Ok(())
}
