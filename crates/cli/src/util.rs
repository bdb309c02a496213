use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use stocksync_config::Settings;
use stocksync_recon::{MatchConfig, MatchSet, StagingProduct};

use crate::CliError;

// ============================================================================
// File IO
// ============================================================================

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let data = fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))
}

pub(crate) fn load_products(path: &Path) -> Result<Vec<StagingProduct>, CliError> {
    let products: Vec<StagingProduct> = read_json(path)?;
    log::debug!("loaded {} product(s) from {}", products.len(), path.display());
    Ok(products)
}

pub(crate) fn load_match_set(path: &Path) -> Result<MatchSet, CliError> {
    read_json(path)
}

/// Pretty JSON to `output`, or to stdout when no path is given.
pub(crate) fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("cannot encode JSON: {}", e)))?;
    match output {
        Some(path) => fs::write(path, format!("{json}\n"))
            .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e))),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json).map_err(|e| CliError::io(e.to_string()))
        }
    }
}

/// Thresholds from `--config`, else from `match.configPath`, else defaults.
pub(crate) fn load_match_config(
    explicit: Option<&PathBuf>,
    settings: &Settings,
) -> Result<MatchConfig, CliError> {
    let Some(path) = explicit.or(settings.match_config_path.as_ref()) else {
        return Ok(MatchConfig::default());
    };
    let data = fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
    MatchConfig::from_toml(&data)
        .map_err(|e| CliError::recon(e).with_hint(format!("check {}", path.display())))
}

// ============================================================================
// Table layout
// ============================================================================

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s.chars().take(width).collect();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let t = truncate_display(s, width);
    let tw = UnicodeWidthStr::width(t.as_str());
    format!("{}{}", t, " ".repeat(width.saturating_sub(tw)))
}
