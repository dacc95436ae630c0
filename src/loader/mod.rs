//! Input loading: schedule catalog, player alias map, cached raw pages and
//! the optional event-pattern catalog override. All of it is read once at
//! startup and read-only afterwards.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::extract::cleaner::{AliasGroup, AliasMap};
use crate::extract::events::{CatalogFileEntry, EventPatternCatalog};
use crate::models::GameCatalogEntry;

/// The original tooling wrote UTF-8-sig files; tolerate the BOM everywhere.
fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(strip_bom(&text)).with_context(|| format!("Failed to parse {:?}", path))
}

/// Schedule catalog from the external schedule-discovery component.
pub fn load_catalog(path: &Path) -> Result<Vec<GameCatalogEntry>> {
    let entries: Vec<GameCatalogEntry> = read_json_file(path)?;
    info!("{} games in schedule catalog", entries.len());
    Ok(entries)
}

/// Alias groups are optional configuration: without the file every name just
/// passes through cleaned but uncanonicalized.
pub fn load_alias_map(path: &Path) -> Result<AliasMap> {
    if !path.exists() {
        warn!("No alias map at {:?} — player names pass through as-is", path);
        return Ok(AliasMap::default());
    }
    let groups: Vec<AliasGroup> = read_json_file(path)?;
    info!("{} alias groups loaded", groups.len());
    Ok(AliasMap::from_groups(groups))
}

pub fn load_pattern_catalog(path: Option<&Path>) -> Result<EventPatternCatalog> {
    match path {
        Some(path) => {
            let entries: Vec<CatalogFileEntry> = read_json_file(path)?;
            info!("Event-pattern catalog from {:?} ({} categories)", path, entries.len());
            EventPatternCatalog::from_entries(entries)
        }
        None => {
            debug!("Using builtin event-pattern catalog");
            Ok(EventPatternCatalog::builtin())
        }
    }
}

/// Cached raw page for one game. `Ok(None)` when the downloader has not
/// produced the file yet — recoverable, the batch skips the game.
pub fn load_raw_page(raw_dir: &Path, game_id: &str) -> Result<Option<String>> {
    let path = raw_dir.join(format!("game-{}.html", game_id));
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(Some(strip_bom(&text).to_string()))
}
