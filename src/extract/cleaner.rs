use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

// ── Name cleaning ─────────────────────────────────────────────────────────────

/// Strip diacritics and collapse whitespace.
/// "José  Müller " → "Jose Muller"
///
/// Decomposes (NFD), drops combining marks, then squeezes whitespace runs to
/// single spaces. Idempotent; never fails.
pub fn clean_name(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deterministic short code for a team name: first token of the cleaned
/// name, alphanumerics only, uppercased. "Racing C" → "RACING"
pub fn short_code(name: &str) -> String {
    let cleaned = clean_name(name);
    let code: String = cleaned
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if code.is_empty() { "UNKNOWN".to_string() } else { code }
}

// ── Player alias map ──────────────────────────────────────────────────────────

/// One canonical name with the raw spellings observed for it on game sheets.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasGroup {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Cleaned spelling → canonical name. Loaded once per run, read-only after.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    by_alias: HashMap<String, String>,
}

impl AliasMap {
    pub fn from_groups(groups: Vec<AliasGroup>) -> Self {
        let mut by_alias = HashMap::new();
        for group in groups {
            // The canonical spelling maps to itself so already-canonical
            // names survive a second pass unchanged.
            by_alias.insert(clean_name(&group.canonical), group.canonical.clone());
            for alias in &group.aliases {
                by_alias.insert(clean_name(alias), group.canonical.clone());
            }
        }
        Self { by_alias }
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }

    /// Clean, then replace by the canonical spelling if one is known.
    pub fn canonical(&self, raw: &str) -> String {
        let cleaned = clean_name(raw);
        match self.by_alias.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }
}

// ── Scalar parsers ────────────────────────────────────────────────────────────

/// Parse a final-score pair: "85 : 78" → (85, 78). Tolerates missing spaces.
pub fn parse_score_pair(s: &str) -> Option<(u32, u32)> {
    let (home, away) = s.split_once(':')?;
    Some((home.trim().parse().ok()?, away.trim().parse().ok()?))
}

/// Parse the localized match datetime: "11/05/2024 - 18h30"
pub fn parse_match_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%d/%m/%Y - %Hh%M").ok()
}

/// Normalized sortable form: "2024-05-11T18:30:00"
pub fn normalize_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
