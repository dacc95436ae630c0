//! Event-log line classification.
//!
//! The game-sheet log is free text; classification is a linear decision list:
//! iterate the catalog's categories in order, and within a category its
//! locale patterns in order. The first regex that matches wins and both
//! loops stop — precedence is the catalog order, nothing else.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::models::Actor;

// ── Taxonomy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventCategory {
    StartingLineupAdded,
    PointsAdded,
    FoulAdded,
    FoulDeleted,
    PointsDeleted,
    LastPointsForDifferentPlayer,
    PlayerInQuarter,
    PlayerInQuarterDeleted,
    PlayerAdded,
    ChangeOfLicenseNumber,
    TimeoutAdded,
    TimeoutDeleted,
    TimeoutLost,
    DeletedFromStartingLineup,
    SignalEndOfGame,
    Other,
}

/// Per-game context the classifier needs: scoring by the home side counts
/// positive, anything else negative.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub home_short: String,
}

/// What classification yields for one raw line.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub action: String,
    pub actor: Actor,
    pub team: Option<String>,
    pub advantage: Option<i32>,
}

// ── Pattern catalog ───────────────────────────────────────────────────────────

/// The terse scoring/foul codes ("3P …", "P2 …") are locale-independent;
/// verbose administrative lines differ per locale. Group contract per
/// category is fixed: see `build()` below.
const BUILTIN: &[(EventCategory, &[(&str, &str)])] = &[
    (EventCategory::StartingLineupAdded, &[
        ("en", r"^Starting five: (.+?) \(([A-Z0-9-]{2,})\)$"),
        ("fr", r"^Cinq de base ?: (.+?) \(([A-Z0-9-]{2,})\)$"),
    ]),
    (EventCategory::PointsAdded, &[
        ("all", r"^([123])P (.+?) ([A-Z0-9-]{2,})$"),
    ]),
    (EventCategory::FoulAdded, &[
        ("all", r"^(P[123]|T1?|U[12]|D) (.+?) ([A-Z0-9-]{2,})$"),
    ]),
    (EventCategory::FoulDeleted, &[
        ("en", r"^(P[123]|T1?|U[12]|D) (.+?) ([A-Z0-9-]{2,}) deleted$"),
        ("fr", r"^(P[123]|T1?|U[12]|D) (.+?) ([A-Z0-9-]{2,}) supprim[ée]e?$"),
    ]),
    (EventCategory::PointsDeleted, &[
        ("en", r"^([123])P (.+?) ([A-Z0-9-]{2,}) deleted$"),
        ("fr", r"^([123])P (.+?) ([A-Z0-9-]{2,}) supprim[ée]s?$"),
    ]),
    (EventCategory::LastPointsForDifferentPlayer, &[
        ("en", r"^Last points scored by (.+?) \(([A-Z0-9-]{2,})\)$"),
        ("fr", r"^Derniers points marqu[ée]s par (.+?) \(([A-Z0-9-]{2,})\)$"),
    ]),
    (EventCategory::PlayerInQuarter, &[
        ("en", r"^Q([1-5]) in (.+?) ([A-Z0-9-]{2,})$"),
        ("fr", r"^Q([1-5]) entr[ée]e (.+?) ([A-Z0-9-]{2,})$"),
    ]),
    (EventCategory::PlayerInQuarterDeleted, &[
        ("en", r"^Q([1-5]) in (.+?) ([A-Z0-9-]{2,}) deleted$"),
        ("fr", r"^Q([1-5]) entr[ée]e (.+?) ([A-Z0-9-]{2,}) supprim[ée]e?$"),
    ]),
    (EventCategory::PlayerAdded, &[
        ("en", r"^Player added (.+?) \(([A-Z0-9-]{2,})\)$"),
        ("fr", r"^Joueur ajout[ée] (.+?) \(([A-Z0-9-]{2,})\)$"),
    ]),
    (EventCategory::ChangeOfLicenseNumber, &[
        ("en", r"^Licen[cs]e number changed\b"),
        ("fr", r"^Changement de (?:num[ée]ro de )?licence\b"),
    ]),
    (EventCategory::TimeoutAdded, &[
        ("en", r"^Timeout ([A-Z0-9-]{2,})$"),
        ("fr", r"^Temps mort ([A-Z0-9-]{2,})$"),
    ]),
    (EventCategory::TimeoutDeleted, &[
        ("en", r"^Q([1-5]) timeout ([A-Z0-9-]{2,}) deleted$"),
        ("fr", r"^Q([1-5]) temps mort ([A-Z0-9-]{2,}) supprim[ée]$"),
    ]),
    (EventCategory::TimeoutLost, &[
        ("en", r"^Q([1-5]) timeout ([A-Z0-9-]{2,}) lost$"),
        ("fr", r"^Q([1-5]) temps mort ([A-Z0-9-]{2,}) perdu$"),
    ]),
    (EventCategory::DeletedFromStartingLineup, &[
        ("en", r"^Removed from starting five: (.+?) \(([A-Z0-9-]{2,})\)$"),
        ("fr", r"^Retir[ée] du cinq de base ?: (.+?) \(([A-Z0-9-]{2,})\)$"),
    ]),
    (EventCategory::SignalEndOfGame, &[
        ("en", r"^(?:End of game|Final signal)\b"),
        ("fr", r"^(?:Fin du match|Signal final)\b"),
    ]),
    (EventCategory::Other, &[
        ("en", r"^(?:Note|Info|Remark)\b"),
        ("fr", r"^(?:Note|Info|Remarque)\b"),
    ]),
];

#[derive(Debug, Clone)]
struct PatternEntry {
    category: EventCategory,
    patterns: Vec<(String, Regex)>, // (locale, compiled)
}

/// Catalog file format: ordered array, one entry per category.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFileEntry {
    pub category: EventCategory,
    pub patterns: Vec<LocalePattern>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalePattern {
    pub locale: String,
    pub pattern: String,
}

#[derive(Debug, Clone)]
pub struct EventPatternCatalog {
    entries: Vec<PatternEntry>,
}

impl EventPatternCatalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(category, patterns)| PatternEntry {
                category: *category,
                patterns: patterns
                    .iter()
                    .map(|(locale, pattern)| {
                        let re = Regex::new(pattern).expect("invalid builtin pattern");
                        (locale.to_string(), re)
                    })
                    .collect(),
            })
            .collect();
        Self { entries }
    }

    /// Build from a deployment-supplied catalog file. Entry order defines
    /// classification precedence, exactly like the builtin table.
    pub fn from_entries(file_entries: Vec<CatalogFileEntry>) -> Result<Self> {
        let mut entries = Vec::with_capacity(file_entries.len());
        for entry in file_entries {
            let mut patterns = Vec::with_capacity(entry.patterns.len());
            for lp in entry.patterns {
                let re = Regex::new(&lp.pattern).with_context(|| {
                    format!("bad pattern for {:?} [{}]: {:?}", entry.category, lp.locale, lp.pattern)
                })?;
                patterns.push((lp.locale, re));
            }
            entries.push(PatternEntry {
                category: entry.category,
                patterns,
            });
        }
        Ok(Self { entries })
    }

    /// First matching category, first matching locale pattern wins.
    /// Unmatched text is a recoverable condition: an Unknown event.
    pub fn classify(&self, raw: &str, ctx: &GameContext) -> Classified {
        let text = raw.trim();
        for entry in &self.entries {
            for (_locale, re) in &entry.patterns {
                if let Some(caps) = re.captures(text) {
                    return build(entry.category, &caps, ctx);
                }
            }
        }
        warn!("Unclassified event text: {:?}", text);
        Classified {
            action: "Unknown".to_string(),
            actor: Actor::Unknown,
            team: Some("Unknown".to_string()),
            advantage: None,
        }
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

fn group(caps: &regex::Captures, i: usize) -> String {
    caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default()
}

fn build(category: EventCategory, caps: &regex::Captures, ctx: &GameContext) -> Classified {
    use EventCategory::*;

    let (action, actor, team, advantage) = match category {
        StartingLineupAdded => (
            "Starting line-up added".to_string(),
            Actor::Player(group(caps, 1)),
            Some(group(caps, 2)),
            None,
        ),
        PointsAdded => {
            let n: i32 = group(caps, 1).parse().unwrap_or(0);
            let team = group(caps, 3);
            let advantage = if team == ctx.home_short { n } else { -n };
            (
                format!("{}P Points Added", n),
                Actor::Player(group(caps, 2)),
                Some(team),
                Some(advantage),
            )
        }
        FoulAdded => (
            format!("{} Foul Added", group(caps, 1)),
            Actor::Player(group(caps, 2)),
            Some(group(caps, 3)),
            None,
        ),
        FoulDeleted => (
            format!("{} Foul Deleted", group(caps, 1)),
            Actor::Player(group(caps, 2)),
            Some(group(caps, 3)),
            None,
        ),
        PointsDeleted => (
            format!("{}P Points Deleted", group(caps, 1)),
            Actor::Player(group(caps, 2)),
            Some(group(caps, 3)),
            None,
        ),
        LastPointsForDifferentPlayer => (
            "Last points for different player".to_string(),
            Actor::Player(group(caps, 1)),
            Some(group(caps, 2)),
            None,
        ),
        PlayerInQuarter => (
            "Player in".to_string(),
            Actor::Player(group(caps, 2)),
            Some(group(caps, 3)),
            None,
        ),
        PlayerInQuarterDeleted => (
            "Player in deleted".to_string(),
            Actor::Player(group(caps, 2)),
            Some(group(caps, 3)),
            None,
        ),
        PlayerAdded => (
            "Player added".to_string(),
            Actor::Player(group(caps, 1)),
            Some(group(caps, 2)),
            None,
        ),
        ChangeOfLicenseNumber => (
            "Change of license number".to_string(),
            Actor::System,
            None,
            None,
        ),
        TimeoutAdded => ("Timeout".to_string(), Actor::Coach, Some(group(caps, 1)), None),
        TimeoutDeleted => (
            "Timeout Deleted".to_string(),
            Actor::Coach,
            Some(group(caps, 2)),
            None,
        ),
        TimeoutLost => (
            "Timeout Lost".to_string(),
            Actor::Coach,
            Some(group(caps, 2)),
            None,
        ),
        DeletedFromStartingLineup => (
            "Deleted from starting line-up".to_string(),
            Actor::Player(group(caps, 1)),
            Some(group(caps, 2)),
            None,
        ),
        SignalEndOfGame => ("Signal end of game".to_string(), Actor::System, None, None),
        Other => ("Other".to_string(), Actor::Unknown, None, None),
    };

    Classified {
        action,
        actor,
        team,
        advantage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GameContext {
        GameContext {
            home_short: "RACING".to_string(),
        }
    }

    fn catalog() -> EventPatternCatalog {
        EventPatternCatalog::builtin()
    }

    #[test]
    fn test_points_added_home_advantage() {
        let c = catalog().classify("3P Jean Dupont RACING", &ctx());
        assert_eq!(c.action, "3P Points Added");
        assert_eq!(c.actor, Actor::Player("Jean Dupont".to_string()));
        assert_eq!(c.team.as_deref(), Some("RACING"));
        assert_eq!(c.advantage, Some(3));
    }

    #[test]
    fn test_points_added_away_advantage() {
        let c = catalog().classify("2P Marc Weber SCHIEREN", &ctx());
        assert_eq!(c.action, "2P Points Added");
        assert_eq!(c.advantage, Some(-2));
    }

    #[test]
    fn test_foul_added_and_deleted_precedence() {
        let added = catalog().classify("P2 Marc Weber SCHIEREN", &ctx());
        assert_eq!(added.action, "P2 Foul Added");
        assert_eq!(added.actor, Actor::Player("Marc Weber".to_string()));

        // The trailing "deleted" keeps this off the FoulAdded pattern.
        let deleted = catalog().classify("P2 Marc Weber SCHIEREN deleted", &ctx());
        assert_eq!(deleted.action, "P2 Foul Deleted");
    }

    #[test]
    fn test_points_deleted() {
        let c = catalog().classify("3P Jean Dupont RACING deleted", &ctx());
        assert_eq!(c.action, "3P Points Deleted");
        assert_eq!(c.advantage, None);
    }

    #[test]
    fn test_starting_lineup() {
        let c = catalog().classify("Starting five: Jean Dupont (RACING)", &ctx());
        assert_eq!(c.action, "Starting line-up added");
        assert_eq!(c.actor, Actor::Player("Jean Dupont".to_string()));
        assert_eq!(c.team.as_deref(), Some("RACING"));
    }

    #[test]
    fn test_french_locale_patterns() {
        let c = catalog().classify("Cinq de base: Jean Dupont (RACING)", &ctx());
        assert_eq!(c.action, "Starting line-up added");

        let t = catalog().classify("Temps mort SCHIEREN", &ctx());
        assert_eq!(t.action, "Timeout");
        assert_eq!(t.actor, Actor::Coach);
        assert_eq!(t.team.as_deref(), Some("SCHIEREN"));
    }

    #[test]
    fn test_timeouts() {
        let lost = catalog().classify("Q3 timeout RACING lost", &ctx());
        assert_eq!(lost.action, "Timeout Lost");
        assert_eq!(lost.actor, Actor::Coach);
        assert_eq!(lost.team.as_deref(), Some("RACING"));

        let deleted = catalog().classify("Q1 timeout SCHIEREN deleted", &ctx());
        assert_eq!(deleted.action, "Timeout Deleted");
        assert_eq!(deleted.team.as_deref(), Some("SCHIEREN"));
    }

    #[test]
    fn test_player_in_quarter() {
        let c = catalog().classify("Q2 in Marc Weber SCHIEREN", &ctx());
        assert_eq!(c.action, "Player in");
        assert_eq!(c.actor, Actor::Player("Marc Weber".to_string()));

        let d = catalog().classify("Q2 in Marc Weber SCHIEREN deleted", &ctx());
        assert_eq!(d.action, "Player in deleted");
    }

    #[test]
    fn test_synthetic_actors() {
        let lic = catalog().classify("License number changed for 1234", &ctx());
        assert_eq!(lic.action, "Change of license number");
        assert_eq!(lic.actor, Actor::System);
        assert_eq!(lic.team, None);

        let end = catalog().classify("End of game", &ctx());
        assert_eq!(end.action, "Signal end of game");
        assert_eq!(end.actor, Actor::System);
    }

    #[test]
    fn test_other_and_unknown() {
        let other = catalog().classify("Note: scoreboard reset", &ctx());
        assert_eq!(other.action, "Other");

        let unknown = catalog().classify("completely free text", &ctx());
        assert_eq!(unknown.action, "Unknown");
        assert_eq!(unknown.actor, Actor::Unknown);
        assert_eq!(unknown.team.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_file_catalog_overrides_builtin() {
        let entries = vec![CatalogFileEntry {
            category: EventCategory::PointsAdded,
            patterns: vec![LocalePattern {
                locale: "lb".to_string(),
                pattern: r"^([123]) Punkten (.+?) ([A-Z0-9-]{2,})$".to_string(),
            }],
        }];
        let catalog = EventPatternCatalog::from_entries(entries).unwrap();
        let c = catalog.classify("3 Punkten Jean Dupont RACING", &ctx());
        assert_eq!(c.action, "3P Points Added");
        assert_eq!(c.advantage, Some(3));
        // The builtin grammar is gone from this catalog.
        assert_eq!(catalog.classify("Timeout RACING", &ctx()).action, "Unknown");
    }

    #[test]
    fn test_bad_file_pattern_is_an_error() {
        let entries = vec![CatalogFileEntry {
            category: EventCategory::Other,
            patterns: vec![LocalePattern {
                locale: "en".to_string(),
                pattern: "([unclosed".to_string(),
            }],
        }];
        assert!(EventPatternCatalog::from_entries(entries).is_err());
    }
}
