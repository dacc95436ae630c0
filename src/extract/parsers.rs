//! DOM section extractors. Each one is independently callable and tolerant
//! of missing optional sections; only the game description is mandatory.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::extract::cleaner::{self, AliasMap};
use crate::extract::events::{EventPatternCatalog, GameContext};
use crate::models::{Actor, GameEvent, GameLocation, Outcome, Player, Referee, Team, TeamRole};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Control condition, not a failure: a 0 : 0 final score means the game
    /// has not been played yet and must not produce a record.
    #[error("game not started yet (0 : 0 final score)")]
    NotStarted,
    #[error("malformed page: {0}")]
    Malformed(String),
}

// ── Selectors ─────────────────────────────────────────────────────────────────

macro_rules! selector {
    ($name:ident, $css:literal) => {
        static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect(concat!("invalid selector: ", $css)));
    };
}

selector!(SEL_HEADER, "div.game-header");
selector!(SEL_DIVISION, "span.division");
selector!(SEL_HOME, "span.home-team");
selector!(SEL_AWAY, "span.away-team");
selector!(SEL_SCORE, "span.final-score");
selector!(SEL_DATETIME, "span.datetime");
selector!(SEL_BOX_SCORE, "table.box-score");
selector!(SEL_EVENTS, "table.game-events");
selector!(SEL_TR, "tr");
selector!(SEL_TD, "td");
selector!(SEL_REFEREES, "ul.referees");
selector!(SEL_LI, "li");
selector!(SEL_LOCATION, "div.game-location");
selector!(SEL_A, "a");

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn cell_texts(row: ElementRef) -> Vec<String> {
    row.select(&SEL_TD).map(elem_text).collect()
}

// ── Game description ──────────────────────────────────────────────────────────

/// The mandatory top-of-page block: division, team names, final score, and
/// everything derivable from those alone.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDescription {
    pub division: String,
    pub home_name: String,
    pub away_name: String,
    pub home_score: u32,
    pub away_score: u32,
    pub home_league_points: u8,
    pub away_league_points: u8,
    pub winner: String,
    pub loser: String,
}

/// League points for a final score: win 2, loss 1, and the 0–20 forfeit
/// convention awards 0 to the side that scored 0.
fn league_points(home: u32, away: u32) -> (u8, u8) {
    match (home, away) {
        (0, 20) => (0, 2),
        (20, 0) => (2, 0),
        _ if home > away => (2, 1),
        _ => (1, 2),
    }
}

pub fn parse_description(doc: &Html) -> Result<GameDescription, ExtractError> {
    let header = doc
        .select(&SEL_HEADER)
        .next()
        .ok_or_else(|| ExtractError::Malformed("no div.game-header".to_string()))?;

    let field = |sel: &Selector, what: &str| -> Result<String, ExtractError> {
        header
            .select(sel)
            .next()
            .map(elem_text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::Malformed(format!("missing {}", what)))
    };

    let division = field(&SEL_DIVISION, "division")?;
    let home_name = field(&SEL_HOME, "home team name")?;
    let away_name = field(&SEL_AWAY, "away team name")?;
    let score_text = field(&SEL_SCORE, "final score")?;

    let (home_score, away_score) = cleaner::parse_score_pair(&score_text)
        .ok_or_else(|| ExtractError::Malformed(format!("unparsable score {:?}", score_text)))?;

    if home_score == 0 && away_score == 0 {
        return Err(ExtractError::NotStarted);
    }

    let (home_league_points, away_league_points) = league_points(home_score, away_score);
    let (winner, loser) = if home_score > away_score {
        (home_name.clone(), away_name.clone())
    } else {
        (away_name.clone(), home_name.clone())
    };

    Ok(GameDescription {
        division,
        home_name,
        away_name,
        home_score,
        away_score,
        home_league_points,
        away_league_points,
        winner,
        loser,
    })
}

// ── Teams / box score ─────────────────────────────────────────────────────────

/// Free-throw weighting per committed foul. Replicated verbatim from the
/// observed derivation; disqualifying fouls carry no weight.
fn weighted_fouls(players: &[Player]) -> u32 {
    players
        .iter()
        .map(|p| p.fouls_p1 + 2 * p.fouls_p2 + 3 * p.fouls_p3 + p.fouls_u1 + 2 * p.fouls_u2 + p.fouls_t)
        .sum()
}

fn parse_player_row(cells: &[String], aliases: &AliasMap) -> Option<Player> {
    // number | name | starter marker | 1P | 2P | 3P | points | foul codes
    if cells.len() < 7 {
        return None;
    }

    let name = aliases.canonical(cells.get(1)?);
    if name.is_empty() {
        return None;
    }

    let num = |i: usize| cells.get(i).and_then(|c| c.parse::<u32>().ok()).unwrap_or(0);

    let mut player = Player {
        name,
        number: num(0),
        starting_five: cells.get(2).map(|c| c.contains('*')).unwrap_or(false),
        made_1p: num(3),
        made_2p: num(4),
        made_3p: num(5),
        total_points: num(6),
        ..Player::default()
    };

    for code in cells.get(7).map(String::as_str).unwrap_or("").split_whitespace() {
        match code {
            "P1" => player.fouls_p1 += 1,
            "P2" => player.fouls_p2 += 1,
            "P3" => player.fouls_p3 += 1,
            "T" | "T1" => player.fouls_t += 1,
            "U1" => player.fouls_u1 += 1,
            "U2" => player.fouls_u2 += 1,
            "D" => player.fouls_d += 1,
            other => debug!("Unknown foul code {:?}", other),
        }
    }
    player.fouls_p = player.fouls_p1 + player.fouls_p2 + player.fouls_p3;
    player.total_fouls =
        player.fouls_p + player.fouls_t + player.fouls_u1 + player.fouls_u2 + player.fouls_d;

    Some(player)
}

fn finalize_team(role: TeamRole, name: String, players: Vec<Player>, desc: &GameDescription) -> Team {
    let (won, lost, points) = match role {
        TeamRole::Home => (desc.home_score, desc.away_score, desc.home_league_points),
        TeamRole::Away => (desc.away_score, desc.home_score, desc.away_league_points),
    };
    Team {
        role,
        name_short: cleaner::short_code(&name),
        name,
        players,
        total_points_won: won,
        total_points_lost: lost,
        league_points: points,
        attempted_free_throws: 0, // cross-assigned below, needs both rosters
        result: Outcome::from_league_points(points),
    }
}

/// Synthetic two-team structure for forfeited games: no roster, outcome
/// carried entirely by the league points of the 0–20 score.
fn forfeit_teams(desc: &GameDescription) -> Vec<Team> {
    vec![
        finalize_team(TeamRole::Home, desc.home_name.clone(), Vec::new(), desc),
        finalize_team(TeamRole::Away, desc.away_name.clone(), Vec::new(), desc),
    ]
}

pub fn parse_teams(doc: &Html, desc: &GameDescription, aliases: &AliasMap) -> Vec<Team> {
    let Some(table) = doc.select(&SEL_BOX_SCORE).next() else {
        debug!("No box-score table — synthesizing forfeit teams");
        return forfeit_teams(desc);
    };

    let mut teams: Vec<Team> = Vec::new();
    let mut current: Option<(String, Vec<Player>)> = None;

    for row in table.select(&SEL_TR) {
        let is_header = row.value().attr("class").is_some_and(|c| c.contains("team-header"));

        if is_header {
            // A header without a preceding Total row still closes the team.
            if let Some((name, players)) = current.take() {
                let role = if teams.is_empty() { TeamRole::Home } else { TeamRole::Away };
                teams.push(finalize_team(role, name, players, desc));
            }
            current = Some((elem_text(row), Vec::new()));
            continue;
        }

        let cells = cell_texts(row);
        if cells.first().map(String::as_str) == Some("Total") {
            if let Some((name, players)) = current.take() {
                let role = if teams.is_empty() { TeamRole::Home } else { TeamRole::Away };
                teams.push(finalize_team(role, name, players, desc));
            }
            continue;
        }

        if let Some((_, players)) = current.as_mut() {
            if let Some(player) = parse_player_row(&cells, aliases) {
                players.push(player);
            }
        }
    }

    if let Some((name, players)) = current.take() {
        let role = if teams.is_empty() { TeamRole::Home } else { TeamRole::Away };
        teams.push(finalize_team(role, name, players, desc));
    }

    if teams.is_empty() {
        warn!("Box-score table yielded no teams — falling back to forfeit structure");
        return forfeit_teams(desc);
    }

    // Team A shoots the free throws earned by team B's fouls, and vice versa.
    if teams.len() == 2 {
        let home_fouls = weighted_fouls(&teams[0].players);
        let away_fouls = weighted_fouls(&teams[1].players);
        teams[0].attempted_free_throws = away_fouls;
        teams[1].attempted_free_throws = home_fouls;
    }

    teams
}

// ── Referees ──────────────────────────────────────────────────────────────────

pub fn parse_referees(doc: &Html) -> Option<Vec<Referee>> {
    let list = doc.select(&SEL_REFEREES).next()?;
    Some(
        list.select(&SEL_LI)
            .map(elem_text)
            .filter(|name| !name.is_empty())
            .map(|name| Referee { name })
            .collect(),
    )
}

// ── Location ──────────────────────────────────────────────────────────────────

pub fn parse_location(doc: &Html) -> Option<GameLocation> {
    let section = doc.select(&SEL_LOCATION).next()?;

    if let Some(link) = section.select(&SEL_A).next() {
        let name = elem_text(link);
        if name.is_empty() {
            return None;
        }
        let map_url = link
            .value()
            .attr("href")
            .filter(|href| Url::parse(href).is_ok())
            .map(str::to_string);
        return Some(GameLocation { name, map_url });
    }

    let name = elem_text(section);
    if name.is_empty() {
        None
    } else {
        Some(GameLocation { name, map_url: None })
    }
}

// ── Match datetime ────────────────────────────────────────────────────────────

pub fn parse_datetime(doc: &Html) -> Option<String> {
    let raw = doc
        .select(&SEL_HEADER)
        .next()
        .and_then(|h| h.select(&SEL_DATETIME).next())
        .map(elem_text)?;

    match cleaner::parse_match_datetime(&raw) {
        Some(dt) => Some(cleaner::normalize_datetime(dt)),
        None => {
            warn!("Unparsable match datetime {:?}", raw);
            None
        }
    }
}

// ── Game events ───────────────────────────────────────────────────────────────

pub fn parse_events(
    doc: &Html,
    desc: &GameDescription,
    date_time: Option<&str>,
    aliases: &AliasMap,
    catalog: &EventPatternCatalog,
) -> Vec<GameEvent> {
    let Some(table) = doc.select(&SEL_EVENTS).next() else {
        debug!("No event log — synthesizing a single Forfeit event");
        return vec![GameEvent {
            time: date_time.unwrap_or("").to_string(),
            text: "Forfeit".to_string(),
            action: "Forfeit".to_string(),
            actor: Actor::System,
            team: None,
            quarter: None,
            score: None,
            advantage: None,
        }];
    };

    let ctx = GameContext {
        home_short: cleaner::short_code(&desc.home_name),
    };

    let mut events = Vec::new();
    for row in table.select(&SEL_TR) {
        // time | quarter | text | score | advantage
        let cells = cell_texts(row);
        if cells.len() < 3 {
            continue;
        }

        let text = cells[2].clone();
        if text.is_empty() {
            continue;
        }

        let classified = catalog.classify(&text, &ctx);
        let actor = match classified.actor {
            Actor::Player(name) => Actor::Player(aliases.canonical(&name)),
            other => other,
        };

        // The page's own advantage column, when filled, beats the derived one.
        let row_advantage = cells.get(4).and_then(|c| c.parse::<i32>().ok());

        events.push(GameEvent {
            time: cells[0].clone(),
            text,
            action: classified.action,
            actor,
            team: classified.team,
            quarter: cells.get(1).and_then(|c| c.parse::<u8>().ok()),
            score: cells.get(3).filter(|c| !c.is_empty()).cloned(),
            advantage: row_advantage.or(classified.advantage),
        });
    }

    // Stable: equal timestamps keep their source order.
    events.sort_by(|a, b| a.time.cmp(&b.time));
    events
}
