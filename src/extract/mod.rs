//! Extraction pipeline for one game page: section extractors feed the
//! record assembler, which cross-references their partial outputs.

pub mod cleaner;
pub mod events;
pub mod parsers;

use anyhow::Result;
use scraper::Html;
use tracing::warn;

use crate::extract::cleaner::AliasMap;
use crate::extract::events::EventPatternCatalog;
use crate::extract::parsers::ExtractError;
use crate::models::{GameRecord, Outcome};

/// Assemble one normalized game record from a raw cached page.
///
/// Returns `Ok(None)` for a game that has not been played yet (0 : 0 final
/// score) — routine, the batch re-queues such games on a later run. Any hard
/// extraction failure aborts this game only; nothing partial is ever
/// returned.
pub fn assemble(
    html: &str,
    game_id: Option<&str>,
    aliases: &AliasMap,
    catalog: &EventPatternCatalog,
) -> Result<Option<GameRecord>> {
    let doc = Html::parse_document(html);

    let desc = match parsers::parse_description(&doc) {
        Ok(desc) => desc,
        Err(ExtractError::NotStarted) => {
            warn!("Game {:?} not played yet (0 : 0) — no record", game_id);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if game_id.is_none() {
        // Data-quality issue, not a blocker: the record is still useful.
        warn!(
            "No external game id for {} vs {} — emitting record without one",
            desc.home_name, desc.away_name
        );
    }

    let date_time = parsers::parse_datetime(&doc);
    let mut teams = parsers::parse_teams(&doc, &desc, aliases);
    let events = parsers::parse_events(&doc, &desc, date_time.as_deref(), aliases, catalog);
    let referees = parsers::parse_referees(&doc);
    let location = parsers::parse_location(&doc);

    // Outcome needs two extractors' outputs: the winner name from the
    // description and the team list from the box score.
    for team in &mut teams {
        team.result = if team.name == desc.winner {
            Outcome::Win
        } else {
            Outcome::from_league_points(team.league_points)
        };
    }

    let home_short = cleaner::short_code(&desc.home_name);
    let away_short = cleaner::short_code(&desc.away_name);

    Ok(Some(GameRecord {
        game_id: game_id.map(str::to_string),
        division: desc.division.clone(),
        teams_short: format!("{} - {}", home_short, away_short),
        home_team_name: desc.home_name.clone(),
        away_team_name: desc.away_name.clone(),
        final_score: format!("{} : {}", desc.home_score, desc.away_score),
        final_home_score: desc.home_score,
        final_away_score: desc.away_score,
        winner_team_name: desc.winner.clone(),
        loser_team_name: desc.loser.clone(),
        home_league_points: desc.home_league_points,
        away_league_points: desc.away_league_points,
        date_time,
        location,
        referees,
        teams,
        events,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, TeamRole};

    const FULL_PAGE: &str = r#"<html><body>
        <div class="game-header">
          <span class="division">Division 2 Hommes</span>
          <span class="home-team">Racing C</span>
          <span class="away-team">Schieren B</span>
          <span class="final-score">85 : 78</span>
          <span class="datetime">11/05/2024 - 18h30</span>
        </div>
        <div class="game-location"><a href="https://maps.example.com/?q=49.6,6.1">Hall Omnisports</a></div>
        <ul class="referees"><li>Paul Faber</li></ul>
        <table class="box-score">
          <tr class="team-header"><td>Racing C</td></tr>
          <tr><td>4</td><td>Jean Dupont</td><td>*</td><td>2</td><td>3</td><td>1</td><td>11</td><td>P1</td></tr>
          <tr><td>Total</td></tr>
          <tr class="team-header"><td>Schieren B</td></tr>
          <tr><td>5</td><td>Marc Weber</td><td>*</td><td>1</td><td>0</td><td>2</td><td>7</td><td>P2</td></tr>
          <tr><td>Total</td></tr>
        </table>
        <table class="game-events">
          <tr><td>18:44:02</td><td>1</td><td>3P Jean Dupont RACING</td><td>3 : 0</td><td></td></tr>
          <tr><td>18:31:00</td><td></td><td>Starting five: Jean Dupont (RACING)</td><td></td><td></td></tr>
        </table>
        </body></html>"#;

    const FORFEIT_PAGE: &str = r#"<html><body>
        <div class="game-header">
          <span class="division">Division 2 Hommes</span>
          <span class="home-team">Racing C</span>
          <span class="away-team">Schieren B</span>
          <span class="final-score">0 : 20</span>
        </div>
        </body></html>"#;

    #[test]
    fn test_assemble_full_page() {
        let aliases = AliasMap::default();
        let catalog = EventPatternCatalog::builtin();
        let record = assemble(FULL_PAGE, Some("12345"), &aliases, &catalog)
            .unwrap()
            .unwrap();

        assert_eq!(record.game_id.as_deref(), Some("12345"));
        assert_eq!(record.teams_short, "RACING - SCHIEREN");
        assert_eq!(record.final_score, "85 : 78");
        assert_eq!(record.winner_team_name, "Racing C");
        assert_eq!(record.date_time.as_deref(), Some("2024-05-11T18:30:00"));
        assert_eq!(record.location.as_ref().unwrap().name, "Hall Omnisports");
        assert_eq!(record.referees.as_ref().unwrap().len(), 1);

        assert_eq!(record.teams.len(), 2);
        assert_eq!(record.teams[0].role, TeamRole::Home);
        assert_eq!(record.teams[0].result, Outcome::Win);
        assert_eq!(record.teams[1].result, Outcome::Loss);

        // Sorted ascending; the lineup row came second in the source.
        assert_eq!(record.events[0].action, "Starting line-up added");
        assert_eq!(record.events[0].quarter, None);
        assert_eq!(record.events[1].advantage, Some(3));
    }

    #[test]
    fn test_assemble_not_started_returns_none() {
        let page = FORFEIT_PAGE.replace("0 : 20", "0 : 0");
        let aliases = AliasMap::default();
        let catalog = EventPatternCatalog::builtin();
        assert!(assemble(&page, Some("1"), &aliases, &catalog).unwrap().is_none());
    }

    #[test]
    fn test_assemble_missing_id_still_emits() {
        let aliases = AliasMap::default();
        let catalog = EventPatternCatalog::builtin();
        let record = assemble(FULL_PAGE, None, &aliases, &catalog).unwrap().unwrap();
        assert_eq!(record.game_id, None);
        assert_eq!(record.final_home_score, 85);
    }

    #[test]
    fn test_assemble_forfeit_page() {
        let aliases = AliasMap::default();
        let catalog = EventPatternCatalog::builtin();
        let record = assemble(FORFEIT_PAGE, Some("99"), &aliases, &catalog)
            .unwrap()
            .unwrap();

        assert_eq!(record.events.len(), 1);
        assert_eq!(record.events[0].action, "Forfeit");
        assert_eq!(record.events[0].actor, Actor::System);
        assert_eq!(record.teams[0].result, Outcome::Forfeit);
        assert_eq!(record.teams[1].result, Outcome::Win);
        assert!(record.teams.iter().all(|t| t.players.is_empty()));
    }

    #[test]
    fn test_assemble_malformed_page_is_an_error() {
        let aliases = AliasMap::default();
        let catalog = EventPatternCatalog::builtin();
        assert!(assemble("<html><body></body></html>", Some("1"), &aliases, &catalog).is_err());
    }

    #[test]
    fn test_record_round_trip() {
        let aliases = AliasMap::default();
        let catalog = EventPatternCatalog::builtin();
        let record = assemble(FULL_PAGE, Some("12345"), &aliases, &catalog)
            .unwrap()
            .unwrap();

        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: GameRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.game_id, record.game_id);
        assert_eq!(back.final_home_score, record.final_home_score);
        assert_eq!(back.final_away_score, record.final_away_score);
        assert_eq!(back.events.len(), record.events.len());
        assert_eq!(back, record);

        // The downstream contract keys must be present verbatim.
        assert!(json.contains("\"GameId\""));
        assert!(json.contains("\"HomeTeamName\""));
        assert!(json.contains("\"Player Name\""));
        assert!(json.contains("\"EventAdvantage\""));
    }
}
