use serde::{Deserialize, Serialize};

// ── Game record ───────────────────────────────────────────────────────────────

/// One normalized record per finished game. Field names are the keys the
/// downstream report generator reads — do not rename without migrating it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    #[serde(rename = "GameId")]
    pub game_id: Option<String>,
    #[serde(rename = "GameDivisionDisplay")]
    pub division: String,
    #[serde(rename = "GameTeamsShort")]
    pub teams_short: String, // "RACING - SCHIEREN"
    #[serde(rename = "HomeTeamName")]
    pub home_team_name: String,
    #[serde(rename = "AwayTeamName")]
    pub away_team_name: String,
    #[serde(rename = "FinalScore")]
    pub final_score: String, // "85 : 78"
    #[serde(rename = "FinalHomeScore")]
    pub final_home_score: u32,
    #[serde(rename = "FinalAwayScore")]
    pub final_away_score: u32,
    #[serde(rename = "WinnerTeamName")]
    pub winner_team_name: String,
    #[serde(rename = "LoserTeamName")]
    pub loser_team_name: String,
    #[serde(rename = "HomeTeamLeaguePoints")]
    pub home_league_points: u8,
    #[serde(rename = "AwayTeamLeaguePoints")]
    pub away_league_points: u8,
    #[serde(rename = "DateTime")]
    pub date_time: Option<String>, // normalized %Y-%m-%dT%H:%M:%S
    #[serde(rename = "GameLocation")]
    pub location: Option<GameLocation>,
    #[serde(rename = "Referees")]
    pub referees: Option<Vec<Referee>>,
    #[serde(rename = "Teams")]
    pub teams: Vec<Team>,
    #[serde(rename = "GameEvents")]
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameLocation {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MapUrl")]
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Referee {
    #[serde(rename = "Referee Name")]
    pub name: String,
}

// ── Team / player box score ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TeamRole {
    Home,
    Away,
}

/// Outcome in league terms. Forfeit is the 0-point loss of a 0–20 game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Forfeit,
}

impl Outcome {
    /// League points are the authoritative encoding: 2 → Win, 1 → Loss, 0 → Forfeit.
    pub fn from_league_points(points: u8) -> Self {
        match points {
            2 => Outcome::Win,
            1 => Outcome::Loss,
            _ => Outcome::Forfeit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    #[serde(rename = "Role")]
    pub role: TeamRole,
    #[serde(rename = "Team Name")]
    pub name: String,
    #[serde(rename = "Team Name Short")]
    pub name_short: String,
    #[serde(rename = "Players")]
    pub players: Vec<Player>,
    #[serde(rename = "Total Points Won")]
    pub total_points_won: u32,
    #[serde(rename = "Total Points Lost")]
    pub total_points_lost: u32,
    #[serde(rename = "League Points")]
    pub league_points: u8,
    /// Free throws this team shot, derived from the opponent's weighted fouls.
    #[serde(rename = "Attempted Free Throws")]
    pub attempted_free_throws: u32,
    #[serde(rename = "Result")]
    pub result: Outcome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Player {
    #[serde(rename = "Player Name")]
    pub name: String,
    #[serde(rename = "Player Number")]
    pub number: u32,
    #[serde(rename = "Starting Five")]
    pub starting_five: bool,
    #[serde(rename = "Total Points")]
    pub total_points: u32,
    #[serde(rename = "1P Made Shots")]
    pub made_1p: u32,
    #[serde(rename = "2P Made Shots")]
    pub made_2p: u32,
    #[serde(rename = "3P Made Shots")]
    pub made_3p: u32,
    #[serde(rename = "Total Fouls")]
    pub total_fouls: u32,
    #[serde(rename = "P Fouls")]
    pub fouls_p: u32, // P1 + P2 + P3
    #[serde(rename = "P1 Fouls")]
    pub fouls_p1: u32,
    #[serde(rename = "P2 Fouls")]
    pub fouls_p2: u32,
    #[serde(rename = "P3 Fouls")]
    pub fouls_p3: u32,
    #[serde(rename = "T Fouls")]
    pub fouls_t: u32,
    #[serde(rename = "U1 Fouls")]
    pub fouls_u1: u32,
    #[serde(rename = "U2 Fouls")]
    pub fouls_u2: u32,
    #[serde(rename = "D Fouls")]
    pub fouls_d: u32,
}

// ── Game events ───────────────────────────────────────────────────────────────

/// Who an event is attributed to. System and Coach are sentinels, kept out of
/// the player name space so the alias map can never capture them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "String", from = "String")]
pub enum Actor {
    Player(String),
    System,
    Coach,
    Unknown,
}

impl Actor {
    pub fn as_str(&self) -> &str {
        match self {
            Actor::Player(name) => name,
            Actor::System => "System",
            Actor::Coach => "Coach",
            Actor::Unknown => "Unknown",
        }
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> String {
        actor.as_str().to_string()
    }
}

impl From<String> for Actor {
    fn from(s: String) -> Actor {
        match s.as_str() {
            "System" => Actor::System,
            "Coach" => Actor::Coach,
            "Unknown" => Actor::Unknown,
            _ => Actor::Player(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEvent {
    #[serde(rename = "EventTime")]
    pub time: String,
    /// Raw source line, preserved for audit.
    #[serde(rename = "EventText")]
    pub text: String,
    #[serde(rename = "EventAction")]
    pub action: String,
    #[serde(rename = "EventActor")]
    pub actor: Actor,
    #[serde(rename = "EventTeam")]
    pub team: Option<String>,
    // Empty cells stay null — downstream treats null as "not applicable".
    #[serde(rename = "EventQuarter")]
    pub quarter: Option<u8>,
    #[serde(rename = "EventScore")]
    pub score: Option<String>,
    #[serde(rename = "EventAdvantage")]
    pub advantage: Option<i32>,
}

// ── Schedule catalog (input from the schedule-discovery component) ────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameCatalogEntry {
    #[serde(rename = "GameId")]
    pub game_id: String,
    #[serde(rename = "DivisionName")]
    pub division: String,
    #[serde(rename = "Status")]
    pub status: GameStatus,
    #[serde(rename = "ScheduledDate")]
    pub scheduled_date: Option<String>,
}
