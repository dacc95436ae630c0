//! Batch driver: ties catalog → extraction → storage together.
//!
//! `run(false)` — incremental mode (default / cron use): only Finished games
//! from the schedule catalog are considered, and a game whose record already
//! exists on disk is skipped. Re-running after a partial batch therefore only
//! touches the games that are still missing.
//!
//! `run(true)` — force mode: reprocess and rewrite every finished game, for
//! when the extraction logic or the alias map changed.
//!
//! Every per-game failure is caught here and logged; the batch always
//! continues with the next game.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::extract;
use crate::extract::cleaner::AliasMap;
use crate::extract::events::EventPatternCatalog;
use crate::loader;
use crate::models::{GameCatalogEntry, GameStatus};
use crate::storage::Repository;

pub struct Pipeline {
    config: AppConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Written,
    SkippedExisting,
    SkippedUnplayed,
    MissingRaw,
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub processed: usize,
    pub written: usize,
    pub skipped_existing: usize,
    pub skipped_unplayed: usize,
    pub missing_raw: usize,
    pub errors: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Written => self.written += 1,
            GameOutcome::SkippedExisting => self.skipped_existing += 1,
            GameOutcome::SkippedUnplayed => self.skipped_unplayed += 1,
            GameOutcome::MissingRaw => self.missing_raw += 1,
        }
    }
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, force: bool) -> Result<PipelineStats> {
        let repo = Repository::open(&self.config.paths.output_dir)
            .context("Failed to open record repository")?;
        let aliases = loader::load_alias_map(&self.config.paths.aliases_path)?;
        let patterns = loader::load_pattern_catalog(self.config.paths.patterns_path.as_deref())?;
        let games = loader::load_catalog(&self.config.paths.catalog_path)
            .context("Schedule catalog load failed")?;

        let total = games.len();
        let finished: Vec<GameCatalogEntry> = games
            .into_iter()
            .filter(|g| g.status == GameStatus::Finished)
            .collect();
        info!("{} finished games out of {} in the catalog", finished.len(), total);

        let mut stats = PipelineStats::default();
        for (i, game) in finished.iter().enumerate() {
            if i > 0 && i % self.config.processing.progress_every == 0 {
                info!("Progress: {}/{} games", i, finished.len());
            }

            stats.processed += 1;
            match self.process_game(game, force, &repo, &aliases, &patterns) {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    // One bad page must never abort the batch.
                    warn!("Game {}: {:#}", game.game_id, e);
                    stats.errors += 1;
                }
            }
        }

        info!(
            "=== Done: {} written | {} existing | {} unplayed | {} missing raw | {} errors ===",
            stats.written, stats.skipped_existing, stats.skipped_unplayed,
            stats.missing_raw, stats.errors,
        );
        Ok(stats)
    }

    /// Reprocess one game by id, regardless of its stored record.
    pub fn run_single(&self, game_id: &str) -> Result<GameOutcome> {
        let repo = Repository::open(&self.config.paths.output_dir)?;
        let aliases = loader::load_alias_map(&self.config.paths.aliases_path)?;
        let patterns = loader::load_pattern_catalog(self.config.paths.patterns_path.as_deref())?;
        let games = loader::load_catalog(&self.config.paths.catalog_path)?;

        let game = games
            .iter()
            .find(|g| g.game_id == game_id)
            .with_context(|| format!("Game {} not in the schedule catalog", game_id))?;
        if game.status != GameStatus::Finished {
            warn!("Game {} is not flagged Finished — processing anyway", game_id);
        }

        self.process_game(game, true, &repo, &aliases, &patterns)
    }

    fn process_game(
        &self,
        game: &GameCatalogEntry,
        force: bool,
        repo: &Repository,
        aliases: &AliasMap,
        patterns: &EventPatternCatalog,
    ) -> Result<GameOutcome> {
        if !force && repo.exists(&game.division, &game.game_id) {
            debug!("Game {}: record exists — skipping", game.game_id);
            return Ok(GameOutcome::SkippedExisting);
        }

        let Some(html) = loader::load_raw_page(&self.config.paths.raw_dir, &game.game_id)? else {
            warn!("Game {}: raw page missing — skipping", game.game_id);
            return Ok(GameOutcome::MissingRaw);
        };

        match extract::assemble(&html, Some(&game.game_id), aliases, patterns)? {
            Some(record) => {
                repo.write_record(&game.division, &game.game_id, &record)?;
                debug!("Game {}: {} written", game.game_id, record.final_score);
                Ok(GameOutcome::Written)
            }
            None => Ok(GameOutcome::SkippedUnplayed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, PathsConfig, ProcessingConfig};
    use std::fs;
    use std::path::Path;

    const PAGE: &str = r#"<html><body>
        <div class="game-header">
          <span class="division">Division 2 Hommes</span>
          <span class="home-team">Racing C</span>
          <span class="away-team">Schieren B</span>
          <span class="final-score">85 : 78</span>
        </div>
        </body></html>"#;

    fn setup(tag: &str, schedule: &str) -> AppConfig {
        let base = std::env::temp_dir().join(format!("flbb-pipeline-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(base.join("raw")).unwrap();
        fs::write(base.join("schedule.json"), schedule).unwrap();

        AppConfig {
            paths: PathsConfig {
                raw_dir: base.join("raw"),
                output_dir: base.join("out"),
                catalog_path: base.join("schedule.json"),
                aliases_path: base.join("aliases.json"), // absent on purpose
                patterns_path: None,
            },
            processing: ProcessingConfig { progress_every: 50 },
        }
    }

    fn write_page(config: &AppConfig, game_id: &str, html: &str) {
        fs::write(
            config.paths.raw_dir.join(format!("game-{}.html", game_id)),
            html,
        )
        .unwrap();
    }

    const SCHEDULE: &str = r#"[
        {"GameId": "1", "DivisionName": "Division 2 Hommes", "Status": "Finished", "ScheduledDate": "2024-05-11"},
        {"GameId": "2", "DivisionName": "Division 2 Hommes", "Status": "NotStarted", "ScheduledDate": null},
        {"GameId": "3", "DivisionName": "Division 2 Hommes", "Status": "Finished", "ScheduledDate": null}
    ]"#;

    #[test]
    fn test_run_is_idempotent() {
        let config = setup("idempotent", SCHEDULE);
        write_page(&config, "1", PAGE);
        write_page(&config, "3", PAGE);

        let pipeline = Pipeline::new(config);
        let first = pipeline.run(false).unwrap();
        assert_eq!(first.processed, 2); // NotStarted game filtered out
        assert_eq!(first.written, 2);
        assert_eq!(first.errors, 0);

        let second = pipeline.run(false).unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.skipped_existing, 2);

        let forced = pipeline.run(true).unwrap();
        assert_eq!(forced.written, 2);
    }

    #[test]
    fn test_missing_raw_page_is_recoverable() {
        let config = setup("missing-raw", SCHEDULE);
        write_page(&config, "1", PAGE);
        // No page for game 3.

        let stats = Pipeline::new(config).run(false).unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(stats.missing_raw, 1);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_unplayed_game_produces_no_record() {
        let config = setup("unplayed", SCHEDULE);
        write_page(&config, "1", &PAGE.replace("85 : 78", "0 : 0"));
        write_page(&config, "3", PAGE);
        let out_dir = config.paths.output_dir.clone();

        let stats = Pipeline::new(config).run(false).unwrap();
        assert_eq!(stats.skipped_unplayed, 1);
        assert_eq!(stats.written, 1);
        assert!(!Path::new(&out_dir).join("division-2-hommes").join("game-1.json").exists());
    }

    #[test]
    fn test_malformed_page_does_not_abort_batch() {
        let config = setup("malformed", SCHEDULE);
        write_page(&config, "1", "<html><body>garbage</body></html>");
        write_page(&config, "3", PAGE);

        let stats = Pipeline::new(config).run(false).unwrap();
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.written, 1);
    }

    #[test]
    fn test_run_single() {
        let config = setup("single", SCHEDULE);
        write_page(&config, "1", PAGE);

        let pipeline = Pipeline::new(config);
        assert_eq!(pipeline.run_single("1").unwrap(), GameOutcome::Written);
        // Force semantics: a second run rewrites instead of skipping.
        assert_eq!(pipeline.run_single("1").unwrap(), GameOutcome::Written);
        assert!(pipeline.run_single("404").is_err());
    }
}
