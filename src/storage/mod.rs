//! Record repository: one pretty-printed JSON document per game, partitioned
//! by division slug — the layout the downstream report generator walks.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::GameRecord;
use crate::utils::slugify;

pub struct Repository {
    root: PathBuf,
}

impl Repository {
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).with_context(|| format!("Could not create dir {:?}", root))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// `<root>/<division-slug>/game-<id>.json`
    pub fn record_path(&self, division: &str, game_id: &str) -> PathBuf {
        self.root
            .join(slugify(division))
            .join(format!("game-{}.json", game_id))
    }

    pub fn exists(&self, division: &str, game_id: &str) -> bool {
        self.record_path(division, game_id).is_file()
    }

    /// All-or-nothing per game: serialize fully before touching the
    /// filesystem, so no partial record is ever persisted.
    pub fn write_record(&self, division: &str, game_id: &str, record: &GameRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)
            .with_context(|| format!("Failed to serialize game {}", game_id))?;

        let path = self.record_path(division, game_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
        debug!("Wrote {:?}", path);
        Ok(())
    }

    pub fn record_count(&self) -> Result<usize> {
        let mut count = 0;
        for division in self.division_dirs()? {
            for entry in fs::read_dir(&division)? {
                let path = entry?.path();
                if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    pub fn list_divisions(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .division_dirs()?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn division_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read {:?}", self.root))?
        {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }
}
