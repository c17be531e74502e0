//! Datasets read from disk plus the answer key the simulated players use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use kidsplay_game::{
    Clock, GameConfig, PuzzleCategory, PuzzleItem, PuzzleSet, PuzzleSource, index_for,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Reads dataset files relative to a data directory
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait(?Send)]
impl PuzzleSource for FsSource {
    type Error = AssetError;

    async fn fetch(&self, resource: &str) -> Result<String, Self::Error> {
        let path = self.root.join(resource);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AssetError::Read {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Wall-clock local date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Parsed datasets and the engine config shared by every scenario.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    data_dir: PathBuf,
    config: GameConfig,
    sets: BTreeMap<PuzzleCategory, PuzzleSet>,
}

impl TesterAssets {
    /// Load all six datasets from `data_dir`. Dataset paths in `config` are
    /// replaced so they resolve against `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any dataset is missing or invalid.
    pub async fn load(data_dir: &Path, config: GameConfig) -> Result<Self> {
        let mut sets = BTreeMap::new();
        for category in PuzzleCategory::ALL {
            let path = data_dir.join(category.resource());
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let set = PuzzleSet::parse(category, &json)
                .with_context(|| format!("invalid dataset {}", path.display()))?;
            log::debug!("{category}: {} puzzles", set.len());
            sets.insert(category, set);
        }
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config: config.with_asset_base(""),
            sets,
        })
    }

    #[must_use]
    pub fn source(&self) -> FsSource {
        FsSource::new(&self.data_dir)
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn set(&self, category: PuzzleCategory) -> Option<&PuzzleSet> {
        self.sets.get(&category)
    }

    /// Dataset words, used as guesses by the random player.
    #[must_use]
    pub fn vocabulary(&self) -> Vec<String> {
        match self.set(PuzzleCategory::Word) {
            Some(PuzzleSet::Word(words)) => words.clone(),
            _ => Vec::new(),
        }
    }

    /// The puzzle every client should be shown for `category` on `day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is missing or empty.
    pub fn answer_key(&self, category: PuzzleCategory, day: NaiveDate) -> Result<PuzzleItem> {
        let set = self
            .set(category)
            .with_context(|| format!("{category} dataset not loaded"))?;
        let index = index_for(category, set.len(), day, self.config.epoch)?;
        set.item(index)
            .with_context(|| format!("{category} has no puzzle {index}"))
    }
}

#[cfg(test)]
pub(crate) fn bundled_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../kidsplay-web/static/assets/data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bundled_datasets_load() {
        let assets = TesterAssets::load(&bundled_data_dir(), GameConfig::default())
            .await
            .unwrap();
        assert_eq!(assets.config().asset_base, "");
        let epoch = assets.config().epoch;
        assert_eq!(
            assets.answer_key(PuzzleCategory::Word, epoch).unwrap(),
            PuzzleItem::Word("APPLE".to_string())
        );
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let err = TesterAssets::load(Path::new("/nonexistent/kidsplay"), GameConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[tokio::test]
    async fn fs_source_reports_path() {
        let err = FsSource::new("/nonexistent")
            .fetch("wordPuzzles.json")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/wordPuzzles.json"));
    }
}
