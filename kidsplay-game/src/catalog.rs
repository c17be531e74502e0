//! Per-category puzzle datasets and the session-wide catalog cache.
use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::session::word::WORD_LENGTH;

/// Dataset families, one JSON array each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleCategory {
    Word,
    Math,
    Pattern,
    Memory,
    Drawing,
    Quiz,
}

impl PuzzleCategory {
    pub const ALL: [Self; 6] = [
        Self::Word,
        Self::Math,
        Self::Pattern,
        Self::Memory,
        Self::Drawing,
        Self::Quiz,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Math => "math",
            Self::Pattern => "pattern",
            Self::Memory => "memory",
            Self::Drawing => "drawing",
            Self::Quiz => "quiz",
        }
    }

    /// File name of the category's dataset under the asset base.
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Word => "wordPuzzles.json",
            Self::Math => "mathPuzzles.json",
            Self::Pattern => "patternPuzzles.json",
            Self::Memory => "memoryPuzzles.json",
            Self::Drawing => "drawingPrompts.json",
            Self::Quiz => "quizPuzzles.json",
        }
    }
}

impl fmt::Display for PuzzleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A question with a single integer answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathPuzzle {
    pub question: String,
    pub answer: i64,
}

/// A number sequence and the value that comes next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternPuzzle {
    pub pattern: Vec<i64>,
    pub answer: i64,
}

/// A multiple-choice question; `correct` indexes into `options`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizPuzzle {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
}

/// A deck of tokens where every token appears exactly twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryDeck(pub Vec<String>);

impl MemoryDeck {
    #[must_use]
    pub fn cards(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.0.len() / 2
    }

    fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("deck has no cards".to_string());
        }
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for token in &self.0 {
            *counts.entry(token.as_str()).or_default() += 1;
        }
        match counts.into_iter().find(|(_, n)| *n != 2) {
            Some((token, n)) => Err(format!("token '{token}' appears {n} times")),
            None => Ok(()),
        }
    }
}

/// One day's puzzle for a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleItem {
    Word(String),
    Math(MathPuzzle),
    Pattern(PatternPuzzle),
    Memory(MemoryDeck),
    Drawing(String),
    Quiz(QuizPuzzle),
}

/// A parsed, validated dataset for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleSet {
    Word(Vec<String>),
    Math(Vec<MathPuzzle>),
    Pattern(Vec<PatternPuzzle>),
    Memory(Vec<MemoryDeck>),
    Drawing(Vec<String>),
    Quiz(Vec<QuizPuzzle>),
}

impl PuzzleSet {
    /// Parse and validate a category's JSON array
    ///
    /// # Errors
    ///
    /// Returns `CatalogUnavailable` if the JSON does not match the category's
    /// schema or an entry is unplayable.
    pub fn parse(category: PuzzleCategory, json: &str) -> Result<Self, CatalogError> {
        let unavailable = |reason: String| CatalogError::CatalogUnavailable { category, reason };
        let set = match category {
            PuzzleCategory::Word => {
                let words: Vec<String> =
                    serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?;
                let words = words
                    .into_iter()
                    .enumerate()
                    .map(|(i, w)| normalize_word(&w).ok_or_else(|| format!("entry {i}: '{w}'")))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| unavailable(format!("not a {WORD_LENGTH}-letter word at {e}")))?;
                Self::Word(words)
            }
            PuzzleCategory::Math => {
                Self::Math(serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?)
            }
            PuzzleCategory::Pattern => {
                Self::Pattern(serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?)
            }
            PuzzleCategory::Memory => {
                let decks: Vec<MemoryDeck> =
                    serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?;
                for (i, deck) in decks.iter().enumerate() {
                    deck.validate()
                        .map_err(|e| unavailable(format!("entry {i}: {e}")))?;
                }
                Self::Memory(decks)
            }
            PuzzleCategory::Drawing => {
                Self::Drawing(serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?)
            }
            PuzzleCategory::Quiz => {
                let questions: Vec<QuizPuzzle> =
                    serde_json::from_str(json).map_err(|e| unavailable(e.to_string()))?;
                if let Some((i, q)) = questions
                    .iter()
                    .enumerate()
                    .find(|(_, q)| q.correct >= q.options.len())
                {
                    return Err(unavailable(format!(
                        "entry {i}: correct index {} out of {} options",
                        q.correct,
                        q.options.len()
                    )));
                }
                Self::Quiz(questions)
            }
        };
        Ok(set)
    }

    #[must_use]
    pub const fn category(&self) -> PuzzleCategory {
        match self {
            Self::Word(_) => PuzzleCategory::Word,
            Self::Math(_) => PuzzleCategory::Math,
            Self::Pattern(_) => PuzzleCategory::Pattern,
            Self::Memory(_) => PuzzleCategory::Memory,
            Self::Drawing(_) => PuzzleCategory::Drawing,
            Self::Quiz(_) => PuzzleCategory::Quiz,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Word(v) | Self::Drawing(v) => v.len(),
            Self::Math(v) => v.len(),
            Self::Pattern(v) => v.len(),
            Self::Memory(v) => v.len(),
            Self::Quiz(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<PuzzleItem> {
        match self {
            Self::Word(v) => v.get(index).cloned().map(PuzzleItem::Word),
            Self::Math(v) => v.get(index).cloned().map(PuzzleItem::Math),
            Self::Pattern(v) => v.get(index).cloned().map(PuzzleItem::Pattern),
            Self::Memory(v) => v.get(index).cloned().map(PuzzleItem::Memory),
            Self::Drawing(v) => v.get(index).cloned().map(PuzzleItem::Drawing),
            Self::Quiz(v) => v.get(index).cloned().map(PuzzleItem::Quiz),
        }
    }
}

fn normalize_word(raw: &str) -> Option<String> {
    let word = raw.trim().to_ascii_uppercase();
    (word.len() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_alphabetic())).then_some(word)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{category} puzzles unavailable: {reason}")]
    CatalogUnavailable {
        category: PuzzleCategory,
        reason: String,
    },
    #[error("{category} catalog is empty")]
    EmptyCatalog { category: PuzzleCategory },
}

impl CatalogError {
    #[must_use]
    pub const fn category(&self) -> PuzzleCategory {
        match self {
            Self::CatalogUnavailable { category, .. } | Self::EmptyCatalog { category } => {
                *category
            }
        }
    }
}

/// Trait for abstracting dataset transport
/// Platform-specific implementations should provide this
#[async_trait(?Send)]
pub trait PuzzleSource {
    type Error: std::error::Error + 'static;

    /// Fetch the raw JSON body of a dataset resource
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be retrieved.
    async fn fetch(&self, resource: &str) -> Result<String, Self::Error>;
}

type PendingLoad = Shared<LocalBoxFuture<'static, Result<Rc<PuzzleSet>, CatalogError>>>;

/// Fetches each category at most once and keeps it for the process lifetime.
///
/// Loads of a category that is already being fetched join the in-flight
/// request instead of starting another one.
pub struct PuzzleCatalog<P> {
    source: Rc<P>,
    asset_base: String,
    cache: RefCell<HashMap<PuzzleCategory, Rc<PuzzleSet>>>,
    pending: RefCell<HashMap<PuzzleCategory, PendingLoad>>,
}

impl<P: PuzzleSource + 'static> PuzzleCatalog<P> {
    pub fn new(source: P, asset_base: impl Into<String>) -> Self {
        Self {
            source: Rc::new(source),
            asset_base: asset_base.into(),
            cache: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn resource_path(&self, category: PuzzleCategory) -> String {
        let base = self.asset_base.trim_end_matches('/');
        if base.is_empty() {
            category.resource().to_string()
        } else {
            format!("{base}/{}", category.resource())
        }
    }

    /// Return the cached dataset for `category`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns `CatalogUnavailable` when the fetch or parse fails. Failures are
    /// not cached.
    pub async fn load(&self, category: PuzzleCategory) -> Result<Rc<PuzzleSet>, CatalogError> {
        if let Some(set) = self.cached(category) {
            return Ok(set);
        }
        let pending = self.pending_load(category);
        let result = pending.clone().await;
        {
            let mut in_flight = self.pending.borrow_mut();
            if in_flight.get(&category).is_some_and(|p| p.ptr_eq(&pending)) {
                in_flight.remove(&category);
            }
        }
        if let Ok(set) = &result {
            self.cache
                .borrow_mut()
                .entry(category)
                .or_insert_with(|| Rc::clone(set));
        }
        result
    }

    #[must_use]
    pub fn cached(&self, category: PuzzleCategory) -> Option<Rc<PuzzleSet>> {
        self.cache.borrow().get(&category).cloned()
    }

    /// Whether a fetch for `category` is still outstanding.
    #[must_use]
    pub fn is_loading(&self, category: PuzzleCategory) -> bool {
        self.pending.borrow().contains_key(&category)
    }

    fn pending_load(&self, category: PuzzleCategory) -> PendingLoad {
        self.pending
            .borrow_mut()
            .entry(category)
            .or_insert_with(|| {
                fetch_set(Rc::clone(&self.source), category, self.resource_path(category))
                    .boxed_local()
                    .shared()
            })
            .clone()
    }
}

async fn fetch_set<P: PuzzleSource>(
    source: Rc<P>,
    category: PuzzleCategory,
    path: String,
) -> Result<Rc<PuzzleSet>, CatalogError> {
    let body = source.fetch(&path).await.map_err(|err| {
        log::error!("fetching {path} failed: {err}");
        CatalogError::CatalogUnavailable {
            category,
            reason: err.to_string(),
        }
    })?;
    let set = PuzzleSet::parse(category, &body).inspect_err(|err| {
        log::error!("{path} rejected: {err}");
    })?;
    log::debug!("loaded {} {category} puzzles from {path}", set.len());
    Ok(Rc::new(set))
}
