//! Engine configuration
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rotation epoch and asset location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Local calendar date whose puzzle is index 0.
    pub epoch: NaiveDate,
    /// Prefix joined with each dataset file name.
    pub asset_base: String,
    pub delays: DelayConfig,
}

/// Display delays for scheduled UI follow-ups, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub celebration_ms: u32,
    pub auto_close_ms: u32,
    pub exhausted_close_ms: u32,
    pub retry_clear_ms: u32,
    pub mismatch_hide_ms: u32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            celebration_ms: 2000,
            auto_close_ms: 2000,
            exhausted_close_ms: 3000,
            retry_clear_ms: 2000,
            mismatch_hide_ms: 1000,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(2025, 7, 16).unwrap_or_default(),
            asset_base: String::new(),
            delays: DelayConfig::default(),
        }
    }
}

impl DelayConfig {
    /// Celebration delay capped at the auto-close delay, so the banner is
    /// dismissed while its session is still current.
    #[must_use]
    pub fn celebration_delay_ms(&self) -> u32 {
        self.celebration_ms.min(self.auto_close_ms)
    }
}

impl GameConfig {
    /// Load configuration from JSON string. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_asset_base(mut self, asset_base: impl Into<String>) -> Self {
        self.asset_base = asset_base.into();
        self
    }
}
