//! Local reference table configuration.
//!
//! Configuration can be set programmatically, parsed from JSON, or loaded
//! from environment variables:
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LOCALREF_INITIAL_CAPACITY` | Slots allocated on first growth | 64 |
//! | `LOCALREF_MAX_CAPACITY` | Hard slot limit | 65536 |
//! | `LOCALREF_GROWTH_FACTOR` | Geometric growth multiplier | 2 |
//! | `LOCALREF_CHECK_MODE` | `strict` or `permissive` | strict |
//!
//! Absent or unparsable variables fall back to the defaults.

use std::env;

use serde::Deserialize;

const DEFAULT_INITIAL_CAPACITY: u32 = 64;
const DEFAULT_MAX_CAPACITY: u32 = 65_536;
const DEFAULT_GROWTH_FACTOR: u32 = 2;
const MIN_GROWTH_FACTOR: u32 = 2;

/// What happens when native code presents a bad handle to a mutating
/// operation, or breaks segment ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Report through the diagnostics channel, then abort the process.
    #[default]
    Strict,
    /// Report and return the failure to the caller; no state is changed.
    Permissive,
}

impl CheckMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "abort" => Some(CheckMode::Strict),
            "permissive" | "report" => Some(CheckMode::Permissive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LrtConfig {
    /// Slot count allocated the first time the table grows.
    pub initial_capacity: u32,
    /// The table never holds more than this many slots.
    pub max_capacity: u32,
    /// Storage grows to `len * growth_factor` slots, clamped to `max_capacity`.
    pub growth_factor: u32,
    pub check_mode: CheckMode,
}

impl Default for LrtConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            check_mode: CheckMode::Strict,
        }
    }
}

impl LrtConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: u32) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn with_growth_factor(mut self, growth_factor: u32) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    pub fn with_check_mode(mut self, check_mode: CheckMode) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Loads configuration from `LOCALREF_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u32>("LOCALREF_INITIAL_CAPACITY") {
            config.initial_capacity = v;
        }
        if let Some(v) = env_parse::<u32>("LOCALREF_MAX_CAPACITY") {
            config.max_capacity = v;
        }
        if let Some(v) = env_parse::<u32>("LOCALREF_GROWTH_FACTOR") {
            config.growth_factor = v;
        }
        if let Some(mode) = env::var("LOCALREF_CHECK_MODE")
            .ok()
            .and_then(|s| CheckMode::parse(&s))
        {
            config.check_mode = mode;
        }

        config.normalized()
    }

    /// Parses a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Clamps fields into a consistent range.
    ///
    /// `initial_capacity` is at least 1 and otherwise never exceeds
    /// `max_capacity`. The growth factor is at least 2 so growth is geometric.
    pub fn normalized(mut self) -> Self {
        self.initial_capacity = self.initial_capacity.clamp(1, self.max_capacity.max(1));
        self.growth_factor = self.growth_factor.max(MIN_GROWTH_FACTOR);
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
