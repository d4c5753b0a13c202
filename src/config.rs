// Contest definitions
//
// A contest is described by data, not code: its name, which multiplier
// calculators apply, and the activity classifier thresholds. Definitions are
// JSON documents; every classifier field has a default so most contests only
// name their multipliers.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::contact::ModeGroup;
use crate::error::{ContestError, Result};

/// Longest window or timeout a definition may ask for (one week)
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Thresholds for run/S&P detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Contacts on one frequency needed to start a run
    pub min_run_qsos: usize,
    /// Window those contacts must fall in
    pub run_window_minutes: i64,
    /// Silence on the run frequency that ends a run
    pub run_timeout_minutes: i64,
    /// Consecutive off-frequency contacts that end a run
    pub off_frequency_break_qsos: usize,
    /// Width of the before/after rate windows
    pub rate_window_minutes: i64,
    /// Below this count in both windows an S&P contact becomes Unknown
    pub low_rate_threshold: usize,
    pub cw_tolerance_khz: f64,
    pub phone_tolerance_khz: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_run_qsos: 3,
            run_window_minutes: 10,
            run_timeout_minutes: 2,
            off_frequency_break_qsos: 3,
            rate_window_minutes: 15,
            low_rate_threshold: 4,
            cw_tolerance_khz: 0.1,
            phone_tolerance_khz: 0.5,
        }
    }
}

impl ClassifierSettings {
    /// Frequency tolerance for "same frequency" in this mode group
    pub fn tolerance_for(&self, group: ModeGroup) -> f64 {
        match group {
            ModeGroup::Phone => self.phone_tolerance_khz,
            ModeGroup::CW | ModeGroup::Data | ModeGroup::Image => self.cw_tolerance_khz,
        }
    }

    /// Reject values the classifier cannot work with
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("run_window_minutes", self.run_window_minutes),
            ("run_timeout_minutes", self.run_timeout_minutes),
            ("rate_window_minutes", self.rate_window_minutes),
        ];
        for (name, minutes) in windows {
            if !(0..=MAX_WINDOW_MINUTES).contains(&minutes) {
                return Err(invalid(name, minutes));
            }
        }

        let counts = [
            ("min_run_qsos", self.min_run_qsos),
            ("off_frequency_break_qsos", self.off_frequency_break_qsos),
        ];
        for (name, count) in counts {
            if count == 0 {
                return Err(invalid(name, count));
            }
        }

        let tolerances = [
            ("cw_tolerance_khz", self.cw_tolerance_khz),
            ("phone_tolerance_khz", self.phone_tolerance_khz),
        ];
        for (name, khz) in tolerances {
            if !khz.is_finite() || khz < 0.0 {
                return Err(invalid(name, khz));
            }
        }
        Ok(())
    }

    // Window helpers clamp, so unvalidated settings still never overflow
    pub fn run_window(&self) -> Duration {
        window_minutes(self.run_window_minutes)
    }

    pub fn run_timeout(&self) -> Duration {
        window_minutes(self.run_timeout_minutes)
    }

    pub fn rate_window(&self) -> Duration {
        window_minutes(self.rate_window_minutes)
    }
}

fn window_minutes(minutes: i64) -> Duration {
    Duration::minutes(minutes.clamp(0, MAX_WINDOW_MINUTES))
}

fn invalid(name: &'static str, value: impl ToString) -> ContestError {
    ContestError::InvalidSetting {
        name,
        value: value.to_string(),
    }
}

/// One multiplier column of a contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierRule {
    /// Column name shown to the user (e.g. "Prefixes")
    pub name: String,
    /// Registry key of the calculator (e.g. "wpx_prefix")
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestDefinition {
    pub contest_name: String,
    #[serde(default)]
    pub multiplier_rules: Vec<MultiplierRule>,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

impl ContestDefinition {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(json)?;
        definition.classifier.validate()?;
        Ok(definition)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading contest definition: {:?}", path);
        let json = fs::read_to_string(path).map_err(|source| ContestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
