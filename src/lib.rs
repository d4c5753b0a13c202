// Contest Core Library
// Callsign resolution, multiplier scoring and run/S&P classification for
// contest logs. Parsing logs and rendering reports is left to the caller.

pub mod activity;
pub mod analysis;
pub mod config;
pub mod contact;
pub mod error;
pub mod multipliers;
pub mod reference;

#[cfg(test)]
pub(crate) mod test_support;

pub use activity::{classify_log, ClassificationLabel};
pub use analysis::{ContactAnalysis, LogAnalysis, LogAnalyzer};
pub use config::{ClassifierSettings, ContestDefinition, MultiplierRule};
pub use contact::{ContactRecord, ContestLog, StreamKey};
pub use error::{ContestError, Result};
pub use multipliers::{resolve_multipliers, CalculatorRegistry, MultiplierCalculator};
pub use reference::{CallsignResolver, GeoEntity, LookupTable, ResolvedCallsign};
