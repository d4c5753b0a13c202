// Error types for the analysis core
//
// Unresolvable callsigns and unclassifiable contacts are values, not errors.
// Only database loading and contest configuration can fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContestError {
    /// The prefix database had no record we could use
    #[error("prefix database contains no usable records")]
    EmptyDatabase,

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Contest definition JSON could not be parsed
    #[error("invalid contest definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// A classifier setting is outside its usable range
    #[error("invalid classifier setting {name} = {value}")]
    InvalidSetting { name: &'static str, value: String },

    /// A multiplier rule names a calculator that is not registered
    #[error("unknown multiplier source '{0}'")]
    UnknownCalculator(String),
}

pub type Result<T> = std::result::Result<T, ContestError>;
