// Contact records and the log arena
//
// The Cabrillo parser (an external collaborator) hands us fully materialized
// contacts. We never mutate them; chronological passes work on an index view
// that is stably sorted once when the log is built.

pub mod bands;
pub mod modes;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bands::{freq_khz_to_band, normalize_band};
pub use modes::{get_mode_group, normalize_mode, ModeGroup};

/// A single contact as supplied by the log parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub call: String,
    pub band: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
    /// Transmit frequency in kHz, if the log carried one
    pub frequency_khz: Option<f64>,
    /// Marked as a duplicate by the parser; never earns a multiplier
    #[serde(default)]
    pub dupe: bool,
}

impl ContactRecord {
    pub fn new(
        call: &str,
        band: &str,
        mode: &str,
        timestamp: DateTime<Utc>,
        frequency_khz: Option<f64>,
    ) -> Self {
        Self {
            call: call.to_string(),
            band: band.to_string(),
            mode: mode.to_string(),
            timestamp,
            frequency_khz,
            dupe: false,
        }
    }

    /// The (band, mode) partition this contact is classified in
    pub fn stream_key(&self) -> StreamKey {
        let mut band = normalize_band(&self.band);
        if band.is_empty() {
            if let Some(derived) = self.frequency_khz.and_then(freq_khz_to_band) {
                band = derived.to_string();
            }
        }
        StreamKey {
            band,
            mode: normalize_mode(&self.mode),
        }
    }
}

/// Independent activity-classification partition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub band: String,
    pub mode: String,
}

impl StreamKey {
    pub fn mode_group(&self) -> ModeGroup {
        get_mode_group(&self.mode)
    }
}

/// Arena of contacts plus a stable chronological index view
#[derive(Debug, Clone, Default)]
pub struct ContestLog {
    contacts: Vec<ContactRecord>,
    chronological: Vec<usize>,
}

impl ContestLog {
    pub fn new(contacts: Vec<ContactRecord>) -> Self {
        let mut chronological: Vec<usize> = (0..contacts.len()).collect();
        // sort_by_key is stable: equal timestamps keep input order
        chronological.sort_by_key(|&i| contacts[i].timestamp);
        Self {
            contacts,
            chronological,
        }
    }

    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Arena indices in chronological order
    pub fn chronological(&self) -> &[usize] {
        &self.chronological
    }

    /// Arena indices grouped by stream, each list chronological
    pub fn streams(&self) -> BTreeMap<StreamKey, Vec<usize>> {
        let mut streams: BTreeMap<StreamKey, Vec<usize>> = BTreeMap::new();
        for &i in &self.chronological {
            streams
                .entry(self.contacts[i].stream_key())
                .or_default()
                .push(i);
        }
        streams
    }
}
