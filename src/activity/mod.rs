// =============================================================================
// Activity Classification - Run vs Search & Pounce
// =============================================================================
//
// Every contact is labeled with how the operator was working when it was
// made:
//
//   Run      calling CQ on one frequency and answering callers
//   S&P      tuning the band and answering other stations
//   Unknown  no frequency, or too little activity around it to tell
//
// Each (band, mode) stream is classified on its own, so an SO2R operator
// running on 20m while tuning 40m gets both right. Streams are independent
// and are classified in parallel.

pub mod classifier;
pub mod state;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierSettings;
use crate::contact::ContestLog;

pub use classifier::{classify_stream, StreamContact};
pub use state::{ActiveRun, RunBreak, RunState, StreamState, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    Run,
    #[serde(rename = "S&P")]
    SP,
    Unknown,
}

impl ClassificationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLabel::Run => "Run",
            ClassificationLabel::SP => "S&P",
            ClassificationLabel::Unknown => "Unknown",
        }
    }
}

/// Label every contact of a log, indexed like the log arena
pub fn classify_log(log: &ContestLog, settings: &ClassifierSettings) -> Vec<ClassificationLabel> {
    let streams: Vec<_> = log.streams().into_iter().collect();

    let classified: Vec<(Vec<usize>, Vec<ClassificationLabel>)> = streams
        .into_par_iter()
        .map(|(key, indices)| {
            let group = key.mode_group();
            log::debug!(
                "Classifying {} {} ({}): {} contacts",
                key.band,
                key.mode,
                group.as_str(),
                indices.len()
            );
            let contacts: Vec<StreamContact> = indices
                .iter()
                .map(|&i| StreamContact::from(&log.contacts()[i]))
                .collect();
            let labels = classify_stream(&contacts, settings.tolerance_for(group), settings);
            (indices, labels)
        })
        .collect();

    let mut labels = vec![ClassificationLabel::Unknown; log.len()];
    for (indices, stream_labels) in classified {
        for (i, label) in indices.into_iter().zip(stream_labels) {
            labels[i] = label;
        }
    }
    labels
}
