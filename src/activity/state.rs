// =============================================================================
// Run Detection - State Machine
// =============================================================================
//
// One state machine per stream (band + mode), fed in chronological order.
//
// ```text
//            3 QSOs on one frequency within 10 min
//   Idle  ------------------------------------------>  InRun
//    ^                                                   |
//    |   > 2 min without a QSO on the run frequency      |
//    +------ or 3 consecutive QSOs on other frequencies -+
// ```
//
// The contact that ends a run is re-evaluated from Idle right away, so an
// operator who moves and keeps calling CQ starts a new run without delay.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::ClassificationLabel;
use crate::config::ClassifierSettings;

/// Frequencies closer than this on top of the tolerance are still equal
const FREQ_EPSILON_KHZ: f64 = 1e-6;

/// A run in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveRun {
    /// Frequency the run was established on
    pub freq_khz: f64,
    /// Time of the latest contact on the run frequency
    pub last_on_freq: DateTime<Utc>,
    /// Consecutive contacts away from the run frequency
    pub off_freq_streak: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    Idle,
    InRun(ActiveRun),
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBreak {
    /// No contact on the run frequency for longer than the timeout
    Timeout,
    /// Too many consecutive contacts on other frequencies
    FrequencyChange,
}

/// What one contact did to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Started,
    Ended(RunBreak),
    /// The run ended and the same contact started a new one
    Restarted(RunBreak),
}

/// Run detection state for a single stream
#[derive(Debug, Clone)]
pub struct StreamState<'s> {
    settings: &'s ClassifierSettings,
    tolerance_khz: f64,
    state: RunState,
    /// Recent (time, frequency) pairs inside the onset window
    recent: VecDeque<(DateTime<Utc>, f64)>,
}

impl<'s> StreamState<'s> {
    pub fn new(settings: &'s ClassifierSettings, tolerance_khz: f64) -> Self {
        Self {
            settings,
            tolerance_khz,
            state: RunState::Idle,
            recent: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::InRun(_))
    }

    /// Feed the next contact of the stream and get its provisional label
    pub fn step(
        &mut self,
        timestamp: DateTime<Utc>,
        frequency_khz: Option<f64>,
    ) -> (ClassificationLabel, Transition) {
        // Without a frequency there is nothing to compare
        let Some(freq) = frequency_khz else {
            return (ClassificationLabel::Unknown, Transition::None);
        };

        let window_start = timestamp
            .checked_sub_signed(self.settings.run_window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        while matches!(self.recent.front(), Some((t, _)) if *t < window_start) {
            self.recent.pop_front();
        }

        let mut ended = None;
        if let RunState::InRun(run) = &mut self.state {
            if timestamp - run.last_on_freq > self.settings.run_timeout() {
                ended = Some(RunBreak::Timeout);
            } else if same_freq(freq, run.freq_khz, self.tolerance_khz) {
                run.last_on_freq = timestamp;
                run.off_freq_streak = 0;
                self.recent.push_back((timestamp, freq));
                return (ClassificationLabel::Run, Transition::None);
            } else {
                run.off_freq_streak += 1;
                if run.off_freq_streak >= self.settings.off_frequency_break_qsos {
                    ended = Some(RunBreak::FrequencyChange);
                } else {
                    self.recent.push_back((timestamp, freq));
                    return (ClassificationLabel::SP, Transition::None);
                }
            }
        }

        if let Some(reason) = ended {
            self.end_run(reason, timestamp);
        }

        let started = self.evaluate_onset(timestamp, freq);
        self.recent.push_back((timestamp, freq));

        let transition = match (ended, started) {
            (Some(reason), true) => Transition::Restarted(reason),
            (Some(reason), false) => Transition::Ended(reason),
            (None, true) => Transition::Started,
            (None, false) => Transition::None,
        };
        let label = if started {
            ClassificationLabel::Run
        } else {
            ClassificationLabel::SP
        };
        (label, transition)
    }

    /// Idle: start a run if this contact completes the onset count
    fn evaluate_onset(&mut self, timestamp: DateTime<Utc>, freq: f64) -> bool {
        let matching = self
            .recent
            .iter()
            .filter(|(_, f)| same_freq(*f, freq, self.tolerance_khz))
            .count();
        if matching + 1 < self.settings.min_run_qsos {
            return false;
        }

        log::debug!("Run started on {:.1} kHz at {}", freq, timestamp);
        self.state = RunState::InRun(ActiveRun {
            freq_khz: freq,
            last_on_freq: timestamp,
            off_freq_streak: 0,
        });
        true
    }

    fn end_run(&mut self, reason: RunBreak, timestamp: DateTime<Utc>) {
        if let RunState::InRun(run) = self.state {
            log::debug!(
                "Run on {:.1} kHz ended at {} ({:?})",
                run.freq_khz,
                timestamp,
                reason
            );
            // Old run contacts must not count towards a new onset
            let tolerance = self.tolerance_khz;
            self.recent
                .retain(|(_, f)| !same_freq(*f, run.freq_khz, tolerance));
        }
        self.state = RunState::Idle;
    }
}

fn same_freq(a: f64, b: f64, tolerance_khz: f64) -> bool {
    (a - b).abs() <= tolerance_khz + FREQ_EPSILON_KHZ
}
