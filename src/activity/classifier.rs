// Two-pass activity classification for one stream
//
// Pass 1 runs the run-detection state machine over the stream and labels each
// contact Run or S&P (Unknown when it has no frequency).
//
// Pass 2 looks at the rate around every S&P contact. A contact with fewer
// than `low_rate_threshold` neighbours in both the window before and the
// window after it was not part of any sustained activity and becomes Unknown.

use chrono::{DateTime, Utc};

use super::state::{StreamState, Transition};
use super::ClassificationLabel;
use crate::config::ClassifierSettings;
use crate::contact::ContactRecord;

/// The parts of a contact the classifier looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamContact {
    pub timestamp: DateTime<Utc>,
    pub frequency_khz: Option<f64>,
}

impl From<&ContactRecord> for StreamContact {
    fn from(contact: &ContactRecord) -> Self {
        Self {
            timestamp: contact.timestamp,
            frequency_khz: contact.frequency_khz,
        }
    }
}

/// Label every contact of a stream, in the order given
///
/// Contacts are classified in chronological order; equal timestamps keep
/// their input order.
pub fn classify_stream(
    contacts: &[StreamContact],
    tolerance_khz: f64,
    settings: &ClassifierSettings,
) -> Vec<ClassificationLabel> {
    if contacts.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        return classify_sorted(contacts, tolerance_khz, settings);
    }

    let mut order: Vec<usize> = (0..contacts.len()).collect();
    order.sort_by_key(|&i| contacts[i].timestamp);
    let sorted: Vec<StreamContact> = order.iter().map(|&i| contacts[i]).collect();

    let mut labels = vec![ClassificationLabel::Unknown; contacts.len()];
    for (i, label) in order.into_iter().zip(classify_sorted(&sorted, tolerance_khz, settings)) {
        labels[i] = label;
    }
    labels
}

fn classify_sorted(
    contacts: &[StreamContact],
    tolerance_khz: f64,
    settings: &ClassifierSettings,
) -> Vec<ClassificationLabel> {
    let mut state = StreamState::new(settings, tolerance_khz);
    let mut runs = 0;
    let mut labels: Vec<ClassificationLabel> = contacts
        .iter()
        .map(|contact| {
            let (label, transition) = state.step(contact.timestamp, contact.frequency_khz);
            if matches!(transition, Transition::Started | Transition::Restarted(_)) {
                runs += 1;
            }
            label
        })
        .collect();

    let window = settings.rate_window();
    let mut demoted = 0;
    for (i, contact) in contacts.iter().enumerate() {
        if labels[i] != ClassificationLabel::SP {
            continue;
        }
        // Neighbours only; ties at the same timestamp are ordered by position
        let earliest = contact
            .timestamp
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let latest = contact
            .timestamp
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let before_start = contacts.partition_point(|c| c.timestamp < earliest);
        let after_end = contacts.partition_point(|c| c.timestamp <= latest);
        let before = i - before_start;
        let after = after_end - i - 1;

        if before < settings.low_rate_threshold && after < settings.low_rate_threshold {
            log::trace!(
                "Low rate at {}: {} before, {} after",
                contact.timestamp,
                before,
                after
            );
            labels[i] = ClassificationLabel::Unknown;
            demoted += 1;
        }
    }

    log::trace!(
        "Classified {} contacts: {} runs, {} low-rate contacts",
        contacts.len(),
        runs,
        demoted
    );
    labels
}
