// WPX Prefix Multipliers
//
// Derives the "Worked All Prefixes" prefix of every contact, then marks the
// chronologically first contact of each prefix in the log.
//
// Examples:
//   W1AW       -> W1        (everything through the last digit)
//   R1FJ       -> R1F       (longer DXCC prefix that the call starts with)
//   WN5N/7     -> WN7       (call area moved)
//   LX/KD4D    -> LX0       (letters-only location)
//   VP2V/KD4D  -> VP2V      (location is a full prefix)
//   W1AW/MM    -> Unknown

use crate::contact::ContestLog;
use crate::reference::{clean_callsign, ResolvedCallsign, UNKNOWN};

use super::{first_worked, MultiplierCalculator};

/// Dense prefix per contact plus the sparse first-worked assignment
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixMultipliers {
    /// Prefix of every contact, "Unknown" when none could be derived
    pub prefixes: Vec<String>,
    /// Set only on the first contact that produced each prefix
    pub first_worked: Vec<Option<String>>,
}

/// Compute WPX prefixes for a whole log
///
/// `resolved` is indexed like the log arena.
pub fn resolve_multipliers(log: &ContestLog, resolved: &[ResolvedCallsign]) -> PrefixMultipliers {
    let prefixes: Vec<String> = log
        .contacts()
        .iter()
        .zip(resolved)
        .map(|(contact, r)| wpx_prefix(&contact.call, r))
        .collect();

    let values: Vec<Option<String>> = prefixes.iter().map(|p| known(p)).collect();
    let first_worked = first_worked(log, &values);

    log::debug!(
        "WPX: {} contacts, {} distinct prefixes",
        prefixes.len(),
        first_worked.iter().filter(|p| p.is_some()).count()
    );

    PrefixMultipliers {
        prefixes,
        first_worked,
    }
}

/// WPX prefix of one contact
pub fn wpx_prefix(raw_call: &str, resolved: &ResolvedCallsign) -> String {
    let call = clean_callsign(raw_call);
    if call.is_empty() || call.ends_with("/MM") {
        return UNKNOWN.to_string();
    }

    let prefix = if resolved.is_portable() {
        portable_prefix(&call, &resolved.portable_id)
    } else {
        home_prefix(base_call(&call), resolved.dxcc_prefix())
    };

    // A lone digit is not a prefix
    if prefix.is_empty() || (prefix.len() == 1 && prefix.chars().all(|c| c.is_ascii_digit())) {
        return UNKNOWN.to_string();
    }
    prefix
}

fn portable_prefix(call: &str, portable_id: &str) -> String {
    if portable_id.chars().all(|c| c.is_ascii_alphabetic()) {
        return format!("{}0", portable_id);
    }

    if portable_id.len() == 1 && portable_id.chars().all(|c| c.is_ascii_digit()) {
        let base = call.split('/').find(|side| *side != portable_id).unwrap_or(call);
        let mut prefix = default_prefix(base);
        // default_prefix always ends in a digit (possibly the fallback '0')
        prefix.pop();
        prefix.push_str(portable_id);
        return prefix;
    }

    portable_id.to_string()
}

/// Prefix of a call worked from home: through the last digit, unless the
/// resolved DXCC prefix is more specific
fn home_prefix(call: &str, dxcc_prefix: &str) -> String {
    let default = default_prefix(call);
    if dxcc_prefix.len() > default.len() && call.starts_with(dxcc_prefix) {
        return dxcc_prefix.to_string();
    }
    default
}

/// Everything through the last digit; first two letters + "0" for calls
/// without any digit
fn default_prefix(call: &str) -> String {
    match call.rfind(|c: char| c.is_ascii_digit()) {
        Some(i) => call[..=i].to_string(),
        None => {
            let letters: String = call.chars().filter(|c| c.is_ascii_alphabetic()).take(2).collect();
            format!("{}0", letters)
        }
    }
}

/// An undecided portable call is scored on its longer side
fn base_call(call: &str) -> &str {
    call.split('/')
        .fold("", |longest, side| if side.len() > longest.len() { side } else { longest })
}

fn known(prefix: &str) -> Option<String> {
    if prefix == UNKNOWN {
        None
    } else {
        Some(prefix.to_string())
    }
}

/// Registry entry for WPX prefixes
#[derive(Debug, Clone, Copy, Default)]
pub struct WpxPrefixCalculator;

impl MultiplierCalculator for WpxPrefixCalculator {
    fn key(&self) -> &'static str {
        "wpx_prefix"
    }

    fn values(&self, log: &ContestLog, resolved: &[ResolvedCallsign]) -> Vec<Option<String>> {
        log.contacts()
            .iter()
            .zip(resolved)
            .map(|(contact, r)| known(&wpx_prefix(&contact.call, r)))
            .collect()
    }
}
