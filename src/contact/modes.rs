// Mode handling for contest logs
// Cabrillo uses short mode codes (CW, PH, RY, DG, FM); ADIF uses the long
// names. Both map onto the same groups.

use serde::{Deserialize, Serialize};

/// Mode group, decides how far apart two frequencies may be and still count
/// as the same running frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeGroup {
    /// PH, SSB, FM, AM and the digital-voice modes
    Phone,
    CW,
    /// RY, DG, RTTY, FT8, PSK...
    Data,
    Image,
}

impl ModeGroup {
    /// Cabrillo-style group label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "PH",
            Self::CW => "CW",
            Self::Data => "DG",
            Self::Image => "IMG",
        }
    }
}

/// Normalize a mode string to its uppercase form
pub fn normalize_mode(mode: &str) -> String {
    mode.trim().to_uppercase()
}

/// Get the mode group for a given mode
pub fn get_mode_group(mode: &str) -> ModeGroup {
    match normalize_mode(mode).as_str() {
        "CW" => ModeGroup::CW,

        // Phone modes, including the Cabrillo "PH"
        "PH" | "SSB" | "LSB" | "USB" | "FM" | "AM" | "C4FM" | "DMR" | "DSTAR" | "M17"
        | "FREEDV" | "DIGVOICE" => ModeGroup::Phone,

        "SSTV" | "FAX" | "ATV" => ModeGroup::Image,

        // Everything else is Data (RY, DG, RTTY, FT8, ...)
        _ => ModeGroup::Data,
    }
}
