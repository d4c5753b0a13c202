// Amateur Radio Band Definitions
// Reference: ARRL Band Plan and ADIF 3.1.4 Specification
//
// Contest logs carry frequency in kHz. When the log parser could not supply
// a band, the stream key falls back to the band derived here.

/// Returns the ADIF band name for a frequency in kHz
pub fn freq_khz_to_band(freq_khz: f64) -> Option<&'static str> {
    match freq_khz {
        // HF Bands
        f if (1_800.0..=2_000.0).contains(&f) => Some("160m"),
        f if (3_500.0..=4_000.0).contains(&f) => Some("80m"),
        f if (5_000.0..=5_500.0).contains(&f) => Some("60m"),
        f if (7_000.0..=7_300.0).contains(&f) => Some("40m"),
        f if (10_100.0..=10_150.0).contains(&f) => Some("30m"),
        f if (14_000.0..=14_350.0).contains(&f) => Some("20m"),
        f if (18_068.0..=18_168.0).contains(&f) => Some("17m"),
        f if (21_000.0..=21_450.0).contains(&f) => Some("15m"),
        f if (24_890.0..=24_990.0).contains(&f) => Some("12m"),
        f if (28_000.0..=29_700.0).contains(&f) => Some("10m"),
        // VHF/UHF Bands
        f if (50_000.0..=54_000.0).contains(&f) => Some("6m"),
        f if (144_000.0..=148_000.0).contains(&f) => Some("2m"),
        f if (222_000.0..=225_000.0).contains(&f) => Some("1.25m"),
        f if (420_000.0..=450_000.0).contains(&f) => Some("70cm"),
        _ => None,
    }
}

/// Normalize a band label from the log parser ("20M", " 20m ") to ADIF form
pub fn normalize_band(band: &str) -> String {
    band.trim().to_lowercase()
}
