// Callsign Resolver
//
// Maps any contest-log callsign, including portable and maritime-mobile
// forms, to a geographic entity. Never fails: anything we cannot place comes
// back as the "Unknown" entity.
//
// Resolution order (first hit wins):
//   1. clean up (case, <...>, anything after '-', /P /M /QRP /B)
//   2. exact full-callsign override
//   3. special cases: /MM is Unknown, KG4 + two letters is Guantanamo Bay
//   4. portable heuristics for calls containing '/'
//   5. longest prefix match on the callsign

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{GeoEntity, LookupTable};

/// Suffixes that say how a station operates, not where
const NON_PREFIX_SUFFIXES: &[&str] = &["P", "M", "QRP", "B"];

/// Canonical prefix of Guantanamo Bay in the country file
const GUANTANAMO_PREFIX: &str = "KG4";

static GUANTANAMO_RE: OnceLock<Regex> = OnceLock::new();
static US_CANADA_RE: OnceLock<Regex> = OnceLock::new();

fn guantanamo_re() -> &'static Regex {
    GUANTANAMO_RE.get_or_init(|| Regex::new(r"^KG4[A-Z]{2}$").unwrap())
}

/// US (A, K, N, W) and Canadian (VA-VG, VO, VX, VY, CF-CK, CY, CZ, XJ-XO)
/// callsign shape: prefix, one call-area digit, 1-3 letter suffix
fn us_canada_re() -> &'static Regex {
    US_CANADA_RE.get_or_init(|| {
        Regex::new(r"^(?:[KNW][A-Z]?|A[A-L]|V[A-GOXY]|C[F-KYZ]|X[J-O])[0-9][A-Z]{1,3}$").unwrap()
    })
}

/// Result of resolving one callsign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCallsign {
    /// The callsign after clean-up
    pub call: String,
    pub entity: GeoEntity,
    pub cq_zone: u8,
    pub itu_zone: u8,
    pub continent: String,
    /// The location fragment of a portable call ("7", "VP2V"); empty otherwise
    pub portable_id: String,
}

impl ResolvedCallsign {
    fn new(call: &str, entity: GeoEntity, portable_id: &str) -> Self {
        Self {
            call: call.to_string(),
            cq_zone: entity.cq_zone,
            itu_zone: entity.itu_zone,
            continent: entity.continent.clone(),
            entity,
            portable_id: portable_id.to_string(),
        }
    }

    fn unknown(call: &str) -> Self {
        Self::new(call, GeoEntity::unknown(), "")
    }

    pub fn is_unknown(&self) -> bool {
        self.entity.is_unknown()
    }

    pub fn is_portable(&self) -> bool {
        !self.portable_id.is_empty()
    }

    /// Canonical DXCC prefix of the resolved entity
    pub fn dxcc_prefix(&self) -> &str {
        &self.entity.prefix
    }
}

/// Outcome of the portable heuristics
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PortableDecision {
    /// Malformed portable form, resolves to Unknown
    Invalid,
    /// This side of the '/' is the location
    Location(String),
    /// No rule fired
    Undecided,
}

/// Clean a raw log callsign before any matching
pub fn clean_callsign(raw: &str) -> String {
    let mut s = raw.trim();
    if s.starts_with('<') && s.ends_with('>') && s.len() >= 2 {
        s = &s[1..s.len() - 1];
    }
    if let Some(hyphen) = s.find('-') {
        s = &s[..hyphen];
    }
    let mut call = s.trim().to_uppercase();

    while let Some(slash) = call.rfind('/') {
        if NON_PREFIX_SUFFIXES.contains(&&call[slash + 1..]) {
            call.truncate(slash);
        } else {
            break;
        }
    }
    call
}

/// Resolver over a shared, read-only lookup table
#[derive(Debug, Clone, Copy)]
pub struct CallsignResolver<'t> {
    table: &'t LookupTable,
}

impl<'t> CallsignResolver<'t> {
    pub fn new(table: &'t LookupTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t LookupTable {
        self.table
    }

    pub fn resolve(&self, raw_callsign: &str) -> ResolvedCallsign {
        let call = clean_callsign(raw_callsign);
        if call.is_empty() {
            return ResolvedCallsign::unknown(&call);
        }

        if let Some(entity) = self.table.exact_match(&call) {
            log::trace!("{}: exact match {}", call, entity.name);
            // The entity is fixed, but a listed portable call still operates
            // from its location for prefix purposes
            let portable_id = if call.contains('/') {
                match self.portable_decision(&call) {
                    PortableDecision::Location(id) => id,
                    PortableDecision::Invalid | PortableDecision::Undecided => String::new(),
                }
            } else {
                String::new()
            };
            return ResolvedCallsign::new(&call, entity, &portable_id);
        }

        if call.ends_with("/MM") {
            return ResolvedCallsign::unknown(&call);
        }
        if guantanamo_re().is_match(&call) {
            if let Some(entity) = self.table.entity_by_prefix(GUANTANAMO_PREFIX) {
                return ResolvedCallsign::new(&call, entity, "");
            }
        }

        let mut portable_id = String::new();
        if call.contains('/') {
            match self.portable_decision(&call) {
                PortableDecision::Invalid => {
                    log::trace!("{}: invalid portable form", call);
                    return ResolvedCallsign::unknown(&call);
                }
                PortableDecision::Location(id) => {
                    // A bare digit only moves the call area; the base call on
                    // the left still decides the entity below
                    if !id.chars().all(|c| c.is_ascii_digit()) {
                        if let Some(entity) = self.table.longest_prefix_match(&id) {
                            log::trace!("{}: portable in {} via {}", call, entity.name, id);
                            return ResolvedCallsign::new(&call, entity, &id);
                        }
                    }
                    portable_id = id;
                }
                PortableDecision::Undecided => {}
            }
        }

        match self.table.longest_prefix_match(&call) {
            Some(entity) => ResolvedCallsign::new(&call, entity, &portable_id),
            None => {
                log::trace!("{}: no prefix match", call);
                ResolvedCallsign::new(&call, GeoEntity::unknown(), &portable_id)
            }
        }
    }

    /// Decide which side of a portable call is the location
    pub(crate) fn portable_decision(&self, call: &str) -> PortableDecision {
        let mut parts = call.split('/');
        let (left, right) = match (parts.next(), parts.next()) {
            (Some(l), Some(r)) if !l.is_empty() && !r.is_empty() => (l, r),
            _ => return PortableDecision::Undecided,
        };

        // 1. "7/KD4D": a bare number cannot lead a callsign
        if left.chars().all(|c| c.is_ascii_digit()) {
            return PortableDecision::Invalid;
        }

        // 2. Exactly one side is a known prefix
        if let Some(side) = only_one(left, right, |s| self.table.is_known_prefix(s)) {
            return PortableDecision::Location(side.to_string());
        }

        // 3. Same test after dropping one trailing digit ("DL7/W1AW")
        if let Some(side) = only_one(left, right, |s| {
            let stripped = strip_trailing_digit(s);
            !stripped.is_empty() && self.table.is_known_prefix(stripped)
        }) {
            return PortableDecision::Location(side.to_string());
        }

        // 4. US/Canadian call with a single call-area digit ("WN5N/7")
        let is_single_digit = |s: &str| s.len() == 1 && s.chars().all(|c| c.is_ascii_digit());
        if us_canada_re().is_match(left) && is_single_digit(right) {
            return PortableDecision::Location(right.to_string());
        }

        // 5. Exactly one side ends in a digit
        if let Some(side) = only_one(left, right, ends_in_digit) {
            return PortableDecision::Location(side.to_string());
        }

        PortableDecision::Undecided
    }
}

/// The side for which `test` holds, if it holds for exactly one side
fn only_one<'a>(left: &'a str, right: &'a str, test: impl Fn(&str) -> bool) -> Option<&'a str> {
    match (test(left), test(right)) {
        (true, false) => Some(left),
        (false, true) => Some(right),
        _ => None,
    }
}

fn strip_trailing_digit(s: &str) -> &str {
    match s.chars().last() {
        Some(c) if c.is_ascii_digit() => &s[..s.len() - 1],
        _ => s,
    }
}

fn ends_in_digit(s: &str) -> bool {
    s.chars().last().map_or(false, |c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{table, TEST_CTY};

    #[test]
    fn test_clean_callsign() {
        assert_eq!(clean_callsign(" k1abc/p "), "K1ABC");
        assert_eq!(clean_callsign("W1AW/QRP"), "W1AW");
        assert_eq!(clean_callsign("W1AW/M/P"), "W1AW");
        assert_eq!(clean_callsign("<DL1ABC>"), "DL1ABC");
        assert_eq!(clean_callsign("K1ABC-7"), "K1ABC");
        // Maritime mobile is not a plain suffix
        assert_eq!(clean_callsign("W1AW/MM"), "W1AW/MM");
        assert_eq!(clean_callsign("W1AW/B/7"), "W1AW/B/7");
    }

    #[test]
    fn test_plain_prefix_lookup() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        let r = resolver.resolve("DL1ABC");
        assert_eq!(r.entity.name, "Germany");
        assert_eq!(r.cq_zone, 14);
        assert_eq!(r.continent, "EU");
        assert!(!r.is_portable());

        assert_eq!(resolver.resolve("KH6XYZ").entity.name, "Hawaii");
        assert_eq!(resolver.resolve("w1aw/p").entity.name, "United States");
    }

    #[test]
    fn test_exact_match_wins() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        // K4XYZ is an exact override with zone corrections
        let r = resolver.resolve("K4XYZ");
        assert_eq!(r.entity.name, "United States");
        assert_eq!(r.cq_zone, 4);
        // KG4AB is exact-listed for Guantanamo, a plain prefix walk agrees
        assert_eq!(resolver.resolve("KG4AB").entity.name, "Guantanamo Bay");
    }

    #[test]
    fn test_exact_listed_portable_keeps_location() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        // Listed as a US station, but operating from Hawaii
        let r = resolver.resolve("W1AW/KH6");
        assert_eq!(r.entity.name, "United States");
        assert_eq!(r.portable_id, "KH6");
        assert!(!resolver.resolve("K4XYZ").is_portable());
    }

    #[test]
    fn test_maritime_mobile_is_unknown() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        assert!(resolver.resolve("W1AW/MM").is_unknown());
        assert!(resolver.resolve("DL1ABC/MM").is_unknown());
        assert!(resolver.resolve("LX/DL1ABC/MM").is_unknown());
    }

    #[test]
    fn test_guantanamo_special_case() {
        let mut table_text = TEST_CTY.to_string();
        // Without the KG4 prefix alias only the special case can find it
        table_text = table_text.replace("KG4,=KG4AA,=KG4AB;", "=KG4AB;");
        let table = LookupTable::from_cty_str(&table_text).unwrap();
        let resolver = CallsignResolver::new(&table);

        assert_eq!(resolver.resolve("KG4AA").entity.name, "Guantanamo Bay");
        assert_eq!(resolver.resolve("KG4XY").entity.name, "Guantanamo Bay");
        // Digits after KG4 fall through to prefix matching (K -> USA)
        assert_eq!(resolver.resolve("KG4AB1").entity.name, "United States");
        assert_eq!(resolver.resolve("KG4ABC").entity.name, "United States");
    }

    #[test]
    fn test_portable_us_call_with_digit() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        let r = resolver.resolve("WN5N/7");
        assert_eq!(r.portable_id, "7");
        assert_eq!(r.entity.name, "United States");
    }

    #[test]
    fn test_portable_known_prefix_side() {
        let table = table();
        let resolver = CallsignResolver::new(&table);

        let r = resolver.resolve("VP2V/KD4D");
        assert_eq!(r.portable_id, "VP2V");
        assert_eq!(r.entity.name, "British Virgin Islands");

        let r = resolver.resolve("LX/KD4D");
        assert_eq!(r.portable_id, "LX");
        assert_eq!(r.entity.name, "Luxembourg");

        let r = resolver.resolve("KD4D/KH6");
        assert_eq!(r.portable_id, "KH6");
        assert_eq!(r.entity.name, "Hawaii");
    }

    #[test]
    fn test_portable_strip_digit_tie_break() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        let r = resolver.resolve("DL7/W1AW");
        assert_eq!(r.portable_id, "DL7");
        assert_eq!(r.entity.name, "Germany");
    }

    #[test]
    fn test_invalid_digit_call_form() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        let r = resolver.resolve("7/KD4D");
        assert!(r.is_unknown());
        assert!(!r.is_portable());
    }

    #[test]
    fn test_portable_ends_in_digit_tie_break() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        // Neither side is a known prefix and HC8N is not US-shaped,
        // so only the digit rule decides; geography stays with the base call
        let r = resolver.resolve("HC8N/4");
        assert_eq!(r.portable_id, "4");
        assert_eq!(r.entity.name, "Galapagos Islands");
    }

    #[test]
    fn test_undecided_portable_falls_through() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        // Both sides are bare callsigns ending in letters: no rule fires
        let r = resolver.resolve("DL1ABC/XYZ");
        assert!(!r.is_portable());
        assert_eq!(r.entity.name, "Germany");
        assert_eq!(
            resolver.portable_decision("DL1ABC/XYZ"),
            PortableDecision::Undecided
        );
    }

    #[test]
    fn test_portable_decision_order() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        // Both sides known prefixes: rules 2 and 3 tie, rule 5 cannot split
        assert_eq!(resolver.portable_decision("LX/DL"), PortableDecision::Undecided);
        assert_eq!(
            resolver.portable_decision("W1AW/4"),
            PortableDecision::Location("4".to_string())
        );
        assert_eq!(resolver.portable_decision("W1AW/"), PortableDecision::Undecided);
        assert_eq!(resolver.portable_decision("12/W1AW"), PortableDecision::Invalid);
    }

    #[test]
    fn test_unresolvable_is_unknown() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        assert!(resolver.resolve("QQ1ABC").is_unknown());
        assert!(resolver.resolve("").is_unknown());
        assert!(resolver.resolve("   ").is_unknown());
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let table = table();
        let resolver = CallsignResolver::new(&table);
        for call in ["VP2V/KD4D", "WN5N/7", "KG4AA", "R1FJ", "HC8N/4"] {
            assert_eq!(resolver.resolve(call), resolver.resolve(call));
        }
    }
}
