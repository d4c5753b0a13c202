// Reference data module - geographic entities and the prefix lookup table
// Source: CTY.DAT country files as used by contest loggers
//
// The table is built once per run from the prefix database and never mutated
// afterwards. It is Send + Sync, so any number of resolvers can read it
// concurrently without locking.

pub mod cty;
pub mod resolver;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use resolver::{clean_callsign, CallsignResolver, ResolvedCallsign};

/// Name and prefix used for anything we could not place
pub const UNKNOWN: &str = "Unknown";

/// A geographic (DXCC) entity as seen through one prefix or exact call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntity {
    pub name: String,
    /// Canonical DXCC prefix of the entity (e.g. "VP2V", "KG4")
    pub prefix: String,
    pub cq_zone: u8,
    pub itu_zone: u8,
    /// Two-letter continent code (NA, SA, EU, AF, AS, OC, AN)
    pub continent: String,
    pub latitude: f64,
    /// East-positive longitude
    pub longitude: f64,
    /// Offset from UTC in hours
    pub utc_offset: f32,
    /// Contest-specific (WAE) entity name; same as `name` outside Europe
    pub wae_name: String,
    /// Contest-specific (WAE) entity prefix; same as `prefix` outside Europe
    pub wae_prefix: String,
}

impl GeoEntity {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            prefix: UNKNOWN.to_string(),
            cq_zone: 0,
            itu_zone: 0,
            continent: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            utc_offset: 0.0,
            wae_name: UNKNOWN.to_string(),
            wae_prefix: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.prefix == UNKNOWN
    }
}

/// One record of the prefix database, before any per-alias overrides
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EntityRecord {
    pub name: String,
    pub prefix: String,
    pub cq_zone: u8,
    pub itu_zone: u8,
    pub continent: String,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset: f32,
    /// Entity only exists on the WAE list (primary prefix marked with '*')
    pub wae_only: bool,
}

/// Per-alias corrections carried in the alias list
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AliasOverrides {
    pub cq_zone: Option<u8>,
    pub itu_zone: Option<u8>,
    pub continent: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub utc_offset: Option<f32>,
}

#[derive(Debug, Clone)]
pub(crate) struct AliasEntry {
    entity: usize,
    overrides: AliasOverrides,
}

/// Immutable prefix and exact-callsign index
#[derive(Debug, Default)]
pub struct LookupTable {
    entities: Vec<EntityRecord>,
    prefixes: HashMap<String, AliasEntry>,
    exact: HashMap<String, AliasEntry>,
    wae_prefixes: HashMap<String, AliasEntry>,
    wae_exact: HashMap<String, AliasEntry>,
}

impl LookupTable {
    /// Register an entity and its aliases. Only the loader builds tables.
    pub(crate) fn add_entity(&mut self, record: EntityRecord, aliases: Vec<(String, bool, AliasOverrides)>) {
        let entity = self.entities.len();
        let wae_only = record.wae_only;
        self.entities.push(record);

        for (key, is_exact, overrides) in aliases {
            let index = match (wae_only, is_exact) {
                (false, false) => &mut self.prefixes,
                (false, true) => &mut self.exact,
                (true, false) => &mut self.wae_prefixes,
                (true, true) => &mut self.wae_exact,
            };
            // First definition of a key wins; country files list each key once
            if index.contains_key(&key) {
                log::debug!("Duplicate key {} ignored for entity #{}", key, entity);
                continue;
            }
            index.insert(key, AliasEntry { entity, overrides });
        }
    }

    /// Look up a complete callsign in the exact-override index
    pub fn exact_match(&self, callsign: &str) -> Option<GeoEntity> {
        let entry = self.exact.get(callsign)?;
        let wae = self.wae_exact.get(callsign);
        Some(self.materialize(entry, wae))
    }

    /// Truncate `candidate` from the right until a known prefix is found
    pub fn longest_prefix_match(&self, candidate: &str) -> Option<GeoEntity> {
        let (matched_len, entry) = longest_match(&self.prefixes, candidate)?;
        // A WAE split only applies when it is more specific than the DXCC match
        let wae = longest_match(&self.wae_prefixes, candidate)
            .filter(|(wae_len, _)| *wae_len > matched_len)
            .map(|(_, wae_entry)| wae_entry);
        Some(self.materialize(entry, wae))
    }

    /// True if `s` is itself a key of the prefix index
    pub fn is_known_prefix(&self, s: &str) -> bool {
        self.prefixes.contains_key(s)
    }

    /// Find a DXCC entity by its canonical prefix (e.g. "KG4")
    pub fn entity_by_prefix(&self, primary: &str) -> Option<GeoEntity> {
        let entity = self
            .entities
            .iter()
            .position(|e| !e.wae_only && e.prefix == primary)?;
        let entry = AliasEntry {
            entity,
            overrides: AliasOverrides::default(),
        };
        Some(self.materialize(&entry, None))
    }

    /// Number of DXCC entities (WAE-only records excluded)
    pub fn entity_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.wae_only).count()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    pub fn exact_count(&self) -> usize {
        self.exact.len()
    }

    fn materialize(&self, entry: &AliasEntry, wae: Option<&AliasEntry>) -> GeoEntity {
        let record = &self.entities[entry.entity];
        let overrides = &entry.overrides;
        let (latitude, longitude) = overrides
            .coordinates
            .unwrap_or((record.latitude, record.longitude));
        let (wae_name, wae_prefix) = match wae {
            Some(w) => {
                let wae_record = &self.entities[w.entity];
                (wae_record.name.clone(), wae_record.prefix.clone())
            }
            None => (record.name.clone(), record.prefix.clone()),
        };

        GeoEntity {
            name: record.name.clone(),
            prefix: record.prefix.clone(),
            cq_zone: overrides.cq_zone.unwrap_or(record.cq_zone),
            itu_zone: overrides.itu_zone.unwrap_or(record.itu_zone),
            continent: overrides
                .continent
                .clone()
                .unwrap_or_else(|| record.continent.clone()),
            latitude,
            longitude,
            utc_offset: overrides.utc_offset.unwrap_or(record.utc_offset),
            wae_name,
            wae_prefix,
        }
    }
}

/// Longest key of `index` that is a prefix of `candidate`, with its length
fn longest_match<'a>(
    index: &'a HashMap<String, AliasEntry>,
    candidate: &str,
) -> Option<(usize, &'a AliasEntry)> {
    (1..=candidate.len())
        .rev()
        .filter(|&end| candidate.is_char_boundary(end))
        .find_map(|end| index.get(&candidate[..end]).map(|entry| (end, entry)))
}
