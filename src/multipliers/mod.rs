// =============================================================================
// Multipliers - per-contest calculators selected by name
// =============================================================================
//
// Every calculator maps each contact to an optional multiplier value. The
// shared first-worked pass then walks the log in chronological order and
// keeps the value only on the first non-dupe contact that produced it.
//
// Contest definitions pick calculators by key ("wpx_prefix", "dxcc", ...), so
// no contest's rules are compiled into the analysis pipeline.

pub mod wpx;

use std::collections::{BTreeMap, HashSet};

use crate::contact::ContestLog;
use crate::error::{ContestError, Result};
use crate::reference::ResolvedCallsign;

pub use wpx::{resolve_multipliers, wpx_prefix, PrefixMultipliers, WpxPrefixCalculator};

/// Dense values and sparse first-worked assignment for one multiplier
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplierColumn {
    pub values: Vec<Option<String>>,
    pub first_worked: Vec<Option<String>>,
}

/// A named way of deriving a multiplier from resolved contacts
pub trait MultiplierCalculator: Send + Sync {
    /// Key used by contest definitions to select this calculator
    fn key(&self) -> &'static str;

    /// Value per contact, indexed like the log arena
    fn values(&self, log: &ContestLog, resolved: &[ResolvedCallsign]) -> Vec<Option<String>>;

    fn calculate(&self, log: &ContestLog, resolved: &[ResolvedCallsign]) -> MultiplierColumn {
        let values = self.values(log, resolved);
        let first_worked = first_worked(log, &values);
        MultiplierColumn { values, first_worked }
    }
}

/// Keep each value only on its chronologically first non-dupe contact
pub fn first_worked(log: &ContestLog, values: &[Option<String>]) -> Vec<Option<String>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut assigned = vec![None; values.len()];

    for &i in log.chronological() {
        if log.contacts()[i].dupe {
            continue;
        }
        if let Some(value) = values.get(i).and_then(Option::as_deref) {
            if seen.insert(value) {
                assigned[i] = Some(value.to_string());
            }
        }
    }
    assigned
}

/// DXCC entity, keyed by its canonical prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct DxccCalculator;

impl MultiplierCalculator for DxccCalculator {
    fn key(&self) -> &'static str {
        "dxcc"
    }

    fn values(&self, _log: &ContestLog, resolved: &[ResolvedCallsign]) -> Vec<Option<String>> {
        resolved
            .iter()
            .map(|r| (!r.is_unknown()).then(|| r.entity.prefix.clone()))
            .collect()
    }
}

/// WAE entity: the contest-specific split of European DXCC entities
#[derive(Debug, Clone, Copy, Default)]
pub struct WaeCalculator;

impl MultiplierCalculator for WaeCalculator {
    fn key(&self) -> &'static str {
        "wae"
    }

    fn values(&self, _log: &ContestLog, resolved: &[ResolvedCallsign]) -> Vec<Option<String>> {
        resolved
            .iter()
            .map(|r| (!r.is_unknown()).then(|| r.entity.wae_prefix.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CqZoneCalculator;

impl MultiplierCalculator for CqZoneCalculator {
    fn key(&self) -> &'static str {
        "cq_zone"
    }

    fn values(&self, _log: &ContestLog, resolved: &[ResolvedCallsign]) -> Vec<Option<String>> {
        resolved
            .iter()
            .map(|r| (!r.is_unknown() && r.cq_zone > 0).then(|| r.cq_zone.to_string()))
            .collect()
    }
}

/// Named calculators available to contest definitions
pub struct CalculatorRegistry {
    calculators: BTreeMap<&'static str, Box<dyn MultiplierCalculator>>,
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CalculatorRegistry {
    pub fn empty() -> Self {
        Self {
            calculators: BTreeMap::new(),
        }
    }

    /// Registry with every calculator shipped in this crate
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(WpxPrefixCalculator));
        registry.register(Box::new(DxccCalculator));
        registry.register(Box::new(WaeCalculator));
        registry.register(Box::new(CqZoneCalculator));
        registry
    }

    /// Add a calculator, replacing any with the same key
    pub fn register(&mut self, calculator: Box<dyn MultiplierCalculator>) {
        self.calculators.insert(calculator.key(), calculator);
    }

    pub fn get(&self, key: &str) -> Result<&dyn MultiplierCalculator> {
        self.calculators
            .get(key)
            .map(|c| c.as_ref())
            .ok_or_else(|| ContestError::UnknownCalculator(key.to_string()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.calculators.keys().copied().collect()
    }
}
