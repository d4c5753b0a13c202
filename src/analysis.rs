// =============================================================================
// Log Analysis - resolve, score and classify a whole contest log
// =============================================================================
//
// Pipeline per log:
//   1. Resolve every callsign against the lookup table (parallel)
//   2. WPX prefixes and their first-worked assignment
//   3. Every multiplier column the contest definition names
//   4. Run / S&P / Unknown label per contact (parallel per stream)
//
// The result is one ContactAnalysis per contact, in the log's arena order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::activity::{classify_log, ClassificationLabel};
use crate::config::ContestDefinition;
use crate::contact::ContestLog;
use crate::error::Result;
use crate::multipliers::{resolve_multipliers, CalculatorRegistry};
use crate::reference::{CallsignResolver, LookupTable, ResolvedCallsign};

/// Everything we derived about one contact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactAnalysis {
    pub resolved: ResolvedCallsign,
    /// WPX prefix of the contact, "Unknown" when none
    pub wpx_prefix: String,
    /// Set on the first contact of each WPX prefix
    pub wpx_first_worked: Option<String>,
    /// Multiplier rule name -> value, set on the first contact of each value
    pub multipliers: BTreeMap<String, Option<String>>,
    pub label: ClassificationLabel,
}

/// Result of analyzing one log
#[derive(Debug, Clone, Serialize)]
pub struct LogAnalysis {
    pub contest_name: String,
    pub contacts: Vec<ContactAnalysis>,
}

impl LogAnalysis {
    pub fn wpx_prefix_count(&self) -> usize {
        self.contacts
            .iter()
            .filter(|c| c.wpx_first_worked.is_some())
            .count()
    }

    /// Number of distinct multipliers earned for a rule
    pub fn multiplier_count(&self, rule: &str) -> usize {
        self.contacts
            .iter()
            .filter(|c| matches!(c.multipliers.get(rule), Some(Some(_))))
            .count()
    }

    pub fn label_count(&self, label: ClassificationLabel) -> usize {
        self.contacts.iter().filter(|c| c.label == label).count()
    }
}

/// Analyzes logs of one contest against one lookup table
pub struct LogAnalyzer<'t> {
    resolver: CallsignResolver<'t>,
    definition: ContestDefinition,
    registry: CalculatorRegistry,
}

impl<'t> LogAnalyzer<'t> {
    /// Analyzer with the built-in calculators
    pub fn new(table: &'t LookupTable, definition: ContestDefinition) -> Result<Self> {
        Self::with_registry(table, definition, CalculatorRegistry::builtin())
    }

    /// Every multiplier rule must name a registered calculator
    pub fn with_registry(
        table: &'t LookupTable,
        definition: ContestDefinition,
        registry: CalculatorRegistry,
    ) -> Result<Self> {
        definition.classifier.validate()?;
        for rule in &definition.multiplier_rules {
            registry.get(&rule.source)?;
        }
        Ok(Self {
            resolver: CallsignResolver::new(table),
            definition,
            registry,
        })
    }

    pub fn definition(&self) -> &ContestDefinition {
        &self.definition
    }

    pub fn analyze(&self, log: &ContestLog) -> Result<LogAnalysis> {
        let resolved: Vec<ResolvedCallsign> = log
            .contacts()
            .par_iter()
            .map(|contact| self.resolver.resolve(&contact.call))
            .collect();

        let wpx = resolve_multipliers(log, &resolved);

        let mut columns = Vec::with_capacity(self.definition.multiplier_rules.len());
        for rule in &self.definition.multiplier_rules {
            let column = self.registry.get(&rule.source)?.calculate(log, &resolved);
            columns.push((rule.name.as_str(), column.first_worked));
        }

        let labels = classify_log(log, &self.definition.classifier);

        let contacts: Vec<ContactAnalysis> = resolved
            .into_iter()
            .zip(wpx.prefixes)
            .zip(wpx.first_worked)
            .zip(labels)
            .enumerate()
            .map(|(i, (((resolved, wpx_prefix), wpx_first_worked), label))| ContactAnalysis {
                resolved,
                wpx_prefix,
                wpx_first_worked,
                multipliers: columns
                    .iter()
                    .map(|(name, first_worked)| {
                        // Registered calculators may return short columns
                        (name.to_string(), first_worked.get(i).cloned().flatten())
                    })
                    .collect(),
                label,
            })
            .collect();

        let analysis = LogAnalysis {
            contest_name: self.definition.contest_name.clone(),
            contacts,
        };

        log::info!(
            "{}: {} contacts, {} unknown calls, {} WPX prefixes, {} run / {} S&P / {} unknown",
            analysis.contest_name,
            analysis.contacts.len(),
            analysis.contacts.iter().filter(|c| c.resolved.is_unknown()).count(),
            analysis.wpx_prefix_count(),
            analysis.label_count(ClassificationLabel::Run),
            analysis.label_count(ClassificationLabel::SP),
            analysis.label_count(ClassificationLabel::Unknown)
        );
        for rule in &self.definition.multiplier_rules {
            log::info!("  {} ({}): {}", rule.name, rule.source, analysis.multiplier_count(&rule.name));
        }

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MultiplierRule;
    use crate::error::ContestError;
    use crate::multipliers::MultiplierCalculator;
    use crate::test_support::{init_logging, qso, table};

    fn definition(rules: &[(&str, &str)]) -> ContestDefinition {
        ContestDefinition {
            contest_name: "TEST".to_string(),
            multiplier_rules: rules
                .iter()
                .map(|(name, source)| MultiplierRule {
                    name: name.to_string(),
                    source: source.to_string(),
                })
                .collect(),
            classifier: Default::default(),
        }
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let table = table();
        let result = LogAnalyzer::new(&table, definition(&[("Sections", "arrl_section")]));
        assert!(matches!(result, Err(ContestError::UnknownCalculator(_))));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let table = table();
        let mut definition = definition(&[]);
        definition.classifier.rate_window_minutes = -15;
        assert!(matches!(
            LogAnalyzer::new(&table, definition),
            Err(ContestError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_short_custom_column() {
        struct Lazy;
        impl MultiplierCalculator for Lazy {
            fn key(&self) -> &'static str {
                "lazy"
            }
            fn values(&self, _log: &ContestLog, _resolved: &[ResolvedCallsign]) -> Vec<Option<String>> {
                vec![Some("X".to_string())]
            }
        }

        let table = table();
        let mut registry = CalculatorRegistry::builtin();
        registry.register(Box::new(Lazy));
        let analyzer =
            LogAnalyzer::with_registry(&table, definition(&[("Lazy", "lazy")]), registry).unwrap();
        let log = ContestLog::new(vec![qso("W1AW", 0, 14025.0), qso("DL1ABC", 1, 14025.0)]);
        let analysis = analyzer.analyze(&log).unwrap();

        assert_eq!(analysis.contacts[0].multipliers["Lazy"].as_deref(), Some("X"));
        assert_eq!(analysis.contacts[1].multipliers["Lazy"], None);
    }

    #[test]
    fn test_analyze_small_log() {
        init_logging();
        let table = table();
        let analyzer = LogAnalyzer::new(
            &table,
            definition(&[("Prefixes", "wpx_prefix"), ("Countries", "dxcc")]),
        )
        .unwrap();

        let log = ContestLog::new(vec![
            qso("W1AW", 0, 14025.0),
            qso("K1ABC", 1, 14025.0),
            qso("DL1ABC", 2, 14025.0),
            qso("W1AW/MM", 3, 14025.0),
            qso("LX/KD4D", 4, 14025.0),
        ]);
        let analysis = analyzer.analyze(&log).unwrap();

        assert_eq!(analysis.contacts.len(), 5);
        // W1, K1, DL1, LX0
        assert_eq!(analysis.wpx_prefix_count(), 4);
        assert_eq!(analysis.multiplier_count("Prefixes"), 4);
        assert_eq!(analysis.multiplier_count("Countries"), 3);

        let mm = &analysis.contacts[3];
        assert!(mm.resolved.is_unknown());
        assert_eq!(mm.wpx_prefix, "Unknown");
        assert_eq!(mm.multipliers["Countries"], None);

        let lx = &analysis.contacts[4];
        assert_eq!(lx.resolved.portable_id, "LX");
        assert_eq!(lx.wpx_first_worked.as_deref(), Some("LX0"));
        assert_eq!(lx.multipliers["Countries"].as_deref(), Some("LX"));

        // Third contact on the same frequency starts the run
        assert_eq!(analysis.contacts[2].label, ClassificationLabel::Run);
        assert_eq!(analysis.label_count(ClassificationLabel::Run), 3);
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let table = table();
        let analyzer = LogAnalyzer::new(&table, definition(&[("Zones", "cq_zone")])).unwrap();
        let log = ContestLog::new(
            ["W1AW", "DL1ABC", "KH6XX", "HC8N/4", "VP2V/KD4D", "QQ1QQ", "IT9XYZ"]
                .iter()
                .enumerate()
                .map(|(i, call)| qso(call, i as i64 * 3, 14000.0 + i as f64))
                .collect(),
        );
        let first = analyzer.analyze(&log).unwrap();
        let second = analyzer.analyze(&log).unwrap();
        assert_eq!(first.contacts, second.contacts);
        assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
    }
}
