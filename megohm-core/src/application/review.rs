// megohm-core/src/application/review.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use crate::application::audit::{AuditOutcome, emit_audit};
use crate::domain::error::DomainError;
use crate::domain::extraction::ExtractionResult;
use crate::domain::standards::{ConfigCache, StandardProfile, ValidationConfig};
use crate::domain::validation::{
    CalibrationValidator, Finding, GroundingValidator, InsulationValidator, Severity,
    ThermographyValidator, ValidationResult, Validator, Verdict, aggregate, findings_by_severity,
};
use crate::error::MegohmError;
use crate::ports::audit::AuditSink;

/// Everything the report renderer and the approval workflow need for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    analysis_id: String,
    standard_profile: StandardProfile,
    verdict: Verdict,
    results: Vec<ValidationResult>,
    audit: AuditOutcome,
}

impl AnalysisReport {
    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    pub fn standard_profile(&self) -> StandardProfile {
        self.standard_profile
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn audit(&self) -> AuditOutcome {
        self.audit
    }

    /// Findings across domains, most severe first.
    pub fn findings_by_severity(&self) -> Vec<&Finding> {
        findings_by_severity(&self.results)
    }

    pub fn counts_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut totals = BTreeMap::new();
        for result in &self.results {
            for (severity, count) in result.counts_by_severity() {
                *totals.entry(*severity).or_insert(0) += count;
            }
        }
        totals
    }

    pub fn rules_evaluated(&self) -> usize {
        self.results.iter().map(|r| r.rules_evaluated().len()).sum()
    }
}

/// Review use case: config lookup, domain validators, verdict, audit trail.
pub struct ReviewEngine {
    cache: Arc<ConfigCache>,
}

impl ReviewEngine {
    pub fn new(cache: Arc<ConfigCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Runs every applicable validator. Pure: same input, same output.
    pub fn evaluate(
        &self,
        extraction: &ExtractionResult,
        profile: StandardProfile,
    ) -> Result<Vec<ValidationResult>, DomainError> {
        let config = self.cache.get(profile)?;
        Ok(validators_for(extraction, &config)
            .iter()
            .map(|v| v.validate(extraction))
            .collect())
    }

    #[instrument(skip(self, extraction, sink), fields(analysis_id = %extraction.analysis_id, test_type = %extraction.test_type))]
    pub fn review(
        &self,
        extraction: &ExtractionResult,
        profile: StandardProfile,
        sink: &dyn AuditSink,
    ) -> Result<AnalysisReport, MegohmError> {
        let results = self.evaluate(extraction, profile)?;
        let verdict = aggregate(&results);

        // The only clock read of a review, and it stays out of classification.
        let audit = emit_audit(&extraction.analysis_id, &results, sink, Utc::now());

        info!(%profile, %verdict, domains = results.len(), "Review complete");

        Ok(AnalysisReport {
            analysis_id: extraction.analysis_id.clone(),
            standard_profile: profile,
            verdict,
            results,
            audit,
        })
    }
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new(Arc::new(ConfigCache::new()))
    }
}

/// Declared test type first, plus any other section the report carries.
/// Calibration always runs. Order is fixed so results are reproducible.
fn validators_for(
    extraction: &ExtractionResult,
    config: &Arc<ValidationConfig>,
) -> Vec<Box<dyn Validator>> {
    let mut validators: Vec<Box<dyn Validator>> = Vec::with_capacity(4);

    if extraction.covers_grounding() {
        validators.push(Box::new(GroundingValidator::new(Arc::clone(config))));
    }
    if extraction.covers_insulation() {
        validators.push(Box::new(InsulationValidator::new(Arc::clone(config))));
    }
    if extraction.covers_thermography() {
        validators.push(Box::new(ThermographyValidator::new(Arc::clone(config))));
    }
    validators.push(Box::new(CalibrationValidator::new(Arc::clone(config))));

    validators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::{Extracted, GroundingData, TestType, ThermalReading};
    use crate::domain::standards::Domain;

    #[test]
    fn test_validator_selection() -> anyhow::Result<()> {
        let engine = ReviewEngine::default();
        let mut ex = ExtractionResult::new("SEL", TestType::Thermography);
        ex.thermography = vec![ThermalReading {
            label: "L1".into(),
            delta_t_c: Some(Extracted::new(0.2)),
        }];
        let domains: Vec<_> = engine
            .evaluate(&ex, StandardProfile::Neta)?
            .iter()
            .map(|r| r.domain())
            .collect();
        assert_eq!(domains, vec![Domain::Thermography, Domain::Calibration]);

        ex.grounding = Some(GroundingData::default());
        let domains: Vec<_> = engine
            .evaluate(&ex, StandardProfile::Neta)?
            .iter()
            .map(|r| r.domain())
            .collect();
        assert_eq!(
            domains,
            vec![Domain::Grounding, Domain::Thermography, Domain::Calibration]
        );
        Ok(())
    }

    #[test]
    fn test_declared_type_without_section_is_flagged() -> anyhow::Result<()> {
        let engine = ReviewEngine::default();
        let ex = ExtractionResult::new("EMPTY", TestType::Grounding);
        let results = engine.evaluate(&ex, StandardProfile::Neta)?;
        assert_eq!(results[0].domain(), Domain::Grounding);
        assert!(
            results[0]
                .findings()
                .iter()
                .any(|f| f.rule_id == "GND-002")
        );
        assert_eq!(aggregate(&results), Verdict::Rejected);
        Ok(())
    }
}
