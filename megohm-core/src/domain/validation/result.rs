// megohm-core/src/domain/validation/result.rs

use super::finding::{Finding, RemediationKind, RuleEvaluation, Severity};
use crate::domain::standards::{Domain, StandardProfile, ThresholdReference, ValidationConfig};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub type RuleDetails = BTreeMap<String, Value>;

/// Details map with the two keys every rule evaluation must carry.
pub fn evidence(extracted_value: Value, threshold: Value) -> RuleDetails {
    let mut details = RuleDetails::new();
    details.insert("extracted_value".into(), extracted_value);
    details.insert("threshold".into(), threshold);
    details
}

/// Everything a validator knows about a violation before it becomes a `Finding`.
#[derive(Debug, Clone)]
pub struct FindingDraft {
    rule_id: &'static str,
    severity: Severity,
    remediation_kind: RemediationKind,
    message: String,
    field_path: String,
    extracted_value: Value,
    threshold: Value,
    threshold_reference: Option<ThresholdReference>,
    standard_reference: Option<String>,
    confidence: Option<f64>,
    details: RuleDetails,
}

impl FindingDraft {
    pub fn new(
        rule_id: &'static str,
        severity: Severity,
        remediation_kind: RemediationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            remediation_kind,
            message: message.into(),
            field_path: String::new(),
            extracted_value: Value::Null,
            threshold: Value::Null,
            threshold_reference: None,
            standard_reference: None,
            confidence: None,
            details: RuleDetails::new(),
        }
    }

    pub fn at(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = field_path.into();
        self
    }

    pub fn evidence(mut self, extracted_value: Value, threshold: Value) -> Self {
        self.extracted_value = extracted_value;
        self.threshold = threshold;
        self
    }

    /// The config threshold this finding was measured against.
    pub fn against(mut self, reference: &ThresholdReference) -> Self {
        self.threshold_reference = Some(reference.clone());
        self
    }

    /// Explicit clause citation. Wins over anything derived from the config.
    pub fn cite(mut self, standard_reference: impl Into<String>) -> Self {
        self.standard_reference = Some(standard_reference.into());
        self
    }

    pub fn confidence(mut self, confidence: Option<f64>) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

/// Output of one domain validator for one report. Immutable once built:
/// counts are derived from the findings and cannot be set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    domain: Domain,
    standard_profile: StandardProfile,
    findings: Vec<Finding>,
    rules_evaluated: Vec<RuleEvaluation>,
    counts_by_severity: BTreeMap<Severity, usize>,
}

impl ValidationResult {
    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn standard_profile(&self) -> StandardProfile {
        self.standard_profile
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn rules_evaluated(&self) -> &[RuleEvaluation] {
        &self.rules_evaluated
    }

    pub fn counts_by_severity(&self) -> &BTreeMap<Severity, usize> {
        &self.counts_by_severity
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counts_by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}

/// Per-call bookkeeping shared by every validator.
pub struct ValidationBuilder<'c> {
    config: &'c ValidationConfig,
    domain: Domain,
    findings: Vec<Finding>,
    rules: Vec<RuleEvaluation>,
}

impl<'c> ValidationBuilder<'c> {
    pub fn new(config: &'c ValidationConfig, domain: Domain) -> Self {
        Self {
            config,
            domain,
            findings: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn config(&self) -> &'c ValidationConfig {
        self.config
    }

    /// Records a violation and its failed rule evaluation.
    pub fn add_finding(&mut self, draft: FindingDraft) {
        let standard_reference = self.resolve_reference(&draft);

        let mut details = draft.details;
        details.insert("extracted_value".into(), draft.extracted_value.clone());
        details.insert("threshold".into(), draft.threshold.clone());
        details.insert("severity".into(), Value::from(draft.severity.as_str()));
        details.insert("field_path".into(), Value::from(draft.field_path.as_str()));
        details.insert(
            "standard_reference".into(),
            Value::from(standard_reference.as_str()),
        );

        self.rules.push(RuleEvaluation {
            rule_id: draft.rule_id.to_string(),
            passed: false,
            details,
        });
        self.findings.push(Finding {
            rule_id: draft.rule_id.to_string(),
            severity: draft.severity,
            message: draft.message,
            field_path: draft.field_path,
            extracted_value: draft.extracted_value,
            threshold: draft.threshold,
            standard_reference,
            remediation_kind: draft.remediation_kind,
            confidence: draft.confidence,
        });
    }

    /// Records a rule check. Passing checks only ever go through here.
    pub fn track_rule(&mut self, rule_id: &str, passed: bool, mut details: RuleDetails) {
        details
            .entry("extracted_value".into())
            .or_insert(Value::Null);
        details.entry("threshold".into()).or_insert(Value::Null);
        self.rules.push(RuleEvaluation {
            rule_id: rule_id.to_string(),
            passed,
            details,
        });
    }

    pub fn create_result(self) -> ValidationResult {
        let mut counts: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for finding in &self.findings {
            *counts.entry(finding.severity).or_insert(0) += 1;
        }

        ValidationResult {
            domain: self.domain,
            standard_profile: self.config.profile,
            findings: self.findings,
            rules_evaluated: self.rules,
            counts_by_severity: counts,
        }
    }

    fn resolve_reference(&self, draft: &FindingDraft) -> String {
        let from_config = draft
            .threshold_reference
            .as_ref()
            .unwrap_or_else(|| self.config.reference_for(self.domain))
            .citation();

        match &draft.standard_reference {
            Some(explicit) if !explicit.trim().is_empty() => {
                if draft.threshold_reference.is_some() && *explicit != from_config {
                    warn!(
                        rule_id = draft.rule_id,
                        explicit = %explicit,
                        config = %from_config,
                        "Explicit standard reference disagrees with active threshold reference, keeping explicit"
                    );
                }
                explicit.clone()
            }
            _ => from_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> anyhow::Result<ValidationConfig> {
        Ok(ValidationConfig::build(StandardProfile::Neta)?)
    }

    #[test]
    fn test_reference_is_auto_filled_from_domain() -> anyhow::Result<()> {
        let cfg = config()?;
        let mut b = ValidationBuilder::new(&cfg, Domain::Grounding);
        b.add_finding(FindingDraft::new(
            "GND-X",
            Severity::Major,
            RemediationKind::RetestRequired,
            "too high",
        ));
        let result = b.create_result();
        assert_eq!(
            result.findings()[0].standard_reference,
            "ANSI/NETA ATS-2021 §7.13.3"
        );
        Ok(())
    }

    #[test]
    fn test_explicit_reference_wins() -> anyhow::Result<()> {
        let cfg = config()?;
        let mut b = ValidationBuilder::new(&cfg, Domain::Grounding);
        b.add_finding(
            FindingDraft::new("GND-X", Severity::Minor, RemediationKind::DocumentationFix, "x")
                .against(&cfg.grounding.general_max.reference)
                .cite("IEEE 142-2007 §4.1"),
        );
        let result = b.create_result();
        assert_eq!(result.findings()[0].standard_reference, "IEEE 142-2007 §4.1");
        Ok(())
    }

    #[test]
    fn test_counts_and_evaluations_follow_findings() -> anyhow::Result<()> {
        let cfg = config()?;
        let mut b = ValidationBuilder::new(&cfg, Domain::Thermography);
        b.track_rule("T-1", true, evidence(json!(0.5), json!(1.0)));
        b.add_finding(
            FindingDraft::new("T-2", Severity::Critical, RemediationKind::RetestRequired, "hot")
                .evidence(json!(22.0), json!(15.0)),
        );
        b.add_finding(FindingDraft::new(
            "T-3",
            Severity::Critical,
            RemediationKind::RetestRequired,
            "hot",
        ));
        let result = b.create_result();

        assert_eq!(result.count(Severity::Critical), 2);
        assert_eq!(result.count(Severity::Info), 0);
        assert_eq!(result.rules_evaluated().len(), 3);
        assert_eq!(result.worst_severity(), Some(Severity::Critical));

        let failed = &result.rules_evaluated()[1];
        assert_eq!(failed.rule_id, "T-2");
        assert!(!failed.passed);
        assert_eq!(failed.details["threshold"], json!(15.0));
        assert_eq!(failed.details["extracted_value"], json!(22.0));
        Ok(())
    }

    #[test]
    fn test_track_rule_always_carries_evidence_keys() -> anyhow::Result<()> {
        let cfg = config()?;
        let mut b = ValidationBuilder::new(&cfg, Domain::Calibration);
        b.track_rule("C-1", true, RuleDetails::new());
        let result = b.create_result();
        let details = &result.rules_evaluated()[0].details;
        assert!(details.contains_key("threshold"));
        assert!(details.contains_key("extracted_value"));
        Ok(())
    }
}
