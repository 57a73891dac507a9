// megohm-core/src/domain/validation/calibration.rs

// Cross-field checks between the instrument certificate and the test itself.
// The test date always comes from the report, never from the clock.

use super::Validator;
use super::finding::{RemediationKind, Severity};
use super::insulation::RULE_CALIBRATION_PRESENT as RULE_INSULATION_CALIBRATION;
use super::result::{FindingDraft, ValidationBuilder, ValidationResult, evidence};
use crate::domain::extraction::{CalibrationInfo, ExtractionResult};
use crate::domain::standards::{Domain, ValidationConfig};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;

pub const RULE_CERTIFICATE_PRESENT: &str = "CAL-001";
pub const RULE_TEST_DATE_PRESENT: &str = "CAL-002";
pub const RULE_NOT_EXPIRED: &str = "CAL-003";
pub const RULE_TRACEABLE: &str = "CAL-004";
pub const RULE_INTERVAL: &str = "CAL-005";
pub const RULE_NEAR_EXPIRY: &str = "CAL-006";

pub struct CalibrationValidator {
    config: Arc<ValidationConfig>,
}

impl CalibrationValidator {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }
}

impl Validator for CalibrationValidator {
    fn domain(&self) -> Domain {
        Domain::Calibration
    }

    fn validate(&self, extraction: &ExtractionResult) -> ValidationResult {
        let mut builder = ValidationBuilder::new(&self.config, Domain::Calibration);

        let Some(cert) = check_certificate(&mut builder, extraction) else {
            return builder.create_result();
        };

        let test_date = check_test_date(&mut builder, extraction);
        let valid_at_test = check_expiry(&mut builder, cert, test_date);
        check_traceability(&mut builder, cert);

        match test_date {
            Some(test_date) => {
                check_interval(&mut builder, cert, test_date);
                if let Some(expires_on) = valid_at_test {
                    check_near_expiry(&mut builder, expires_on, test_date);
                }
            }
            None => {
                if let Some(calibrated_on) = cert.calibrated_on.as_ref() {
                    not_evaluated(&mut builder, RULE_INTERVAL, json!(calibrated_on.value), "no test date");
                }
            }
        }

        builder.create_result()
    }
}

fn check_certificate<'e>(
    builder: &mut ValidationBuilder<'_>,
    extraction: &'e ExtractionResult,
) -> Option<&'e CalibrationInfo> {
    let cert = extraction
        .calibration
        .as_ref()
        .filter(|c| c.has_certificate());
    let required = extraction.test_type.requires_calibration();

    match (cert, required) {
        (Some(cert), _) => {
            let id = cert.certificate_id.as_ref().map(|c| c.value.clone());
            builder.track_rule(
                RULE_CERTIFICATE_PRESENT,
                true,
                evidence(json!(id), json!("certificate on file")),
            );
            Some(cert)
        }
        // The insulation validator reports this one as IR-CAL-001.
        (None, _) if extraction.covers_insulation() => {
            let mut details = evidence(Value::Null, json!("certificate on file"));
            details.insert("reported_as".into(), json!(RULE_INSULATION_CALIBRATION));
            builder.track_rule(RULE_CERTIFICATE_PRESENT, false, details);
            None
        }
        (None, true) => {
            builder.add_finding(
                FindingDraft::new(
                    RULE_CERTIFICATE_PRESENT,
                    Severity::Critical,
                    RemediationKind::DocumentationFix,
                    format!(
                        "No calibration certificate supplied; required for {} tests",
                        extraction.test_type
                    ),
                )
                .at("calibration")
                .evidence(Value::Null, json!("certificate on file")),
            );
            None
        }
        (None, false) => {
            let mut details = evidence(Value::Null, json!("not required"));
            details.insert("test_type".into(), json!(extraction.test_type.as_str()));
            builder.track_rule(RULE_CERTIFICATE_PRESENT, true, details);
            None
        }
    }
}

fn check_test_date(
    builder: &mut ValidationBuilder<'_>,
    extraction: &ExtractionResult,
) -> Option<NaiveDate> {
    match &extraction.test_date {
        Some(date) => {
            builder.track_rule(
                RULE_TEST_DATE_PRESENT,
                true,
                evidence(json!(date.value), json!("test date on report")),
            );
            Some(date.value)
        }
        None => {
            builder.add_finding(
                FindingDraft::new(
                    RULE_TEST_DATE_PRESENT,
                    Severity::Critical,
                    RemediationKind::DocumentationFix,
                    "Test date is missing; calibration validity cannot be established",
                )
                .at("test_date")
                .evidence(Value::Null, json!("test date on report")),
            );
            None
        }
    }
}

/// Returns the expiry date when the certificate was valid on the test date.
fn check_expiry(
    builder: &mut ValidationBuilder<'_>,
    cert: &CalibrationInfo,
    test_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let Some(expires_on) = cert.expires_on.as_ref() else {
        builder.add_finding(
            FindingDraft::new(
                RULE_NOT_EXPIRED,
                Severity::Critical,
                RemediationKind::DocumentationFix,
                "Calibration certificate has no expiry date",
            )
            .at("calibration.expires_on")
            .evidence(Value::Null, json!(test_date)),
        );
        return None;
    };

    // Nothing to compare against; the missing test date is already a finding.
    let Some(test_date) = test_date else {
        not_evaluated(builder, RULE_NOT_EXPIRED, json!(expires_on.value), "no test date");
        return None;
    };

    if expires_on.value >= test_date {
        builder.track_rule(
            RULE_NOT_EXPIRED,
            true,
            evidence(json!(expires_on.value), json!(test_date)),
        );
        Some(expires_on.value)
    } else {
        let days = (test_date - expires_on.value).num_days();
        builder.add_finding(
            FindingDraft::new(
                RULE_NOT_EXPIRED,
                Severity::Critical,
                RemediationKind::RetestRequired,
                format!(
                    "Calibration expired on {} ({days} days before the test on {test_date}); instrument accuracy is unverifiable",
                    expires_on.value
                ),
            )
            .at("calibration.expires_on")
            .evidence(json!(expires_on.value), json!(test_date))
            .confidence(expires_on.confidence)
            .detail("days_expired", json!(days)),
        );
        None
    }
}

fn check_traceability(builder: &mut ValidationBuilder<'_>, cert: &CalibrationInfo) {
    let traceable = cert.traceable.as_ref();
    if traceable.is_some_and(|t| t.value) {
        builder.track_rule(RULE_TRACEABLE, true, evidence(json!(true), json!(true)));
        return;
    }

    let message = if traceable.is_some() {
        "Calibration certificate is not traceable to a national standard"
    } else {
        "Calibration certificate does not state traceability"
    };
    builder.add_finding(
        FindingDraft::new(
            RULE_TRACEABLE,
            Severity::Major,
            RemediationKind::DocumentationFix,
            message,
        )
        .at("calibration.traceable")
        .evidence(json!(traceable.map(|t| t.value)), json!(true))
        .confidence(traceable.and_then(|t| t.confidence)),
    );
}

fn check_interval(builder: &mut ValidationBuilder<'_>, cert: &CalibrationInfo, test_date: NaiveDate) {
    // The interval only applies when the certificate states a calibration date.
    let Some(calibrated_on) = cert.calibrated_on.as_ref() else {
        return;
    };
    let limit = &builder.config().calibration.max_interval_days;
    let days = (test_date - calibrated_on.value).num_days();

    if days < 0 {
        builder.add_finding(
            FindingDraft::new(
                RULE_INTERVAL,
                Severity::Major,
                RemediationKind::DocumentationFix,
                format!(
                    "Certificate is dated {} which is after the test on {test_date}",
                    calibrated_on.value
                ),
            )
            .at("calibration.calibrated_on")
            .evidence(json!(calibrated_on.value), json!(test_date))
            .against(&limit.reference)
            .confidence(calibrated_on.confidence),
        );
    } else if days as f64 > limit.value {
        builder.add_finding(
            FindingDraft::new(
                RULE_INTERVAL,
                Severity::Major,
                RemediationKind::RetestRequired,
                format!(
                    "Instrument was calibrated {days} days before the test (limit {} days)",
                    limit.value
                ),
            )
            .at("calibration.calibrated_on")
            .evidence(json!(days), json!(limit.value))
            .against(&limit.reference)
            .confidence(calibrated_on.confidence),
        );
    } else {
        builder.track_rule(RULE_INTERVAL, true, evidence(json!(days), json!(limit.value)));
    }
}

/// A rule that applies but had nothing to compare against. Recorded as
/// failed; the missing input is already a finding.
fn not_evaluated(builder: &mut ValidationBuilder<'_>, rule_id: &str, extracted_value: Value, reason: &str) {
    let mut details = evidence(extracted_value, Value::Null);
    details.insert("reason".into(), json!(reason));
    builder.track_rule(rule_id, false, details);
}

fn check_near_expiry(builder: &mut ValidationBuilder<'_>, expires_on: NaiveDate, test_date: NaiveDate) {
    let limit = &builder.config().calibration.expiry_warning_days;
    let remaining = (expires_on - test_date).num_days();

    if remaining as f64 <= limit.value {
        builder.add_finding(
            FindingDraft::new(
                RULE_NEAR_EXPIRY,
                Severity::Info,
                RemediationKind::DocumentationFix,
                format!("Certificate expires {remaining} days after the test; renew before the next test"),
            )
            .at("calibration.expires_on")
            .evidence(json!(remaining), json!(limit.value))
            .against(&limit.reference),
        );
    } else {
        builder.track_rule(RULE_NEAR_EXPIRY, true, evidence(json!(remaining), json!(limit.value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::{Extracted, TestType};
    use crate::domain::standards::StandardProfile;

    fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow::anyhow!("bad date"))
    }

    fn report(test_date: NaiveDate, expires_on: NaiveDate) -> ExtractionResult {
        let mut ex = ExtractionResult::new("CAL-T", TestType::InsulationResistance);
        ex.test_date = Some(Extracted::new(test_date));
        ex.calibration = Some(CalibrationInfo {
            certificate_id: Some(Extracted::new("CERT-9".into())),
            instrument: Some("MIT1025".into()),
            calibrated_on: None,
            expires_on: Some(Extracted::new(expires_on)),
            traceable: Some(Extracted::new(true)),
        });
        ex
    }

    fn validate(ex: &ExtractionResult) -> anyhow::Result<ValidationResult> {
        let cfg = Arc::new(ValidationConfig::build(StandardProfile::Neta)?);
        Ok(CalibrationValidator::new(cfg).validate(ex))
    }

    #[test]
    fn test_valid_certificate_passes() -> anyhow::Result<()> {
        let result = validate(&report(date(2024, 3, 1)?, date(2025, 1, 1)?))?;
        assert!(result.findings().is_empty(), "{:?}", result.findings());
        assert!(result.rules_evaluated().iter().all(|r| r.passed));
        Ok(())
    }

    #[test]
    fn test_expiry_on_test_day_is_still_valid() -> anyhow::Result<()> {
        let result = validate(&report(date(2024, 3, 1)?, date(2024, 3, 1)?))?;
        assert!(!result.findings().iter().any(|f| f.rule_id == RULE_NOT_EXPIRED));
        // ...but it does warrant a renewal note
        assert_eq!(result.findings()[0].rule_id, RULE_NEAR_EXPIRY);
        assert_eq!(result.findings()[0].severity, Severity::Info);
        Ok(())
    }

    #[test]
    fn test_expired_certificate_requires_retest() -> anyhow::Result<()> {
        let result = validate(&report(date(2024, 3, 1)?, date(2024, 2, 29)?))?;
        let f = &result.findings()[0];
        assert_eq!(f.rule_id, RULE_NOT_EXPIRED);
        assert_eq!(f.severity, Severity::Critical);
        assert_eq!(f.remediation_kind, RemediationKind::RetestRequired);
        Ok(())
    }

    #[test]
    fn test_missing_certificate_is_documentation_fix() -> anyhow::Result<()> {
        let mut ex = report(date(2024, 3, 1)?, date(2025, 1, 1)?);
        ex.calibration = None;
        ex.test_type = TestType::Grounding;
        let result = validate(&ex)?;
        assert_eq!(result.findings().len(), 1);
        assert_eq!(result.findings()[0].severity, Severity::Critical);
        assert_eq!(
            result.findings()[0].remediation_kind,
            RemediationKind::DocumentationFix
        );

        ex.test_type = TestType::Thermography;
        let result = validate(&ex)?;
        assert!(result.findings().is_empty());
        assert_eq!(result.rules_evaluated().len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_certificate_on_insulation_test_is_left_to_insulation() -> anyhow::Result<()> {
        let mut ex = report(date(2024, 3, 1)?, date(2025, 1, 1)?);
        ex.calibration = None;
        let result = validate(&ex)?;
        assert!(result.findings().is_empty());
        assert_eq!(result.rules_evaluated().len(), 1);
        let evaluation = &result.rules_evaluated()[0];
        assert_eq!(evaluation.rule_id, RULE_CERTIFICATE_PRESENT);
        assert!(!evaluation.passed);
        assert_eq!(evaluation.details["reported_as"], json!("IR-CAL-001"));
        Ok(())
    }

    #[test]
    fn test_traceability_and_interval() -> anyhow::Result<()> {
        let mut ex = report(date(2024, 3, 1)?, date(2025, 1, 1)?);
        if let Some(cal) = ex.calibration.as_mut() {
            cal.traceable = Some(Extracted::new(false));
            cal.calibrated_on = Some(Extracted::new(date(2022, 12, 1)?));
        }
        let result = validate(&ex)?;
        let ids: Vec<_> = result.findings().iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec![RULE_TRACEABLE, RULE_INTERVAL]);
        assert!(result.findings().iter().all(|f| f.severity == Severity::Major));
        Ok(())
    }

    #[test]
    fn test_missing_test_date() -> anyhow::Result<()> {
        let mut ex = report(date(2024, 3, 1)?, date(2025, 1, 1)?);
        ex.test_date = None;
        if let Some(cal) = ex.calibration.as_mut() {
            cal.calibrated_on = Some(Extracted::new(date(2023, 9, 1)?));
        }
        let result = validate(&ex)?;
        assert_eq!(result.findings().len(), 1);
        assert_eq!(result.findings()[0].rule_id, RULE_TEST_DATE_PRESENT);

        // expiry and interval still show up in the audit trail, as not evaluated
        for rule in [RULE_NOT_EXPIRED, RULE_INTERVAL] {
            let evaluation = result
                .rules_evaluated()
                .iter()
                .find(|r| r.rule_id == rule)
                .ok_or_else(|| anyhow::anyhow!("{rule} was not tracked"))?;
            assert!(!evaluation.passed);
            assert_eq!(evaluation.details["reason"], json!("no test date"));
        }
        Ok(())
    }
}
