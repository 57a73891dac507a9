// megohm-core/src/domain/validation/insulation.rs

use super::Validator;
use super::finding::{RemediationKind, Severity};
use super::result::{FindingDraft, ValidationBuilder, ValidationResult, evidence};
use crate::domain::extraction::{Extracted, ExtractionResult, InsulationMeasurement};
use crate::domain::standards::{Domain, ValidationConfig};
use serde_json::{Value, json};
use std::sync::Arc;

pub const RULE_NO_MEASUREMENTS: &str = "IR-READ-000";
pub const RULE_READINGS: &str = "IR-READ-001";
pub const RULE_POLARIZATION_INDEX: &str = "IR-PI-001";
pub const RULE_MIN_RESISTANCE: &str = "IR-MIN-001";
pub const RULE_VOLTAGE_CLASS: &str = "IR-VCLASS-001";
pub const RULE_CALIBRATION_PRESENT: &str = "IR-CAL-001";

/// Insulation resistance is normalised to this temperature before comparison.
const BASE_TEMPERATURE_C: f64 = 20.0;

/// Outcome of the polarization index classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiClass {
    Excellent,
    Acceptable,
    Questionable,
    /// 1-minute reading so high that PI carries no information (IEEE 43).
    Waived,
}

impl PiClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Acceptable => "acceptable",
            Self::Questionable => "questionable",
            Self::Waived => "waived",
        }
    }
}

pub fn polarization_index(ir_1min: f64, ir_10min: f64) -> f64 {
    ir_10min / ir_1min
}

/// IR at `temperature_c` expressed at 20 °C: resistance halves for every 10 °C rise.
pub fn correct_to_base_temperature(megohms: f64, temperature_c: f64) -> f64 {
    megohms * 2f64.powf((temperature_c - BASE_TEMPERATURE_C) / 10.0)
}

pub struct InsulationValidator {
    config: Arc<ValidationConfig>,
}

impl InsulationValidator {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }

    pub fn classify_pi(&self, ir_1min: f64, pi: f64) -> PiClass {
        let t = &self.config.insulation;
        if ir_1min > t.pi_waiver_megohms.value {
            PiClass::Waived
        } else if pi >= t.pi_excellent.value {
            PiClass::Excellent
        } else if pi >= t.pi_acceptable.value {
            PiClass::Acceptable
        } else {
            PiClass::Questionable
        }
    }
}

impl Validator for InsulationValidator {
    fn domain(&self) -> Domain {
        Domain::Insulation
    }

    fn validate(&self, extraction: &ExtractionResult) -> ValidationResult {
        let mut builder = ValidationBuilder::new(&self.config, Domain::Insulation);

        check_calibration_present(&mut builder, extraction);

        if extraction.insulation.is_empty() {
            builder.add_finding(
                FindingDraft::new(
                    RULE_NO_MEASUREMENTS,
                    Severity::Critical,
                    RemediationKind::DocumentationFix,
                    "No insulation resistance measurements found in the report",
                )
                .at("insulation"),
            );
            return builder.create_result();
        }

        let minimum = resolve_minimum(&mut builder, extraction);

        for (idx, measurement) in extraction.insulation.iter().enumerate() {
            let path = format!("insulation[{idx}]");
            let (ir_1, ir_10) = check_readings(&mut builder, measurement, &path);

            if let (Some(ir_1), Some(ir_10)) = (ir_1, ir_10) {
                self.check_polarization_index(&mut builder, ir_1, ir_10, &path);
            }
            if let (Some(ir_1), Some(minimum)) = (ir_1, minimum) {
                check_min_resistance(&mut builder, measurement, ir_1, minimum, &path);
            }
        }

        builder.create_result()
    }
}

impl InsulationValidator {
    fn check_polarization_index(
        &self,
        builder: &mut ValidationBuilder<'_>,
        ir_1: &Extracted<f64>,
        ir_10: &Extracted<f64>,
        path: &str,
    ) {
        let t = &self.config.insulation;
        let pi = polarization_index(ir_1.value, ir_10.value);
        let class = self.classify_pi(ir_1.value, pi);

        match class {
            PiClass::Questionable => {
                let draft = FindingDraft::new(
                    RULE_POLARIZATION_INDEX,
                    Severity::Major,
                    RemediationKind::RetestRequired,
                    format!(
                        "Polarization index {pi:.2} is below {:.1}; flagged for engineering review",
                        t.pi_acceptable.value
                    ),
                )
                .at(format!("{path}.readings"))
                .evidence(json!(pi), json!(t.pi_acceptable.value))
                .against(&t.pi_acceptable.reference)
                .confidence(lowest_confidence(ir_1, ir_10))
                .detail("classification", json!(class.as_str()))
                .detail("ir_1min", json!(ir_1.value))
                .detail("ir_10min", json!(ir_10.value))
                .detail("engineering_review", Value::Bool(true));
                builder.add_finding(draft);
            }
            _ => {
                let threshold = if class == PiClass::Waived {
                    t.pi_waiver_megohms.value
                } else {
                    t.pi_acceptable.value
                };
                let mut details = evidence(json!(pi), json!(threshold));
                details.insert("classification".into(), json!(class.as_str()));
                details.insert("ir_1min".into(), json!(ir_1.value));
                details.insert("ir_10min".into(), json!(ir_10.value));
                details.insert("field_path".into(), json!(format!("{path}.readings")));
                builder.track_rule(RULE_POLARIZATION_INDEX, true, details);
            }
        }
    }
}

fn lowest_confidence(a: &Extracted<f64>, b: &Extracted<f64>) -> Option<f64> {
    match (a.confidence, b.confidence) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn check_calibration_present(builder: &mut ValidationBuilder<'_>, extraction: &ExtractionResult) {
    let reference = &builder.config().calibration.reference;
    let present = extraction
        .calibration
        .as_ref()
        .is_some_and(|c| c.has_certificate());

    if present {
        builder.track_rule(
            RULE_CALIBRATION_PRESENT,
            true,
            evidence(json!("present"), json!("required")),
        );
    } else {
        builder.add_finding(
            FindingDraft::new(
                RULE_CALIBRATION_PRESENT,
                Severity::Critical,
                RemediationKind::DocumentationFix,
                "Calibration certificate is required for insulation resistance tests but was not found",
            )
            .at("calibration")
            .evidence(Value::Null, json!("required"))
            .against(reference),
        );
    }
}

/// Resolves the minimum IR (MΩ) for the equipment's voltage class, once per report.
fn resolve_minimum(
    builder: &mut ValidationBuilder<'_>,
    extraction: &ExtractionResult,
) -> Option<(u32, f64)> {
    let table = &builder.config().insulation.min_resistance;
    let rated = extraction.equipment.rated_voltage.as_ref();

    let failure = |message: String, extracted: Value| {
        FindingDraft::new(
            RULE_VOLTAGE_CLASS,
            Severity::Critical,
            RemediationKind::DocumentationFix,
            message,
        )
        .at("equipment.rated_voltage")
        .evidence(extracted, table.value_json())
        .against(table)
        .confidence(rated.and_then(|r| r.confidence))
    };

    let Some(rated) = rated else {
        builder.add_finding(failure(
            "Rated voltage is missing; the minimum insulation resistance cannot be determined".into(),
            Value::Null,
        ));
        return None;
    };
    let raw = json!(rated.value);

    let Some(volts) = rated.value.volts() else {
        builder.add_finding(failure(
            format!("Rated voltage {raw} cannot be read as a voltage"),
            raw,
        ));
        return None;
    };

    match table.class_for(volts) {
        Ok((class, minimum)) => {
            let mut details = evidence(raw, table.value_json());
            details.insert("rated_volts".into(), json!(volts));
            details.insert("voltage_class".into(), json!(class));
            details.insert("min_megohms".into(), json!(minimum));
            builder.track_rule(RULE_VOLTAGE_CLASS, true, details);
            Some((class, minimum))
        }
        Err(err) => {
            builder.add_finding(failure(err.to_string(), raw));
            None
        }
    }
}

fn check_readings<'m>(
    builder: &mut ValidationBuilder<'_>,
    measurement: &'m InsulationMeasurement,
    path: &str,
) -> (Option<&'m Extracted<f64>>, Option<&'m Extracted<f64>>) {
    let valid = |r: Option<&'m Extracted<f64>>| r.filter(|r| r.value.is_finite() && r.value > 0.0);
    let ir_1 = valid(measurement.reading_at(1.0));
    let ir_10 = valid(measurement.reading_at(10.0));

    let mut problems = Vec::new();
    if ir_1.is_none() {
        problems.push("1-minute");
    }
    if ir_10.is_none() {
        problems.push("10-minute");
    }

    let extracted = json!({
        "ir_1min": measurement.reading_at(1.0).map(|r| r.value),
        "ir_10min": measurement.reading_at(10.0).map(|r| r.value),
    });

    if problems.is_empty() {
        let mut details = evidence(extracted, json!("1-minute and 10-minute readings > 0"));
        details.insert("label".into(), json!(measurement.label));
        builder.track_rule(RULE_READINGS, true, details);
    } else {
        builder.add_finding(
            FindingDraft::new(
                RULE_READINGS,
                Severity::Critical,
                RemediationKind::DocumentationFix,
                format!(
                    "Measurement '{}' lacks a usable {} reading",
                    measurement.label,
                    problems.join(" and ")
                ),
            )
            .at(format!("{path}.readings"))
            .evidence(extracted, json!("1-minute and 10-minute readings > 0"))
            .detail("label", json!(measurement.label)),
        );
    }

    (ir_1, ir_10)
}

fn check_min_resistance(
    builder: &mut ValidationBuilder<'_>,
    measurement: &InsulationMeasurement,
    ir_1: &Extracted<f64>,
    (class, minimum): (u32, f64),
    path: &str,
) {
    let reference = &builder.config().insulation.min_resistance;
    let temperature = measurement
        .temperature_c
        .as_ref()
        .map(|t| t.value)
        .filter(|t| t.is_finite());
    let corrected = match temperature {
        Some(t) => correct_to_base_temperature(ir_1.value, t),
        None => ir_1.value,
    };

    if corrected >= minimum {
        let mut details = evidence(json!(corrected), json!(minimum));
        details.insert("voltage_class".into(), json!(class));
        details.insert("raw_megohms".into(), json!(ir_1.value));
        details.insert("temperature_c".into(), json!(temperature));
        details.insert("field_path".into(), json!(format!("{path}.readings")));
        builder.track_rule(RULE_MIN_RESISTANCE, true, details);
        return;
    }

    builder.add_finding(
        FindingDraft::new(
            RULE_MIN_RESISTANCE,
            Severity::Major,
            RemediationKind::RetestRequired,
            format!(
                "Insulation resistance {corrected:.1} MΩ is below the {minimum} MΩ minimum for the {class} V class"
            ),
        )
        .at(format!("{path}.readings"))
        .evidence(json!(corrected), json!(minimum))
        .against(reference)
        .confidence(ir_1.confidence)
        .detail("voltage_class", json!(class))
        .detail("raw_megohms", json!(ir_1.value))
        .detail("temperature_c", json!(temperature)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::{CalibrationInfo, RatedVoltage, TestType, TimedReading};
    use crate::domain::standards::StandardProfile;

    fn measurement(ir_1: f64, ir_10: f64) -> InsulationMeasurement {
        InsulationMeasurement {
            label: "A-G".into(),
            readings: vec![
                TimedReading {
                    minutes: 1.0,
                    megohms: Extracted::new(ir_1),
                },
                TimedReading {
                    minutes: 10.0,
                    megohms: Extracted::new(ir_10),
                },
            ],
            temperature_c: None,
        }
    }

    fn report(m: InsulationMeasurement) -> ExtractionResult {
        let mut ex = ExtractionResult::new("IR-T", TestType::InsulationResistance);
        ex.equipment.rated_voltage = Some(Extracted::new(RatedVoltage::Volts(208.0)));
        ex.calibration = Some(CalibrationInfo {
            certificate_id: Some(Extracted::new("CAL-77".into())),
            ..Default::default()
        });
        ex.insulation = vec![m];
        ex
    }

    fn validator() -> anyhow::Result<InsulationValidator> {
        Ok(InsulationValidator::new(Arc::new(ValidationConfig::build(
            StandardProfile::Neta,
        )?)))
    }

    #[test]
    fn test_pi_acceptable_passes() -> anyhow::Result<()> {
        let result = validator()?.validate(&report(measurement(50.0, 110.0)));
        assert!(result.findings().is_empty(), "{:?}", result.findings());
        let pi = result
            .rules_evaluated()
            .iter()
            .find(|r| r.rule_id == RULE_POLARIZATION_INDEX)
            .ok_or_else(|| anyhow::anyhow!("PI rule not evaluated"))?;
        assert!(pi.passed);
        assert_eq!(pi.details["classification"], json!("acceptable"));
        Ok(())
    }

    #[test]
    fn test_low_pi_is_major_retest() -> anyhow::Result<()> {
        let result = validator()?.validate(&report(measurement(50.0, 90.0)));
        assert_eq!(result.findings().len(), 1);
        let f = &result.findings()[0];
        assert_eq!(f.rule_id, RULE_POLARIZATION_INDEX);
        assert_eq!(f.severity, Severity::Major);
        assert_eq!(f.remediation_kind, RemediationKind::RetestRequired);
        assert_eq!(f.standard_reference, "IEEE 43-2013 §12.2.2");
        Ok(())
    }

    #[test]
    fn test_pi_classification_edges() -> anyhow::Result<()> {
        let v = validator()?;
        assert_eq!(v.classify_pi(100.0, 4.0), PiClass::Excellent);
        assert_eq!(v.classify_pi(100.0, 2.0), PiClass::Acceptable);
        assert_eq!(v.classify_pi(100.0, 1.99), PiClass::Questionable);
        assert_eq!(v.classify_pi(6_000.0, 1.1), PiClass::Waived);
        Ok(())
    }

    #[test]
    fn test_min_resistance_by_voltage_class() -> anyhow::Result<()> {
        // 208 V -> 250 V class -> 25 MΩ
        let result = validator()?.validate(&report(measurement(20.0, 80.0)));
        let f = &result.findings()[0];
        assert_eq!(f.rule_id, RULE_MIN_RESISTANCE);
        assert_eq!(f.severity, Severity::Major);
        assert_eq!(f.threshold, json!(25.0));
        assert_eq!(f.standard_reference, "ANSI/NETA ATS-2021 Table 100.1");
        Ok(())
    }

    #[test]
    fn test_temperature_correction_applies() -> anyhow::Result<()> {
        assert_eq!(correct_to_base_temperature(20.0, 30.0), 40.0);
        assert_eq!(correct_to_base_temperature(20.0, 20.0), 20.0);

        let mut m = measurement(20.0, 80.0);
        m.temperature_c = Some(Extracted::new(30.0));
        let result = validator()?.validate(&report(m));
        assert!(result.findings().is_empty());
        Ok(())
    }

    #[test]
    fn test_unresolvable_voltage_class_is_critical_documentation_fix() -> anyhow::Result<()> {
        let mut ex = report(measurement(50.0, 110.0));
        ex.equipment.rated_voltage = Some(Extracted::new(RatedVoltage::Text("high".into())));
        let result = validator()?.validate(&ex);
        assert_eq!(result.findings().len(), 1);
        assert_eq!(result.findings()[0].rule_id, RULE_VOLTAGE_CLASS);
        assert_eq!(result.findings()[0].severity, Severity::Critical);
        assert_eq!(
            result.findings()[0].remediation_kind,
            RemediationKind::DocumentationFix
        );

        ex.equipment.rated_voltage = Some(Extracted::new(RatedVoltage::Volts(230_000.0)));
        let result = validator()?.validate(&ex);
        assert_eq!(result.findings()[0].rule_id, RULE_VOLTAGE_CLASS);
        Ok(())
    }

    #[test]
    fn test_missing_calibration_is_critical() -> anyhow::Result<()> {
        let mut ex = report(measurement(50.0, 110.0));
        ex.calibration = None;
        let result = validator()?.validate(&ex);
        assert_eq!(result.findings().len(), 1);
        let f = &result.findings()[0];
        assert_eq!(f.rule_id, RULE_CALIBRATION_PRESENT);
        assert_eq!(f.severity, Severity::Critical);
        assert_eq!(f.remediation_kind, RemediationKind::DocumentationFix);
        Ok(())
    }

    #[test]
    fn test_missing_ten_minute_reading() -> anyhow::Result<()> {
        let mut m = measurement(50.0, 110.0);
        m.readings.truncate(1);
        let result = validator()?.validate(&report(m));
        assert_eq!(result.findings().len(), 1);
        assert_eq!(result.findings()[0].rule_id, RULE_READINGS);
        // PI skipped, minimum still checked on the 1-minute reading
        assert!(result.rules_evaluated().iter().any(|r| r.rule_id == RULE_MIN_RESISTANCE));
        assert!(!result.rules_evaluated().iter().any(|r| r.rule_id == RULE_POLARIZATION_INDEX));
        Ok(())
    }

    #[test]
    fn test_no_measurements() -> anyhow::Result<()> {
        let mut ex = report(measurement(50.0, 110.0));
        ex.insulation.clear();
        let result = validator()?.validate(&ex);
        assert_eq!(result.findings()[0].rule_id, RULE_NO_MEASUREMENTS);
        Ok(())
    }
}
