// megohm-core/src/domain/validation/grounding.rs

use super::Validator;
use super::finding::{RemediationKind, Severity};
use super::result::{FindingDraft, ValidationBuilder, ValidationResult, evidence};
use crate::domain::extraction::{EquipmentClass, Extracted, ExtractionResult};
use crate::domain::standards::{Domain, ValidationConfig};
use serde_json::{Value, json};
use std::sync::Arc;

pub const RULE_EQUIPMENT_CLASS: &str = "GND-001";
pub const RULE_RESISTANCE_PRESENT: &str = "GND-002";
pub const RULE_RESISTANCE_MAX: &str = "GND-003";

/// Exceeding the limit by more than this factor is a gross non-compliance.
const CRITICAL_FACTOR: f64 = 2.0;

pub struct GroundingValidator {
    config: Arc<ValidationConfig>,
}

impl GroundingValidator {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }
}

impl Validator for GroundingValidator {
    fn domain(&self) -> Domain {
        Domain::Grounding
    }

    fn validate(&self, extraction: &ExtractionResult) -> ValidationResult {
        let mut builder = ValidationBuilder::new(&self.config, Domain::Grounding);

        let class = check_equipment_class(&mut builder, extraction);
        let resistance = check_resistance_present(&mut builder, extraction);

        // An unclassifiable class has no applicable limit: the class finding stands alone.
        if let (Some(class), Some(resistance)) = (class, resistance) {
            check_resistance_max(&mut builder, class, resistance);
        }

        builder.create_result()
    }
}

fn check_equipment_class(
    builder: &mut ValidationBuilder<'_>,
    extraction: &ExtractionResult,
) -> Option<EquipmentClass> {
    let known = json!([
        EquipmentClass::General.as_str(),
        EquipmentClass::DataCenter.as_str()
    ]);

    // Only data-center equipment takes the stricter limit; an unstated class is general.
    let Some(raw) = extraction.equipment.class.as_ref() else {
        let mut details = evidence(Value::Null, known);
        details.insert("resolved_class".into(), json!("general (default)"));
        builder.track_rule(RULE_EQUIPMENT_CLASS, true, details);
        return Some(EquipmentClass::General);
    };

    match EquipmentClass::classify(&raw.value) {
        Some(class) => {
            let mut details = evidence(json!(raw.value), known);
            details.insert("resolved_class".into(), json!(class.as_str()));
            builder.track_rule(RULE_EQUIPMENT_CLASS, true, details);
            Some(class)
        }
        None => {
            builder.add_finding(
                FindingDraft::new(
                    RULE_EQUIPMENT_CLASS,
                    Severity::Critical,
                    RemediationKind::DocumentationFix,
                    format!("Equipment class '{}' is not a recognised class", raw.value),
                )
                .at("equipment.class")
                .evidence(json!(raw.value), known)
                .confidence(raw.confidence),
            );
            None
        }
    }
}

fn check_resistance_present<'e>(
    builder: &mut ValidationBuilder<'_>,
    extraction: &'e ExtractionResult,
) -> Option<&'e Extracted<f64>> {
    let reading = extraction
        .grounding
        .as_ref()
        .and_then(|g| g.resistance_ohms.as_ref());

    match reading {
        None => {
            builder.add_finding(
                FindingDraft::new(
                    RULE_RESISTANCE_PRESENT,
                    Severity::Critical,
                    RemediationKind::DocumentationFix,
                    "Ground resistance measurement is missing from the report",
                )
                .at("grounding.resistance_ohms"),
            );
            None
        }
        Some(r) if !r.value.is_finite() || r.value < 0.0 => {
            builder.add_finding(
                FindingDraft::new(
                    RULE_RESISTANCE_PRESENT,
                    Severity::Critical,
                    RemediationKind::DocumentationFix,
                    format!("Ground resistance {} Ω is not a plausible reading", r.value),
                )
                .at("grounding.resistance_ohms")
                .evidence(json!(r.value), json!(">= 0"))
                .confidence(r.confidence),
            );
            None
        }
        Some(r) => {
            builder.track_rule(RULE_RESISTANCE_PRESENT, true, evidence(json!(r.value), json!(">= 0")));
            Some(r)
        }
    }
}

fn check_resistance_max(
    builder: &mut ValidationBuilder<'_>,
    class: EquipmentClass,
    resistance: &Extracted<f64>,
) {
    let limit = builder.config().grounding.max_for(class);
    let value = resistance.value;

    // Inclusive boundary: exactly at the limit passes.
    if value <= limit.value {
        let mut details = evidence(json!(value), json!(limit.value));
        details.insert("equipment_class".into(), json!(class.as_str()));
        details.insert("standard_reference".into(), json!(limit.reference.citation()));
        builder.track_rule(RULE_RESISTANCE_MAX, true, details);
        return;
    }

    let severity = if value > CRITICAL_FACTOR * limit.value {
        Severity::Critical
    } else {
        Severity::Major
    };

    let draft = FindingDraft::new(
        RULE_RESISTANCE_MAX,
        severity,
        RemediationKind::RetestRequired,
        format!(
            "Ground resistance {value} Ω exceeds the {} Ω limit for {} equipment",
            limit.value,
            class.as_str()
        ),
    )
    .at("grounding.resistance_ohms")
    .evidence(json!(value), json!(limit.value))
    .against(&limit.reference)
    .confidence(resistance.confidence)
    .detail("equipment_class", json!(class.as_str()));

    builder.add_finding(draft);
}
