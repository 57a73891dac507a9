// megohm-core/src/domain/validation/thermography.rs

use super::Validator;
use super::finding::{RemediationKind, Severity};
use super::result::{FindingDraft, ValidationBuilder, ValidationResult};
use crate::domain::extraction::{ExtractionResult, ThermalReading};
use crate::domain::standards::config::Limit;
use crate::domain::standards::{Domain, ThermographyThresholds, ValidationConfig};
use serde_json::json;
use std::sync::Arc;

pub const RULE_MISSING_DELTA: &str = "THERM-000";
pub const RULE_DELTA_T: &str = "THERM-001";

/// Temperature-rise bands, ascending. Lower edge inclusive, upper edge exclusive;
/// `Serious` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    Normal,
    Attention,
    Intermediate,
    Serious,
}

impl Band {
    pub fn classify(delta_t: f64, t: &ThermographyThresholds) -> Self {
        let magnitude = delta_t.abs();
        if magnitude >= t.serious_min.value {
            Self::Serious
        } else if magnitude >= t.intermediate_min.value {
            Self::Intermediate
        } else if magnitude >= t.attention_min.value {
            Self::Attention
        } else {
            Self::Normal
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Normal => Severity::Info,
            Self::Attention => Severity::Minor,
            Self::Intermediate => Severity::Major,
            Self::Serious => Severity::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Attention => "attention",
            Self::Intermediate => "intermediate",
            Self::Serious => "serious",
        }
    }

    /// The edge that bounds this band: its lower edge, or for `Normal` the
    /// attention edge it stays under.
    fn edge<'t>(&self, t: &'t ThermographyThresholds) -> &'t Limit {
        match self {
            Self::Normal | Self::Attention => &t.attention_min,
            Self::Intermediate => &t.intermediate_min,
            Self::Serious => &t.serious_min,
        }
    }

    fn describe(&self, edge: f64) -> String {
        match self {
            Self::Normal => format!("below {edge} °C"),
            _ => format!("≥ {edge} °C"),
        }
    }
}

pub struct ThermographyValidator {
    config: Arc<ValidationConfig>,
}

impl ThermographyValidator {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }
}

impl Validator for ThermographyValidator {
    fn domain(&self) -> Domain {
        Domain::Thermography
    }

    fn validate(&self, extraction: &ExtractionResult) -> ValidationResult {
        let mut builder = ValidationBuilder::new(&self.config, Domain::Thermography);

        if extraction.thermography.is_empty() {
            builder.add_finding(
                FindingDraft::new(
                    RULE_MISSING_DELTA,
                    Severity::Critical,
                    RemediationKind::RetestRequired,
                    "No thermographic readings found in the report",
                )
                .at("thermography"),
            );
            return builder.create_result();
        }

        for (idx, reading) in extraction.thermography.iter().enumerate() {
            check_reading(&mut builder, reading, &format!("thermography[{idx}].delta_t_c"));
        }

        builder.create_result()
    }
}

fn check_reading(builder: &mut ValidationBuilder<'_>, reading: &ThermalReading, path: &str) {
    let t = &builder.config().thermography;
    let bands = json!({
        "attention_min": t.attention_min.value,
        "intermediate_min": t.intermediate_min.value,
        "serious_min": t.serious_min.value,
    });

    let Some(delta) = reading.delta_t_c.as_ref().filter(|d| d.value.is_finite()) else {
        builder.add_finding(
            FindingDraft::new(
                RULE_MISSING_DELTA,
                Severity::Critical,
                RemediationKind::RetestRequired,
                format!("Reading '{}' has no usable temperature rise", reading.label),
            )
            .at(path)
            .evidence(json!(reading.delta_t_c.as_ref().map(|d| d.value)), bands),
        );
        return;
    };

    let band = Band::classify(delta.value, t);
    let edge = band.edge(t);
    // Every band is reported; the normal band only as INFO.
    builder.add_finding(
        FindingDraft::new(
            RULE_DELTA_T,
            band.severity(),
            RemediationKind::RetestRequired,
            format!(
                "ΔT {} °C on '{}' falls in the {} band ({})",
                delta.value,
                reading.label,
                band.as_str(),
                band.describe(edge.value)
            ),
        )
        .at(path)
        .evidence(json!(delta.value), json!(edge.value))
        .against(&edge.reference)
        .confidence(delta.confidence)
        .detail("band", json!(band.as_str()))
        .detail("bands", bands)
        .detail("label", json!(reading.label)),
    );
}
