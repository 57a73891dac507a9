// megohm-core/src/domain/extraction/mod.rs

// What the extraction collaborator hands us. Every leaf measurement carries the
// extractor's confidence; validation passes it through untouched.

pub mod voltage;

pub use voltage::RatedVoltage;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A value read off a report, with the extractor's confidence (0.0–1.0).
/// Deserializes from `{value, confidence}` or from the bare value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extracted<T> {
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl<T> Extracted<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            confidence: None,
        }
    }

    pub fn with_confidence(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence: Some(confidence),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Extracted<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<U> {
            Wrapped {
                value: U,
                #[serde(default)]
                confidence: Option<f64>,
            },
            Bare(U),
        }

        Ok(match Repr::<T>::deserialize(deserializer)? {
            Repr::Wrapped { value, confidence } => Self { value, confidence },
            Repr::Bare(value) => Self::new(value),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    Grounding,
    #[serde(alias = "MEGGER")]
    InsulationResistance,
    Thermography,
}

impl TestType {
    /// Test types for which an instrument calibration certificate is mandatory.
    pub fn requires_calibration(&self) -> bool {
        matches!(self, Self::Grounding | Self::InsulationResistance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grounding => "GROUNDING",
            Self::InsulationResistance => "INSULATION_RESISTANCE",
            Self::Thermography => "THERMOGRAPHY",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Equipment class, used to pick class-specific thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    General,
    DataCenter,
}

impl EquipmentClass {
    /// Exact vocabulary lookup (case and separators ignored). No guessing.
    pub fn classify(text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "general" | "industrial" | "commercial" => Some(Self::General),
            "datacenter" | "datacentre" | "dc" => Some(Self::DataCenter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::DataCenter => "data_center",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EquipmentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<Extracted<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_voltage: Option<Extracted<RatedVoltage>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalibrationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<Extracted<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibrated_on: Option<Extracted<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<Extracted<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceable: Option<Extracted<bool>>,
}

impl CalibrationInfo {
    /// A certificate exists when it is identified or at least dated.
    pub fn has_certificate(&self) -> bool {
        self.certificate_id
            .as_ref()
            .is_some_and(|id| !id.value.trim().is_empty())
            || self.expires_on.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroundingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance_ohms: Option<Extracted<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedReading {
    pub minutes: f64,
    pub megohms: Extracted<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InsulationMeasurement {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub readings: Vec<TimedReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<Extracted<f64>>,
}

impl InsulationMeasurement {
    pub fn reading_at(&self, minutes: f64) -> Option<&Extracted<f64>> {
        self.readings
            .iter()
            .find(|r| (r.minutes - minutes).abs() < 1e-6)
            .map(|r| &r.megohms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThermalReading {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_t_c: Option<Extracted<f64>>,
}

/// Structured output of the extraction pipeline for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub analysis_id: String,
    pub test_type: TestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_date: Option<Extracted<NaiveDate>>,
    #[serde(default)]
    pub equipment: EquipmentInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<GroundingData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insulation: Vec<InsulationMeasurement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thermography: Vec<ThermalReading>,
}

impl ExtractionResult {
    pub fn new(analysis_id: impl Into<String>, test_type: TestType) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            test_type,
            test_date: None,
            equipment: EquipmentInfo::default(),
            calibration: None,
            grounding: None,
            insulation: Vec::new(),
            thermography: Vec::new(),
        }
    }

    /// A domain is reviewed when it is the declared test type or its section is present.
    pub fn covers_grounding(&self) -> bool {
        self.test_type == TestType::Grounding || self.grounding.is_some()
    }

    pub fn covers_insulation(&self) -> bool {
        self.test_type == TestType::InsulationResistance || !self.insulation.is_empty()
    }

    pub fn covers_thermography(&self) -> bool {
        self.test_type == TestType::Thermography || !self.thermography.is_empty()
    }
}
