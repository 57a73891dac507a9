// megohm-core/src/domain/standards/mod.rs

pub mod cache;
pub mod config;
pub mod reference;
pub mod registry;

pub use cache::{ConfigCache, get_config_for_standard, get_validation_config};
pub use config::{
    CalibrationThresholds, GroundingThresholds, InsulationThresholds, ThermographyThresholds,
    ValidationConfig,
};
pub use reference::{ThresholdReference, ThresholdSet, ThresholdValue};
pub use registry::StandardsRegistry;

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which acceptance table is active for one validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum StandardProfile {
    #[default]
    Neta,
    Microsoft,
}

impl StandardProfile {
    pub const ALL: [StandardProfile; 2] = [Self::Neta, Self::Microsoft];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neta => "NETA",
            Self::Microsoft => "MICROSOFT",
        }
    }
}

impl fmt::Display for StandardProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StandardProfile {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neta" => Ok(Self::Neta),
            "microsoft" | "ms" => Ok(Self::Microsoft),
            _ => Err(DomainError::UnknownProfile(s.to_string())),
        }
    }
}

/// Test domain a threshold table (and a validator) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Grounding,
    Insulation,
    Thermography,
    Calibration,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Self::Grounding,
        Self::Insulation,
        Self::Thermography,
        Self::Calibration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grounding => "grounding",
            Self::Insulation => "insulation",
            Self::Thermography => "thermography",
            Self::Calibration => "calibration",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
