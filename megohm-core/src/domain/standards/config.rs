// megohm-core/src/domain/standards/config.rs

use super::reference::{ThresholdReference, ThresholdSet, ThresholdValue};
use super::registry::{REGISTRY_VERSION, StandardsRegistry};
use super::{Domain, StandardProfile};
use crate::domain::error::DomainError;
use crate::domain::extraction::EquipmentClass;
use serde::Serialize;

/// A scalar threshold, shape-checked at build time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Limit {
    pub value: f64,
    pub reference: ThresholdReference,
}

impl Limit {
    fn from_set(set: &ThresholdSet, name: &str) -> Result<Self, DomainError> {
        let reference = set.get(name)?.clone();
        Ok(Self {
            value: reference.as_scalar(name)?,
            reference,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundingThresholds {
    pub general_max: Limit,
    pub data_center_max: Limit,
    pub reference: ThresholdReference,
}

impl GroundingThresholds {
    /// Equipment-class override: the only place the class matters.
    pub fn max_for(&self, class: EquipmentClass) -> &Limit {
        match class {
            EquipmentClass::General => &self.general_max,
            EquipmentClass::DataCenter => &self.data_center_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsulationThresholds {
    /// `ThresholdValue::ByVoltageClass`, MΩ per rated voltage class.
    pub min_resistance: ThresholdReference,
    pub pi_acceptable: Limit,
    pub pi_excellent: Limit,
    pub pi_waiver_megohms: Limit,
    pub reference: ThresholdReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermographyThresholds {
    pub attention_min: Limit,
    pub intermediate_min: Limit,
    pub serious_min: Limit,
    pub reference: ThresholdReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationThresholds {
    pub max_interval_days: Limit,
    pub expiry_warning_days: Limit,
    pub reference: ThresholdReference,
}

/// Every threshold a validation call can need, resolved for one profile.
/// Read-only once built; two builds for the same profile compare equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationConfig {
    pub profile: StandardProfile,
    pub registry_version: &'static str,
    pub grounding: GroundingThresholds,
    pub insulation: InsulationThresholds,
    pub thermography: ThermographyThresholds,
    pub calibration: CalibrationThresholds,
}

impl ValidationConfig {
    pub fn build(profile: StandardProfile) -> Result<Self, DomainError> {
        let grounding = StandardsRegistry::thresholds_for(profile, Domain::Grounding)?;
        let insulation = StandardsRegistry::thresholds_for(profile, Domain::Insulation)?;
        let thermography = StandardsRegistry::thresholds_for(profile, Domain::Thermography)?;
        let calibration = StandardsRegistry::thresholds_for(profile, Domain::Calibration)?;

        let min_resistance = insulation.get("min_resistance")?.clone();
        if !matches!(min_resistance.value, ThresholdValue::ByVoltageClass(_)) {
            return Err(DomainError::ThresholdShape {
                name: "min_resistance".into(),
                expected: "voltage-class table",
            });
        }

        let thermography = ThermographyThresholds {
            attention_min: Limit::from_set(&thermography, "attention_min")?,
            intermediate_min: Limit::from_set(&thermography, "intermediate_min")?,
            serious_min: Limit::from_set(&thermography, "serious_min")?,
            reference: thermography.primary()?.clone(),
        };
        // Bands must ascend, otherwise classification is meaningless.
        if !(thermography.attention_min.value < thermography.intermediate_min.value
            && thermography.intermediate_min.value < thermography.serious_min.value)
        {
            return Err(DomainError::ThresholdShape {
                name: "thermography bands".into(),
                expected: "strictly ascending band edges",
            });
        }

        Ok(Self {
            profile,
            registry_version: REGISTRY_VERSION,
            grounding: GroundingThresholds {
                general_max: Limit::from_set(&grounding, "general_max")?,
                data_center_max: Limit::from_set(&grounding, "data_center_max")?,
                reference: grounding.primary()?.clone(),
            },
            insulation: InsulationThresholds {
                min_resistance,
                pi_acceptable: Limit::from_set(&insulation, "pi_acceptable")?,
                pi_excellent: Limit::from_set(&insulation, "pi_excellent")?,
                pi_waiver_megohms: Limit::from_set(&insulation, "pi_waiver_megohms")?,
                reference: insulation.primary()?.clone(),
            },
            thermography,
            calibration: CalibrationThresholds {
                max_interval_days: Limit::from_set(&calibration, "max_interval_days")?,
                expiry_warning_days: Limit::from_set(&calibration, "expiry_warning_days")?,
                reference: calibration.primary()?.clone(),
            },
        })
    }

    /// Reference used to auto-fill findings that do not cite a clause themselves.
    pub fn reference_for(&self, domain: Domain) -> &ThresholdReference {
        match domain {
            Domain::Grounding => &self.grounding.reference,
            Domain::Insulation => &self.insulation.reference,
            Domain::Thermography => &self.thermography.reference,
            Domain::Calibration => &self.calibration.reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_deterministic() -> anyhow::Result<()> {
        for profile in StandardProfile::ALL {
            assert_eq!(ValidationConfig::build(profile)?, ValidationConfig::build(profile)?);
        }
        Ok(())
    }

    #[test]
    fn test_equipment_override_is_baked_in() -> anyhow::Result<()> {
        let neta = ValidationConfig::build(StandardProfile::Neta)?;
        let ms = ValidationConfig::build(StandardProfile::Microsoft)?;
        assert_eq!(neta.grounding.max_for(EquipmentClass::General).value, 5.0);
        assert_eq!(neta.grounding.max_for(EquipmentClass::DataCenter).value, 5.0);
        assert_eq!(ms.grounding.max_for(EquipmentClass::General).value, 5.0);
        assert_eq!(ms.grounding.max_for(EquipmentClass::DataCenter).value, 1.0);
        Ok(())
    }

    #[test]
    fn test_primary_references() -> anyhow::Result<()> {
        let cfg = ValidationConfig::build(StandardProfile::Neta)?;
        assert_eq!(cfg.reference_for(Domain::Grounding).section, "7.13.3");
        assert_eq!(cfg.reference_for(Domain::Insulation).section, "Table 100.1");
        assert_eq!(cfg.reference_for(Domain::Thermography).section, "Table 100.18");
        Ok(())
    }
}
