// megohm-core/src/domain/standards/registry.rs

// Compiled-in acceptance tables. Nothing here is mutable at runtime: a table
// can only change through a new release (bump REGISTRY_VERSION).

use super::reference::{ThresholdReference, ThresholdSet};
use super::{Domain, StandardProfile};
use crate::domain::error::DomainError;
use std::str::FromStr;
use tracing::debug;

pub const REGISTRY_VERSION: &str = "2024.2";

const NETA_ATS: &str = "ANSI/NETA ATS-2021";
const IEEE_43: &str = "IEEE 43-2013";
const MS_DC: &str = "Microsoft Datacenter Electrical Commissioning Standard";

type TableFn = fn() -> ThresholdSet;

const TABLES: &[(StandardProfile, Domain, TableFn)] = &[
    (StandardProfile::Neta, Domain::Grounding, neta_grounding),
    (StandardProfile::Neta, Domain::Insulation, neta_insulation),
    (StandardProfile::Neta, Domain::Thermography, neta_thermography),
    (StandardProfile::Neta, Domain::Calibration, neta_calibration),
    (StandardProfile::Microsoft, Domain::Grounding, ms_grounding),
    (StandardProfile::Microsoft, Domain::Insulation, ms_insulation),
    (StandardProfile::Microsoft, Domain::Thermography, ms_thermography),
    (StandardProfile::Microsoft, Domain::Calibration, ms_calibration),
];

pub struct StandardsRegistry;

impl StandardsRegistry {
    pub fn thresholds_for(
        profile: StandardProfile,
        domain: Domain,
    ) -> Result<ThresholdSet, DomainError> {
        TABLES
            .iter()
            .find(|(p, d, _)| *p == profile && *d == domain)
            .map(|(_, _, table)| table())
            .ok_or_else(|| DomainError::UnknownDomain {
                profile: profile.to_string(),
                domain: domain.to_string(),
            })
    }

    /// Same lookup from a free-text profile tag (settings files, CLI flags).
    pub fn thresholds_for_tag(tag: &str, domain: Domain) -> Result<ThresholdSet, DomainError> {
        let profile = StandardProfile::from_str(tag)?;
        Self::thresholds_for(profile, domain)
    }

    /// Resolves every profile × domain pair and every primary reference.
    /// Meant for startup and tests: a missing table must never reach production.
    pub fn verify() -> Result<(), DomainError> {
        for profile in StandardProfile::ALL {
            for domain in Domain::ALL {
                let set = Self::thresholds_for(profile, domain)?;
                set.primary()?;
            }
        }
        debug!(version = REGISTRY_VERSION, "Standards registry verified");
        Ok(())
    }
}

// =============================================================================
//  NETA
// =============================================================================

fn neta_grounding() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Neta, Domain::Grounding, "general_max")
        .with(
            "general_max",
            ThresholdReference::scalar(
                5.0,
                NETA_ATS,
                "7.13.3",
                "Grounding system resistance shall not exceed 5 ohms",
            ),
        )
        // NETA makes no distinction for data-center equipment.
        .with(
            "data_center_max",
            ThresholdReference::scalar(
                5.0,
                NETA_ATS,
                "7.13.3",
                "Grounding system resistance shall not exceed 5 ohms",
            ),
        )
}

const NETA_IR_CLASSES: &[(u32, f64)] = &[
    (250, 25.0),
    (600, 100.0),
    (1_000, 100.0),
    (2_500, 500.0),
    (5_000, 1_000.0),
    (8_000, 2_000.0),
    (15_000, 5_000.0),
    (25_000, 20_000.0),
    (35_000, 100_000.0),
    (46_000, 100_000.0),
    (69_000, 100_000.0),
];

fn neta_insulation() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Neta, Domain::Insulation, "min_resistance")
        .with(
            "min_resistance",
            ThresholdReference::by_voltage_class(
                NETA_IR_CLASSES,
                NETA_ATS,
                "Table 100.1",
                "Minimum insulation resistance (MΩ) by rated voltage class",
            ),
        )
        .with("pi_acceptable", pi_acceptable())
        .with("pi_excellent", pi_excellent())
        .with("pi_waiver_megohms", pi_waiver())
}

fn neta_thermography() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Neta, Domain::Thermography, "serious_min")
        .with(
            "attention_min",
            ThresholdReference::scalar(
                1.0,
                NETA_ATS,
                "Table 100.18",
                "Possible deficiency, warrants investigation (ΔT ≥ 1 °C)",
            ),
        )
        .with(
            "intermediate_min",
            ThresholdReference::scalar(
                4.0,
                NETA_ATS,
                "Table 100.18",
                "Probable deficiency, repair as time permits (ΔT ≥ 4 °C)",
            ),
        )
        .with(
            "serious_min",
            ThresholdReference::scalar(
                15.0,
                NETA_ATS,
                "Table 100.18",
                "Major discrepancy, repair immediately (ΔT ≥ 15 °C)",
            ),
        )
}

fn neta_calibration() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Neta, Domain::Calibration, "max_interval_days")
        .with(
            "max_interval_days",
            ThresholdReference::scalar(
                365.0,
                NETA_ATS,
                "5.2",
                "Field test instruments calibrated at least annually, traceable to NIST",
            ),
        )
        .with(
            "expiry_warning_days",
            ThresholdReference::scalar(
                30.0,
                NETA_ATS,
                "5.2",
                "Certificate close to expiry at time of test",
            ),
        )
}

// =============================================================================
//  MICROSOFT (data-center profile)
// =============================================================================

fn ms_grounding() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Microsoft, Domain::Grounding, "data_center_max")
        .with(
            "general_max",
            ThresholdReference::scalar(
                5.0,
                MS_DC,
                "4.3.1",
                "Grounding electrode system resistance, general equipment (≤ 5 ohms)",
            ),
        )
        .with(
            "data_center_max",
            ThresholdReference::scalar(
                1.0,
                MS_DC,
                "4.3.2",
                "Grounding resistance for data-center critical equipment (≤ 1 ohm)",
            ),
        )
}

const MS_IR_CLASSES: &[(u32, f64)] = &[
    (250, 50.0),
    (600, 200.0),
    (1_000, 200.0),
    (2_500, 1_000.0),
    (5_000, 2_000.0),
    (8_000, 4_000.0),
    (15_000, 10_000.0),
    (25_000, 20_000.0),
    (35_000, 100_000.0),
    (46_000, 100_000.0),
    (69_000, 100_000.0),
];

fn ms_insulation() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Microsoft, Domain::Insulation, "min_resistance")
        .with(
            "min_resistance",
            ThresholdReference::by_voltage_class(
                MS_IR_CLASSES,
                MS_DC,
                "5.2.4",
                "Minimum insulation resistance (MΩ) by rated voltage class, data-center equipment",
            ),
        )
        .with("pi_acceptable", pi_acceptable())
        .with("pi_excellent", pi_excellent())
        .with("pi_waiver_megohms", pi_waiver())
}

fn ms_thermography() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Microsoft, Domain::Thermography, "serious_min")
        .with(
            "attention_min",
            ThresholdReference::scalar(
                1.0,
                MS_DC,
                "6.1.2",
                "Monitor: temperature rise over similar component (ΔT ≥ 1 °C)",
            ),
        )
        .with(
            "intermediate_min",
            ThresholdReference::scalar(
                3.0,
                MS_DC,
                "6.1.2",
                "Schedule repair within the next maintenance window (ΔT ≥ 3 °C)",
            ),
        )
        .with(
            "serious_min",
            ThresholdReference::scalar(
                10.0,
                MS_DC,
                "6.1.2",
                "Critical hot spot, immediate corrective action (ΔT ≥ 10 °C)",
            ),
        )
}

fn ms_calibration() -> ThresholdSet {
    ThresholdSet::new(StandardProfile::Microsoft, Domain::Calibration, "max_interval_days")
        .with(
            "max_interval_days",
            ThresholdReference::scalar(
                365.0,
                MS_DC,
                "2.4",
                "Test equipment calibrated within the last 12 months, traceable certificate on file",
            ),
        )
        .with(
            "expiry_warning_days",
            ThresholdReference::scalar(
                30.0,
                MS_DC,
                "2.4",
                "Certificate close to expiry at time of test",
            ),
        )
}

// --- shared IEEE 43 criteria ---

fn pi_acceptable() -> ThresholdReference {
    ThresholdReference::scalar(
        2.0,
        IEEE_43,
        "12.2.2",
        "Minimum polarization index for class B and higher insulation",
    )
}

fn pi_excellent() -> ThresholdReference {
    ThresholdReference::scalar(4.0, IEEE_43, "12.2.2", "Polarization index indicating dry, clean insulation")
}

fn pi_waiver() -> ThresholdReference {
    ThresholdReference::scalar(
        5_000.0,
        IEEE_43,
        "12.2.3",
        "PI not required when the 1-minute reading exceeds 5000 MΩ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::standards::ThresholdValue;

    #[test]
    fn test_every_profile_has_every_domain() -> anyhow::Result<()> {
        StandardsRegistry::verify()?;
        Ok(())
    }

    #[test]
    fn test_unknown_profile_tag_is_fatal() {
        let res = StandardsRegistry::thresholds_for_tag("iec", Domain::Grounding);
        assert!(matches!(res, Err(DomainError::UnknownProfile(_))));
    }

    #[test]
    fn test_data_center_grounding_diverges() -> anyhow::Result<()> {
        let neta = StandardsRegistry::thresholds_for(StandardProfile::Neta, Domain::Grounding)?;
        let ms = StandardsRegistry::thresholds_for(StandardProfile::Microsoft, Domain::Grounding)?;
        assert_eq!(neta.get("data_center_max")?.as_scalar("data_center_max")?, 5.0);
        assert_eq!(ms.get("data_center_max")?.as_scalar("data_center_max")?, 1.0);
        Ok(())
    }

    #[test]
    fn test_voltage_tables_are_stricter_for_microsoft() -> anyhow::Result<()> {
        let neta = StandardsRegistry::thresholds_for(StandardProfile::Neta, Domain::Insulation)?;
        let ms = StandardsRegistry::thresholds_for(StandardProfile::Microsoft, Domain::Insulation)?;
        let (ThresholdValue::ByVoltageClass(n), ThresholdValue::ByVoltageClass(m)) =
            (&neta.get("min_resistance")?.value, &ms.get("min_resistance")?.value)
        else {
            anyhow::bail!("min_resistance must be a voltage-class table");
        };
        assert_eq!(n.keys().collect::<Vec<_>>(), m.keys().collect::<Vec<_>>());
        for (class, min) in n {
            assert!(m[class] >= *min, "class {class} V is looser under Microsoft");
        }
        Ok(())
    }

    #[test]
    fn test_every_reference_is_cited() -> anyhow::Result<()> {
        for profile in StandardProfile::ALL {
            for domain in Domain::ALL {
                for (name, r) in StandardsRegistry::thresholds_for(profile, domain)?.iter() {
                    assert!(!r.standard.is_empty(), "{profile}/{domain}/{name}");
                    assert!(!r.section.is_empty(), "{profile}/{domain}/{name}");
                    assert!(!r.description.is_empty(), "{profile}/{domain}/{name}");
                }
            }
        }
        Ok(())
    }
}
