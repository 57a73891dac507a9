// megohm-core/src/domain/standards/reference.rs

use super::{Domain, StandardProfile};
use crate::domain::error::DomainError;
use serde::Serialize;
use std::collections::BTreeMap;

/// A threshold is either a single number or a table keyed by rated voltage (V).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Scalar(f64),
    ByVoltageClass(BTreeMap<u32, f64>),
}

/// One threshold together with the clause it comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdReference {
    pub value: ThresholdValue,
    pub standard: String,
    pub section: String,
    pub description: String,
}

impl ThresholdReference {
    pub fn scalar(value: f64, standard: &str, section: &str, description: &str) -> Self {
        Self {
            value: ThresholdValue::Scalar(value),
            standard: standard.to_string(),
            section: section.to_string(),
            description: description.to_string(),
        }
    }

    pub fn by_voltage_class(
        classes: &[(u32, f64)],
        standard: &str,
        section: &str,
        description: &str,
    ) -> Self {
        Self {
            value: ThresholdValue::ByVoltageClass(classes.iter().copied().collect()),
            standard: standard.to_string(),
            section: section.to_string(),
            description: description.to_string(),
        }
    }

    /// Human citation used on findings, e.g. `ANSI/NETA ATS-2021 §7.13.3`
    /// or `ANSI/NETA ATS-2021 Table 100.1`.
    pub fn citation(&self) -> String {
        if self.section.starts_with(|c: char| c.is_ascii_digit()) {
            format!("{} §{}", self.standard, self.section)
        } else {
            format!("{} {}", self.standard, self.section)
        }
    }

    pub fn as_scalar(&self, name: &str) -> Result<f64, DomainError> {
        match &self.value {
            ThresholdValue::Scalar(v) => Ok(*v),
            ThresholdValue::ByVoltageClass(_) => Err(DomainError::ThresholdShape {
                name: name.to_string(),
                expected: "scalar",
            }),
        }
    }

    /// Picks the smallest voltage class able to cover `volts`.
    /// Returns `(class_volts, threshold)`.
    pub fn class_for(&self, volts: f64) -> Result<(u32, f64), DomainError> {
        let ThresholdValue::ByVoltageClass(classes) = &self.value else {
            return Err(DomainError::ThresholdShape {
                name: self.description.clone(),
                expected: "voltage-class table",
            });
        };

        if !volts.is_finite() || volts <= 0.0 {
            return Err(DomainError::UnresolvableVoltageClass { volts });
        }

        classes
            .iter()
            .find(|(class, _)| f64::from(**class) >= volts)
            .map(|(class, min)| (*class, *min))
            .ok_or(DomainError::UnresolvableVoltageClass { volts })
    }

    pub fn value_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.value).unwrap_or(serde_json::Value::Null)
    }
}

/// Named thresholds of one (profile, domain) table.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet {
    pub profile: StandardProfile,
    pub domain: Domain,
    primary: &'static str,
    entries: BTreeMap<&'static str, ThresholdReference>,
}

impl ThresholdSet {
    pub fn new(profile: StandardProfile, domain: Domain, primary: &'static str) -> Self {
        Self {
            profile,
            domain,
            primary,
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &'static str, reference: ThresholdReference) -> Self {
        self.entries.insert(name, reference);
        self
    }

    pub fn get(&self, name: &str) -> Result<&ThresholdReference, DomainError> {
        self.entries
            .get(name)
            .ok_or_else(|| DomainError::MissingThreshold {
                profile: self.profile.to_string(),
                domain: self.domain.to_string(),
                name: name.to_string(),
            })
    }

    /// The reference findings of this domain fall back to.
    pub fn primary(&self) -> Result<&ThresholdReference, DomainError> {
        self.get(self.primary)
    }

    pub fn primary_name(&self) -> &'static str {
        self.primary
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ThresholdReference)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}
