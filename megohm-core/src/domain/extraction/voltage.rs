// megohm-core/src/domain/extraction/voltage.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// "480V", "480 VAC", "13.8 kV", "15kV", "4,160 V"
static VOLTAGE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(kv|v)?(?:\s*(?:ac|dc|rms))?\s*$").ok()
});

/// Nameplate rating as the extractor saw it: a number (volts) or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatedVoltage {
    Volts(f64),
    Text(String),
}

impl RatedVoltage {
    /// Rating in volts, `None` when the text cannot be read as a voltage.
    pub fn volts(&self) -> Option<f64> {
        match self {
            Self::Volts(v) if v.is_finite() && *v > 0.0 => Some(*v),
            Self::Volts(_) => None,
            Self::Text(text) => parse_volts(text),
        }
    }
}

fn parse_volts(text: &str) -> Option<f64> {
    let re = VOLTAGE_RE.as_ref()?;
    let caps = re.captures(text)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(unit) if unit == "kv" => 1_000.0,
        _ => 1.0,
    };
    let volts = number * scale;
    (volts > 0.0).then_some(volts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_nameplate_formats() {
        let cases = [
            ("480V", Some(480.0)),
            ("480 VAC", Some(480.0)),
            ("13.8 kV", Some(13_800.0)),
            ("15kV", Some(15_000.0)),
            ("4,160 V", Some(4_160.0)),
            ("600", Some(600.0)),
            ("medium voltage", None),
            ("0 V", None),
        ];
        for (text, expected) in cases {
            assert_eq!(RatedVoltage::Text(text.into()).volts(), expected, "{text}");
        }
    }

    #[test]
    fn test_numeric_rating() {
        assert_eq!(RatedVoltage::Volts(208.0).volts(), Some(208.0));
        assert_eq!(RatedVoltage::Volts(-1.0).volts(), None);
    }
}
