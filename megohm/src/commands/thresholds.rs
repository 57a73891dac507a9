// megohm/src/commands/thresholds.rs
//
// USE CASE: Show the compiled-in acceptance tables of a profile.

use megohm_core::StandardProfile;
use megohm_core::domain::standards::registry::REGISTRY_VERSION;
use megohm_core::domain::standards::{Domain, StandardsRegistry, ThresholdSet};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::render;

pub fn execute(profile: StandardProfile, format: OutputFormat) -> anyhow::Result<()> {
    let sets = Domain::ALL
        .iter()
        .map(|domain| StandardsRegistry::thresholds_for(profile, *domain))
        .collect::<Result<Vec<ThresholdSet>, _>>()?;

    match format {
        OutputFormat::Json => {
            let domains: serde_json::Map<String, serde_json::Value> = sets
                .iter()
                .map(|set| {
                    let entries: serde_json::Map<String, serde_json::Value> = set
                        .iter()
                        .map(|(name, reference)| (name.to_string(), json!(reference)))
                        .collect();
                    (
                        set.domain.to_string(),
                        json!({ "primary": set.primary_name(), "thresholds": entries }),
                    )
                })
                .collect();
            let doc = json!({
                "standard": profile,
                "registry_version": REGISTRY_VERSION,
                "domains": domains,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Table => {
            println!("📏 {} thresholds (registry {})", profile, REGISTRY_VERSION);
            println!("{}", render::thresholds_table(&sets));
        }
    }

    Ok(())
}
