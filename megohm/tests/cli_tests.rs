use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A throwaway copy of `demos/` (settings + reports) to run the binary in.
struct MegohmTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl MegohmTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let demos = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("demos");

        let dest = tmp.path().join("demos");
        Self::copy_dir(&demos, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn megohm(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("megohm"));
        cmd.current_dir(&self.root)
            .env_remove("MEGOHM_STANDARD")
            .env_remove("MEGOHM_AUDIT_LOG");
        cmd
    }

    fn json_stdout(&self, args: &[&str], expected_code: i32) -> Result<Value> {
        let output = self.megohm().args(args).output()?;
        assert_eq!(
            output.status.code(),
            Some(expected_code),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[test]
fn test_review_approved_report_writes_audit_trail() -> Result<()> {
    let env = MegohmTestEnv::new()?;

    env.megohm()
        .args(["review", "reports/grounding_pass.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEMO-GND-001"))
        .stdout(predicate::str::contains("APPROVED"));

    let audit = std::fs::read_to_string(env.root.join("target/audit.jsonl"))?;
    let records: Vec<Value> = audit
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;

    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r["analysis_id"] == "DEMO-GND-001"));
    assert!(
        records
            .iter()
            .any(|r| r["rule_id"] == "GND-003" && r["passed"] == true)
    );
    Ok(())
}

#[test]
fn test_rejected_report_exits_with_code_2() -> Result<()> {
    let env = MegohmTestEnv::new()?;

    env.megohm()
        .args(["review", "reports/thermography_serious.json"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("THERM-001"))
        .stdout(predicate::str::contains("REJECTED"));
    Ok(())
}

#[test]
fn test_profile_divergence_flag_and_env() -> Result<()> {
    let env = MegohmTestEnv::new()?;
    let report = "reports/grounding_dc_3ohm.yaml";

    env.megohm().args(["review", report]).assert().success();

    env.megohm()
        .args(["review", report, "--standard", "microsoft"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("GND-003"))
        .stdout(predicate::str::contains("§4.3.2"));

    env.megohm()
        .env("MEGOHM_STANDARD", "ms")
        .args(["review", report])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_review_json_report() -> Result<()> {
    let env = MegohmTestEnv::new()?;
    let report = env.json_stdout(&["review", "reports/megger_low_pi.yaml", "--format", "json"], 0)?;

    assert_eq!(report["verdict"], "NEEDS_REVIEW");
    assert_eq!(report["standard_profile"], "NETA");

    let findings: Vec<&Value> = report["results"]
        .as_array()
        .context("results")?
        .iter()
        .flat_map(|r| r["findings"].as_array().into_iter().flatten())
        .collect();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["rule_id"], "IR-PI-001");
    assert_eq!(findings[0]["remediation_kind"], "RETEST_REQUIRED");
    assert_eq!(findings[0]["standard_reference"], "IEEE 43-2013 §12.2.2");
    Ok(())
}

#[test]
fn test_review_output_file() -> Result<()> {
    let env = MegohmTestEnv::new()?;

    std::fs::create_dir_all(env.root.join("out"))?;
    env.megohm()
        .args(["review", "reports/megger_low_pi.yaml", "-o", "out/report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON report saved"));

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(
        env.root.join("out/report.json"),
    )?)?;
    assert_eq!(saved["analysis_id"], "DEMO-IR-001");
    Ok(())
}

#[test]
fn test_batch_verdicts_are_sorted_by_file() -> Result<()> {
    let env = MegohmTestEnv::new()?;
    let entries = env.json_stdout(&["batch", "reports", "--format", "json", "-j", "2"], 2)?;

    let verdicts: Vec<String> = entries
        .as_array()
        .context("batch output")?
        .iter()
        .map(|e| {
            let file = e["file"].as_str().unwrap_or_default();
            let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
            format!("{} {}", name, e["report"]["verdict"].as_str().unwrap_or("?"))
        })
        .collect();

    insta::assert_snapshot!(verdicts.join("\n"), @r"
    grounding_dc_3ohm.yaml APPROVED
    grounding_pass.yaml APPROVED
    megger_low_pi.yaml NEEDS_REVIEW
    thermography_serious.json REJECTED
    ");
    Ok(())
}

#[test]
fn test_fail_on_setting_tightens_the_gate() -> Result<()> {
    let env = MegohmTestEnv::new()?;
    std::fs::write(env.root.join("megohm.yaml"), "fail_on: NEEDS_REVIEW\n")?;

    env.megohm()
        .args(["review", "reports/megger_low_pi.yaml"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_thresholds_json() -> Result<()> {
    let env = MegohmTestEnv::new()?;
    let doc = env.json_stdout(&["thresholds", "--standard", "microsoft", "--format", "json"], 0)?;

    assert_eq!(doc["standard"], "MICROSOFT");
    assert_eq!(doc["domains"]["grounding"]["primary"], "data_center_max");
    assert_eq!(
        doc["domains"]["grounding"]["thresholds"]["data_center_max"]["value"],
        1.0
    );
    Ok(())
}

#[test]
fn test_bad_inputs_fail_cleanly() -> Result<()> {
    let env = MegohmTestEnv::new()?;

    std::fs::write(env.root.join("notes.txt"), "not a report")?;
    env.megohm()
        .args(["review", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported extraction file"));

    std::fs::write(env.root.join("megohm.yaml"), "concurrency: 0\n")?;
    env.megohm()
        .args(["review", "reports/grounding_pass.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid settings"));
    Ok(())
}
