//! Command tests against temporary config and spool directories

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use sweep_core::{ModeKind, SpoolQueue};
use sweep_launcher::{commands, LaunchArgs};
use sweep_test_utils::small_axes_dirs;

const SMALL_CONFIG: &str = r#"
experiment = "cli smoke"

[axes]
cpus = ["kvm", "atomic"]
benchmarks = ["401.bzip2", "429.mcf"]

[axes.sizes]
kvm = ["test", "ref"]
atomic = ["test"]
"#;

fn write_config(dir: &tempfile::TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("sweep.toml");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn plan_lists_output_dirs_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, SMALL_CONFIG);

    let mut out = Vec::new();
    let jobs = commands::plan(Some(config.as_path()), false, &mut out).unwrap();
    assert_eq!(jobs, 6);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..6], small_axes_dirs().as_slice());
    assert_eq!(lines[6], "6 jobs");
}

#[test]
fn plan_json_includes_commands() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, SMALL_CONFIG);

    let mut out = Vec::new();
    commands::plan(Some(config.as_path()), true, &mut out).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(doc["experiment"], "cli smoke");
    let jobs = doc["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 6);
    assert_eq!(jobs[0]["command"][2], "--outdir=results/kvm/test/401.bzip2");
}

#[test]
fn missing_config_names_the_file() {
    let path = std::path::Path::new("/nonexistent/sweep.toml");
    let err = commands::plan(Some(path), false, &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/sweep.toml"));
}

#[test]
fn artifacts_json_lists_seven_in_build_order() {
    let mut out = Vec::new();
    commands::artifacts(true, &mut out).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let artifacts = doc["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 7);
}

#[tokio::test]
async fn dry_run_launch_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, SMALL_CONFIG);
    let args = LaunchArgs {
        config: Some(config),
        mode: Some(ModeKind::BoundedPool),
        workers: Some(3),
        dry_run: true,
        ..LaunchArgs::default()
    };

    let mut out = Vec::new();
    let report = commands::launch(&args, &mut out).await.unwrap();
    assert_eq!(report.submitted.len(), 6);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Submitted: 6"));
    assert!(text.contains("Pool: 6 jobs on 3 workers"));
}

#[tokio::test]
async fn launch_spools_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, SMALL_CONFIG);
    let spool = dir.path().join("spool");
    let args = LaunchArgs {
        config: Some(config),
        spool: Some(spool.clone()),
        ..LaunchArgs::default()
    };

    commands::launch(&args, &mut Vec::new()).await.unwrap();

    let spooled = std::fs::read_dir(SpoolQueue::new(&spool).jobs_dir())
        .unwrap()
        .count();
    assert_eq!(spooled, 6);
}

#[tokio::test]
async fn strict_launch_fails_on_missing_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &SMALL_CONFIG.replace(r#"cpus = ["kvm", "atomic"]"#, r#"cpus = ["kvm", "atomic", "o3"]"#),
    );
    let args = LaunchArgs {
        config: Some(config),
        dry_run: true,
        strict: true,
        ..LaunchArgs::default()
    };

    let err = commands::launch(&args, &mut Vec::new()).await.unwrap_err();
    assert!(format!("{err:#}").contains("o3"));
}
