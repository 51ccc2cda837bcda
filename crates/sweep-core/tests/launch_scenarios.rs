//! End-to-end launch scenarios against the bundled queues

use pretty_assertions::assert_eq;
use std::sync::Arc;
use sweep_core::{
    AxisError, AxisIssue, Launcher, SpoolQueue, Strictness, SubmissionMode, SweepConfig,
    SweepError,
};
use sweep_test_utils::{recording_queue, small_axes, small_axes_dirs, stock_template};

#[tokio::test]
async fn fire_and_forget_submits_six_jobs_in_order() {
    let (graph, template) = stock_template("scenario");
    template.verify(&graph).unwrap();
    let queue = recording_queue();

    let report = Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
        .launch(&small_axes(), &template)
        .await
        .unwrap();

    let dirs: Vec<String> = queue.jobs().into_iter().map(|j| j.output_dir).collect();
    assert_eq!(dirs, small_axes_dirs());
    assert_eq!(report.submitted, queue.handles());
    assert!(report.pool.is_none());
    assert!(queue.pools().is_empty());
    assert!(report.axes.is_clean());
}

#[tokio::test]
async fn every_job_carries_the_full_parameter_set() {
    let (_, template) = stock_template("scenario");
    let queue = recording_queue();

    Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
        .launch(&small_axes(), &template)
        .await
        .unwrap();

    for job in queue.jobs() {
        assert_eq!(job.name, "scenario");
        assert_eq!(job.timeout_secs, 432_000);
        assert_eq!(job.artifacts, template.artifacts);
        assert_eq!(
            job.command(),
            vec![
                template.simulator_binary.clone(),
                "-re".to_string(),
                format!("--outdir={}", job.output_dir),
                template.run_script.clone(),
                template.linux_binary.clone(),
                template.disk_image.clone(),
                job.cpu.clone(),
                job.benchmark.clone(),
                job.size.clone(),
            ]
        );
    }
}

#[tokio::test]
async fn pool_receives_every_handle_in_submission_order() {
    let (_, template) = stock_template("pool");
    let queue = recording_queue();

    let report = Launcher::new(queue.clone(), SubmissionMode::BoundedPool { workers: 4 })
        .launch(&small_axes(), &template)
        .await
        .unwrap();

    let pools = queue.pools();
    assert_eq!(pools.len(), 1);
    let (handles, workers) = &pools[0];
    assert_eq!(*workers, 4);
    assert_eq!(handles, &report.submitted);
    assert_eq!(
        handles.iter().map(|h| h.seq).collect::<Vec<_>>(),
        (0..6).collect::<Vec<_>>()
    );
    assert_eq!(report.pool.unwrap().jobs, 6);
}

#[tokio::test]
async fn cpu_without_sizes_is_skipped_with_warning() {
    let (_, template) = stock_template("missing cpu");
    let mut axes = small_axes();
    axes.cpus.push("o3".into());
    let queue = recording_queue();

    let report = Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
        .launch(&axes, &template)
        .await
        .unwrap();

    assert_eq!(queue.len(), 6);
    assert_eq!(report.axes.issues, vec![AxisIssue::MissingSizes("o3".into())]);
    assert_eq!(report.axes.skipped_cpus().collect::<Vec<_>>(), vec!["o3"]);
}

#[tokio::test]
async fn cpu_without_sizes_is_an_error_when_strict() {
    let (_, template) = stock_template("missing cpu");
    let mut axes = small_axes();
    axes.cpus.push("o3".into());
    let queue = recording_queue();

    let err = Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
        .with_strictness(Strictness::Deny)
        .launch(&axes, &template)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SweepError::Axes(AxisError::Inconsistent(ref issues)) if issues.len() == 1
    ));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn duplicate_benchmark_is_rejected() {
    let (_, template) = stock_template("dup");
    let mut axes = small_axes();
    axes.benchmarks.push("401.bzip2".into());
    let queue = recording_queue();

    let err = Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
        .launch(&axes, &template)
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::Axes(AxisError::Duplicate { axis: "benchmark", .. })));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn repeated_launches_produce_identical_jobs() {
    let (_, template) = stock_template("repeat");
    let first = recording_queue();
    let second = recording_queue();

    for queue in [&first, &second] {
        Launcher::new(queue.clone(), SubmissionMode::FireAndForget)
            .launch(&small_axes(), &template)
            .await
            .unwrap();
    }

    assert_eq!(first.jobs(), second.jobs());
    let hashes = |q: &sweep_core::RecordingQueue| {
        q.handles().into_iter().map(|h| h.job_hash).collect::<Vec<_>>()
    };
    assert_eq!(hashes(&*first), hashes(&*second));
}

#[tokio::test]
async fn stock_config_spools_every_job() {
    let dir = tempfile::tempdir().unwrap();
    let config = SweepConfig::default();
    let (_, template) = stock_template(&config.experiment);
    let queue = Arc::new(SpoolQueue::new(dir.path()));

    let report = Launcher::new(queue.clone(), config.submission_mode().unwrap())
        .launch(&config.axes, &template)
        .await
        .unwrap();

    assert_eq!(report.submitted.len(), 235);
    let spooled = std::fs::read_dir(queue.jobs_dir()).unwrap().count();
    assert_eq!(spooled, 235);
}
