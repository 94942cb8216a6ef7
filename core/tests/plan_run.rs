mod common;

use cmdplan_core::api::{load_plan, ExecutorError, RunError, DEFAULT_MAX_PARALLEL};
use common::{lines, plan_in, runner, write_plan};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn series_runs_in_order_and_halts_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - echo a >> order.log
  - echo b >> order.log
  - "false"
  - echo d >> order.log
"#,
    );

    let err = runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap_err();

    assert_eq!(lines(&dir.path().join("order.log")), vec!["a", "b"]);
    match err {
        RunError::Step { label, .. } => assert_eq!(label, "series step 3"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_batch_stops_later_steps() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - echo a >> order.log
  - - echo b >> order.log; exit 1
    - echo c >> order.log
  - echo d >> order.log
parallel:
  - echo top >> order.log
"#,
    );

    let err = runner(2).run(&plan).await.unwrap_err();

    let mut seen = lines(&dir.path().join("order.log"));
    assert_eq!(seen[0], "a");
    seen.sort();
    assert_eq!(seen, vec!["a", "b", "c"]);

    assert_eq!(err.failure_count(), 1);
    match err {
        RunError::Batch { label, source } => {
            assert_eq!(label, "parallel batch at series step 2");
            assert_eq!(source.total, 2);
            let argv = source.failures[0].argv().unwrap();
            assert_eq!(argv[2], "echo b >> order.log; exit 1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_failure_in_a_batch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - - touch one; exit 2
    - touch two
    - touch three; exit 3
    - touch four
"#,
    );

    let err = runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap_err();

    assert_eq!(err.failure_count(), 2);
    for name in ["one", "two", "three", "four"] {
        assert!(dir.path().join(name).exists(), "{name} did not run");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn top_level_parallel_runs_last() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - echo first >> order.log
parallel:
  - echo x >> order.log
  - echo y >> order.log
"#,
    );

    let report = runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap();

    assert_eq!(report.steps, 2);
    assert_eq!(report.commands, 3);
    let seen = lines(&dir.path().join("order.log"));
    assert_eq!(seen[0], "first");
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn zero_budget_dispatches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
parallel:
  - touch ran
"#,
    );

    let err = runner(0).run(&plan).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Executor(ExecutorError::InvalidConcurrency(0))
    ));
    assert!(!dir.path().join("ran").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serial_budget_keeps_submission_order() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - - sleep 0.2; echo 1 >> order.log
    - echo 2 >> order.log
    - sleep 0.1; echo 3 >> order.log
"#,
    );

    runner(1).run(&plan).await.unwrap();

    assert_eq!(lines(&dir.path().join("order.log")), vec!["1", "2", "3"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_output_file_collects_every_command() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
  out_file: all.log
series:
  - - echo line-1
    - echo line-2
    - echo line-3
    - echo line-4
    - echo line-5
"#,
    );

    runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap();

    let mut seen = lines(&dir.path().join("all.log"));
    seen.sort();
    assert_eq!(
        seen,
        vec!["line-1", "line-2", "line-3", "line-4", "line-5"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn later_steps_append_to_an_inherited_output_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("run.log"), "previous invocation\n").unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
  out_file: run.log
series:
  - echo first
  - echo second
"#,
    );

    runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap();

    assert_eq!(lines(&dir.path().join("run.log")), vec!["first", "second"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_spellings_of_one_output_file_are_truncated_once() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
  out_file: run.log
series:
  - echo first
  - cmd: echo second
    meta:
      working_dir: "{dir}/sub"
      out_file: ../run.log
"#,
    );

    runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap();

    assert_eq!(lines(&dir.path().join("run.log")), vec!["first", "second"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_precondition_stops_the_whole_batch() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - - touch ran
    - cmd: "true"
      meta:
        working_dir: "{dir}/absent"
        out_file: x.log
"#,
    );

    let err = runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap_err();

    match err {
        RunError::Step { label, .. } => assert_eq!(label, "parallel batch at series step 1"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.path().join("ran").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn explicit_meta_overrides_parent_output() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_in(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
  out_file: y.log
series:
  - cmd: echo explicit
    meta:
      working_dir: "{dir}"
      out_file: x.log
  - echo inherited
"#,
    );

    runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap();

    assert_eq!(lines(&dir.path().join("x.log")), vec!["explicit"]);
    assert_eq!(lines(&dir.path().join("y.log")), vec!["inherited"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn loads_and_runs_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plan(
        dir.path(),
        r#"
meta:
  working_dir: "{dir}"
series:
  - printf 'from file\n' > result.txt
"#,
    );

    let plan = load_plan(&path).unwrap();
    runner(DEFAULT_MAX_PARALLEL).run(&plan).await.unwrap();

    assert_eq!(lines(&dir.path().join("result.txt")), vec!["from file"]);
}
