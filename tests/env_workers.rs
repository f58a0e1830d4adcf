// Test intent: verifies ANALYTIC_ND_THREADS resolution, including ignored
// values and precedence of the programmatic override.
#![cfg(feature = "std")]

use std::process::Command;

use analytic_nd::executor::{configured_workers, set_worker_override};
use analytic_nd::Executor;

#[test]
fn print_workers() {
    println!("workers={}", Executor::from_env().workers());
}

#[test]
fn print_overridden_workers() {
    set_worker_override(2);
    println!("workers={}", configured_workers());
    set_worker_override(0);
}

/// Re-run one of the print tests in a fresh process so the environment is
/// read again.
fn workers_in_child(test: &str, threads: Option<&str>) -> usize {
    let exe = std::env::current_exe().unwrap();
    let mut cmd = Command::new(&exe);
    cmd.args(["--exact", test, "--show-output"]);
    match threads {
        Some(value) => cmd.env("ANALYTIC_ND_THREADS", value),
        None => cmd.env_remove("ANALYTIC_ND_THREADS"),
    };
    let output = cmd.output().expect("run worker test");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .rev()
        .find_map(|l| l.trim().strip_prefix("workers=")?.parse().ok())
        .unwrap()
}

#[test]
fn env_var_sets_worker_count() {
    assert_eq!(workers_in_child("print_workers", Some("5")), 5);
    assert_eq!(workers_in_child("print_workers", Some(" 7 ")), 7);
}

#[test]
fn zero_and_garbage_fall_back_to_cpu_count() {
    let cpus = workers_in_child("print_workers", None);
    assert!(cpus >= 1);
    assert_eq!(workers_in_child("print_workers", Some("0")), cpus);
    assert_eq!(workers_in_child("print_workers", Some("abc")), cpus);
    assert_eq!(workers_in_child("print_workers", Some("")), cpus);
}

#[test]
fn override_wins_over_env_var() {
    assert_eq!(workers_in_child("print_overridden_workers", Some("5")), 2);
}
