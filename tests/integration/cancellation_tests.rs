use linkdupe::duplicates::{run, Counters, DuplicateFinder, Outcome};
use linkdupe::scanner::{Digest, HashError};
use linkdupe::signal::CancelToken;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn populate(root: &Path, files: usize) {
    for i in 0..files {
        let sub = root.join(format!("dir_{}", i % 10));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("f{i}.txt")), format!("content {}", i % 7)).unwrap();
    }
}

fn slow_digest(path: &Path) -> Result<Digest, HashError> {
    std::thread::sleep(Duration::from_millis(20));
    Ok(Digest::new(path.as_os_str().len().to_le_bytes().to_vec()))
}

#[test]
fn test_precancelled_token_returns_cancelled() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 50);

    let cancel = CancelToken::new();
    cancel.cancel();
    let counters = Arc::new(Counters::new());

    let report = run(
        dir.path(),
        Some(Arc::new(slow_digest)),
        4,
        &cancel,
        Arc::clone(&counters),
    )
    .unwrap();

    assert!(matches!(report.outcome, Outcome::Cancelled));
    assert!(counters.files_hashed() <= counters.files_found());
}

#[test]
fn test_cancel_mid_scan_returns_promptly() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 200);

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(60));
        trigger.cancel();
    });

    let started = Instant::now();
    let finder = DuplicateFinder::new()
        .with_digester(Arc::new(slow_digest))
        .with_workers(2)
        .with_cancel_token(cancel);
    let report = finder.find_duplicates(dir.path()).unwrap();
    canceller.join().unwrap();

    // 200 files at 20ms on 2 workers would take about two seconds.
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(report.outcome, Outcome::Cancelled));
    let counters = finder.counters();
    assert!(counters.files_hashed() <= counters.files_found());
    assert!(counters.files_hashed() < 200);
    assert_eq!(report.hashes.len() as u64, counters.files_hashed());
}

#[test]
fn test_timeout_cancels_scan() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 200);

    let cancel = CancelToken::new();
    let _deadline = cancel.cancel_after(Duration::from_millis(50));

    let report = DuplicateFinder::new()
        .with_digester(Arc::new(slow_digest))
        .with_workers(1)
        .with_cancel_token(cancel.clone())
        .find_duplicates(dir.path())
        .unwrap();

    assert!(cancel.is_cancelled());
    assert!(report.outcome.is_cancelled());
}

#[test]
fn test_deadline_dropped_before_expiry_does_not_cancel() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 5);

    let cancel = CancelToken::new();
    let deadline = cancel.cancel_after(Duration::from_secs(60));
    let report = DuplicateFinder::with_defaults()
        .with_cancel_token(cancel.clone())
        .find_duplicates(dir.path())
        .unwrap();
    drop(deadline);

    assert!(report.outcome.is_completed());
    assert!(!cancel.is_cancelled());
}
