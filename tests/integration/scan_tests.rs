use linkdupe::duplicates::{run, Counters, DuplicateFinder, FinderError, Outcome};
use linkdupe::scanner::{Algorithm, Digest, FileDigester, HashError, ScanError};
use linkdupe::signal::CancelToken;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let report = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.outcome.is_completed());
    assert!(report.groups.is_empty());
    assert!(report.directories.is_empty());
    assert_eq!(finder.counters().files_found(), 0);
}

#[test]
fn test_scan_groups_identical_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), "alpha");
    write(&dir.path().join("b.txt"), "beta");
    write(&dir.path().join("sub").join("c.txt"), "alpha");

    for algorithm in [Algorithm::Blake3, Algorithm::Sha256, Algorithm::Md5] {
        let counters = Arc::new(Counters::new());
        let report = run(
            dir.path(),
            Some(Arc::new(algorithm.digester())),
            4,
            &CancelToken::new(),
            Arc::clone(&counters),
        )
        .unwrap();

        assert!(report.outcome.is_completed());
        assert_eq!(counters.files_found(), 3);
        assert_eq!(counters.files_hashed(), 3);
        assert_eq!(report.unique_digests, 2);
        assert_eq!(report.groups.len(), 1, "{algorithm}");

        let (digest, paths) = report.groups.iter().next().unwrap();
        assert_eq!(digest.len(), algorithm.digest_len() * 2);
        let mut paths = paths.to_vec();
        paths.sort();
        assert_eq!(
            paths,
            vec![dir.path().join("a.txt"), dir.path().join("sub").join("c.txt")]
        );
        assert_eq!(report.directories, vec![dir.path().join("sub")]);
    }
}

#[test]
fn test_single_worker_preserves_walk_order() {
    let dir = tempdir().unwrap();
    for name in ["d.txt", "a.txt", "c.txt", "b.txt"] {
        write(&dir.path().join(name), "same");
    }

    let report = DuplicateFinder::with_defaults()
        .with_workers(1)
        .find_duplicates(dir.path())
        .unwrap();

    let (_, paths) = report.groups.iter().next().unwrap();
    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt", "d.txt"]);
}

#[test]
fn test_hash_table_covers_every_file() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(
            &dir.path().join(format!("dir_{}", i % 3)).join(format!("f{i}.txt")),
            &format!("content {}", i % 5),
        );
    }

    let finder = DuplicateFinder::with_algorithm(Algorithm::Sha256).with_workers(3);
    let report = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(report.hashes.len(), 20);
    assert_eq!(report.unique_digests, 5);
    assert_eq!(report.groups.len(), 5);
    assert_eq!(report.groups.redundant_files(), 15);
    assert_eq!(report.directories.len(), 3);
}

#[test]
fn test_missing_digester_is_configuration_error() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), "alpha");

    let err = DuplicateFinder::<FileDigester>::new()
        .find_duplicates(dir.path())
        .unwrap_err();

    assert!(matches!(err, FinderError::MissingDigester));
}

#[test]
fn test_missing_root_reports_failed_outcome() {
    let dir = tempdir().unwrap();
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("nope"))
        .unwrap();

    assert!(matches!(report.outcome, Outcome::Failed(ScanError::NotFound(_))));
}

#[test]
fn test_file_root_reports_failed_outcome() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    write(&file, "alpha");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&file)
        .unwrap();

    assert!(matches!(
        report.outcome,
        Outcome::Failed(ScanError::NotADirectory(_))
    ));
}

#[test]
fn test_failed_copy_excluded_but_others_grouped() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        write(&dir.path().join(name), "same");
    }

    let blake3 = Algorithm::Blake3.digester();
    let digester = move |path: &Path| -> Result<Digest, HashError> {
        if path.ends_with("b.txt") {
            return Err(HashError::PermissionDenied(path.to_path_buf()));
        }
        linkdupe::scanner::Digester::digest(&blake3, path)
    };

    let counters = Arc::new(Counters::new());
    let report = run(
        dir.path(),
        Some(Arc::new(digester)),
        2,
        &CancelToken::new(),
        Arc::clone(&counters),
    )
    .unwrap();

    assert!(report.outcome.is_completed());
    assert!(report.is_partial());
    assert_eq!(counters.files_found(), 3);
    assert_eq!(counters.files_hashed(), 2);
    assert_eq!(report.hash_errors.len(), 1);
    assert_eq!(report.groups.len(), 1);

    let (_, paths) = report.groups.iter().next().unwrap();
    assert_eq!(paths.len(), 2);
    assert!(!paths.contains(&dir.path().join("b.txt")));
}

#[test]
fn test_failed_copy_of_pair_leaves_no_group() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), "same");
    write(&dir.path().join("b.txt"), "same");

    let digester = |path: &Path| -> Result<Digest, HashError> {
        if path.ends_with("b.txt") {
            return Err(HashError::NotFound(path.to_path_buf()));
        }
        Ok(Digest::new(vec![0xab]))
    };

    let report = DuplicateFinder::new()
        .with_digester(Arc::new(digester))
        .with_workers(2)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.hash_errors.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    write(&locked.join("hidden.txt"), "secret");
    write(&dir.path().join("open.txt"), "visible");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("Skipping permission test: running with elevated privileges");
        return;
    }

    let finder = DuplicateFinder::with_defaults().with_workers(2);
    let report = finder.find_duplicates(dir.path()).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(finder.counters().files_found(), 1);
    assert_eq!(finder.counters().files_hashed(), 1);
    assert!(report.groups.is_empty());
    assert_eq!(report.walk_warnings.len(), 1);
    assert!(report.is_partial());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("a.txt");
    write(&target, "alpha");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let report = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(finder.counters().files_found(), 1);
}
