use linkdupe::actions::{consolidate, planned_links};
use linkdupe::duplicates::DuplicateFinder;
use linkdupe::scanner::hardlink::{is_same_object, is_supported};
use std::fs;
use tempfile::tempdir;

fn scenario(root: &std::path::Path) {
    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("b.txt"), "beta").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("c.txt"), "alpha").unwrap();
}

#[test]
fn test_consolidate_links_duplicate_to_first_copy() {
    if !is_supported() {
        return;
    }
    let dir = tempdir().unwrap();
    scenario(dir.path());

    let report = DuplicateFinder::with_defaults()
        .with_workers(1)
        .find_duplicates(dir.path())
        .unwrap();
    let summary = consolidate(&report.groups);

    assert_eq!(summary.replaced, 1);
    assert!(summary.all_succeeded());
    let original = dir.path().join("a.txt");
    let copy = dir.path().join("sub").join("c.txt");
    assert!(is_same_object(&original, &copy).unwrap());
    assert_eq!(fs::read_to_string(&copy).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "beta");
}

#[test]
fn test_consolidate_twice_replaces_nothing() {
    if !is_supported() {
        return;
    }
    let dir = tempdir().unwrap();
    scenario(dir.path());

    let finder = DuplicateFinder::with_defaults().with_workers(2);
    let report = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(consolidate(&report.groups).replaced, 1);

    // Linked files still hash the same, so the group is found again.
    let report = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(report.groups.len(), 1);
    let second = consolidate(&report.groups);
    assert_eq!(second.replaced, 0);
    assert_eq!(second.already_linked, 1);
}

#[test]
fn test_dry_run_plan_leaves_files_untouched() {
    let dir = tempdir().unwrap();
    scenario(dir.path());

    let report = DuplicateFinder::with_defaults()
        .with_workers(1)
        .find_duplicates(dir.path())
        .unwrap();
    let plan = planned_links(&report.groups);

    let original = dir.path().join("a.txt");
    let copy = dir.path().join("sub").join("c.txt");
    assert_eq!(plan, vec![(original.clone(), copy.clone())]);
    assert!(!is_same_object(&original, &copy).unwrap());
}

#[cfg(unix)]
#[test]
fn test_unremovable_candidate_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    scenario(dir.path());
    let sub = dir.path().join("sub");

    let report = DuplicateFinder::with_defaults()
        .with_workers(1)
        .find_duplicates(dir.path())
        .unwrap();

    // Read-only directory: the candidate inside cannot be removed.
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o555)).unwrap();
    let probe = sub.join("probe");
    if fs::write(&probe, "x").is_ok() {
        let _ = fs::remove_file(&probe);
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let summary = consolidate(&report.groups);
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(summary.replaced, 0);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.at_risk.is_empty());
    assert_eq!(fs::read_to_string(sub.join("c.txt")).unwrap(), "alpha");
    assert!(dir.path().join("a.txt").exists());
}
