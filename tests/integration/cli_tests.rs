use clap::Parser;
use linkdupe::cli::Cli;
use linkdupe::error::ExitCode;
use linkdupe::run_app;
use linkdupe::scanner::hardlink::{is_same_object, is_supported};
use std::fs;
use std::path::Path;

fn scenario(root: &Path) {
    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("b.txt"), "beta").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("c.txt"), "alpha").unwrap();
}

// Runs inside a figment jail so LINKDUPE_* variables set by other tests
// cannot leak into the configuration.
fn run_in_jail(extra: &[&str], check: impl FnOnce(&Path, anyhow::Result<ExitCode>)) {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "")?;
        let root = jail.directory().join("tree");
        fs::create_dir(&root).unwrap();
        scenario(&root);

        let config = jail.directory().join("config.toml");
        let mut args = vec![
            "linkdupe".to_string(),
            root.to_string_lossy().into_owned(),
            "--config".to_string(),
            config.to_string_lossy().into_owned(),
            "-q".to_string(),
            "-o".to_string(),
            "json".to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        let cli = Cli::try_parse_from(args).unwrap();

        check(&root, run_app(cli));
        Ok(())
    });
}

#[test]
fn test_report_only_leaves_files_alone() {
    run_in_jail(&["-w", "2"], |root, result| {
        assert_eq!(result.unwrap(), ExitCode::Success);
        assert!(!is_same_object(&root.join("a.txt"), &root.join("sub").join("c.txt")).unwrap());
    });
}

#[test]
fn test_hardlink_dry_run_touches_nothing() {
    run_in_jail(&["--hardlink", "--dry-run"], |root, result| {
        assert_eq!(result.unwrap(), ExitCode::Success);
        assert!(!is_same_object(&root.join("a.txt"), &root.join("sub").join("c.txt")).unwrap());
        assert_eq!(fs::read_to_string(root.join("sub").join("c.txt")).unwrap(), "alpha");
    });
}

#[test]
fn test_hardlink_links_duplicate() {
    if !is_supported() {
        return;
    }
    run_in_jail(&["--hardlink", "--algo", "sha256"], |root, result| {
        assert_eq!(result.unwrap(), ExitCode::Success);
        assert!(is_same_object(&root.join("a.txt"), &root.join("sub").join("c.txt")).unwrap());
        assert!(!is_same_object(&root.join("a.txt"), &root.join("b.txt")).unwrap());
        assert_eq!(fs::read_to_string(root.join("sub").join("c.txt")).unwrap(), "alpha");
    });
}

#[test]
fn test_missing_root_is_general_error() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "")?;
        let config = jail.directory().join("config.toml");
        let missing = jail.directory().join("does-not-exist");
        let cli = Cli::try_parse_from([
            "linkdupe".to_string(),
            missing.to_string_lossy().into_owned(),
            "--config".to_string(),
            config.to_string_lossy().into_owned(),
            "-q".to_string(),
        ])
        .unwrap();

        let err = run_app(cli).unwrap_err();

        assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
        assert!(format!("{err:#}").contains("does-not-exist"));
        Ok(())
    });
}
