use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use linkdupe::config::{Config, ConfigOverrides};
use linkdupe::scanner::Algorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_defaults_extract() {
    // Figment directly, without Env, to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
algorithm = "sha256"
workers = 3
hardlink = true
timeout_secs = 10
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.algorithm, Algorithm::Sha256);
    assert_eq!(config.workers, 3);
    assert!(config.hardlink);
    assert!(!config.dry_run);
    assert_eq!(config.timeout_secs, Some(10));
}

#[test]
fn test_config_env_layer() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("LINKDUPE_WORKERS", "7");
        jail.set_env("LINKDUPE_ALGORITHM", "md5");

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("LINKDUPE_"))
            .extract()?;

        assert_eq!(config.workers, 7);
        assert_eq!(config.algorithm, Algorithm::Md5);
        Ok(())
    });
}

#[test]
fn test_cli_overrides_file_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "algorithm = \"sha256\"\nworkers = 3\n")?;
        jail.set_env("LINKDUPE_WORKERS", "5");
        jail.set_env("LINKDUPE_HARDLINK", "true");

        let overrides = ConfigOverrides {
            workers: Some(9),
            dry_run: Some(true),
            ..Default::default()
        };
        let path = jail.directory().join("config.toml");
        let config = Config::load(Some(&path), &overrides).unwrap();

        assert_eq!(config.algorithm, Algorithm::Sha256);
        assert_eq!(config.workers, 9);
        assert!(config.hardlink);
        assert!(config.dry_run);
        Ok(())
    });
}

#[test]
fn test_invalid_algorithm_is_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "algorithm = \"crc32\"\n")?;
        let path = jail.directory().join("config.toml");

        let result = Config::load(Some(&path), &ConfigOverrides::default());
        assert!(result.is_err());
        Ok(())
    });
}
