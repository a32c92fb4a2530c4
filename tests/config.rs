use std::fs;

use eventops::config::{Backend, Config, CONFIG_FILE};

#[test]
fn config_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load_from_dir(dir.path());

    assert_eq!(config.store.backend, Backend::Github);
    assert_eq!(config.store.data_dir, "data");
    assert_eq!(config.github.branch, "main");
    assert_eq!(config.github.token_env, "GITHUB_TOKEN");
    assert_eq!(config.events.default_status, "Planned");
    assert_eq!(config.tasks.done_status, "Done");
    assert_eq!(config.calendar.max_items_per_day, 3);
    assert_eq!(config.calendar.upcoming_days, 14);
}

#[test]
fn config_overrides_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let toml = r#"
[store]
backend = "git"
data_dir = "tables"

[git]
path = "/srv/ops-data"

[github]
owner = "ops"
repo = "events"
branch = "data"

[tasks]
statuses = ["Todo", "Finished"]
default_status = "Todo"
done_status = "Finished"

[calendar]
max_items_per_day = 5
"#;
    fs::write(dir.path().join(CONFIG_FILE), toml)?;

    let config = Config::load(&dir.path().join(CONFIG_FILE))?;
    assert_eq!(config.store.backend, Backend::Git);
    assert_eq!(config.store.data_dir, "tables");
    assert_eq!(config.github.owner.as_deref(), Some("ops"));
    assert_eq!(config.github.branch, "data");
    assert_eq!(config.tasks.done_status, "Finished");
    assert_eq!(config.calendar.max_items_per_day, 5);
    assert_eq!(config.calendar.upcoming_days, 14);
    Ok(())
}

#[test]
fn implicit_invalid_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "[calendar]\nmax_items_per_day = 0\n").expect("write");

    let config = Config::load_from_dir(dir.path());
    assert_eq!(config.calendar.max_items_per_day, 3);
    assert!(Config::load(&dir.path().join(CONFIG_FILE)).is_err());
}

#[test]
fn done_status_must_be_listed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[tasks]\nstatuses = [\"Open\"]\ndefault_status = \"Open\"\n").expect("write");
    assert!(Config::load(&path).is_err());
}

#[test]
fn env_overrides_apply_to_github() {
    let mut config = Config::default();
    config.apply_env(|key| match key {
        "GITHUB_OWNER" => Some("ops".to_string()),
        "GITHUB_REPO" => Some("  ".to_string()),
        "GITHUB_BRANCH" => Some("data".to_string()),
        _ => None,
    });
    assert_eq!(config.github.owner.as_deref(), Some("ops"));
    assert!(config.github.repo.is_none());
    assert_eq!(config.github.branch, "data");
}

#[test]
fn explicit_config_file_must_parse() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "store = 12").expect("write");
    assert!(Config::resolve(Some(&path)).is_err());
}
