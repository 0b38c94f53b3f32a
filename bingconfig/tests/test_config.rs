use bingconfig::{Config, Environment};
use std::time::Duration;

fn write_config(contents: &str) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("config.yaml"), contents).unwrap();
    temp_dir
}

#[test]
fn test_load_config_from_directory() {
    let temp_dir = write_config(
        "api:\n  environment: sandbox\n  developer_token: DEV\n  account_id: 1234\nhttp:\n  retry_limit: 4\n",
    );

    let config = Config::load_config(temp_dir.path().to_str().unwrap()).unwrap();

    assert_eq!(config.config_dir(), temp_dir.path());
    assert_eq!(config.get_environment(), Environment::Sandbox);
    assert_eq!(config.get_developer_token().unwrap(), "DEV");
    assert_eq!(config.get_account_id().unwrap(), "1234");
    assert_eq!(config.get_retry_limit(), 4);
    // Non surchargé : valeur par défaut
    assert_eq!(config.get_open_timeout(), Duration::from_secs(10));
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();

    let config = Config::load_config(temp_dir.path().to_str().unwrap()).unwrap();

    assert_eq!(config.get_environment(), Environment::Production);
    assert_eq!(config.get_developer_token().unwrap(), "");
    assert_eq!(config.get_wsdl_dir(), temp_dir.path().join("vendor/wsdl"));
    assert!(!temp_dir.path().join("config.yaml").exists());
}

#[test]
fn test_save_round_trips() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().to_str().unwrap();

    let config = Config::load_config(dir).unwrap();
    config.set_customer_id("987".to_string()).unwrap();
    config.set_validation_bypass(vec!["A".into(), "B".into()]).unwrap();
    config.save().unwrap();

    let reloaded = Config::load_config(dir).unwrap();
    assert_eq!(reloaded.get_customer_id().unwrap(), "987");
    assert_eq!(reloaded.get_validation_bypass(), vec!["A", "B"]);
}

#[test]
fn test_in_memory_config_cannot_be_saved() {
    let config = Config::from_yaml_str("{}").unwrap();
    assert!(config.save().is_err());
}
