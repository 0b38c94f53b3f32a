//! # Bing Ads SDK Configuration
//!
//! This crate provides configuration management for the Bing Ads SDK:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//!
//! There is no process-wide instance: a [`Config`] is loaded once by the
//! application and handed to the client that needs it.
//!
//! ## Usage
//!
//! ```no_run
//! use bingconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let token = config.get_developer_token()?;
//! let timeout = config.get_read_timeout();
//!
//! config.set_account_id("123456".to_string())?;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use parking_lot::Mutex;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("bingads.yaml");

const ENV_CONFIG_DIR: &str = "BINGADS_CONFIG";
const ENV_PREFIX: &str = "BINGADS_CONFIG__";
const CONFIG_DIR_NAME: &str = ".bingads";

// Default values for configuration
const DEFAULT_OPEN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 20;
const DEFAULT_RETRY_LIMIT: usize = 2;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 1;
const DEFAULT_WSDL_DIR: &str = "vendor/wsdl";
const DEFAULT_XSD_FILE: &str = "vendor/xsd/main.xsd";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> usize {
            match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_u64().map(|v| v as usize).unwrap_or($default),
                Ok(Value::String(s)) => s.trim().parse().unwrap_or($default),
                _ => $default,
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for durations stored as whole seconds
macro_rules! impl_secs_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Duration {
            let secs = match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_u64().unwrap_or($default),
                Ok(Value::String(s)) => match s.trim().parse::<u64>() {
                    Ok(secs) => secs,
                    Err(_) => {
                        warn!(path = %$path.join("."), value = %s, "Invalid duration, using default");
                        $default
                    }
                },
                _ => $default,
            };
            Duration::from_secs(secs)
        }

        pub fn $setter(&self, duration: Duration) -> Result<()> {
            let n = Number::from(duration.as_secs());
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values.
///
/// Numbers are accepted and rendered as strings, since account and customer
/// ids are often written unquoted in YAML.
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr) => {
        pub fn $getter(&self) -> Result<String> {
            match self.get_value($path)? {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                Value::Null => Ok(String::new()),
                other => Err(anyhow!("{} is not a string: {:?}", $path.join("."), other)),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Bing Ads API environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "sandbox" | "test" => Ok(Environment::Sandbox),
            other => Err(anyhow!("Unknown Bing Ads environment '{}'", other)),
        }
    }
}

/// Configuration manager for the Bing Ads SDK
///
/// This structure manages the SDK configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: PathBuf,
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        // 1. Try provided directory
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Loads the configuration from the specified directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `BINGADS_CONFIG` environment variable
    /// 3. `.bingads` in the current directory
    /// 4. `.bingads` in the user's home directory
    ///
    /// The embedded defaults are merged with `config.yaml` from that directory
    /// when it exists, then `BINGADS_CONFIG__*` environment variables are
    /// applied. Nothing is written to disk; call [`Config::save`] for that.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join("config.yaml");

        let external = match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                Some(serde_yaml::from_slice::<Value>(&data)?)
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
                None
            }
        };

        Self::build(config_dir, Some(path), external)
    }

    /// Builds a configuration from a YAML document merged over the defaults.
    ///
    /// Relative paths are resolved against the current directory and the
    /// configuration has no backing file.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let external: Value = serde_yaml::from_str(yaml)?;
        Self::build(PathBuf::from("."), None, Some(external))
    }

    fn build(config_dir: PathBuf, path: Option<PathBuf>, external: Option<Value>) -> Result<Self> {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if let Some(external) = external {
            merge_yaml(&mut config_value, &Self::lower_keys_value(external));
        }
        let mut config_value = Self::lower_keys_value(config_value);

        Self::apply_env_overrides(&mut config_value);

        Ok(Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        })
    }

    /// Directory the configuration was loaded from
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("Configuration has no backing file"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(&*self.data.lock())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["http", "read_timeout"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock();
        Self::set_value_internal(&mut data, path, value)
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(err) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %err, "Ignoring config override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Résout un chemin relatif par rapport au répertoire de configuration
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    fn get_path(&self, path: &[&str], default: &str) -> PathBuf {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.is_empty() => self.resolve_path(&s),
            _ => self.resolve_path(default),
        }
    }

    /// Gets the API environment, falling back to production
    pub fn get_environment(&self) -> Environment {
        match self.get_value(&["api", "environment"]) {
            Ok(Value::String(s)) => s.parse().unwrap_or_else(|err| {
                warn!("{}, using production", err);
                Environment::Production
            }),
            _ => Environment::Production,
        }
    }

    pub fn set_environment(&self, environment: Environment) -> Result<()> {
        self.set_value(
            &["api", "environment"],
            Value::String(environment.as_str().to_string()),
        )
    }

    impl_string_config!(
        get_developer_token,
        set_developer_token,
        &["api", "developer_token"]
    );

    impl_string_config!(get_customer_id, set_customer_id, &["api", "customer_id"]);

    impl_string_config!(get_account_id, set_account_id, &["api", "account_id"]);

    impl_secs_config!(
        get_open_timeout,
        set_open_timeout,
        &["http", "open_timeout"],
        DEFAULT_OPEN_TIMEOUT_SECS
    );

    impl_secs_config!(
        get_read_timeout,
        set_read_timeout,
        &["http", "read_timeout"],
        DEFAULT_READ_TIMEOUT_SECS
    );

    impl_usize_config!(
        get_retry_limit,
        set_retry_limit,
        &["http", "retry_limit"],
        DEFAULT_RETRY_LIMIT
    );

    impl_secs_config!(
        get_retry_interval,
        set_retry_interval,
        &["http", "retry_interval"],
        DEFAULT_RETRY_INTERVAL_SECS
    );

    /// Directory holding one sub-directory of WSDL files per environment
    pub fn get_wsdl_dir(&self) -> PathBuf {
        self.get_path(&["schema", "wsdl_dir"], DEFAULT_WSDL_DIR)
    }

    /// Entry point XSD file used for request validation
    pub fn get_xsd_file(&self) -> PathBuf {
        self.get_path(&["schema", "xsd_file"], DEFAULT_XSD_FILE)
    }

    /// Request element names exempted from schema validation
    pub fn get_validation_bypass(&self) -> Vec<String> {
        match self.get_value(&["schema", "validation_bypass"]) {
            Ok(Value::Sequence(seq)) => seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_validation_bypass(&self, names: Vec<String>) -> Result<()> {
        let seq = names.into_iter().map(Value::String).collect();
        self.set_value(&["schema", "validation_bypass"], Value::Sequence(seq))
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> String {
        match self.get_value(&["logger", "min_level"]) {
            Ok(Value::String(s)) => s,
            _ => DEFAULT_LOG_MIN_LEVEL.to_string(),
        }
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["logger", "min_level"], Value::String(level))
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings, keys from external are merged into default recursively
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_open_timeout(), Duration::from_secs(10));
        assert_eq!(config.get_read_timeout(), Duration::from_secs(20));
        assert_eq!(config.get_retry_limit(), 2);
        assert_eq!(config.get_retry_interval(), Duration::from_secs(1));
        assert_eq!(
            config.get_validation_bypass(),
            vec!["SignupCustomerRequest".to_string()]
        );
        assert!(config.get_log_enable_console());
    }

    #[test]
    fn test_merge_keeps_unset_defaults() {
        let config = Config::from_yaml_str("http:\n  read_timeout: 45\n").unwrap();
        assert_eq!(config.get_read_timeout(), Duration::from_secs(45));
        assert_eq!(config.get_open_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let config = Config::from_yaml_str("API:\n  Customer_Id: 42\n").unwrap();
        assert_eq!(config.get_customer_id().unwrap(), "42");
    }

    #[test]
    fn test_environment_parsing() {
        let config = Config::from_yaml_str("api:\n  environment: Sandbox\n").unwrap();
        assert_eq!(config.get_environment(), Environment::Sandbox);

        let config = Config::from_yaml_str("api:\n  environment: mars\n").unwrap();
        assert_eq!(config.get_environment(), Environment::Production);
    }

    #[test]
    fn test_set_and_get_value() {
        let config = Config::from_yaml_str("{}").unwrap();
        config.set_retry_limit(5).unwrap();
        assert_eq!(config.get_retry_limit(), 5);
        assert!(config.get_value(&["nope", "missing"]).is_err());
    }

    #[test]
    fn test_merge_yaml_replaces_sequences() {
        let mut default: Value = serde_yaml::from_str("a: [1, 2]\nb: {c: 1, d: 2}").unwrap();
        let external: Value = serde_yaml::from_str("a: [3]\nb: {d: 5}").unwrap();
        merge_yaml(&mut default, &external);
        let expected: Value = serde_yaml::from_str("a: [3]\nb: {c: 1, d: 5}").unwrap();
        assert_eq!(default, expected);
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let config = Config::from_yaml_str("schema:\n  xsd_file: xsd/main.xsd\n").unwrap();
        assert_eq!(config.get_xsd_file(), Path::new(".").join("xsd/main.xsd"));
    }
}
