//! # Weburg Configuration Module
//!
//! This module provides configuration management for weburg-loader, including:
//! - Merging an optional YAML file with the embedded default configuration
//! - Environment variable overrides
//! - Path-based getters and setters for configuration values
//!
//! ## Usage
//!
//! ```no_run
//! use wbgconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let level = config.get_log_level()?;
//! println!("log level: {}", level);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! There is no process-wide configuration object: callers load a [`Config`]
//! and hand the values they need to the code that uses them.

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("weburg.yaml");

const ENV_CONFIG_DIR: &str = "WEBURG_CONFIG";
const ENV_PREFIX: &str = "WEBURG_CONFIG__";
const CONFIG_DIR_NAME: &str = ".weburg";
const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration manager for weburg-loader
///
/// Values are stored as a YAML tree whose keys are lower-cased. Lookups are
/// done with a path of keys, e.g. `&["output", "sort_by_name"]`.
#[derive(Debug)]
pub struct Config {
    config_dir: PathBuf,
    loaded_file: Option<PathBuf>,
    env_overrides: Vec<String>,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            config_dir: self.config_dir.clone(),
            loaded_file: self.loaded_file.clone(),
            env_overrides: self.env_overrides.clone(),
            data: Mutex::new(self.snapshot()),
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

        // Default fallback
        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies `WEBURG_CONFIG__*` environment variable overrides
    ///
    /// Unlike a server configuration, nothing is written back to disk: a
    /// missing directory or file simply means the defaults are used.
    pub fn load_config(directory: &str) -> Result<Self> {
        let mut config = Self::load_without_env(directory)?;
        let data = config.data.get_mut().map_err(|_| anyhow!("Config lock poisoned"))?;
        config.env_overrides = Self::apply_env_overrides(data, env::vars());
        Ok(config)
    }

    fn load_without_env(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        debug!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);

        // Charger la configuration par défaut
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Merger avec le fichier externe s'il existe
        let loaded_file = match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external_value: Value = serde_yaml::from_slice(&data)
                    .map_err(|e| anyhow!("Invalid YAML in {}: {}", path.display(), e))?;
                merge_yaml(&mut config_value, &Self::lower_keys_value(external_value));
                Some(path)
            }
            Err(_) => {
                debug!(config_file = %path.display(), "Config file not found, using default embedded config");
                None
            }
        };

        Ok(Config {
            config_dir,
            loaded_file,
            env_overrides: Vec::new(),
            data: Mutex::new(Self::lower_keys_value(config_value)),
        })
    }

    /// Directory the configuration was looked up in
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// The config.yaml merged over the defaults, if one was found
    pub fn loaded_file(&self) -> Option<&Path> {
        self.loaded_file.as_deref()
    }

    /// `WEBURG_CONFIG__*` variables applied at load time
    pub fn env_overrides(&self) -> &[String] {
        &self.env_overrides
    }

    fn snapshot(&self) -> Value {
        match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sets a configuration value at the specified path (in memory only)
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["proxy", "port"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().map_err(|_| anyhow!("Config lock poisoned"))?;
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
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().map_err(|_| anyhow!("Config lock poisoned"))?;
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

    /// String value at `path`, `None` when absent, null or not a string
    pub fn get_string(&self, path: &[&str]) -> Result<Option<String>> {
        match self.get_value(path) {
            Ok(Value::String(s)) => Ok(Some(s)),
            Ok(Value::Number(n)) => Ok(Some(n.to_string())),
            _ => Ok(None),
        }
    }

    /// Unsigned value at `path`, `None` when absent or null
    pub fn get_u64(&self, path: &[&str]) -> Result<Option<u64>> {
        match self.get_value(path) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| anyhow!("{} must be a non-negative integer", path.join("."))),
            Ok(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| anyhow!("{} must be a non-negative integer: {}", path.join("."), e)),
            _ => Ok(None),
        }
    }

    /// Boolean value at `path`, `None` when absent or null
    pub fn get_bool(&self, path: &[&str]) -> Result<Option<bool>> {
        match self.get_value(path) {
            Ok(Value::Bool(b)) => Ok(Some(b)),
            Ok(Value::Null) | Err(_) => Ok(None),
            Ok(other) => Err(anyhow!("{} must be a boolean, got {:?}", path.join("."), other)),
        }
    }

    /// Log level filter (`trace`, `debug`, `info`, `warn`, `error`)
    pub fn get_log_level(&self) -> Result<String> {
        Ok(self
            .get_string(&["log", "level"])?
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()))
    }

    fn apply_env_overrides(
        config: &mut Value,
        vars: impl Iterator<Item = (String, String)>,
    ) -> Vec<String> {
        let mut applied = Vec::new();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                debug!(variable = %key, "Applying config override from env");
                if Self::set_value_internal(config, &key_path, yaml_value).is_ok() {
                    applied.push(key);
                }
            }
        }
        applied
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
                        let new_key = Value::String(s.to_lowercase());
                        let new_val = Self::lower_keys_value(v);
                        new_map.insert(new_key, new_val);
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
}

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
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from(dir: &Path) -> Config {
        Config::load_without_env(dir.to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_without_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = load_from(dir.path());

        assert_eq!(config.loaded_file(), None);
        assert!(config.env_overrides().is_empty());
        assert_eq!(
            config.get_string(&["source", "url"])?.as_deref(),
            Some("http://weburg.tv/playlist.vlc")
        );
        assert_eq!(config.get_u64(&["source", "timeout_secs"])?, Some(30));
        assert_eq!(config.get_string(&["proxy", "host"])?, None);
        assert_eq!(config.get_bool(&["output", "sort_by_name"])?, Some(false));
        assert_eq!(config.get_log_level()?, "info");
        Ok(())
    }

    #[test]
    fn test_file_is_merged_over_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "Proxy:\n  Host: 192.168.1.1\n  port: 4022\noutput:\n  sort_by_name: true\n",
        )?;
        let config = load_from(dir.path());

        assert_eq!(
            config.loaded_file(),
            Some(dir.path().join(CONFIG_FILE_NAME).as_path())
        );
        assert_eq!(config.get_string(&["proxy", "host"])?.as_deref(), Some("192.168.1.1"));
        assert_eq!(config.get_u64(&["proxy", "port"])?, Some(4022));
        assert_eq!(config.get_bool(&["output", "sort_by_name"])?, Some(true));
        // les autres valeurs par défaut sont conservées
        assert_eq!(
            config.get_string(&["output", "unicast_playlist"])?.as_deref(),
            Some("PlayList (unicast).m3u")
        );
        Ok(())
    }

    #[test]
    fn test_invalid_yaml_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE_NAME), "proxy: [unterminated")?;
        assert!(Config::load_without_env(dir.path().to_str().unwrap()).is_err());
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let vars = vec![
            ("WEBURG_CONFIG__PROXY__PORT".to_string(), "8080".to_string()),
            ("WEBURG_CONFIG__LOG__LEVEL".to_string(), "debug".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        let applied = Config::apply_env_overrides(&mut value, vars.into_iter());

        assert_eq!(
            applied,
            vec!["WEBURG_CONFIG__PROXY__PORT", "WEBURG_CONFIG__LOG__LEVEL"]
        );

        assert_eq!(
            Config::get_value_internal(&value, &["proxy", "port"]).unwrap(),
            Value::Number(8080.into())
        );
        assert_eq!(
            Config::get_value_internal(&value, &["log", "level"]).unwrap(),
            Value::String("debug".into())
        );
    }

    #[test]
    fn test_set_and_get_value() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = load_from(dir.path());
        config.set_value(&["Proxy", "Host"], Value::String("gw".into()))?;
        assert_eq!(config.get_string(&["proxy", "host"])?.as_deref(), Some("gw"));
        assert!(config.get_value(&["nope", "missing"]).is_err());
        Ok(())
    }
}
