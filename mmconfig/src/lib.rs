//! # MMSoap client configuration
//!
//! This crate builds the option set of an MMSoap transport session:
//! - Built-in defaults embedded from `mmsoap.yaml`
//! - Optional YAML config file (`$MMSOAP_CONFIG`, `./.mmsoap/config.yaml`
//!   or `~/.mmsoap/config.yaml`)
//! - Environment variable overrides (`MMSOAP_CONFIG__WSDL_TRACE=false`)
//! - Caller overrides passed as an untyped option bag
//!
//! Every layer is merged with the same rule: a value replaces the current one
//! only when it is present and not empty. `null`, `""`, `[]` and `{}` are
//! empty; `false` and `0` are explicit values and do override.
//!
//! ## Usage
//!
//! ```
//! use mmconfig::{keys, ClientConfiguration};
//! use serde_yaml::{Mapping, Value};
//!
//! let mut overrides = Mapping::new();
//! overrides.insert(Value::from(keys::WSDL_TRACE), Value::from(false));
//!
//! let config = ClientConfiguration::with_overrides(&overrides)?;
//! assert_eq!(config.trace(), Some(false));
//! assert_eq!(config.soap_version(), Some(1));
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub mod keys;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("mmsoap.yaml");

const ENV_CONFIG_FILE: &str = "MMSOAP_CONFIG";
const ENV_PREFIX: &str = "MMSOAP_CONFIG__";
const CONFIG_DIR_NAME: &str = ".mmsoap";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Macro to generate a getter for string options
macro_rules! impl_string_option {
    ($getter:ident, $key:expr) => {
        pub fn $getter(&self) -> Option<String> {
            match self.get($key)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            }
        }
    };
}

/// Macro to generate a getter for boolean options
macro_rules! impl_bool_option {
    ($getter:ident, $key:expr) => {
        pub fn $getter(&self) -> Option<bool> {
            match self.get($key)? {
                Value::Bool(b) => Some(*b),
                Value::Number(n) => n.as_i64().map(|n| n != 0),
                Value::String(s) => parse_bool(s),
                _ => None,
            }
        }
    };
}

/// Macro to generate a getter for integer options
macro_rules! impl_int_option {
    ($getter:ident, $key:expr) => {
        pub fn $getter(&self) -> Option<i64> {
            match self.get($key)? {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                Value::Bool(b) => Some(i64::from(*b)),
                _ => None,
            }
        }
    };
}

/// Effective option set of one transport session.
///
/// Built from the embedded defaults, then refined with [`merge`](Self::merge),
/// [`load_file`](Self::load_file) and the environment. Only recognised keys
/// (see [`keys::ALL`]) are ever stored; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfiguration {
    data: Mapping,
}

impl ClientConfiguration {
    /// Returns the built-in defaults.
    pub fn defaults() -> Result<Self> {
        let value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let data = match lower_keys_value(value) {
            Value::Mapping(map) => map,
            _ => return Err(anyhow!("Embedded default configuration is not a mapping")),
        };
        Ok(Self { data })
    }

    /// Returns the defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Mapping) -> Result<Self> {
        let mut config = Self::defaults()?;
        config.merge(overrides);
        Ok(config)
    }

    /// Loads the full configuration stack:
    /// 1. the embedded defaults
    /// 2. the config file, if one is found
    /// 3. the `MMSOAP_CONFIG__*` environment variables
    pub fn load() -> Result<Self> {
        let mut config = Self::defaults()?;

        if let Some(path) = Self::find_config_file() {
            config.load_file(&path)?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Finds the config file by trying different locations in order
    fn find_config_file() -> Option<PathBuf> {
        // 1. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
            info!(env_var = ENV_CONFIG_FILE, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        // 2. Try current directory
        let local = Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        // 3. Try home directory
        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    /// Merges a YAML file into the configuration.
    ///
    /// The file must hold a mapping at its root. Its entries follow the usual
    /// merge rule.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let yaml = fs::read_to_string(path)?;
        let value: Value = serde_yaml::from_str(&yaml)?;

        let applied = match lower_keys_value(value) {
            Value::Mapping(map) => self.merge(&map),
            Value::Null => 0,
            _ => {
                return Err(anyhow!(
                    "Config file {} does not contain a mapping",
                    path.display()
                ))
            }
        };

        info!(config_file = %path.display(), applied, "Loaded config file");
        Ok(applied)
    }

    /// Merges caller overrides.
    ///
    /// Keys may use the long (`wsdl_trace`) or short (`trace`) form, in any
    /// case. A value is applied when the key is recognised and the value is
    /// not empty. Returns the number of applied entries.
    pub fn merge(&mut self, overrides: &Mapping) -> usize {
        let mut applied = 0;

        for (key, value) in overrides {
            let Some(name) = key.as_str() else {
                debug!(?key, "Ignoring non-string option key");
                continue;
            };

            let Some(canonical) = keys::canonical(name) else {
                debug!(option = name, "Ignoring unknown option");
                continue;
            };

            if is_empty_value(value) {
                debug!(option = canonical, "Empty value, keeping current setting");
                continue;
            }

            self.data
                .insert(Value::String(canonical.to_string()), value.clone());
            applied += 1;
        }

        applied
    }

    /// Applies the `MMSOAP_CONFIG__<KEY>` environment variables.
    pub fn apply_env_overrides(&mut self) -> usize {
        self.apply_overrides_from(env::vars())
    }

    /// Applies `MMSOAP_CONFIG__<KEY>=<yaml value>` pairs from any source.
    pub fn apply_overrides_from<I>(&mut self, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Mapping::new();
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                overrides.insert(
                    Value::String(name.to_lowercase()),
                    convert_env_value(&value),
                );
            }
        }
        self.merge(&overrides)
    }

    /// Sets one option, following the merge rule.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        let mut single = Mapping::new();
        single.insert(Value::String(key.to_string()), value);
        self.merge(&single) == 1
    }

    /// Returns the value of an option, `None` when it is unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let canonical = keys::canonical(key)?;
        self.data
            .get(canonical)
            .filter(|value| !is_empty_value(value))
    }

    /// Returns every set option, keyed without the `wsdl_` prefix.
    pub fn options(&self) -> Mapping {
        self.data
            .iter()
            .filter(|(_, value)| !is_empty_value(value))
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                let short = key.strip_prefix(keys::KEY_PREFIX).unwrap_or(key);
                Some((Value::String(short.to_string()), value.clone()))
            })
            .collect()
    }

    /// Serialises the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.data)?)
    }

    impl_string_option!(url, keys::WSDL_URL);
    impl_string_option!(target_namespace, keys::WSDL_TARGET_NAMESPACE);
    impl_string_option!(login, keys::WSDL_LOGIN);
    impl_string_option!(password, keys::WSDL_PASSWORD);
    impl_string_option!(encoding, keys::WSDL_ENCODING);
    impl_string_option!(user_agent, keys::WSDL_USER_AGENT);
    impl_string_option!(proxy_host, keys::WSDL_PROXY_HOST);
    impl_string_option!(proxy_login, keys::WSDL_PROXY_LOGIN);
    impl_string_option!(proxy_password, keys::WSDL_PROXY_PASSWORD);
    impl_string_option!(local_cert, keys::WSDL_LOCAL_CERT);
    impl_string_option!(passphrase, keys::WSDL_PASSPHRASE);

    impl_bool_option!(trace, keys::WSDL_TRACE);
    impl_bool_option!(exceptions, keys::WSDL_EXCEPTIONS);
    impl_bool_option!(keep_alive, keys::WSDL_KEEP_ALIVE);

    impl_int_option!(cache_wsdl, keys::WSDL_CACHE_WSDL);
    impl_int_option!(soap_version, keys::WSDL_SOAP_VERSION);
    impl_int_option!(compression, keys::WSDL_COMPRESSION);
    impl_int_option!(connection_timeout, keys::WSDL_CONNECTION_TIMEOUT);
    impl_int_option!(features, keys::WSDL_FEATURES);
    impl_int_option!(proxy_port, keys::WSDL_PROXY_PORT);
    impl_int_option!(authentication, keys::WSDL_AUTHENTICATION);
    impl_int_option!(ssl_method, keys::WSDL_SSL_METHOD);

    /// Stream context options (`http.header` carries extra header lines).
    pub fn stream_context(&self) -> Option<&Mapping> {
        self.get(keys::WSDL_STREAM_CONTEXT)?.as_mapping()
    }

    /// Type map entries, kept as given.
    pub fn typemap(&self) -> Option<&Value> {
        self.get(keys::WSDL_TYPEMAP)
    }
}

/// Tells whether a value counts as "not provided".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
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
                    new_map.insert(Value::String(s.to_lowercase()), v);
                } else {
                    new_map.insert(k, v);
                }
            }
            Value::Mapping(new_map)
        }
        _ => value,
    }
}
