use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VireoError};
use crate::role::Role;

/// A single scalar configuration value.
///
/// Values sourced from the environment are always `String`; YAML sections may
/// carry any of the scalar shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            OptionValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Lenient truthiness. Environment overrides arrive as strings, so
    /// `"false"`, `"0"`, `"no"`, and the empty string read as false.
    pub fn truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(i) => *i != 0,
            OptionValue::Float(f) => *f != 0.0,
            OptionValue::String(s) => !matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "no"
            ),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Float(x) => write!(f, "{x}"),
            OptionValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

/// Flat option mapping for one role: one level deep, scalar values only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleOptions(BTreeMap<String, OptionValue>);

impl RoleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(OptionValue::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove and return a value.
    pub fn take(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    /// Remove a boolean-ish flag; `default` when absent.
    pub fn take_flag(&mut self, key: &str, default: bool) -> bool {
        self.take(key).map(|v| v.truthy()).unwrap_or(default)
    }

    /// Insert `value` only when `key` is absent.
    pub fn set_default(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.0.entry(key.to_string()).or_insert_with(|| value.into());
    }

    /// Overlay `overrides` onto self. Overriding values win key-by-key; keys
    /// unique to either side are kept.
    pub fn merge_over(&mut self, overrides: RoleOptions) {
        for (key, value) in overrides.0 {
            self.0.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, OptionValue)> for RoleOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parsed configuration document: the file's top-level mapping.
#[derive(Debug, Clone, Default)]
pub struct ConfigDoc(serde_yaml::Mapping);

impl ConfigDoc {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Load the configuration file.
///
/// `${VAR}` references are expanded from the environment before parsing.
/// A missing or empty file yields an empty document so that env-only and
/// probe-only setups work without a file on disk.
pub fn load_config(path: &Path) -> Result<ConfigDoc> {
    if !path.exists() {
        return Ok(ConfigDoc::default());
    }

    let content = std::fs::read_to_string(path)?;
    let expanded = expand_env_vars(&content);
    if expanded.trim().is_empty() {
        return Ok(ConfigDoc::default());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(&expanded)?;
    match value {
        serde_yaml::Value::Null => Ok(ConfigDoc::default()),
        serde_yaml::Value::Mapping(mapping) => Ok(ConfigDoc(mapping)),
        other => Err(VireoError::Config(format!(
            "expected a mapping at the top level of {}, found {}",
            path.display(),
            yaml_kind(&other)
        ))),
    }
}

/// The role's section of the document as flat options.
///
/// An absent or null section is empty options; a section that is present but
/// not a flat mapping of scalars is a type error.
pub fn role_options(doc: &ConfigDoc, role: Role) -> Result<RoleOptions> {
    match doc.0.get(role.config_key()) {
        None | Some(serde_yaml::Value::Null) => Ok(RoleOptions::default()),
        Some(serde_yaml::Value::Mapping(mapping)) => {
            let mut options = RoleOptions::new();
            for (key, value) in mapping {
                let key = key.as_str().ok_or_else(|| VireoError::ConfigType {
                    role,
                    found: "a non-string key".to_string(),
                })?;
                let value = scalar_value(value).ok_or_else(|| VireoError::ConfigType {
                    role,
                    found: format!("a nested value under `{key}`"),
                })?;
                options.insert(key, value);
            }
            Ok(options)
        }
        Some(other) => Err(VireoError::ConfigType {
            role,
            found: yaml_kind(other).to_string(),
        }),
    }
}

/// Per-role overrides from the process environment.
///
/// Every `<ROLE>_MODEL__<option>` variable becomes an option keyed by the
/// lower-cased remainder. Values stay strings; nothing is validated here.
pub fn env_overrides(role: Role) -> RoleOptions {
    let prefix = role.env_prefix();
    let mut options = RoleOptions::new();
    for (key, value) in std::env::vars() {
        if let Some(rest) = key.strip_prefix(&prefix) {
            if !rest.is_empty() {
                options.insert(rest.to_ascii_lowercase(), OptionValue::String(value));
            }
        }
    }
    options
}

/// The role's YAML section overlaid with its environment overrides,
/// environment winning key-by-key.
pub fn merged_options(doc: &ConfigDoc, role: Role) -> Result<RoleOptions> {
    let mut options = role_options(doc, role)?;
    options.merge_over(env_overrides(role));
    Ok(options)
}

fn scalar_value(value: &serde_yaml::Value) -> Option<OptionValue> {
    match value {
        serde_yaml::Value::Bool(b) => Some(OptionValue::Bool(*b)),
        serde_yaml::Value::Number(n) => n
            .as_i64()
            .map(OptionValue::Int)
            .or_else(|| n.as_f64().map(OptionValue::Float)),
        serde_yaml::Value::String(s) => Some(OptionValue::String(s.clone())),
        _ => None,
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}
