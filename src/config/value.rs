//! Tagged configuration value and the deep-merge rules applied to it.
use serde::Deserialize;
use std::collections::BTreeMap;

/// A mapping of configuration keys to values.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A parsed, format-independent configuration value.
///
/// Both JSON and TOML files deserialize into this type, so the resolver
/// never has to care which format the user wrote.
///
/// # Examples
///
/// ```
/// use linkthedots::config::value::ConfigValue;
///
/// let v: ConfigValue = serde_json::from_str(r#"{"a": [1, "two", null]}"#).unwrap();
/// assert!(v.as_map().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered list.
    List(Vec<Self>),
    /// A nested mapping.
    Map(ConfigMap),
}

impl ConfigValue {
    /// Return the inner mapping, if this value is one.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Return the inner string, if this value is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
        }
    }
}

/// Deep-merge `overlay` into `base`.
///
/// | base      | overlay   | result                              |
/// |-----------|-----------|-------------------------------------|
/// | mapping   | mapping   | keys merged recursively, overlay wins |
/// | anything  | anything  | overlay replaces base wholesale     |
pub fn deep_merge(base: &mut ConfigValue, overlay: ConfigValue) {
    match (base, overlay) {
        (ConfigValue::Map(base_map), ConfigValue::Map(overlay_map)) => {
            merge_maps(base_map, overlay_map);
        }
        (slot, overlay) => *slot = overlay,
    }
}

/// Deep-merge the entries of `overlay` into `base`.
pub fn merge_maps(base: &mut ConfigMap, overlay: ConfigMap) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}
