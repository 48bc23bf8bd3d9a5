//! Host section selection, general/host merging and container normalisation.
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::host::HostIdentity;
use super::value::{ConfigMap, ConfigValue, merge_maps};
use super::{ContainerSpec, HostOptions, Rule, RuleMode};
use crate::error::ConfigError;

/// Reserved section holding defaults shared by every host.
pub const GENERAL_SECTION: &str = "general";

/// Scalar options inherited from `general` before the host section is merged.
pub const TOGGLE_OPTIONS: &[&str] = &["dry_run", "overwrite", "verbose", "group_output"];

/// Resolve the normalised options for `host` from a raw configuration.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the offending section, container or
/// rule if the configuration cannot be normalised. No partial result is
/// ever returned.
pub fn resolve(raw: &ConfigValue, host: &HostIdentity) -> Result<HostOptions, ConfigError> {
    let root = raw.as_map().ok_or(ConfigError::NotAMapping)?;
    let general = match root.get(GENERAL_SECTION) {
        None | Some(ConfigValue::Null) => ConfigMap::new(),
        Some(ConfigValue::Map(m)) => m.clone(),
        Some(_) => return Err(ConfigError::InvalidGeneral),
    };

    let tag = select_section(root, host)?;
    let section = match root.get(&tag) {
        Some(ConfigValue::Map(m)) => m.clone(),
        _ => return Err(ConfigError::InvalidSection(tag)),
    };
    tracing::debug!("host \"{host}\" resolved to section \"{tag}\"");

    let mut merged: ConfigMap = general
        .iter()
        .filter(|(key, value)| {
            TOGGLE_OPTIONS.contains(&key.as_str())
                && !matches!(value, ConfigValue::Map(_) | ConfigValue::List(_))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    merge_maps(&mut merged, section);

    let name = match merged.get("name") {
        None | Some(ConfigValue::Null) => tag.clone(),
        Some(ConfigValue::String(s)) => s.clone(),
        Some(_) => {
            return Err(ConfigError::InvalidOption {
                section: tag,
                key: "name".to_string(),
            });
        }
    };

    let host_containers = match merged.get("containers") {
        None => return Err(ConfigError::NoContainersKey(tag)),
        Some(ConfigValue::Map(m)) => m,
        Some(_) => return Err(ConfigError::InvalidContainers(tag)),
    };

    let mut containers = BTreeMap::new();
    for (container, host_value) in host_containers {
        let template = general_template(&general, container)?;
        let fields = merge_container(container, template, host_value)?;
        containers.insert(container.clone(), normalize_container(container, &fields)?);
    }

    Ok(HostOptions {
        dry_run: toggle(&merged, &tag, "dry_run")?,
        overwrite: toggle(&merged, &tag, "overwrite")?,
        verbose: toggle(&merged, &tag, "verbose")?,
        group_output: toggle(&merged, &tag, "group_output")?,
        name,
        tag,
        containers,
    })
}

/// Pick the section key for `host`.
///
/// A section whose declared `name` matches the identity wins; otherwise the
/// identity itself is the section key.
fn select_section(root: &ConfigMap, host: &HostIdentity) -> Result<String, ConfigError> {
    let identity = host.as_str();
    let claimants: Vec<&String> = root
        .iter()
        .filter(|(key, _)| key.as_str() != GENERAL_SECTION)
        .filter(|(_, value)| {
            value
                .as_map()
                .and_then(|m| m.get("name"))
                .and_then(ConfigValue::as_str)
                .is_some_and(|n| n.to_lowercase() == identity)
        })
        .map(|(key, _)| key)
        .collect();

    match claimants.as_slice() {
        [] => {}
        [key] => {
            if key.as_str() != identity && identity != GENERAL_SECTION && root.contains_key(identity)
            {
                return Err(ConfigError::AmbiguousSection {
                    host: identity.to_string(),
                    sections: vec![(*key).clone(), identity.to_string()],
                });
            }
            return Ok((*key).clone());
        }
        many => {
            return Err(ConfigError::AmbiguousSection {
                host: identity.to_string(),
                sections: many.iter().map(|k| (*k).clone()).collect(),
            });
        }
    }

    if identity != GENERAL_SECTION && root.contains_key(identity) {
        return Ok(identity.to_string());
    }
    if let Some(key) = root
        .keys()
        .find(|k| k.as_str() != GENERAL_SECTION && k.to_lowercase() == identity)
    {
        return Err(ConfigError::SectionNotLowercase(key.clone()));
    }
    Err(ConfigError::SectionNotFound(identity.to_string()))
}

/// Look up the `general.containers` entry for `container`.
fn general_template<'a>(
    general: &'a ConfigMap,
    container: &str,
) -> Result<&'a ConfigValue, ConfigError> {
    match general.get("containers") {
        None | Some(ConfigValue::Null) => {
            Err(ConfigError::ContainerNotInGeneral(container.to_string()))
        }
        Some(ConfigValue::Map(m)) => m
            .get(container)
            .ok_or_else(|| ConfigError::ContainerNotInGeneral(container.to_string())),
        Some(_) => Err(ConfigError::InvalidGeneralContainers),
    }
}

/// Combine the general template with the host entry of one container.
///
/// | general            | host     | result                                  |
/// |--------------------|----------|-----------------------------------------|
/// | mapping            | mapping  | deep merge, host wins                   |
/// | path string / null | mapping  | host, `source` defaulted to the path    |
/// | mapping            | string   | general, `destination` = host string    |
/// | path string / null | string   | `{source: path, destination: string}`   |
fn merge_container(
    container: &str,
    template: &ConfigValue,
    host: &ConfigValue,
) -> Result<ConfigMap, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidContainer {
        container: container.to_string(),
        reason,
    };

    match (template, host) {
        (ConfigValue::Map(general), ConfigValue::Map(overlay)) => {
            let mut fields = general.clone();
            merge_maps(&mut fields, overlay.clone());
            Ok(fields)
        }
        (ConfigValue::String(_) | ConfigValue::Null, ConfigValue::Map(overlay)) => {
            let mut fields = overlay.clone();
            fields
                .entry("source".to_string())
                .or_insert_with(|| template.clone());
            Ok(fields)
        }
        (ConfigValue::Map(general), ConfigValue::String(_)) => {
            let mut fields = general.clone();
            fields.insert("destination".to_string(), host.clone());
            Ok(fields)
        }
        (ConfigValue::String(_) | ConfigValue::Null, ConfigValue::String(_)) => Ok(ConfigMap::from([
            ("source".to_string(), template.clone()),
            ("destination".to_string(), host.clone()),
        ])),
        (ConfigValue::Map(_) | ConfigValue::String(_) | ConfigValue::Null, other) => Err(invalid(
            format!("expected a mapping, found a {}", other.kind()),
        )),
        (other, _) => Err(invalid(format!(
            "the general entry must be a mapping or a source path, found a {}",
            other.kind()
        ))),
    }
}

/// Turn merged container fields into a typed [`ContainerSpec`].
fn normalize_container(container: &str, fields: &ConfigMap) -> Result<ContainerSpec, ConfigError> {
    let pkg = flag(container, fields, "pkg")?;
    Ok(ContainerSpec {
        name: container.to_string(),
        source: path_field(container, fields, "source")?,
        destination: path_field(container, fields, "destination")?,
        destination_create: flag(container, fields, "destination_create")?,
        pkg,
        packages: packages(container, fields.get("packages"))?,
        rules: rules(container, pkg, fields.get("rules"))?,
    })
}

fn toggle(options: &ConfigMap, section: &str, key: &str) -> Result<bool, ConfigError> {
    match options.get(key) {
        None | Some(ConfigValue::Null) => Ok(false),
        Some(ConfigValue::Bool(b)) => Ok(*b),
        Some(_) => Err(ConfigError::InvalidOption {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn flag(container: &str, fields: &ConfigMap, key: &str) -> Result<bool, ConfigError> {
    match fields.get(key) {
        None | Some(ConfigValue::Null) => Ok(false),
        Some(ConfigValue::Bool(b)) => Ok(*b),
        Some(other) => Err(ConfigError::InvalidContainer {
            container: container.to_string(),
            reason: format!("\"{key}\" must be true or false, found a {}", other.kind()),
        }),
    }
}

fn path_field(
    container: &str,
    fields: &ConfigMap,
    key: &str,
) -> Result<Option<PathBuf>, ConfigError> {
    match fields.get(key) {
        None | Some(ConfigValue::Null) => Ok(None),
        Some(ConfigValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(ConfigValue::String(s)) => Ok(Some(PathBuf::from(s))),
        Some(other) => Err(ConfigError::InvalidContainer {
            container: container.to_string(),
            reason: format!("\"{key}\" must be a path string, found a {}", other.kind()),
        }),
    }
}

/// Normalise `packages` into a set; a string is split on whitespace.
fn packages(
    container: &str,
    value: Option<&ConfigValue>,
) -> Result<Option<BTreeSet<String>>, ConfigError> {
    match value {
        None | Some(ConfigValue::Null) => Ok(None),
        Some(ConfigValue::String(s)) => Ok(Some(
            s.split_whitespace().map(str::to_string).collect(),
        )),
        Some(ConfigValue::List(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::InvalidPackages(container.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Some),
        Some(_) => Err(ConfigError::InvalidPackages(container.to_string())),
    }
}

/// Normalise `rules` into a per-package mapping.
///
/// A package container carries one `[mode, files]` pair, stored under the
/// container's own name.
fn rules(
    container: &str,
    pkg: bool,
    value: Option<&ConfigValue>,
) -> Result<BTreeMap<String, Rule>, ConfigError> {
    let invalid = |hint: Option<&str>| ConfigError::InvalidRules {
        container: container.to_string(),
        hint: hint.map(str::to_string),
    };

    match value {
        None | Some(ConfigValue::Null) => Ok(BTreeMap::new()),
        Some(value @ ConfigValue::List(_)) if pkg => Ok(BTreeMap::from([(
            container.to_string(),
            rule(container, container, value)?,
        )])),
        Some(ConfigValue::Map(_)) if pkg => Err(invalid(Some(
            "\"pkg\" is true, so \"rules\" must be a single [mode, files] pair; is \"pkg\" set by mistake?",
        ))),
        Some(ConfigValue::Map(per_package)) => per_package
            .iter()
            .map(|(package, value)| Ok((package.clone(), rule(container, package, value)?)))
            .collect(),
        Some(ConfigValue::List(items)) if looks_like_rule(items) => Err(invalid(Some(
            "a single [mode, files] pair applies to a package container; is \"pkg\": true missing?",
        ))),
        Some(_) => Err(invalid(None)),
    }
}

fn looks_like_rule(items: &[ConfigValue]) -> bool {
    matches!(items, [mode, _] if mode.as_str().and_then(RuleMode::parse).is_some())
}

/// Parse one `[mode, files]` pair; a `files` string is split on whitespace.
fn rule(container: &str, package: &str, value: &ConfigValue) -> Result<Rule, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidRule {
        container: container.to_string(),
        package: package.to_string(),
        reason,
    };

    let ConfigValue::List(items) = value else {
        return Err(invalid(format!(
            "expected a [mode, files] pair, found a {}",
            value.kind()
        )));
    };
    let [mode, files] = items.as_slice() else {
        return Err(invalid(format!(
            "expected a [mode, files] pair, found {} element(s)",
            items.len()
        )));
    };

    let mode = mode
        .as_str()
        .and_then(RuleMode::parse)
        .ok_or_else(|| invalid("mode must be \"include\" or \"exclude\"".to_string()))?;
    let files = match files {
        ConfigValue::String(s) => s.split_whitespace().map(str::to_string).collect(),
        ConfigValue::List(entries) => entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("files must be strings".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(invalid(format!(
                "files must be a string or a list, found a {}",
                other.kind()
            )));
        }
    };

    Ok(Rule { mode, files })
}
