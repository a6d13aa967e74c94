use crate::domain::model::{ClassificationRule, HostMatcher};
use crate::utils::error::{Result, SimpError};
use crate::utils::validation::validate_non_empty_string;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Environment used when no rule matches and the file declares no default,
/// and for every host when the rule file does not exist.
pub const DEFAULT_ENVIRONMENT: &str = "production";

pub const DEFAULT_CONFIG_PATH: &str = "/etc/puppetlabs/puppet/environment_rules.yaml";

/// The one key of the rule file that is not a hostname rule.
pub const DEFAULT_ENVIRONMENT_KEY: &str = "default_environment";

/// Hostname rules, in the order they appear in the file.
///
/// The file is a single mapping of hostname or `/regex/` to environment
/// name, plus an optional `default_environment` entry.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub default_environment: Option<String>,
    pub rules: Vec<ClassificationRule>,
}

impl ClassifierConfig {
    /// `Ok(None)` when `path` does not exist; an unconfigured host is not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No rule file at {}, using defaults", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| SimpError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content, &path.display().to_string()).map(Some)
    }

    pub fn from_yaml_str(content: &str, source: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| structure_error(source, format!("YAML parsing error: {}", e)))?;

        let entries = match document {
            Value::Mapping(entries) => entries,
            Value::Null => Mapping::new(),
            other => {
                return Err(structure_error(
                    source,
                    format!("expected a mapping of hostname or /regex/ to environment, found {:?}", other),
                ))
            }
        };

        let mut default_environment = None;
        let mut rules = Vec::new();
        for (key, value) in entries {
            let (Value::String(pattern), Value::String(environment)) = (&key, &value) else {
                return Err(structure_error(
                    source,
                    format!(
                        "rules must map a hostname or /regex/ to an environment name, found {:?}: {:?}",
                        key, value
                    ),
                ));
            };
            validate_non_empty_string(pattern, environment)?;

            if pattern == DEFAULT_ENVIRONMENT_KEY {
                default_environment = Some(environment.clone());
                continue;
            }

            rules.push(ClassificationRule {
                matcher: parse_matcher(pattern)?,
                environment: environment.clone(),
            });
        }

        tracing::debug!("Loaded {} classification rules from {}", rules.len(), source);
        Ok(Self {
            default_environment,
            rules,
        })
    }

    pub fn default_environment(&self) -> &str {
        self.default_environment
            .as_deref()
            .unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// First matching rule wins.
    pub fn environment_for(&self, hostname: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(hostname))
            .map(|rule| rule.environment.as_str())
            .unwrap_or_else(|| self.default_environment())
    }
}

fn structure_error(source: &str, message: String) -> SimpError {
    SimpError::ConfigParseError {
        path: source.to_string(),
        message,
    }
}

/// `/.../` is a regular expression, anything else an exact hostname.
fn parse_matcher(pattern: &str) -> Result<HostMatcher> {
    let starts = pattern.starts_with('/');
    let ends = pattern.len() > 1 && pattern.ends_with('/');

    match (starts, ends) {
        (false, false) => Ok(HostMatcher::Literal(pattern.to_string())),
        (true, true) if pattern.len() > 2 => {
            let body = &pattern[1..pattern.len() - 1];
            Regex::new(body)
                .map(HostMatcher::Pattern)
                .map_err(|e| SimpError::InvalidRegexError {
                    rule: pattern.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Err(SimpError::InvalidRuleError {
            rule: pattern.to_string(),
        }),
    }
}
