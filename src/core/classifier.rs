//! Puppet external node classifier backed by a YAML rule file.

use crate::config::classifier_config::{ClassifierConfig, DEFAULT_ENVIRONMENT};
use crate::utils::error::{Result, SimpError};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The bare environment name.
    #[default]
    Name,
    /// A node document for Puppet's `exec` node terminus.
    Enc,
}

#[derive(Serialize)]
struct EncDocument<'a> {
    environment: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct YamlNodeClassifier {
    format: OutputFormat,
}

impl YamlNodeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Classifies the first of `hostnames` and returns the text to print.
    /// Extra hostnames are ignored.
    pub fn run<S: AsRef<str>>(&self, hostnames: &[S], config_path: impl AsRef<Path>) -> Result<String> {
        let hostname = hostnames
            .first()
            .map(|h| h.as_ref())
            .filter(|h| !h.is_empty())
            .ok_or(SimpError::MissingHostnameError)?;

        if hostnames.len() > 1 {
            tracing::debug!("Ignoring {} extra arguments", hostnames.len() - 1);
        }

        let environment = self.classify(hostname, config_path)?;
        self.render(&environment)
    }

    pub fn classify(&self, hostname: &str, config_path: impl AsRef<Path>) -> Result<String> {
        let environment = match ClassifierConfig::load(config_path)? {
            Some(config) => config.environment_for(hostname).to_string(),
            None => DEFAULT_ENVIRONMENT.to_string(),
        };

        tracing::debug!("{} -> {}", hostname, environment);
        Ok(environment)
    }

    fn render(&self, environment: &str) -> Result<String> {
        match self.format {
            OutputFormat::Name => Ok(format!("{}\n", environment)),
            OutputFormat::Enc => {
                let document = serde_yaml::to_string(&EncDocument { environment })?;
                Ok(format!("---\n{}", document))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_regex_rule_match() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(
            &temp_dir,
            "---\n/worker\\d+/: production\nworker1.test.local: latest\n",
        );

        let output = YamlNodeClassifier::new()
            .run(&["worker10.test.local"], &config)
            .unwrap();
        assert_eq!(output, "production\n");
    }

    #[test]
    fn test_hostname_is_compared_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(
            &temp_dir,
            "worker1.test.local: latest_and_greatest\ndefault_environment: fallback\n",
        );

        let output = YamlNodeClassifier::new()
            .run(&[" worker1.test.local"], &config)
            .unwrap();
        assert_eq!(output, "fallback\n");
    }

    #[test]
    fn test_missing_config_is_production() {
        let temp_dir = TempDir::new().unwrap();

        let output = YamlNodeClassifier::new()
            .run(&["anything"], temp_dir.path().join("does-not-exist.yaml"))
            .unwrap();
        assert_eq!(output, "production\n");
    }

    #[test]
    fn test_missing_hostname() {
        let temp_dir = TempDir::new().unwrap();
        let no_hosts: [&str; 0] = [];

        let err = YamlNodeClassifier::new()
            .run(&no_hosts, temp_dir.path().join("rules.yaml"))
            .unwrap_err();
        assert!(matches!(err, SimpError::MissingHostnameError));
        assert!(err
            .to_string()
            .contains("You must pass the FQDN of the host as the first argument"));
    }

    #[test]
    fn test_enc_output() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(&temp_dir, "worker1.test.local: latest_and_greatest\n");

        let output = YamlNodeClassifier::with_format(OutputFormat::Enc)
            .run(&["worker1.test.local", "extra.test.local"], &config)
            .unwrap();
        assert_eq!(output, "---\nenvironment: latest_and_greatest\n");
    }
}
