//! Workspace configuration (`.ghlint.yml`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::rule::Finding;
use crate::rule_set::{RuleSet, RuleSetError};
use crate::rules;

/// File names looked up in the workspace root, in order
pub const CONFIG_FILE_NAMES: &[&str] = &[".ghlint.yml", ".ghlint.yaml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Rule identifiers to skip entirely
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Issue ids whose findings are dropped
    #[serde(default)]
    pub disabled_issues: Vec<String>,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `root`, or the defaults
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let path = root.join(name);
            if path.is_file() {
                debug!("Loading config from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for id in &self.disabled_rules {
            if !rules::rule_ids().any(|known| known == id) {
                return Err(ConfigError::UnknownRule { id: id.clone() });
            }
        }
        Ok(())
    }

    /// The built-in rules that are not disabled, in registry order
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        self.validate()?;
        let enabled: Vec<&str> = rules::rule_ids()
            .filter(|id| !self.disabled_rules.iter().any(|disabled| disabled == id))
            .collect();
        Ok(rules::rule_set(&enabled)?)
    }

    pub fn is_issue_enabled(&self, id: &str) -> bool {
        !self.disabled_issues.iter().any(|disabled| disabled == id)
    }

    /// Drop findings of disabled issues
    pub fn retain_enabled(&self, findings: &mut Vec<Finding>) {
        findings.retain(|finding| self.is_issue_enabled(finding.issue().id));
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    #[error("Unknown rule '{id}' in disabled-rules")]
    UnknownRule { id: String },

    #[error(transparent)]
    RuleSet(#[from] RuleSetError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{File, RawFile};
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.is_issue_enabled("MissingJobTimeout"));
        assert_eq!(config.rule_set().unwrap().len(), rules::REGISTRY.len());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
disabled-rules:
  - missing-job-timeout
disabled-issues:
  - MissingJobPermissions
"#;
        let config = Config::from_yaml(yaml).expect("parse failed");
        assert_eq!(config.disabled_rules, vec!["missing-job-timeout"]);
        assert!(!config.is_issue_enabled("MissingJobPermissions"));
        let names: Vec<_> = config
            .rule_set()
            .unwrap()
            .create_rules()
            .iter()
            .map(|rule| rule.name().to_string())
            .collect();
        assert_eq!(names.len(), rules::REGISTRY.len() - 1);
        assert!(!names.iter().any(|name| name == "MissingJobTimeoutRule"));
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_rule() {
        let result = Config::from_yaml("disabled-rules: [no-such-rule]");
        assert_matches!(result, Err(ConfigError::UnknownRule { ref id }) if id == "no-such-rule");

        let config = Config {
            disabled_rules: vec!["no-such-rule".to_string()],
            ..Config::default()
        };
        assert_matches!(config.rule_set(), Err(ConfigError::UnknownRule { .. }));
    }

    #[test]
    fn test_unknown_field() {
        let result = Config::from_yaml("disabled_rules: [schema]");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_retain_enabled() {
        let config = Config::from_yaml("disabled-issues: [MissingJobTimeout]").unwrap();
        let file = File::new(RawFile::new("ci.yml", "on: push\njobs:\n  a:\n    runs-on: x\n"));
        let mut findings = crate::Analyzer::new().analyze(&[file], &[config.rule_set().unwrap()]);
        assert!(findings.iter().any(|f| f.issue().id == "MissingJobTimeout"));

        config.retain_enabled(&mut findings);
        assert!(!findings.is_empty());
        assert!(findings.iter().all(|f| f.issue().id != "MissingJobTimeout"));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(dir.path()).unwrap(), Config::default());

        let mut file = std::fs::File::create(dir.path().join(".ghlint.yaml")).unwrap();
        writeln!(file, "disabled-rules: [schema]").unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.disabled_rules, vec!["schema"]);
    }
}
