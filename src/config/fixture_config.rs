use crate::core::context::Dispatcher;
use crate::utils::error::{RepoError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_one_of, validate_unique_names, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub cleanup: CleanupConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Dispatcher installed on every teardown session.
    pub dispatcher: String,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            dispatcher: Dispatcher::NO_INDEX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub roles: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            roles: vec![
                "reviewer".to_string(),
                "editor".to_string(),
                "finaleditor".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "repo_fixtures=info".to_string(),
        }
    }
}

impl FixtureConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RepoError::Config {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RepoError::Config {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn cleanup_dispatcher(&self) -> &str {
        &self.cleanup.dispatcher
    }

    pub fn is_workflow_role(&self, role: &str) -> bool {
        self.workflow.roles.iter().any(|r| r == role)
    }
}

impl Validate for FixtureConfig {
    fn validate(&self) -> Result<()> {
        validate_one_of(
            "cleanup.dispatcher",
            &self.cleanup.dispatcher,
            &[Dispatcher::DEFAULT, Dispatcher::NO_INDEX],
        )?;
        validate_unique_names("workflow.roles", &self.workflow.roles)?;
        validate_non_empty_string("logging.filter", &self.logging.filter)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = FixtureConfig::default();
        assert_eq!(config.cleanup_dispatcher(), "noindex");
        assert!(config.is_workflow_role("reviewer"));
        assert!(!config.is_workflow_role("approver"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_content = r#"
[workflow]
roles = ["reviewer", "approver"]
"#;

        let config = FixtureConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.cleanup_dispatcher(), "noindex");
        assert!(config.is_workflow_role("approver"));
        assert!(!config.is_workflow_role("editor"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REPO_FIXTURES_TEST_DISPATCHER", "default");

        let toml_content = r#"
[cleanup]
dispatcher = "${REPO_FIXTURES_TEST_DISPATCHER}"
"#;

        let config = FixtureConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.cleanup_dispatcher(), "default");

        std::env::remove_var("REPO_FIXTURES_TEST_DISPATCHER");
    }

    #[test]
    fn test_config_validation() {
        let config = FixtureConfig::from_toml_str("[cleanup]\ndispatcher = \"solr\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = FixtureConfig::from_toml_str("[workflow]\nroles = []\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nfilter = \"repo_fixtures=trace\"\n")
            .unwrap();

        let config = FixtureConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.logging.filter, "repo_fixtures=trace");
    }

    #[test]
    fn test_invalid_toml() {
        let err = FixtureConfig::from_toml_str("[cleanup\n").unwrap_err();
        assert!(matches!(err, RepoError::Config { .. }));
    }
}
