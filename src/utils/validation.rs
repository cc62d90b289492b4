use crate::utils::error::{RepoError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RepoError::Config {
            field: field_name.to_string(),
            message: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(RepoError::Config {
            field: field_name.to_string(),
            message: format!(
                "Unsupported value '{}'. Allowed values: {}",
                value,
                allowed.join(", ")
            ),
        });
    }
    Ok(())
}

pub fn validate_unique_names(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(RepoError::Config {
            field: field_name.to_string(),
            message: "At least one value is required".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for value in values {
        validate_non_empty_string(field_name, value)?;
        if !seen.insert(value.as_str()) {
            return Err(RepoError::Config {
                field: field_name.to_string(),
                message: format!("Duplicate value '{}'", value),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("name", "reviewers").is_ok());
        assert!(validate_non_empty_string("name", "   ").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("dispatcher", "noindex", &["default", "noindex"]).is_ok());
        assert!(validate_one_of("dispatcher", "solr", &["default", "noindex"]).is_err());
    }

    #[test]
    fn test_validate_unique_names() {
        let roles = vec!["reviewer".to_string(), "editor".to_string()];
        assert!(validate_unique_names("roles", &roles).is_ok());

        let dup = vec!["reviewer".to_string(), "reviewer".to_string()];
        assert!(validate_unique_names("roles", &dup).is_err());
        assert!(validate_unique_names("roles", &[]).is_err());
    }
}
