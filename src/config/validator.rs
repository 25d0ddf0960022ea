//! Configuration validation.

use super::schema::EngineConfig;
use crate::error::{FleetcheckError, Result};
use crate::plugin::MAX_PRIORITY;

/// Collect validation problems.
pub fn validate_config(config: &EngineConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.plugin_roots.is_empty() {
        errors.push("at least one plugin root is required".to_string());
    }
    if config.jobs == Some(0) {
        errors.push("jobs must be at least 1".to_string());
    }
    if config.timeout_secs == Some(0) {
        errors.push("timeout_secs must be at least 1".to_string());
    }
    if config.priority > MAX_PRIORITY {
        errors.push(format!("priority must be at most {}", MAX_PRIORITY));
    }
    if config.results_file.is_empty() || config.results_file.contains(&['/', '\\'][..]) {
        errors.push(format!(
            "results_file must be a plain file name, got {:?}",
            config.results_file
        ));
    }
    if config.fact_category.is_empty() {
        errors.push("fact_category must not be empty".to_string());
    }
    for rule in &config.alternatives {
        if rule.when_okay.is_empty() || rule.skip.is_empty() {
            errors.push("alternatives need both 'when_okay' and 'skip'".to_string());
        }
    }

    errors
}

/// Validate and return an error listing every problem.
pub fn validate(config: &EngineConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FleetcheckError::ConfigValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::AlternativeRule;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let config = EngineConfig {
            jobs: Some(0),
            priority: 5000,
            results_file: "../x.json".into(),
            alternatives: vec![AlternativeRule::new("", "b.sh")],
            ..Default::default()
        };
        assert_eq!(validate_config(&config).len(), 4);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("jobs"));
    }
}
