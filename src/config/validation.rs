//! Configuration validation system.

use super::types::{TrackComponents, TrackingConfig};
use crate::lifecycle::Operation;
use std::collections::HashSet;

/// A single validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// Error message.
    pub message: String,
    /// Severity level.
    pub severity: ValidationSeverity,
}

impl ValidationError {
    /// Create a new error.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    /// Create a new warning.
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }
}

/// Severity of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Error - configuration is invalid.
    Error,
    /// Warning - configuration may have issues.
    Warning,
}

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if the validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.severity == ValidationSeverity::Error)
    }

    /// Get all validation issues.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get only errors (not warnings).
    #[must_use]
    pub fn errors_only(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Error)
            .collect()
    }

    /// Get only warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Warning)
            .collect()
    }

    /// Merge another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

/// Trait for configuration validators.
pub trait Validator: std::fmt::Debug + Send + Sync {
    /// Validate a configuration and return any errors.
    fn validate(&self, config: &TrackingConfig) -> ValidationResult;
}

/// Built-in validator for tracked operations, component filter, timeout and
/// naming prefixes.
#[derive(Debug, Default)]
pub struct OperationValidator;

impl OperationValidator {
    /// Create a new operation validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for OperationValidator {
    fn validate(&self, config: &TrackingConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        let mut seen = HashSet::new();
        for name in &config.tracked_operations {
            if Operation::parse(name).is_none() {
                result.add_error(ValidationError::warning(
                    "tracked_operations",
                    format!("Unknown operation '{}' will be ignored", name),
                ));
            } else if !seen.insert(name.as_str()) {
                result.add_error(ValidationError::warning(
                    "tracked_operations",
                    format!("Duplicate operation: {}", name),
                ));
            }
        }

        if let TrackComponents::Names(names) = &config.track_components {
            if names.is_empty() {
                result.add_error(ValidationError::warning(
                    "track_components",
                    "Empty component list tracks no component besides the root",
                ));
            }
        }

        if config.timeout.is_zero() {
            result.add_error(ValidationError::warning(
                "timeout",
                "Zero timeout closes the root span after every completed operation",
            ));
        }

        if config.span_name_prefix.trim().is_empty() {
            result.add_error(ValidationError::error(
                "span_name_prefix",
                "Span name prefix cannot be empty",
            ));
        }

        if config.op_prefix.trim().is_empty() {
            result.add_error(ValidationError::error(
                "op_prefix",
                "Operation prefix cannot be empty",
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_valid() {
        let config = TrackingConfig::default();
        let result = OperationValidator::new().validate(&config);
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_unknown_operation_is_warning() {
        let config = TrackingConfig::default()
            .with_operation("mount")
            .with_operation("render");

        let result = OperationValidator::new().validate(&config);

        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].message.contains("render"));
    }

    #[test]
    fn test_duplicate_operation_is_warning() {
        let config = TrackingConfig::default()
            .with_operation("create")
            .with_operation("create");

        let result = OperationValidator::new().validate(&config);

        assert!(result.is_valid());
        assert!(result.warnings()[0].message.contains("Duplicate"));
    }

    #[test]
    fn test_zero_timeout_and_empty_list() {
        let config = TrackingConfig::default()
            .with_timeout(Duration::ZERO)
            .with_track_components(TrackComponents::Names(Vec::new()));

        let result = OperationValidator::new().validate(&config);

        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 2);
    }

    #[test]
    fn test_empty_prefix_is_error() {
        let mut config = TrackingConfig::default();
        config.span_name_prefix = String::new();

        let result = OperationValidator::new().validate(&config);

        assert!(!result.is_valid());
        assert_eq!(result.errors_only()[0].field, "span_name_prefix");
    }

    #[test]
    fn test_validation_result_merge() {
        let mut result1 = ValidationResult::new();
        result1.add_error(ValidationError::error("field1", "error1"));

        let mut result2 = ValidationResult::new();
        result2.add_error(ValidationError::warning("field2", "warning1"));

        result1.merge(result2);
        assert_eq!(result1.errors().len(), 2);
        assert_eq!(result1.warnings().len(), 1);
    }
}
