use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level validation report. Every violation is collected, not only the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Merge a nested report, prefixing each field with `prefix`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for err in other.errors {
            self.errors.push(FieldError {
                field: format!("{}.{}", prefix, err.field),
                message: err.message,
            });
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(VessError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum VessError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Configuration,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl VessError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        VessError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        VessError::Conflict {
            message: message.into(),
        }
    }

    /// HTTP status the API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            VessError::NotFound { .. } => 404,
            VessError::Conflict { .. } => 409,
            VessError::Validation(_) => 400,
            VessError::SerializationError(_) => 400,
            _ => 500,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            VessError::NotFound { .. }
            | VessError::Conflict { .. }
            | VessError::Validation(_) => ErrorCategory::Client,
            VessError::TomlError(_)
            | VessError::ConfigError { .. }
            | VessError::MissingConfigError { .. }
            | VessError::InvalidConfigValueError { .. }
            | VessError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            VessError::IoError(_) | VessError::CsvError(_) => ErrorCategory::Storage,
            VessError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            VessError::NotFound { entity, .. } => {
                format!("Check that the {} exists and belongs to the current user", entity)
            }
            VessError::Conflict { .. } => "Use a different value for the conflicting field".to_string(),
            VessError::Validation(errors) => {
                format!("Fix the {} invalid field(s) and submit again", errors.len())
            }
            VessError::IoError(_) => "Check file paths and permissions".to_string(),
            VessError::SerializationError(_) => {
                "Make sure the input is valid JSON in the expected shape".to_string()
            }
            VessError::CsvError(_) => "Check that the output directory is writable".to_string(),
            VessError::TomlError(_) => "Make sure the configuration file is valid TOML".to_string(),
            VessError::MissingConfigError { field } => {
                format!("Set `{}` in the config file or environment", field)
            }
            VessError::InvalidConfigValueError { field, .. }
            | VessError::ConfigValidationError { field, .. } => {
                format!("Correct the value of `{}`", field)
            }
            VessError::ConfigError { .. } => "Review the configuration".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            VessError::NotFound { entity, .. } => format!("{} não encontrado(a)", entity),
            VessError::Conflict { message } => message.clone(),
            VessError::Validation(errors) => format!("Dados inválidos: {}", errors),
            VessError::IoError(e) => format!("Erro de arquivo: {}", e),
            VessError::SerializationError(_) => "Dados inválidos fornecidos".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VessError>;
