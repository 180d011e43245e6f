use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, VessError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl std::str::FromStr for Environment {
    type Err = VessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(VessError::InvalidConfigValueError {
                field: "app.environment".to_string(),
                value: other.to_string(),
                reason: "Expected development, production or test".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// Store snapshot kept between runs; no persistence when absent.
    #[serde(default)]
    pub snapshot_file: Option<String>,
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_limit() -> u32 {
    10
}

fn default_max_limit() -> u32 {
    100
}

fn default_country() -> String {
    "Brasil".to_string()
}

fn default_language() -> String {
    "Português (Brasil)".to_string()
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            language: default_language(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            snapshot_file: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, field: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| VessError::InvalidConfigValueError {
                field: field.to_string(),
                value: raw.clone(),
                reason: format!("Could not parse {}", name),
            }),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(VessError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        Ok(toml::from_str(&processed_content)?)
    }

    /// Replace `${VAR}` placeholders (e.g. `${CORS_ORIGIN}`) with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| VessError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Defaults overridden by `VESS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(environment) = parse_env::<Environment>("VESS_ENV", "app.environment")? {
            self.app.environment = environment;
        }
        if let Some(port) = parse_env::<u16>("VESS_PORT", "app.port")? {
            self.app.port = port;
        }
        if let Ok(origin) = env::var("VESS_CORS_ORIGIN") {
            self.app.cors_origin = origin;
        }
        if let Some(limit) = parse_env::<u32>("VESS_DEFAULT_PAGE_SIZE", "pagination.default_limit")? {
            self.pagination.default_limit = limit;
        }
        if let Some(max) = parse_env::<u32>("VESS_MAX_PAGE_SIZE", "pagination.max_limit")? {
            self.pagination.max_limit = max;
        }
        if let Ok(country) = env::var("VESS_DEFAULT_COUNTRY") {
            self.defaults.country = country;
        }
        if let Ok(language) = env::var("VESS_DEFAULT_LANGUAGE") {
            self.defaults.language = language;
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }
}

impl ConfigProvider for AppConfig {
    fn default_page_size(&self) -> u32 {
        self.pagination.default_limit
    }

    fn max_page_size(&self) -> u32 {
        self.pagination.max_limit
    }

    fn default_country(&self) -> &str {
        &self.defaults.country
    }

    fn default_language(&self) -> &str {
        &self.defaults.language
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("app.cors_origin", &self.app.cors_origin)?;
        validation::validate_range("app.port", self.app.port, 1, u16::MAX)?;
        validation::validate_range("pagination.max_limit", self.pagination.max_limit, 1, 1000)?;
        validation::validate_range(
            "pagination.default_limit",
            self.pagination.default_limit,
            1,
            self.pagination.max_limit,
        )?;
        validation::validate_non_empty_string("defaults.country", &self.defaults.country)?;
        validation::validate_non_empty_string("defaults.language", &self.defaults.language)?;
        validation::validate_path("report.output_path", &self.report.output_path)?;
        if let Some(snapshot) = &self.report.snapshot_file {
            validation::validate_path("report.snapshot_file", snapshot)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.app.port, 5000);
        assert_eq!(config.default_page_size(), 10);
        assert_eq!(config.max_page_size(), 100);
        assert_eq!(config.default_country(), "Brasil");
        assert_eq!(config.default_language(), "Português (Brasil)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_content = r#"
[app]
environment = "production"
port = 8080
cors_origin = "https://vess.example.com"

[pagination]
default_limit = 20
max_limit = 50

[defaults]
country = "Portugal"
language = "Português (Portugal)"

[report]
output_path = "./reports"
snapshot_file = "./data/store.json"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.is_production());
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.default_page_size(), 20);
        assert_eq!(config.default_country(), "Portugal");
        assert_eq!(config.report.snapshot_file.as_deref(), Some("./data/store.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("QE_VESS_TEST_ORIGIN", "https://test.vess.com");

        let toml_content = r#"
[app]
cors_origin = "${QE_VESS_TEST_ORIGIN}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.app.cors_origin, "https://test.vess.com");

        std::env::remove_var("QE_VESS_TEST_ORIGIN");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[app]
cors_origin = "invalid-url"
"#;
        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[pagination]
default_limit = 200
max_limit = 100
"#;
        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_environment_rejected() {
        let err = AppConfig::from_toml_str("[app]\nenvironment = \"staging\"\n").unwrap_err();
        assert!(matches!(err, VessError::TomlError(_)));
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.recovery_suggestion(), "Make sure the configuration file is valid TOML");
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[app]\nport = 6000\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.app.port, 6000);
    }
}
