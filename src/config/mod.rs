pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::report::ReportFormat;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "qe-vess")]
#[command(about = "Score Qe-VESS soil structure evaluations and summarize them")]
pub struct CliConfig {
    /// Evaluation JSON files to import
    #[arg(long, short, value_delimiter = ',')]
    pub input: Vec<String>,

    /// Path to TOML configuration file
    #[arg(long, short)]
    pub config: Option<String>,

    /// Overrides report.output_path from the config
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, default_value = "text", help = "Report format: text, json or csv")]
    pub format: ReportFormat,

    #[arg(long, default_value = "Avaliador")]
    pub user_name: String,

    #[arg(long, default_value = "avaliador@vess.local")]
    pub user_email: String,

    #[arg(long, help = "Load the demo user and evaluation")]
    pub seed_demo: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        for file in &self.input {
            validation::validate_path("input", file)?;
        }
        if let Some(path) = &self.output_path {
            validation::validate_path("output_path", path)?;
        }
        validation::validate_non_empty_string("user_name", &self.user_name)?;
        if !validation::is_valid_email(&self.user_email) {
            return Err(crate::utils::error::VessError::InvalidConfigValueError {
                field: "user_email".to_string(),
                value: self.user_email.clone(),
                reason: "Not a valid email address".to_string(),
            });
        }
        if self.input.is_empty() && !self.seed_demo {
            return Err(crate::utils::error::VessError::MissingConfigError {
                field: "input (or --seed-demo)".to_string(),
            });
        }
        Ok(())
    }
}
