pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::InMemoryStore;
pub use config::{cli::LocalStorage, toml_config::AppConfig};
pub use core::report::{render_report, ReportFormat, ReportWriter};
pub use core::scoring::{
    categorize_score, compute_evaluation_score, compute_sample_score, is_valid_vess_score,
    management_recommendation,
};
pub use core::{EvaluationService, UserService};
pub use domain::model::ScoreCategory;
pub use utils::error::{Result, VessError};
