pub mod evaluation_service;
pub mod report;
pub mod scoring;
pub mod seed;
pub mod user_service;

pub use crate::domain::model::{EvaluationData, EvaluationWithUser, LayerData, SampleData};
pub use crate::domain::ports::{ConfigProvider, EvaluationRepository, Storage, UserRepository};
pub use crate::utils::error::Result;
pub use evaluation_service::EvaluationService;
pub use user_service::UserService;
