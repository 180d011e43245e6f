use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative bucket for a Qe-VESS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    Excellent,
    Reasonable,
    Poor,
}

impl ScoreCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Excellent => "excellent",
            ScoreCategory::Reasonable => "reasonable",
            ScoreCategory::Poor => "poor",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---- inputs ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    pub length: f64,
    pub score: f64,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleData {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub other_info: Option<String>,
    #[serde(default)]
    pub management_decision: Option<String>,
    pub layers: Vec<LayerData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationData {
    pub name: String,
    pub date: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub management_description: Option<String>,
    pub samples: Vec<SampleData>,
}

/// Only these fields of a stored evaluation may change; scores never do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub management_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserData {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city_state: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city_state: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

// ---- stored records ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub country: String,
    pub city_state: Option<String>,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub length: f64,
    pub score: f64,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub other_info: Option<String>,
    pub management_decision: Option<String>,
    pub sample_score: f64,
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub management_description: Option<String>,
    pub average_score: f64,
    pub samples: Vec<Sample>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// An evaluation as the API returns it: samples, layers and the owner embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationWithUser {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub user: UserSummary,
}

// ---- listings & statistics ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: usize,
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationPage {
    pub evaluations: Vec<EvaluationWithUser>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub reasonable: usize,
    pub poor: usize,
}

impl ScoreDistribution {
    pub fn record(&mut self, category: ScoreCategory) {
        match category {
            ScoreCategory::Excellent => self.excellent += 1,
            ScoreCategory::Reasonable => self.reasonable += 1,
            ScoreCategory::Poor => self.poor += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub last_evaluation: Option<String>,
    pub evaluations_this_month: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationStats {
    pub total_evaluations: usize,
    pub total_samples: usize,
    pub average_score: f64,
    pub score_distribution: ScoreDistribution,
    pub recent_activity: RecentActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastEvaluation {
    pub id: String,
    pub name: String,
    pub date: String,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_evaluations: usize,
    pub total_samples: usize,
    pub member_since: DateTime<Utc>,
    pub last_evaluation: Option<LastEvaluation>,
    pub evaluations_this_month: usize,
}
