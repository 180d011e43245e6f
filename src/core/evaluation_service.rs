use crate::core::scoring::{
    categorize_score, compute_evaluation_score, compute_sample_score, ordered_sum, round1,
};
use crate::domain::model::{
    Evaluation, EvaluationData, EvaluationPage, EvaluationStats, EvaluationUpdate,
    EvaluationWithUser, Layer, Pagination, PaginationQuery, RecentActivity, Sample,
    SampleData, ScoreDistribution, UserSummary,
};
use crate::domain::ports::{ConfigProvider, EvaluationRepository, UserRepository};
use crate::utils::error::{Result, VessError};
use crate::utils::validation::Validate;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PageSettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PageSettings {
    pub(crate) fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            default_limit: config.default_page_size(),
            max_limit: config.max_page_size(),
        }
    }

    /// `(page, limit)` after clamping; a zero or absent limit means the default.
    fn resolve(&self, query: &PaginationQuery) -> (u32, u32) {
        let page = query.page.unwrap_or(1).max(1);
        let limit = match query.limit {
            None | Some(0) => self.default_limit,
            Some(limit) => limit,
        };
        (page, limit.min(self.max_limit).max(1))
    }
}

pub(crate) fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn build_sample(data: SampleData) -> Sample {
    let sample_score = compute_sample_score(&data.layers);

    let mut layers: Vec<Layer> = data
        .layers
        .into_iter()
        .map(|l| Layer {
            id: Uuid::new_v4().to_string(),
            length: l.length,
            score: l.score,
            order: l.order,
        })
        .collect();
    layers.sort_by_key(|l| l.order);

    Sample {
        id: Uuid::new_v4().to_string(),
        name: data.name,
        location: data.location,
        other_info: data.other_info,
        management_decision: data.management_decision,
        sample_score,
        layers,
    }
}

pub struct EvaluationService<E: EvaluationRepository, U: UserRepository> {
    evaluations: Arc<E>,
    users: Arc<U>,
    pages: PageSettings,
}

impl<E: EvaluationRepository, U: UserRepository> EvaluationService<E, U> {
    pub fn new<C: ConfigProvider + ?Sized>(evaluations: Arc<E>, users: Arc<U>, config: &C) -> Self {
        Self {
            evaluations,
            users,
            pages: PageSettings::from_config(config),
        }
    }

    async fn owner(&self, user_id: &str) -> Result<UserSummary> {
        self.users
            .find_user(user_id)
            .await?
            .map(|u| UserSummary::from(&u))
            .ok_or_else(|| VessError::not_found("User", user_id))
    }

    async fn owned(&self, user_id: &str, id: &str) -> Result<Evaluation> {
        self.evaluations
            .find_evaluation(user_id, id)
            .await?
            .ok_or_else(|| VessError::not_found("Evaluation", id))
    }

    /// Scores every sample from its layers, averages them into the
    /// evaluation score and stores the whole tree in one write.
    pub async fn create(&self, user_id: &str, data: EvaluationData) -> Result<EvaluationWithUser> {
        data.validate()?;
        let user = self.owner(user_id).await?;

        let samples: Vec<Sample> = data.samples.into_iter().map(build_sample).collect();
        let sample_scores: Vec<f64> = samples.iter().map(|s| s.sample_score).collect();
        let average_score = compute_evaluation_score(&sample_scores);

        let now = Utc::now();
        let evaluation = Evaluation {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: data.name,
            date: data.date,
            start_time: data.start_time,
            end_time: data.end_time,
            management_description: data.management_description,
            average_score,
            samples,
            created_at: now,
            updated_at: now,
        };

        let stored = self.evaluations.insert_evaluation(evaluation).await?;
        tracing::info!(
            "Created evaluation {} with {} samples (score {})",
            stored.id,
            stored.samples.len(),
            stored.average_score
        );
        tracing::debug!("Sample scores: {:?}", sample_scores);

        Ok(EvaluationWithUser {
            evaluation: stored,
            user,
        })
    }

    pub async fn list(&self, user_id: &str, query: &PaginationQuery) -> Result<EvaluationPage> {
        let (page, limit) = self.pages.resolve(query);
        let skip = (page as usize - 1) * limit as usize;
        let order = query.sort_order.unwrap_or_default();

        let user = self.owner(user_id).await?;
        let items = self
            .evaluations
            .list_evaluations(user_id, skip, limit as usize, order)
            .await?;
        let total = self.evaluations.count_evaluations(user_id).await?;
        let total_pages = total.div_ceil(limit as usize) as u32;

        tracing::debug!(
            "Listing evaluations for {}: page {}/{} ({} items)",
            user_id,
            page,
            total_pages,
            items.len()
        );

        Ok(EvaluationPage {
            evaluations: items
                .into_iter()
                .map(|evaluation| EvaluationWithUser {
                    evaluation,
                    user: user.clone(),
                })
                .collect(),
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_items: total,
                items_per_page: limit,
                has_next_page: page < total_pages,
                has_previous_page: page > 1,
            },
        })
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<EvaluationWithUser> {
        let evaluation = self.owned(user_id, id).await?;
        let user = self.owner(user_id).await?;
        Ok(EvaluationWithUser { evaluation, user })
    }

    /// Samples, layers and scores are left untouched.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        update: EvaluationUpdate,
    ) -> Result<EvaluationWithUser> {
        update.validate()?;
        let mut evaluation = self.owned(user_id, id).await?;

        if let Some(name) = update.name {
            evaluation.name = name;
        }
        if let Some(end_time) = update.end_time {
            evaluation.end_time = Some(end_time);
        }
        if let Some(description) = update.management_description {
            evaluation.management_description = Some(description);
        }
        evaluation.updated_at = Utc::now();

        let stored = self.evaluations.update_evaluation(evaluation).await?;
        tracing::info!("Updated evaluation {}", stored.id);

        let user = self.owner(user_id).await?;
        Ok(EvaluationWithUser {
            evaluation: stored,
            user,
        })
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        if !self.evaluations.delete_evaluation(user_id, id).await? {
            return Err(VessError::not_found("Evaluation", id));
        }
        tracing::info!("Deleted evaluation {}", id);
        Ok(())
    }

    pub async fn stats(&self, user_id: &str) -> Result<EvaluationStats> {
        self.stats_at(user_id, Utc::now()).await
    }

    pub async fn stats_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<EvaluationStats> {
        let evaluations = self.evaluations.all_evaluations(user_id).await?;

        let total_samples = evaluations.iter().map(Evaluation::sample_count).sum();
        let stored_scores: Vec<f64> = evaluations.iter().map(|e| e.average_score).collect();
        let average_score = if stored_scores.is_empty() {
            0.0
        } else {
            round1(ordered_sum(&stored_scores) / stored_scores.len() as f64)
        };

        let mut score_distribution = ScoreDistribution::default();
        for score in &stored_scores {
            score_distribution.record(categorize_score(*score));
        }

        let month_start = start_of_month(now);
        let last_evaluation = evaluations
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.created_at.cmp(&b.created_at).then(ia.cmp(ib)))
            .map(|(_, e)| e.date.clone());

        Ok(EvaluationStats {
            total_evaluations: evaluations.len(),
            total_samples,
            average_score,
            score_distribution,
            recent_activity: RecentActivity {
                last_evaluation,
                evaluations_this_month: evaluations
                    .iter()
                    .filter(|e| e.created_at >= month_start)
                    .count(),
            },
        })
    }
}
