use crate::core::evaluation_service::start_of_month;
use crate::domain::model::{CreateUserData, LastEvaluation, UpdateUserData, User, UserStats};
use crate::domain::ports::{ConfigProvider, EvaluationRepository, UserRepository};
use crate::utils::error::{Result, VessError};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService<U: UserRepository, E: EvaluationRepository> {
    users: Arc<U>,
    evaluations: Arc<E>,
    default_country: String,
    default_language: String,
}

impl<U: UserRepository, E: EvaluationRepository> UserService<U, E> {
    pub fn new<C: ConfigProvider + ?Sized>(users: Arc<U>, evaluations: Arc<E>, config: &C) -> Self {
        Self {
            users,
            evaluations,
            default_country: config.default_country().to_string(),
            default_language: config.default_language().to_string(),
        }
    }

    async fn existing(&self, user_id: &str) -> Result<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| VessError::not_found("User", user_id))
    }

    /// Creates the account profile. The password is checked for length only;
    /// credentials are handled by the authentication layer.
    pub async fn register(&self, data: CreateUserData) -> Result<User> {
        data.validate()?;

        if self.users.find_user_by_email(&data.email).await?.is_some() {
            return Err(VessError::conflict("Email já está em uso"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: data.email,
            name: data.name,
            address: data.address,
            country: data.country.unwrap_or_else(|| self.default_country.clone()),
            city_state: data.city_state,
            language: data.language.unwrap_or_else(|| self.default_language.clone()),
            created_at: now,
            updated_at: now,
        };

        let stored = self.users.insert_user(user).await?;
        tracing::info!("Registered user {} <{}>", stored.id, stored.email);
        Ok(stored)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_user_by_email(email).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<User> {
        self.existing(user_id).await
    }

    pub async fn update_profile(&self, user_id: &str, data: UpdateUserData) -> Result<User> {
        data.validate()?;
        let mut user = self.existing(user_id).await?;

        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(address) = data.address {
            user.address = Some(address);
        }
        if let Some(country) = data.country {
            user.country = country;
        }
        if let Some(city_state) = data.city_state {
            user.city_state = Some(city_state);
        }
        if let Some(language) = data.language {
            user.language = language;
        }
        user.updated_at = Utc::now();

        let stored = self.users.update_user(user).await?;
        tracing::info!("Updated profile of user {}", stored.id);
        Ok(stored)
    }

    /// Removes the user together with all of their evaluations.
    pub async fn delete(&self, user_id: &str) -> Result<()> {
        self.existing(user_id).await?;

        let removed = self.evaluations.delete_for_user(user_id).await?;
        if !self.users.delete_user(user_id).await? {
            return Err(VessError::not_found("User", user_id));
        }
        tracing::info!("Deleted user {} and {} evaluation(s)", user_id, removed);
        Ok(())
    }

    pub async fn stats(&self, user_id: &str) -> Result<UserStats> {
        self.stats_at(user_id, Utc::now()).await
    }

    pub async fn stats_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserStats> {
        let user = self.existing(user_id).await?;
        let evaluations = self.evaluations.all_evaluations(user_id).await?;
        let month_start = start_of_month(now);

        let last_evaluation = evaluations
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.created_at.cmp(&b.created_at).then(ia.cmp(ib)))
            .map(|(_, e)| LastEvaluation {
                id: e.id.clone(),
                name: e.name.clone(),
                date: e.date.clone(),
                average_score: e.average_score,
            });

        Ok(UserStats {
            total_evaluations: evaluations.len(),
            total_samples: evaluations.iter().map(|e| e.samples.len()).sum(),
            member_since: user.created_at,
            last_evaluation,
            evaluations_this_month: evaluations
                .iter()
                .filter(|e| e.created_at >= month_start)
                .count(),
        })
    }
}
