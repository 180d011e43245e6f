use crate::domain::model::{Evaluation, SortOrder, User};
use crate::domain::ports::{EvaluationRepository, UserRepository};
use crate::utils::error::{Result, VessError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub users: Vec<User>,
    pub evaluations: Vec<Evaluation>,
}

/// Process-local store. Each evaluation is written with its samples and
/// layers under a single write lock, so readers never see a partial record.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = self.snapshot().await;
        let json = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path.as_ref(), json).await?;

        tracing::debug!(
            "Saved snapshot with {} users and {} evaluations to {}",
            snapshot.users.len(),
            snapshot.evaluations.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            "Loaded snapshot with {} users and {} evaluations",
            snapshot.users.len(),
            snapshot.evaluations.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }
}

fn sort_by_creation(evaluations: &mut [(usize, Evaluation)], order: SortOrder) {
    evaluations.sort_by(|(ia, a), (ib, b)| {
        let asc = a.created_at.cmp(&b.created_at).then(ia.cmp(ib));
        match order {
            SortOrder::Asc => asc,
            SortOrder::Desc => asc.reverse(),
        }
    });
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(VessError::conflict("Email já está em uso"));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: User) -> Result<User> {
        let mut state = self.state.write().await;
        let existing = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| VessError::not_found("User", &user.id))?;
        *existing = user.clone();
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        Ok(state.users.len() != before)
    }
}

#[async_trait]
impl EvaluationRepository for InMemoryStore {
    async fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation> {
        let mut state = self.state.write().await;
        if state.evaluations.iter().any(|e| e.id == evaluation.id) {
            return Err(VessError::conflict("Dados já existem no sistema"));
        }
        state.evaluations.push(evaluation.clone());
        Ok(evaluation)
    }

    async fn find_evaluation(&self, user_id: &str, id: &str) -> Result<Option<Evaluation>> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    async fn list_evaluations(
        &self,
        user_id: &str,
        skip: usize,
        take: usize,
        order: SortOrder,
    ) -> Result<Vec<Evaluation>> {
        let state = self.state.read().await;
        let mut owned: Vec<(usize, Evaluation)> = state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .enumerate()
            .collect();
        sort_by_creation(&mut owned, order);

        Ok(owned.into_iter().skip(skip).take(take).map(|(_, e)| e).collect())
    }

    async fn count_evaluations(&self, user_id: &str) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state.evaluations.iter().filter(|e| e.user_id == user_id).count())
    }

    async fn all_evaluations(&self, user_id: &str) -> Result<Vec<Evaluation>> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation> {
        let mut state = self.state.write().await;
        let existing = state
            .evaluations
            .iter_mut()
            .find(|e| e.id == evaluation.id && e.user_id == evaluation.user_id)
            .ok_or_else(|| VessError::not_found("Evaluation", &evaluation.id))?;
        *existing = evaluation.clone();
        Ok(evaluation)
    }

    async fn delete_evaluation(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.evaluations.len();
        state
            .evaluations
            .retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(state.evaluations.len() != before)
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize> {
        let mut state = self.state.write().await;
        let before = state.evaluations.len();
        state.evaluations.retain(|e| e.user_id != user_id);
        Ok(before - state.evaluations.len())
    }
}
