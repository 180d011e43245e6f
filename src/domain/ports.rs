use crate::domain::model::{Evaluation, SortOrder, User};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<User>;
    async fn find_user(&self, id: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_user(&self, user: User) -> Result<User>;
    /// Removes the user row only. Evaluations go through
    /// [`EvaluationRepository::delete_for_user`].
    async fn delete_user(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Stores the evaluation together with its samples and layers.
    async fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation>;
    async fn find_evaluation(&self, user_id: &str, id: &str) -> Result<Option<Evaluation>>;
    async fn list_evaluations(
        &self,
        user_id: &str,
        skip: usize,
        take: usize,
        order: SortOrder,
    ) -> Result<Vec<Evaluation>>;
    async fn count_evaluations(&self, user_id: &str) -> Result<usize>;
    async fn all_evaluations(&self, user_id: &str) -> Result<Vec<Evaluation>>;
    async fn update_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation>;
    async fn delete_evaluation(&self, user_id: &str, id: &str) -> Result<bool>;
    /// Removes every evaluation owned by `user_id`, returning how many went.
    async fn delete_for_user(&self, user_id: &str) -> Result<usize>;
}

/// Where rendered reports and input files live.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Supplies everything the service layer needs from configuration.
pub trait ConfigProvider: Send + Sync {
    fn default_page_size(&self) -> u32;
    fn max_page_size(&self) -> u32;
    fn default_country(&self) -> &str;
    fn default_language(&self) -> &str;
}
