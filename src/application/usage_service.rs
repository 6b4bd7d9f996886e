use super::ServiceError;
use crate::domain::Usage;
use crate::infrastructure::UsageRepository;
use crate::tools::ToolId;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct UsageService<G>
where
    G: UsageRepository,
{
    usage_repo: Arc<G>,
}

impl<G> UsageService<G>
where
    G: UsageRepository,
{
    pub fn new(usage_repo: Arc<G>) -> Self {
        Self { usage_repo }
    }

    fn check_tool_id(tool_id: &str) -> Result<(), ServiceError> {
        if tool_id.trim().is_empty() {
            return Err(ServiceError::Validation("tool id must not be empty".to_string()));
        }
        if ToolId::from_str(tool_id).is_err() {
            return Err(ServiceError::Validation(format!("unknown tool id '{}'", tool_id)));
        }
        Ok(())
    }

    /// Adds one use. The counter row is created on first use.
    pub async fn increment_usage(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, ServiceError> {
        Self::check_tool_id(tool_id)?;
        let usage = self.usage_repo.increment(user_id, tool_id).await?;
        debug!(user_id = %user_id, tool_id = %tool_id, count = usage.count, "Recorded tool use");
        Ok(usage)
    }

    /// Current counter, creating a zero row when the user has never used the tool.
    pub async fn get_usage(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, ServiceError> {
        Self::check_tool_id(tool_id)?;
        Ok(self.usage_repo.get_or_create(user_id, tool_id).await?)
    }

    pub async fn list_usage(&self, user_id: Uuid) -> Result<Vec<Usage>, ServiceError> {
        Ok(self.usage_repo.list_by_user(user_id).await?)
    }

    pub async fn reset_usage(&self, user_id: Uuid, tool_id: &str) -> Result<(), ServiceError> {
        Self::check_tool_id(tool_id)?;
        self.usage_repo.reset(user_id, tool_id).await?;
        info!(user_id = %user_id, tool_id = %tool_id, "Reset usage counter");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::RepositoryError;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::{always, eq};

    mock! {
        UsageRepo {}

        #[async_trait]
        impl UsageRepository for UsageRepo {
            async fn increment(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, RepositoryError>;
            async fn get_or_create(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, RepositoryError>;
            async fn find(&self, user_id: Uuid, tool_id: &str) -> Result<Option<Usage>, RepositoryError>;
            async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Usage>, RepositoryError>;
            async fn reset(&self, user_id: Uuid, tool_id: &str) -> Result<(), RepositoryError>;
        }
    }

    #[test]
    fn empty_tool_id_never_reaches_the_repository() {
        let mut repo = MockUsageRepo::new();
        repo.expect_increment().never();
        repo.expect_reset().never();
        let service = UsageService::new(Arc::new(repo));
        let user_id = Uuid::new_v4();

        let increment = tokio_test::block_on(service.increment_usage(user_id, "  "));
        assert!(matches!(increment, Err(ServiceError::Validation(_))));
        let reset = tokio_test::block_on(service.reset_usage(user_id, ""));
        assert!(matches!(reset, Err(ServiceError::Validation(_))));
        let unknown = tokio_test::block_on(service.reset_usage(user_id, "chart-renderer"));
        assert!(matches!(unknown, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn reset_is_forwarded_once() {
        let user_id = Uuid::new_v4();
        let mut repo = MockUsageRepo::new();
        repo.expect_reset()
            .with(eq(user_id), always())
            .times(1)
            .returning(|_, _| Ok(()));
        let service = UsageService::new(Arc::new(repo));

        service.reset_usage(user_id, "base64").await.unwrap();
    }

    #[tokio::test]
    async fn storage_failures_surface_as_repository_errors() {
        let mut repo = MockUsageRepo::new();
        repo.expect_increment()
            .returning(|_, _| Err(RepositoryError::NotFound("User".to_string())));
        let service = UsageService::new(Arc::new(repo));

        let err = service
            .increment_usage(Uuid::new_v4(), "base64")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
