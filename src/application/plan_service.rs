use super::{optional, ServiceError};
use crate::domain::{Plan, PlanFeatures, UNLIMITED};
use crate::infrastructure::PlanRepository;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Editable fields of a plan, used for both create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDraft {
    pub name: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default = "unlimited")]
    pub max_tools: i64,
    #[serde(default = "unlimited")]
    pub max_usage: i64,
    #[serde(default)]
    pub features: PlanFeatures,
    #[serde(default)]
    pub priority: i32,
}

fn unlimited() -> i64 {
    UNLIMITED
}

impl PlanDraft {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("plan name must not be empty".to_string()));
        }
        if self.price_cents < 0 {
            return Err(ServiceError::Validation("price must not be negative".to_string()));
        }
        if self.max_tools < UNLIMITED || self.max_usage < UNLIMITED {
            return Err(ServiceError::Validation(
                "limits must be -1 (unlimited) or a non-negative count".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct PlanService<P>
where
    P: PlanRepository,
{
    plan_repo: Arc<P>,
}

impl<P> PlanService<P>
where
    P: PlanRepository,
{
    pub fn new(plan_repo: Arc<P>) -> Self {
        Self { plan_repo }
    }

    pub async fn create_plan(&self, draft: PlanDraft) -> Result<Plan, ServiceError> {
        draft.validate()?;

        let plan = Plan::new(
            draft.name.trim().to_string(),
            draft.price_cents,
            draft.max_tools,
            draft.max_usage,
            draft.features,
            draft.priority,
        );
        self.plan_repo.create(&plan).await?;
        info!(plan_id = %plan.id, name = %plan.name, priority = plan.priority, "Created plan");

        Ok(plan)
    }

    pub async fn get_plan(&self, id: Uuid) -> Result<Option<Plan>, ServiceError> {
        Ok(optional(self.plan_repo.get_by_id(id).await)?)
    }

    pub async fn get_plan_by_name(&self, name: &str) -> Result<Option<Plan>, ServiceError> {
        Ok(optional(self.plan_repo.get_by_name(name.trim()).await)?)
    }

    /// Highest priority first.
    pub async fn list_plans(&self) -> Result<Vec<Plan>, ServiceError> {
        Ok(self.plan_repo.list().await?)
    }

    pub async fn update_plan(&self, id: Uuid, draft: PlanDraft) -> Result<Plan, ServiceError> {
        draft.validate()?;

        let existing = self.plan_repo.get_by_id(id).await?;
        let plan = Plan {
            name: draft.name.trim().to_string(),
            price_cents: draft.price_cents,
            max_tools: draft.max_tools,
            max_usage: draft.max_usage,
            features: draft.features,
            priority: draft.priority,
            updated_at: Utc::now(),
            ..existing
        };
        self.plan_repo.update(&plan).await?;
        info!(plan_id = %plan.id, "Updated plan");

        Ok(plan)
    }

    pub async fn delete_plan(&self, id: Uuid) -> Result<(), ServiceError> {
        self.plan_repo.delete(id).await?;
        info!(plan_id = %id, "Deleted plan");
        Ok(())
    }
}
