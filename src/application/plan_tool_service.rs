use super::subscription_service::resolve_active_subscription;
use super::{optional, ServiceError};
use crate::domain::{decide_tool_access, AccessType, PlanTool, ToolAccessInfo, UNLIMITED};
use crate::infrastructure::{
    PlanRepository, PlanToolRepository, SubscriptionRepository, UsageRepository, UserRepository,
};
use crate::tools::ToolId;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct PlanToolService<U, P, S, T, G>
where
    U: UserRepository,
    P: PlanRepository,
    S: SubscriptionRepository,
    T: PlanToolRepository,
    G: UsageRepository,
{
    user_repo: Arc<U>,
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    plan_tool_repo: Arc<T>,
    usage_repo: Arc<G>,
}

impl<U, P, S, T, G> PlanToolService<U, P, S, T, G>
where
    U: UserRepository,
    P: PlanRepository,
    S: SubscriptionRepository,
    T: PlanToolRepository,
    G: UsageRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        plan_tool_repo: Arc<T>,
        usage_repo: Arc<G>,
    ) -> Self {
        Self {
            user_repo,
            plan_repo,
            subscription_repo,
            plan_tool_repo,
            usage_repo,
        }
    }

    /// Inserts or replaces the override for `(plan_id, tool_id)`.
    pub async fn set_plan_tool(
        &self,
        plan_id: Uuid,
        tool_id: &str,
        access_type: AccessType,
        max_usage: i64,
        features: serde_json::Value,
    ) -> Result<PlanTool, ServiceError> {
        let tool = ToolId::from_str(tool_id)
            .map_err(|_| ServiceError::Validation(format!("unknown tool '{}'", tool_id)))?;
        if max_usage < UNLIMITED {
            return Err(ServiceError::Validation(
                "max_usage must be -1 (unlimited) or a non-negative count".to_string(),
            ));
        }
        if !features.is_object() {
            return Err(ServiceError::Validation("features must be a JSON object".to_string()));
        }
        if optional(self.plan_repo.get_by_id(plan_id).await)?.is_none() {
            return Err(ServiceError::NotFound(format!("plan {}", plan_id)));
        }

        let stored = self
            .plan_tool_repo
            .upsert(&PlanTool::new(
                plan_id,
                tool.to_string(),
                access_type,
                max_usage,
                features,
            ))
            .await?;
        info!(
            plan_id = %plan_id,
            tool_id = %stored.tool_id,
            access_type = %stored.access_type,
            max_usage = stored.max_usage,
            "Set plan tool override"
        );

        Ok(stored)
    }

    pub async fn get_plan_tool(
        &self,
        plan_id: Uuid,
        tool_id: &str,
    ) -> Result<Option<PlanTool>, ServiceError> {
        Ok(self.plan_tool_repo.find(plan_id, tool_id).await?)
    }

    pub async fn list_plan_tools(&self, plan_id: Uuid) -> Result<Vec<PlanTool>, ServiceError> {
        Ok(self.plan_tool_repo.list_by_plan(plan_id).await?)
    }

    pub async fn remove_plan_tool(&self, plan_id: Uuid, tool_id: &str) -> Result<(), ServiceError> {
        self.plan_tool_repo.delete(plan_id, tool_id).await?;
        info!(plan_id = %plan_id, tool_id = %tool_id, "Removed plan tool override");
        Ok(())
    }

    /// Looks up everything the access decision needs. Missing users, plans and
    /// overrides are ordinary outcomes here; only storage failures are errors.
    pub async fn get_tool_access_info(
        &self,
        user_id: Uuid,
        tool_id: &str,
    ) -> Result<ToolAccessInfo, ServiceError> {
        let Some(user) = optional(self.user_repo.get_by_id(user_id).await)? else {
            debug!(user_id = %user_id, tool_id = %tool_id, "Access check for unknown user");
            return Ok(decide_tool_access(None, None, None, 0));
        };

        let current_usage = self
            .usage_repo
            .find(user_id, tool_id)
            .await?
            .map_or(0, |usage| usage.count);

        if user.is_admin() {
            return Ok(decide_tool_access(Some(&user), None, None, current_usage));
        }

        let active = resolve_active_subscription(
            self.plan_repo.as_ref(),
            self.subscription_repo.as_ref(),
            user_id,
            Utc::now(),
        )
        .await?;
        let plan = active.map(|a| a.plan);

        let plan_tool = match &plan {
            Some(plan) => self.plan_tool_repo.find(plan.id, tool_id).await?,
            None => None,
        };

        let info = decide_tool_access(Some(&user), plan.as_ref(), plan_tool.as_ref(), current_usage);
        debug!(
            user_id = %user_id,
            tool_id = %tool_id,
            has_access = info.has_access,
            access_type = %info.access_type,
            remaining = info.remaining_usage,
            "Resolved tool access"
        );

        Ok(info)
    }
}
