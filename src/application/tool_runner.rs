use super::{PlanToolService, ServiceError, UsageService};
use crate::domain::ToolAccessInfo;
use crate::infrastructure::{
    PlanRepository, PlanToolRepository, SubscriptionRepository, UsageRepository, UserRepository,
};
use crate::tools::{run_tool, ToolError, ToolId};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ToolRunError {
    #[error("Access to tool denied")]
    Denied(ToolAccessInfo),
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolRun {
    pub tool_id: ToolId,
    pub output: serde_json::Value,
    /// Access state after this run was counted.
    pub access: ToolAccessInfo,
}

/// Gatekeeper around [`run_tool`]: checks access, runs the tool and counts the
/// use. Failed runs are not counted.
pub struct ToolRunService<U, P, S, T, G>
where
    U: UserRepository,
    P: PlanRepository,
    S: SubscriptionRepository,
    T: PlanToolRepository,
    G: UsageRepository,
{
    access: Arc<PlanToolService<U, P, S, T, G>>,
    usage: Arc<UsageService<G>>,
}

impl<U, P, S, T, G> ToolRunService<U, P, S, T, G>
where
    U: UserRepository,
    P: PlanRepository,
    S: SubscriptionRepository,
    T: PlanToolRepository,
    G: UsageRepository,
{
    pub fn new(access: Arc<PlanToolService<U, P, S, T, G>>, usage: Arc<UsageService<G>>) -> Self {
        Self { access, usage }
    }

    pub async fn run(
        &self,
        user_id: Uuid,
        tool_id: ToolId,
        input: serde_json::Value,
    ) -> Result<ToolRun, ToolRunError> {
        let key = tool_id.to_string();

        let before = self.access.get_tool_access_info(user_id, &key).await?;
        if !before.has_access {
            warn!(
                user_id = %user_id,
                tool_id = %key,
                access_type = %before.access_type,
                current_usage = before.current_usage,
                "Tool run denied"
            );
            return Err(ToolRunError::Denied(before));
        }

        let output = run_tool(tool_id, input)?;

        self.usage.increment_usage(user_id, &key).await?;
        let access = self.access.get_tool_access_info(user_id, &key).await?;
        info!(
            user_id = %user_id,
            tool_id = %key,
            current_usage = access.current_usage,
            "Tool run"
        );

        Ok(ToolRun {
            tool_id,
            output,
            access,
        })
    }
}
