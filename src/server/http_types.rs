use crate::application::{PlanDraft, ToolRun};
use crate::domain::{Plan, PlanTool, Subscription, ToolAccessInfo, Usage, User};
use crate::tools::ToolInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, ToSchema)]
pub(super) struct HealthResponse {
    pub(super) status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams, ToSchema)]
pub(super) struct PaginationParams {
    #[serde(default = "default_limit")]
    #[param(default = 100, maximum = 1000)]
    pub(super) limit: i64,
    #[serde(default)]
    #[param(default = 0)]
    pub(super) offset: i64,
}

pub(super) fn default_limit() -> i64 {
    100
}

#[derive(Deserialize, Validate, ToSchema)]
pub(super) struct LoginRequest {
    #[validate(email)]
    #[schema(example = "admin@toolhub.local")]
    pub(super) email: String,
    #[validate(length(min = 1))]
    pub(super) password: String,
}

#[derive(Serialize, ToSchema)]
pub(super) struct LoginResponse {
    pub(super) token: String,
    pub(super) user: UserResponse,
}

#[derive(Deserialize, Validate, ToSchema)]
pub(super) struct CreateUserRequest {
    #[validate(email)]
    pub(super) email: String,
    #[validate(length(max = 200))]
    pub(super) name: Option<String>,
    #[validate(length(min = 8, max = 256))]
    pub(super) password: Option<String>,
    #[schema(example = "USER")]
    pub(super) role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub(super) struct UpdateRoleRequest {
    #[schema(example = "ADMIN")]
    pub(super) role: String,
}

#[derive(Serialize, ToSchema)]
pub(super) struct UserResponse {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) name: Option<String>,
    pub(super) role: String,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Deserialize, Validate, ToSchema)]
pub(super) struct PlanRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Pro")]
    pub(super) name: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub(super) price_cents: i64,
    #[schema(example = -1)]
    pub(super) max_tools: i64,
    #[schema(example = 1000)]
    pub(super) max_usage: i64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub(super) features: Option<serde_json::Value>,
    #[serde(default)]
    pub(super) priority: i32,
}

impl PlanRequest {
    pub(super) fn into_draft(self) -> Result<PlanDraft, String> {
        let features = match self.features {
            Some(value) => serde_json::from_value(value).map_err(|e| format!("features: {}", e))?,
            None => Default::default(),
        };
        Ok(PlanDraft {
            name: self.name,
            price_cents: self.price_cents,
            max_tools: self.max_tools,
            max_usage: self.max_usage,
            features,
            priority: self.priority,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub(super) struct PlanResponse {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) price_cents: i64,
    pub(super) max_tools: i64,
    pub(super) max_usage: i64,
    #[schema(value_type = Object)]
    pub(super) features: serde_json::Value,
    pub(super) priority: i32,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id,
            features: plan.features.to_json(),
            name: plan.name,
            price_cents: plan.price_cents,
            max_tools: plan.max_tools,
            max_usage: plan.max_usage,
            priority: plan.priority,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub(super) struct PlanToolRequest {
    #[schema(example = "LIMITED")]
    pub(super) access_type: String,
    #[schema(example = 100)]
    pub(super) max_usage: i64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub(super) features: Option<serde_json::Value>,
}

#[derive(Serialize, ToSchema)]
pub(super) struct PlanToolResponse {
    pub(super) id: Uuid,
    pub(super) plan_id: Uuid,
    pub(super) tool_id: String,
    pub(super) access_type: String,
    pub(super) max_usage: i64,
    #[schema(value_type = Object)]
    pub(super) features: serde_json::Value,
    pub(super) updated_at: DateTime<Utc>,
}

impl From<PlanTool> for PlanToolResponse {
    fn from(tool: PlanTool) -> Self {
        Self {
            id: tool.id,
            plan_id: tool.plan_id,
            tool_id: tool.tool_id,
            access_type: tool.access_type.to_string(),
            max_usage: tool.max_usage,
            features: tool.features,
            updated_at: tool.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub(super) struct SubscribeRequest {
    pub(super) user_id: Uuid,
    pub(super) plan_id: Uuid,
    #[schema(format = "date-time")]
    pub(super) ends_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub(super) struct SubscriptionResponse {
    pub(super) id: Uuid,
    pub(super) user_id: Uuid,
    pub(super) plan_id: Uuid,
    pub(super) status: String,
    pub(super) starts_at: DateTime<Utc>,
    #[schema(format = "date-time")]
    pub(super) ends_at: Option<DateTime<Utc>>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            user_id: sub.user_id,
            plan_id: sub.plan_id,
            status: sub.status.to_string(),
            starts_at: sub.starts_at,
            ends_at: sub.ends_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub(super) struct UsageResponse {
    pub(super) tool_id: String,
    pub(super) count: i64,
    #[schema(format = "date-time")]
    pub(super) last_used_at: Option<DateTime<Utc>>,
}

impl From<Usage> for UsageResponse {
    fn from(usage: Usage) -> Self {
        Self {
            tool_id: usage.tool_id,
            count: usage.count,
            last_used_at: usage.last_used_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub(super) struct AccessResponse {
    pub(super) has_access: bool,
    #[schema(example = "LIMITED")]
    pub(super) access_type: String,
    pub(super) max_usage: i64,
    pub(super) current_usage: i64,
    pub(super) remaining_usage: i64,
    #[schema(value_type = Object)]
    pub(super) features: serde_json::Value,
}

impl From<ToolAccessInfo> for AccessResponse {
    fn from(info: ToolAccessInfo) -> Self {
        Self {
            has_access: info.has_access,
            access_type: info.access_type.to_string(),
            max_usage: info.max_usage,
            current_usage: info.current_usage,
            remaining_usage: info.remaining_usage,
            features: info.features,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub(super) struct ToolInfoResponse {
    #[schema(example = "json-formatter")]
    pub(super) id: String,
    pub(super) title: String,
    pub(super) description: String,
}

impl From<ToolInfo> for ToolInfoResponse {
    fn from(tool: ToolInfo) -> Self {
        Self {
            id: tool.id.to_string(),
            title: tool.title.to_string(),
            description: tool.description.to_string(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub(super) struct RunToolRequest {
    /// Tool-specific input object.
    #[schema(value_type = Object)]
    pub(super) input: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
pub(super) struct RunToolResponse {
    pub(super) tool_id: String,
    #[schema(value_type = Object)]
    pub(super) output: serde_json::Value,
    pub(super) access: AccessResponse,
}

impl From<ToolRun> for RunToolResponse {
    fn from(run: ToolRun) -> Self {
        Self {
            tool_id: run.tool_id.to_string(),
            output: run.output,
            access: run.access.into(),
        }
    }
}
