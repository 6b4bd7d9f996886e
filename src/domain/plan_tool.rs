use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Per-(plan, tool) override of the plan's blanket rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanTool {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub tool_id: String,
    pub access_type: AccessType,
    pub max_usage: i64,
    pub features: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    Unlimited,
    Limited,
    Blocked,
}

impl PlanTool {
    pub fn new(
        plan_id: Uuid,
        tool_id: String,
        access_type: AccessType,
        max_usage: i64,
        features: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plan_id,
            tool_id,
            access_type,
            max_usage,
            features,
            created_at: now,
            updated_at: now,
        }
    }
}
