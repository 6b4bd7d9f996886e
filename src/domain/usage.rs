use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user, per-tool invocation counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_id: String,
    pub count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Usage {
    pub fn empty(user_id: Uuid, tool_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            tool_id,
            count: 0,
            last_used_at: None,
        }
    }
}
