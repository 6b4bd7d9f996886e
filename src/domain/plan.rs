use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel used by `max_usage` and `max_tools` for "no cap".
pub const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub max_tools: i64,
    pub max_usage: i64,
    pub features: PlanFeatures,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Feature flag bundle stored as a JSON blob on the plan row.
///
/// `can_access_all_tools` is the only flag the access decision reads; everything
/// else is carried through to callers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanFeatures {
    #[serde(default)]
    pub can_access_all_tools: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlanFeatures {
    pub fn all_tools() -> Self {
        Self {
            can_access_all_tools: true,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_flag(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

impl Plan {
    pub fn new(
        name: String,
        price_cents: i64,
        max_tools: i64,
        max_usage: i64,
        features: PlanFeatures,
        priority: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            price_cents,
            max_tools,
            max_usage,
            features,
            priority,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_unlimited_usage(&self) -> bool {
        self.max_usage == UNLIMITED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_keep_unknown_flags() {
        let raw = serde_json::json!({
            "can_access_all_tools": true,
            "priority_support": true,
            "export_formats": ["csv", "pdf"]
        });
        let features: PlanFeatures = serde_json::from_value(raw.clone()).unwrap();

        assert!(features.can_access_all_tools);
        assert_eq!(features.extra.len(), 2);
        assert_eq!(features.to_json(), raw);
    }

    #[test]
    fn features_default_to_no_blanket_access() {
        let features: PlanFeatures = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!features.can_access_all_tools);
    }
}
