//! Tool access decision.
//!
//! The decision is a pure function of the records the services look up, so the
//! whole precedence table can be exercised without a database.

use super::{AccessType, Plan, PlanTool, User, UNLIMITED};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolAccessInfo {
    pub has_access: bool,
    pub access_type: AccessType,
    pub max_usage: i64,
    pub current_usage: i64,
    pub remaining_usage: i64,
    pub features: serde_json::Value,
}

impl ToolAccessInfo {
    pub fn blocked(current_usage: i64) -> Self {
        Self {
            has_access: false,
            access_type: AccessType::Blocked,
            max_usage: 0,
            current_usage,
            remaining_usage: 0,
            features: serde_json::json!({}),
        }
    }

    fn capped(
        access_type: AccessType,
        max_usage: i64,
        current_usage: i64,
        features: serde_json::Value,
    ) -> Self {
        let remaining_usage = remaining_usage(max_usage, current_usage);
        let has_access =
            access_type != AccessType::Blocked && (max_usage == UNLIMITED || remaining_usage > 0);

        Self {
            has_access,
            access_type,
            max_usage,
            current_usage,
            remaining_usage,
            features,
        }
    }
}

/// `-1` for an uncapped allowance, otherwise what is left, floored at zero.
pub fn remaining_usage(max_usage: i64, current_usage: i64) -> i64 {
    if max_usage == UNLIMITED {
        UNLIMITED
    } else {
        (max_usage - current_usage).max(0)
    }
}

/// Precedence, first match wins:
/// unknown user, admin, no plan in force, blanket plan access without an
/// override, no override at all, then the override itself.
pub fn decide_tool_access(
    user: Option<&User>,
    effective_plan: Option<&Plan>,
    plan_tool: Option<&PlanTool>,
    current_usage: i64,
) -> ToolAccessInfo {
    let Some(user) = user else {
        return ToolAccessInfo::blocked(0);
    };

    if user.is_admin() {
        return ToolAccessInfo {
            has_access: true,
            access_type: AccessType::Unlimited,
            max_usage: UNLIMITED,
            current_usage,
            remaining_usage: UNLIMITED,
            features: serde_json::json!({}),
        };
    }

    let Some(plan) = effective_plan else {
        return ToolAccessInfo::blocked(current_usage);
    };

    match plan_tool {
        None if plan.features.can_access_all_tools => ToolAccessInfo::capped(
            AccessType::Unlimited,
            plan.max_usage,
            current_usage,
            plan.features.to_json(),
        ),
        None => ToolAccessInfo::blocked(current_usage),
        Some(tool) => ToolAccessInfo::capped(
            tool.access_type,
            tool.max_usage,
            current_usage,
            tool.features.clone(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlanFeatures, Role};

    fn user(role: Role) -> User {
        User::new("someone@example.com".to_string(), None, None, role)
    }

    fn plan(max_usage: i64, all_tools: bool) -> Plan {
        let features = if all_tools {
            PlanFeatures::all_tools()
        } else {
            PlanFeatures::default()
        };
        Plan::new("Test".to_string(), 0, UNLIMITED, max_usage, features, 1)
    }

    fn override_for(plan: &Plan, access_type: AccessType, max_usage: i64) -> PlanTool {
        PlanTool::new(
            plan.id,
            "base64".to_string(),
            access_type,
            max_usage,
            serde_json::json!({ "batch": false }),
        )
    }

    #[test]
    fn unknown_user_is_blocked() {
        let info = decide_tool_access(None, None, None, 0);
        assert!(!info.has_access);
        assert_eq!(info.access_type, AccessType::Blocked);
        assert_eq!(info.remaining_usage, 0);
    }

    #[test]
    fn admin_bypasses_everything() {
        let admin = user(Role::Admin);
        let p = plan(10, false);
        let blocked = override_for(&p, AccessType::Blocked, 0);

        for (plan, tool) in [(None, None), (Some(&p), Some(&blocked)), (Some(&p), None)] {
            let info = decide_tool_access(Some(&admin), plan, tool, 500);
            assert!(info.has_access);
            assert_eq!(info.access_type, AccessType::Unlimited);
            assert_eq!(info.remaining_usage, UNLIMITED);
        }
    }

    #[test]
    fn no_plan_in_force_is_blocked() {
        let info = decide_tool_access(Some(&user(Role::User)), None, None, 3);
        assert!(!info.has_access);
        assert_eq!(info.access_type, AccessType::Blocked);
        assert_eq!(info.current_usage, 3);
    }

    #[test]
    fn blanket_plan_is_unlimited_up_to_plan_cap() {
        let u = user(Role::User);
        let p = plan(100, true);

        let info = decide_tool_access(Some(&u), Some(&p), None, 40);
        assert!(info.has_access);
        assert_eq!(info.access_type, AccessType::Unlimited);
        assert_eq!(info.max_usage, 100);
        assert_eq!(info.remaining_usage, 60);
        assert_eq!(info.features["can_access_all_tools"], true);

        let exhausted = decide_tool_access(Some(&u), Some(&p), None, 100);
        assert!(!exhausted.has_access);
        assert_eq!(exhausted.remaining_usage, 0);
    }

    #[test]
    fn blanket_plan_without_cap_never_runs_out() {
        let p = plan(UNLIMITED, true);
        let info = decide_tool_access(Some(&user(Role::User)), Some(&p), None, 1_000_000);
        assert!(info.has_access);
        assert_eq!(info.remaining_usage, UNLIMITED);
    }

    #[test]
    fn no_override_and_no_blanket_access_is_blocked() {
        let p = plan(100, false);
        let info = decide_tool_access(Some(&user(Role::User)), Some(&p), None, 0);
        assert!(!info.has_access);
        assert_eq!(info.access_type, AccessType::Blocked);
    }

    #[test]
    fn limited_override_counts_down() {
        let p = plan(100, false);
        let tool = override_for(&p, AccessType::Limited, 5);
        let u = user(Role::User);

        let info = decide_tool_access(Some(&u), Some(&p), Some(&tool), 2);
        assert!(info.has_access);
        assert_eq!(info.access_type, AccessType::Limited);
        assert_eq!(info.remaining_usage, 3);
        assert_eq!(info.features, serde_json::json!({ "batch": false }));

        let over = decide_tool_access(Some(&u), Some(&p), Some(&tool), 9);
        assert!(!over.has_access);
        assert_eq!(over.remaining_usage, 0);
    }

    #[test]
    fn override_takes_precedence_over_blanket_access() {
        let p = plan(UNLIMITED, true);
        let tool = override_for(&p, AccessType::Blocked, 0);
        let info = decide_tool_access(Some(&user(Role::User)), Some(&p), Some(&tool), 0);
        assert!(!info.has_access);
        assert_eq!(info.access_type, AccessType::Blocked);
    }

    #[test]
    fn remaining_usage_formula() {
        assert_eq!(remaining_usage(UNLIMITED, 0), UNLIMITED);
        assert_eq!(remaining_usage(UNLIMITED, 99), UNLIMITED);
        assert_eq!(remaining_usage(10, 3), 7);
        assert_eq!(remaining_usage(10, 10), 0);
        assert_eq!(remaining_usage(10, 25), 0);
        assert_eq!(remaining_usage(0, 0), 0);
    }
}
