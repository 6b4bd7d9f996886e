use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
    Expired,
}

impl Subscription {
    pub fn new(user_id: Uuid, plan_id: Uuid, ends_at: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            status: SubscriptionStatus::Active,
            starts_at: now,
            ends_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active status alone is not enough: a lapsed end date also takes the
    /// subscription out of force.
    pub fn is_in_force(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.ends_at.map_or(true, |end| end > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn active_without_end_date_is_in_force() {
        let sub = Subscription::new(Uuid::new_v4(), Uuid::new_v4(), None);
        assert!(sub.is_in_force(Utc::now()));
    }

    #[test]
    fn lapsed_end_date_is_not_in_force() {
        let sub = Subscription::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Utc::now() - Duration::days(1)),
        );
        assert!(!sub.is_in_force(Utc::now()));
    }

    #[test]
    fn cancelled_is_not_in_force() {
        let mut sub = Subscription::new(Uuid::new_v4(), Uuid::new_v4(), None);
        sub.status = SubscriptionStatus::Cancelled;
        assert!(!sub.is_in_force(Utc::now()));
    }
}
