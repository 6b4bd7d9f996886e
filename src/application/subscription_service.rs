use super::{optional, ServiceError};
use crate::domain::{Plan, Subscription, SubscriptionStatus};
use crate::infrastructure::{PlanRepository, SubscriptionRepository, UserRepository};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// The subscription that currently decides a user's access, with its plan.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActiveSubscription {
    pub subscription: Subscription,
    pub plan: Plan,
}

/// Picks the in-force subscription with the highest plan priority, the most
/// recent start winning ties. Active rows whose end date has passed are marked
/// `Expired` on the way.
pub(crate) async fn resolve_active_subscription<P, S>(
    plan_repo: &P,
    subscription_repo: &S,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<ActiveSubscription>, ServiceError>
where
    P: PlanRepository,
    S: SubscriptionRepository,
{
    let mut best: Option<ActiveSubscription> = None;

    for subscription in subscription_repo.list_active_by_user(user_id).await? {
        if !subscription.is_in_force(now) {
            subscription_repo
                .update_status(subscription.id, SubscriptionStatus::Expired)
                .await?;
            debug!(subscription_id = %subscription.id, "Marked lapsed subscription expired");
            continue;
        }

        // A plan deleted underneath the subscription grants nothing.
        let Some(plan) = optional(plan_repo.get_by_id(subscription.plan_id).await)? else {
            continue;
        };

        let outranks = best.as_ref().map_or(true, |current| {
            (plan.priority, subscription.starts_at)
                > (current.plan.priority, current.subscription.starts_at)
        });
        if outranks {
            best = Some(ActiveSubscription { subscription, plan });
        }
    }

    Ok(best)
}

pub struct SubscriptionService<U, P, S>
where
    U: UserRepository,
    P: PlanRepository,
    S: SubscriptionRepository,
{
    user_repo: Arc<U>,
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
}

impl<U, P, S> SubscriptionService<U, P, S>
where
    U: UserRepository,
    P: PlanRepository,
    S: SubscriptionRepository,
{
    pub fn new(user_repo: Arc<U>, plan_repo: Arc<P>, subscription_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            plan_repo,
            subscription_repo,
        }
    }

    pub async fn subscribe(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<Subscription, ServiceError> {
        if optional(self.user_repo.get_by_id(user_id).await)?.is_none() {
            return Err(ServiceError::NotFound(format!("user {}", user_id)));
        }
        if optional(self.plan_repo.get_by_id(plan_id).await)?.is_none() {
            return Err(ServiceError::NotFound(format!("plan {}", plan_id)));
        }
        if ends_at.is_some_and(|end| end <= Utc::now()) {
            return Err(ServiceError::Validation(
                "subscription end date must be in the future".to_string(),
            ));
        }

        let subscription = Subscription::new(user_id, plan_id, ends_at);
        self.subscription_repo.create(&subscription).await?;
        info!(
            subscription_id = %subscription.id,
            user_id = %user_id,
            plan_id = %plan_id,
            "Created subscription"
        );

        Ok(subscription)
    }

    pub async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, ServiceError> {
        Ok(optional(self.subscription_repo.get_by_id(id).await)?)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, ServiceError> {
        Ok(self.subscription_repo.list_by_user(user_id).await?)
    }

    pub async fn get_active_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ActiveSubscription>, ServiceError> {
        resolve_active_subscription(
            self.plan_repo.as_ref(),
            self.subscription_repo.as_ref(),
            user_id,
            Utc::now(),
        )
        .await
    }

    pub async fn get_effective_plan(&self, user_id: Uuid) -> Result<Option<Plan>, ServiceError> {
        Ok(self
            .get_active_subscription(user_id)
            .await?
            .map(|active| active.plan))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Subscription, ServiceError> {
        self.subscription_repo.update_status(id, status).await?;
        info!(subscription_id = %id, status = %status, "Updated subscription status");
        Ok(self.subscription_repo.get_by_id(id).await?)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Subscription, ServiceError> {
        self.update_status(id, SubscriptionStatus::Cancelled).await
    }
}
