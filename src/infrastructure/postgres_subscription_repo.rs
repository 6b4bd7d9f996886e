use crate::domain::{Subscription, SubscriptionStatus};
use crate::infrastructure::repository::{map_read_error, map_write_error, parse_subscription_status};
use crate::infrastructure::{RepositoryError, SubscriptionRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, user_id, plan_id, status, starts_at, ends_at,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.plan_id)
        .bind(subscription.status.to_string())
        .bind(subscription.starts_at)
        .bind(subscription.ends_at)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("Subscription {}", subscription.id)))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, plan_id, status, starts_at, ends_at, created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, format!("Subscription {}", id)))?;

        row_to_subscription(&row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, plan_id, status, starts_at, ends_at, created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY starts_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_subscription).collect()
    }

    async fn list_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, plan_id, status, starts_at, ends_at, created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1 AND status = $2
            ORDER BY starts_at DESC
            "#,
        )
        .bind(user_id)
        .bind(SubscriptionStatus::Active.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_subscription).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Subscription {}", id)));
        }
        Ok(())
    }
}

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Result<Subscription, RepositoryError> {
    let status_str: String = row.try_get("status")?;

    Ok(Subscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        plan_id: row.try_get("plan_id")?,
        status: parse_subscription_status(&status_str)?,
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
