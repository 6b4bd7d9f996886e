use crate::domain::{
    AccessType, Plan, PlanFeatures, PlanTool, Role, Subscription, SubscriptionStatus, Usage, User,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres `foreign_key_violation`: the referenced user or plan is gone.
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(crate) fn map_write_error(err: sqlx::Error, what: impl Into<String>) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            RepositoryError::Conflict(what.into())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            RepositoryError::NotFound(what.into())
        }
        _ => RepositoryError::DatabaseError(err),
    }
}

pub(crate) fn map_read_error(err: sqlx::Error, what: impl Into<String>) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound(what.into()),
        _ => RepositoryError::DatabaseError(err),
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    #[must_use]
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError>;
    #[must_use]
    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;
    #[must_use]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, RepositoryError>;
    #[must_use]
    async fn update_role(&self, id: Uuid, role: Role) -> Result<(), RepositoryError>;
    #[must_use]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    #[must_use]
    async fn create(&self, plan: &Plan) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_by_id(&self, id: Uuid) -> Result<Plan, RepositoryError>;
    #[must_use]
    async fn get_by_name(&self, name: &str) -> Result<Plan, RepositoryError>;
    /// Highest priority first.
    #[must_use]
    async fn list(&self) -> Result<Vec<Plan>, RepositoryError>;
    #[must_use]
    async fn update(&self, plan: &Plan) -> Result<(), RepositoryError>;
    #[must_use]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    #[must_use]
    async fn create(&self, subscription: &Subscription) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, RepositoryError>;
    #[must_use]
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError>;
    /// Subscriptions with status ACTIVE; end dates are left to the caller.
    #[must_use]
    async fn list_active_by_user(&self, user_id: Uuid)
        -> Result<Vec<Subscription>, RepositoryError>;
    #[must_use]
    async fn update_status(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PlanToolRepository: Send + Sync {
    /// Insert or replace the override for `(plan_id, tool_id)`.
    #[must_use]
    async fn upsert(&self, plan_tool: &PlanTool) -> Result<PlanTool, RepositoryError>;
    #[must_use]
    async fn find(&self, plan_id: Uuid, tool_id: &str) -> Result<Option<PlanTool>, RepositoryError>;
    #[must_use]
    async fn list_by_plan(&self, plan_id: Uuid) -> Result<Vec<PlanTool>, RepositoryError>;
    #[must_use]
    async fn delete(&self, plan_id: Uuid, tool_id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Atomic upsert-increment of the `(user_id, tool_id)` counter.
    #[must_use]
    async fn increment(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, RepositoryError>;
    /// Returns the counter, inserting a zero row first if none exists.
    #[must_use]
    async fn get_or_create(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, RepositoryError>;
    /// Read-only lookup that never inserts.
    #[must_use]
    async fn find(&self, user_id: Uuid, tool_id: &str) -> Result<Option<Usage>, RepositoryError>;
    #[must_use]
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Usage>, RepositoryError>;
    #[must_use]
    async fn reset(&self, user_id: Uuid, tool_id: &str) -> Result<(), RepositoryError>;
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("User {}", user.email)))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, format!("User {}", id)))?;

        row_to_user(&row)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, format!("User {}", email)))?;

        row_to_user(&row)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_user).collect()
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(role.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, RepositoryError> {
    let role_str: String = row.try_get("role")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        role: Role::from_str(&role_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown role: {}", role_str)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn create(&self, plan: &Plan) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO plans (id, name, price_cents, max_tools, max_usage, features, priority,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(plan.price_cents)
        .bind(plan.max_tools)
        .bind(plan.max_usage)
        .bind(plan.features.to_json())
        .bind(plan.priority)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("Plan {}", plan.name)))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Plan, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price_cents, max_tools, max_usage, features, priority,
                   created_at, updated_at
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, format!("Plan {}", id)))?;

        row_to_plan(&row)
    }

    async fn get_by_name(&self, name: &str) -> Result<Plan, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price_cents, max_tools, max_usage, features, priority,
                   created_at, updated_at
            FROM plans
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, format!("Plan {}", name)))?;

        row_to_plan(&row)
    }

    async fn list(&self) -> Result<Vec<Plan>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, max_tools, max_usage, features, priority,
                   created_at, updated_at
            FROM plans
            ORDER BY priority DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_plan).collect()
    }

    async fn update(&self, plan: &Plan) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE plans
            SET name = $1, price_cents = $2, max_tools = $3, max_usage = $4, features = $5,
                priority = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&plan.name)
        .bind(plan.price_cents)
        .bind(plan.max_tools)
        .bind(plan.max_usage)
        .bind(plan.features.to_json())
        .bind(plan.priority)
        .bind(Utc::now())
        .bind(plan.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("Plan {}", plan.name)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Plan {}", plan.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Plan {}", id)));
        }
        Ok(())
    }
}

fn row_to_plan(row: &sqlx::postgres::PgRow) -> Result<Plan, RepositoryError> {
    let features_json: serde_json::Value = row.try_get("features")?;
    let features: PlanFeatures = serde_json::from_value(features_json)
        .map_err(|e| RepositoryError::InvalidData(format!("Bad plan features: {}", e)))?;

    Ok(Plan {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price_cents: row.try_get("price_cents")?,
        max_tools: row.try_get("max_tools")?,
        max_usage: row.try_get("max_usage")?,
        features,
        priority: row.try_get("priority")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn parse_access_type(raw: &str) -> Result<AccessType, RepositoryError> {
    AccessType::from_str(raw)
        .map_err(|_| RepositoryError::InvalidData(format!("Unknown access type: {}", raw)))
}

pub(crate) fn parse_subscription_status(raw: &str) -> Result<SubscriptionStatus, RepositoryError> {
    SubscriptionStatus::from_str(raw)
        .map_err(|_| RepositoryError::InvalidData(format!("Unknown subscription status: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_enum_strings_parse() {
        assert_eq!(parse_access_type("LIMITED").unwrap(), AccessType::Limited);
        assert_eq!(
            parse_subscription_status("CANCELLED").unwrap(),
            SubscriptionStatus::Cancelled
        );
    }

    #[test]
    fn unknown_enum_strings_are_invalid_data() {
        assert!(matches!(
            parse_access_type("SOMETIMES"),
            Err(RepositoryError::InvalidData(_))
        ));
        assert!(matches!(
            parse_subscription_status("paused"),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        assert!(matches!(
            map_read_error(sqlx::Error::RowNotFound, "User x"),
            RepositoryError::NotFound(_)
        ));
    }
}
