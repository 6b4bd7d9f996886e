use crate::domain::{PlanTool, Usage};
use crate::infrastructure::repository::{map_write_error, parse_access_type};
use crate::infrastructure::{PlanToolRepository, RepositoryError, UsageRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PostgresPlanToolRepository {
    pool: PgPool,
}

impl PostgresPlanToolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanToolRepository for PostgresPlanToolRepository {
    async fn upsert(&self, plan_tool: &PlanTool) -> Result<PlanTool, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO plan_tools (id, plan_id, tool_id, access_type, max_usage, features,
                                    created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (plan_id, tool_id) DO UPDATE
            SET access_type = EXCLUDED.access_type,
                max_usage = EXCLUDED.max_usage,
                features = EXCLUDED.features,
                updated_at = EXCLUDED.updated_at
            RETURNING id, plan_id, tool_id, access_type, max_usage, features, created_at, updated_at
            "#,
        )
        .bind(plan_tool.id)
        .bind(plan_tool.plan_id)
        .bind(&plan_tool.tool_id)
        .bind(plan_tool.access_type.to_string())
        .bind(plan_tool.max_usage)
        .bind(&plan_tool.features)
        .bind(plan_tool.created_at)
        .bind(plan_tool.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("Plan {}", plan_tool.plan_id)))?;

        row_to_plan_tool(&row)
    }

    async fn find(&self, plan_id: Uuid, tool_id: &str) -> Result<Option<PlanTool>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, plan_id, tool_id, access_type, max_usage, features, created_at, updated_at
            FROM plan_tools
            WHERE plan_id = $1 AND tool_id = $2
            "#,
        )
        .bind(plan_id)
        .bind(tool_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_plan_tool).transpose()
    }

    async fn list_by_plan(&self, plan_id: Uuid) -> Result<Vec<PlanTool>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, plan_id, tool_id, access_type, max_usage, features, created_at, updated_at
            FROM plan_tools
            WHERE plan_id = $1
            ORDER BY tool_id
            "#,
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_plan_tool).collect()
    }

    async fn delete(&self, plan_id: Uuid, tool_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM plan_tools WHERE plan_id = $1 AND tool_id = $2")
            .bind(plan_id)
            .bind(tool_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Plan tool {} for plan {}",
                tool_id, plan_id
            )));
        }
        Ok(())
    }
}

fn row_to_plan_tool(row: &sqlx::postgres::PgRow) -> Result<PlanTool, RepositoryError> {
    let access_str: String = row.try_get("access_type")?;

    Ok(PlanTool {
        id: row.try_get("id")?,
        plan_id: row.try_get("plan_id")?,
        tool_id: row.try_get("tool_id")?,
        access_type: parse_access_type(&access_str)?,
        max_usage: row.try_get("max_usage")?,
        features: row.try_get("features")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresUsageRepository {
    pool: PgPool,
}

impl PostgresUsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PostgresUsageRepository {
    async fn increment(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, RepositoryError> {
        // Single statement so concurrent increments rely on the row lock taken by the upsert.
        let row = sqlx::query(
            r#"
            INSERT INTO usages (id, user_id, tool_id, count, last_used_at)
            VALUES ($1, $2, $3, 1, $4)
            ON CONFLICT (user_id, tool_id) DO UPDATE
            SET count = usages.count + 1,
                last_used_at = EXCLUDED.last_used_at
            RETURNING id, user_id, tool_id, count, last_used_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(tool_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("User {}", user_id)))?;

        row_to_usage(&row)
    }

    async fn get_or_create(&self, user_id: Uuid, tool_id: &str) -> Result<Usage, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO usages (id, user_id, tool_id, count, last_used_at)
            VALUES ($1, $2, $3, 0, NULL)
            ON CONFLICT (user_id, tool_id) DO UPDATE
            SET count = usages.count
            RETURNING id, user_id, tool_id, count, last_used_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(tool_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, format!("User {}", user_id)))?;

        row_to_usage(&row)
    }

    async fn find(&self, user_id: Uuid, tool_id: &str) -> Result<Option<Usage>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, tool_id, count, last_used_at
            FROM usages
            WHERE user_id = $1 AND tool_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tool_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_usage).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Usage>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, tool_id, count, last_used_at
            FROM usages
            WHERE user_id = $1
            ORDER BY tool_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_usage).collect()
    }

    async fn reset(&self, user_id: Uuid, tool_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE usages
            SET count = 0
            WHERE user_id = $1 AND tool_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tool_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_usage(row: &sqlx::postgres::PgRow) -> Result<Usage, RepositoryError> {
    Ok(Usage {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        tool_id: row.try_get("tool_id")?,
        count: row.try_get("count")?,
        last_used_at: row.try_get("last_used_at")?,
    })
}
