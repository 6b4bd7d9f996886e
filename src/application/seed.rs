use super::ServiceError;
use crate::domain::{AccessType, Plan, PlanFeatures, PlanTool, Role, User, UNLIMITED};
use crate::infrastructure::{
    hash_password, PlanRepository, PlanToolRepository, RepositoryError, UserRepository,
};
use crate::tools::ToolId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const FREE_PLAN: &str = "Free";
pub const PRO_PLAN: &str = "Pro";
pub const ENTERPRISE_PLAN: &str = "Enterprise";

/// Tools the Free plan may use despite lacking blanket access.
pub const FREE_PLAN_TOOLS: [ToolId; 5] = [
    ToolId::Base64,
    ToolId::JsonFormatter,
    ToolId::CaseConverter,
    ToolId::UrlEncoder,
    ToolId::VatCalculator,
];
pub const FREE_PLAN_TOOL_CAP: i64 = 100;

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedOutcome {
    Created,
    Existing,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub admin: SeedOutcome,
    pub plans: Vec<(String, SeedOutcome)>,
    pub overrides_created: usize,
}

impl SeedReport {
    pub fn created_anything(&self) -> bool {
        self.admin == SeedOutcome::Created
            || self.overrides_created > 0
            || self.plans.iter().any(|(_, o)| *o == SeedOutcome::Created)
    }
}

pub fn default_plans() -> Vec<Plan> {
    vec![
        Plan::new(
            FREE_PLAN.to_string(),
            0,
            5,
            100,
            PlanFeatures::default().with_flag("support", "community"),
            0,
        ),
        Plan::new(
            PRO_PLAN.to_string(),
            999,
            UNLIMITED,
            1000,
            PlanFeatures::all_tools().with_flag("support", "email"),
            1,
        ),
        Plan::new(
            ENTERPRISE_PLAN.to_string(),
            4999,
            UNLIMITED,
            UNLIMITED,
            PlanFeatures::all_tools().with_flag("support", "priority"),
            2,
        ),
    ]
}

pub struct SeedService<U, P, T>
where
    U: UserRepository,
    P: PlanRepository,
    T: PlanToolRepository,
{
    user_repo: Arc<U>,
    plan_repo: Arc<P>,
    plan_tool_repo: Arc<T>,
}

impl<U, P, T> SeedService<U, P, T>
where
    U: UserRepository,
    P: PlanRepository,
    T: PlanToolRepository,
{
    pub fn new(user_repo: Arc<U>, plan_repo: Arc<P>, plan_tool_repo: Arc<T>) -> Self {
        Self {
            user_repo,
            plan_repo,
            plan_tool_repo,
        }
    }

    /// Creates the admin account, the default plans and the Free plan's tool
    /// overrides. Rows that already exist are left untouched, so running it
    /// twice creates nothing the second time.
    pub async fn seed(&self, admin: &AdminSeed) -> Result<SeedReport, ServiceError> {
        let admin_outcome = self.seed_admin(admin).await?;

        let mut plans = Vec::new();
        let mut overrides_created = 0;
        for plan in default_plans() {
            let (stored, outcome) = self.seed_plan(plan).await?;
            if stored.name == FREE_PLAN {
                overrides_created += self.seed_free_overrides(&stored).await?;
            }
            plans.push((stored.name, outcome));
        }

        let report = SeedReport {
            admin: admin_outcome,
            plans,
            overrides_created,
        };
        info!(
            created_anything = report.created_anything(),
            overrides_created = report.overrides_created,
            "Seed finished"
        );

        Ok(report)
    }

    async fn seed_admin(&self, admin: &AdminSeed) -> Result<SeedOutcome, ServiceError> {
        let user = User::new(admin.email.clone(), Some(admin.name.clone()), None, Role::Admin);

        match self.user_repo.get_by_email(&user.email).await {
            Ok(existing) => {
                if !existing.is_admin() {
                    warn!(user_id = %existing.id, "Seed admin email belongs to a non-admin user");
                }
                return Ok(SeedOutcome::Existing);
            }
            Err(RepositoryError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        if admin.password.is_empty() {
            return Err(ServiceError::Validation(
                "an admin password is required to seed the admin user".to_string(),
            ));
        }

        let user = User {
            password_hash: Some(hash_password(&admin.password)?),
            ..user
        };
        match self.user_repo.create(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "Seeded admin user");
                Ok(SeedOutcome::Created)
            }
            // Another seeder got there first.
            Err(RepositoryError::Conflict(_)) => Ok(SeedOutcome::Existing),
            Err(e) => Err(e.into()),
        }
    }

    async fn seed_plan(&self, plan: Plan) -> Result<(Plan, SeedOutcome), ServiceError> {
        match self.plan_repo.get_by_name(&plan.name).await {
            Ok(existing) => return Ok((existing, SeedOutcome::Existing)),
            Err(RepositoryError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        match self.plan_repo.create(&plan).await {
            Ok(()) => {
                info!(plan_id = %plan.id, name = %plan.name, "Seeded plan");
                Ok((plan, SeedOutcome::Created))
            }
            Err(RepositoryError::Conflict(_)) => {
                let existing = self.plan_repo.get_by_name(&plan.name).await?;
                Ok((existing, SeedOutcome::Existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn seed_free_overrides(&self, plan: &Plan) -> Result<usize, ServiceError> {
        let mut created = 0;
        for tool in FREE_PLAN_TOOLS {
            let tool_id = tool.to_string();
            if self.plan_tool_repo.find(plan.id, &tool_id).await?.is_some() {
                continue;
            }

            self.plan_tool_repo
                .upsert(&PlanTool::new(
                    plan.id,
                    tool_id,
                    AccessType::Limited,
                    FREE_PLAN_TOOL_CAP,
                    serde_json::json!({}),
                ))
                .await?;
            created += 1;
        }
        Ok(created)
    }
}
