use crate::application::{
    AuthService, PlanService, PlanToolService, SubscriptionService, ToolRunService, UsageService,
    UserService,
};
use crate::infrastructure::{
    AppConfig, PostgresPlanRepository, PostgresPlanToolRepository, PostgresSubscriptionRepository,
    PostgresUsageRepository, PostgresUserRepository, SessionTokens,
};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

pub type UserServiceType = UserService<PostgresUserRepository>;
pub type PlanServiceType = PlanService<PostgresPlanRepository>;
pub type SubscriptionServiceType =
    SubscriptionService<PostgresUserRepository, PostgresPlanRepository, PostgresSubscriptionRepository>;
pub type PlanToolServiceType = PlanToolService<
    PostgresUserRepository,
    PostgresPlanRepository,
    PostgresSubscriptionRepository,
    PostgresPlanToolRepository,
    PostgresUsageRepository,
>;
pub type UsageServiceType = UsageService<PostgresUsageRepository>;
pub type AuthServiceType = AuthService<PostgresUserRepository>;
pub type ToolRunServiceType = ToolRunService<
    PostgresUserRepository,
    PostgresPlanRepository,
    PostgresSubscriptionRepository,
    PostgresPlanToolRepository,
    PostgresUsageRepository,
>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<SessionTokens>,
    pub users: Arc<UserServiceType>,
    pub plans: Arc<PlanServiceType>,
    pub subscriptions: Arc<SubscriptionServiceType>,
    pub plan_tools: Arc<PlanToolServiceType>,
    pub usage: Arc<UsageServiceType>,
    pub auth: Arc<AuthServiceType>,
    pub runner: Arc<ToolRunServiceType>,
}

/// Build full state from config + an existing pool.
///
/// Intended for embedding into a larger service that already manages a `PgPool`.
pub async fn build_state_with_pool(
    config: AppConfig,
    pool: PgPool,
    run_migrations: bool,
) -> anyhow::Result<AppState> {
    if run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
    }

    anyhow::ensure!(!config.jwt_secret.is_empty(), "jwt_secret must be set");
    let tokens = Arc::new(SessionTokens::new(&config.jwt_secret, config.token_ttl_minutes));

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let plan_repo = Arc::new(PostgresPlanRepository::new(pool.clone()));
    let subscription_repo = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let plan_tool_repo = Arc::new(PostgresPlanToolRepository::new(pool.clone()));
    let usage_repo = Arc::new(PostgresUsageRepository::new(pool.clone()));

    let users = Arc::new(UserService::new(user_repo.clone()));
    let plans = Arc::new(PlanService::new(plan_repo.clone()));
    let subscriptions = Arc::new(SubscriptionService::new(
        user_repo.clone(),
        plan_repo.clone(),
        subscription_repo.clone(),
    ));
    let plan_tools = Arc::new(PlanToolService::new(
        user_repo,
        plan_repo,
        subscription_repo,
        plan_tool_repo,
        usage_repo.clone(),
    ));
    let usage = Arc::new(UsageService::new(usage_repo));
    let auth = Arc::new(AuthService::new(users.clone(), tokens.clone()));
    let runner = Arc::new(ToolRunService::new(plan_tools.clone(), usage.clone()));

    Ok(AppState {
        pool,
        tokens,
        users,
        plans,
        subscriptions,
        plan_tools,
        usage,
        auth,
        runner,
    })
}

/// Build state for the standalone server.
///
/// Creates the `PgPool`, runs migrations, and wires repositories/services.
pub async fn build_state_from_env(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connect database")?;
    build_state_with_pool(config, pool, true).await
}
