//! One-shot seed: default admin user, Free/Pro/Enterprise plans and the Free
//! plan's tool overrides. Safe to run repeatedly.

use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;
use toolhub::application::{AdminSeed, SeedService};
use toolhub::infrastructure::{
    AppConfig, PostgresPlanRepository, PostgresPlanToolRepository, PostgresUserRepository,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("load config")?;
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connect database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("run migrations")?;

    let seeder = SeedService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresPlanRepository::new(pool.clone())),
        Arc::new(PostgresPlanToolRepository::new(pool)),
    );

    let report = seeder
        .seed(&AdminSeed {
            email: config.admin_email,
            password: config.admin_password,
            name: config.admin_name,
        })
        .await
        .context("seed database")?;

    info!(admin = ?report.admin, "Admin user");
    for (name, outcome) in &report.plans {
        info!(plan = %name, outcome = ?outcome, "Plan");
    }
    info!(overrides_created = report.overrides_created, "Free plan tool overrides");

    Ok(())
}
