//! Toolhub
//!
//! Single-purpose text and number tools behind plan-based access control and
//! per-user usage metering.
//!
//! ## Standalone
//!
//! Run the binary:
//! ```bash
//! toolhub-server
//! ```
//!
//! ## Embedded (Axum)
//!
//! When the `server` feature is enabled, this crate can be embedded into a larger Axum app:
//! ```rust,ignore
//! use axum::Router;
//! use toolhub::infrastructure::AppConfig;
//! use toolhub::server::{build_state_with_pool, router};
//! use sqlx::PgPool;
//!
//! let cfg = AppConfig::from_env()?;
//! let pool = PgPool::connect(&cfg.database_url).await?;
//! let state = build_state_with_pool(cfg, pool, true).await?;
//! let app = Router::new().nest("/toolhub", router(state));
//! ```
//!
//! ## Library
//!
//! The tools are plain functions and work without a database:
//! ```rust
//! use toolhub::tools::{run_tool, ToolId};
//!
//! let out = run_tool(ToolId::Base64, serde_json::json!({ "text": "hi" })).unwrap();
//! assert_eq!(out["output"], "aGk=");
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod tools;

// Enabled behind the `server` feature so the core library can be used without Axum.
#[cfg(feature = "server")]
pub mod server;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;

#[cfg(feature = "server")]
pub use server::*;
