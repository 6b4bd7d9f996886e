pub mod auth_service;
pub mod plan_service;
pub mod plan_tool_service;
pub mod seed;
pub mod subscription_service;
pub mod tool_runner;
pub mod usage_service;
pub mod user_service;

pub use auth_service::*;
pub use plan_service::*;
pub use plan_tool_service::*;
pub use seed::*;
pub use subscription_service::*;
pub use tool_runner::*;
pub use usage_service::*;
pub use user_service::*;

use crate::infrastructure::{PasswordError, RepositoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_) | ServiceError::Repository(RepositoryError::NotFound(_))
        )
    }
}

/// Turns a repository `NotFound` into `None`, leaving real failures intact.
pub(crate) fn optional<T>(result: Result<T, RepositoryError>) -> Result<Option<T>, RepositoryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RepositoryError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
