use super::{ServiceError, UserService};
use crate::domain::User;
use crate::infrastructure::{SessionError, SessionIdentity, SessionTokens, UserRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

pub struct AuthService<U>
where
    U: UserRepository,
{
    users: Arc<UserService<U>>,
    tokens: Arc<SessionTokens>,
}

impl<U> AuthService<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<UserService<U>>, tokens: Arc<SessionTokens>) -> Self {
        Self { users, tokens }
    }

    /// Checks credentials and issues a session token carrying the user's
    /// current role.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .users
            .authenticate(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.tokens.issue(user.id, user.role)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome { token, user })
    }

    pub fn verify(&self, token: &str) -> Result<SessionIdentity, AuthError> {
        Ok(self.tokens.verify(token)?)
    }
}
