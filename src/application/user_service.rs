use super::{optional, ServiceError};
use crate::domain::{normalize_email, Role, User};
use crate::infrastructure::{hash_password, verify_password, UserRepository};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

pub struct UserService<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserService<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Creates a user, hashing `password` when one is given. Users without a
    /// password cannot log in with credentials.
    pub async fn create_user(
        &self,
        email: &str,
        name: Option<String>,
        password: Option<&str>,
        role: Role,
    ) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::Validation(format!(
                "'{}' is not an email address",
                email
            )));
        }

        let password_hash = match password {
            Some(p) if p.len() < MIN_PASSWORD_LEN => {
                return Err(ServiceError::Validation(format!(
                    "password must be at least {} characters",
                    MIN_PASSWORD_LEN
                )));
            }
            Some(p) => Some(hash_password(p)?),
            None => None,
        };

        let user = User::new(email, name, password_hash, role);
        self.user_repo.create(&user).await?;
        info!(user_id = %user.id, role = %user.role, "Created user");

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(optional(self.user_repo.get_by_id(id).await)?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let email = normalize_email(email);
        Ok(optional(self.user_repo.get_by_email(&email).await)?)
    }

    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, ServiceError> {
        Ok(self.user_repo.list(limit, offset).await?)
    }

    pub async fn update_role(&self, id: Uuid, role: Role) -> Result<User, ServiceError> {
        self.user_repo.update_role(id, role).await?;
        info!(user_id = %id, role = %role, "Updated user role");
        Ok(self.user_repo.get_by_id(id).await?)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ServiceError> {
        self.user_repo.delete(id).await?;
        info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// `Ok(None)` for an unknown email, a password-less account or a wrong password.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, ServiceError> {
        let Some(user) = self.get_user_by_email(email).await? else {
            return Ok(None);
        };

        let Some(hash) = user.password_hash.as_deref() else {
            warn!(user_id = %user.id, "Credential login attempted for account without password");
            return Ok(None);
        };

        if verify_password(password, hash)? {
            Ok(Some(user))
        } else {
            warn!(user_id = %user.id, "Rejected login with wrong password");
            Ok(None)
        }
    }
}
