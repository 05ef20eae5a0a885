//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::entities::users::Role;
use crate::services::auth_service::{
    AuthError, AuthService, AuthSession, Registration, UserProfile,
};
use crate::services::token::TokenService;
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self
            .tokens
            .issue(user.id, user.role)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(AuthSession {
            token,
            user: UserProfile::from(user),
        })
    }
}

/// Emails are compared trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&registration.email);

        if self.store.email_exists(&email).await? {
            return Err(AuthError::UserExists);
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    name: registration.name.trim().to_string(),
                    email,
                    password: registration.password,
                    phone: registration.phone,
                    membership_type: registration.membership_type,
                    role: Role::User,
                },
                &self.security,
            )
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration
                if e.chain().any(|cause| {
                    cause
                        .downcast_ref::<sea_orm::DbErr>()
                        .and_then(sea_orm::DbErr::sql_err)
                        .is_some_and(|sql| {
                            matches!(sql, sea_orm::SqlErr::UniqueConstraintViolation(_))
                        })
                }) {
                    AuthError::UserExists
                } else {
                    AuthError::from(e)
                }
            })?;

        info!(user_id = user.id, "Registered new member");
        self.session_for(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email);

        let user = self
            .store
            .verify_credentials(&email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.session_for(user)
    }

    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .store
            .get_user(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    async fn profile(&self, user_id: i32) -> Result<UserProfile, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Jane.Doe@Gym.COM "), "jane.doe@gym.com");
    }
}
