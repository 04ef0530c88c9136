use std::sync::Arc;

use crates::domain::{
    entities::profiles::InsertProfileEntity,
    repositories::profiles::ProfileRepository,
    value_objects::profiles::ProfileDto,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::{self, ROLE_ADMIN, ROLE_USER};
use crate::config::config_model::SessionAuth;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("profile not found")]
    ProfileNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SessionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SessionError::InvalidEmail => StatusCode::BAD_REQUEST,
            SessionError::ProfileNotFound => StatusCode::NOT_FOUND,
            SessionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub token: String,
    pub profile: ProfileDto,
}

/// Login and first-time registration are the same operation: identity is
/// the email, there is no password and no proof of ownership.
pub struct SessionUseCase<P>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    profile_repository: Arc<P>,
    session: SessionAuth,
    admin_email: String,
}

impl<P> SessionUseCase<P>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    pub fn new(profile_repository: Arc<P>, session: SessionAuth, admin_email: String) -> Self {
        Self {
            profile_repository,
            session,
            admin_email,
        }
    }

    pub async fn login_or_register(&self, email: &str) -> Result<SessionDto, SessionError> {
        let email = email.trim().to_ascii_lowercase();
        if email.is_empty() || !email.contains('@') {
            let err = SessionError::InvalidEmail;
            warn!(
                status = err.status_code().as_u16(),
                "sessions: rejected login with malformed email"
            );
            return Err(err);
        }

        let existing = self
            .profile_repository
            .find_by_email(&email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "sessions: failed to look up profile");
                SessionError::Internal(err)
            })?;

        let profile = match existing {
            Some(profile) => {
                info!(email = %profile.email, "sessions: existing profile logged in");
                profile
            }
            None => {
                let created = self
                    .profile_repository
                    .create(InsertProfileEntity::fresh(email.clone()))
                    .await
                    .map_err(|err| {
                        error!(db_error = ?err, "sessions: failed to create profile");
                        SessionError::Internal(err)
                    })?;
                info!(email = %created.email, "sessions: new profile registered");
                created
            }
        };

        let role = if profile.email == self.admin_email {
            ROLE_ADMIN
        } else {
            ROLE_USER
        };

        let token = auth::issue_session_token(&profile.email, role, &self.session)
            .map_err(SessionError::Internal)?;

        Ok(SessionDto {
            token,
            profile: ProfileDto::from(profile),
        })
    }

    /// Resolves a session identity to its profile; the client polls this
    /// while a generation tab is open.
    pub async fn current_profile(&self, email: &str) -> Result<ProfileDto, SessionError> {
        let profile = self
            .profile_repository
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "sessions: failed to load current profile");
                SessionError::Internal(err)
            })?
            .ok_or(SessionError::ProfileNotFound)?;

        Ok(ProfileDto::from(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::profiles::ProfileEntity,
        repositories::profiles::MockProfileRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    };

    const ADMIN: &str = "admin@voxgen.dev";

    fn session_config() -> SessionAuth {
        SessionAuth {
            jwt_secret: "unit-test-session-secret-0123456789".to_string(),
            ttl_seconds: 3600,
        }
    }

    fn entity(email: &str) -> ProfileEntity {
        ProfileEntity {
            email: email.to_string(),
            char_count: 0,
            image_count: 0,
            voice_premium_expiry: None,
            image_premium_expiry: None,
            payment_status: "none".to_string(),
            last_payment_ref: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_login_registers_a_zeroed_profile() {
        let mut repo = MockProfileRepository::new();

        repo.expect_find_by_email()
            .withf(|email| email == "new@example.com")
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|insert| {
                insert.email == "new@example.com"
                    && insert.char_count == 0
                    && insert.image_count == 0
                    && insert.payment_status == "none"
            })
            .returning(|insert| Ok(entity(&insert.email)));

        let usecase = SessionUseCase::new(Arc::new(repo), session_config(), ADMIN.to_string());
        let session = usecase.login_or_register("new@example.com").await.unwrap();

        assert_eq!(session.profile.email, "new@example.com");
        assert_eq!(session.profile.char_count, 0);
        assert_eq!(session.profile.image_count, 0);
        assert_eq!(session.profile.payment_status, PaymentStatus::None);
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn repeat_login_reuses_the_existing_profile() {
        let mut repo = MockProfileRepository::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email))));
        repo.expect_create().times(0);

        let usecase = SessionUseCase::new(Arc::new(repo), session_config(), ADMIN.to_string());
        let session = usecase.login_or_register("Known@Example.com").await.unwrap();

        // identity is normalized before hitting the store
        assert_eq!(session.profile.email, "known@example.com");
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_before_touching_the_store() {
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_email().times(0);
        repo.expect_create().times(0);

        let usecase = SessionUseCase::new(Arc::new(repo), session_config(), ADMIN.to_string());
        let result = usecase.login_or_register("   ").await;

        assert!(matches!(result, Err(SessionError::InvalidEmail)));
    }

    #[tokio::test]
    async fn current_profile_for_unknown_identity_is_not_found() {
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let usecase = SessionUseCase::new(Arc::new(repo), session_config(), ADMIN.to_string());
        let result = usecase.current_profile("gone@example.com").await;

        assert!(matches!(result, Err(SessionError::ProfileNotFound)));
    }
}
