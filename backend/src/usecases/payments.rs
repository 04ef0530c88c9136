use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    repositories::profiles::ProfileRepository,
    value_objects::{
        enums::features::Feature,
        profiles::{
            PRICE_IMAGE_MINOR, PRICE_VOICE_MINOR, PaymentInstructionsDto, ProfileDto,
            SUBSCRIPTION_DAYS,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::config_model::PaymentAccount;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("profile not found")]
    ProfileNotFound,
    #[error("a payment reference is required")]
    MissingReference,
    #[error("payments apply to the voice or image feature only")]
    UnsupportedFeature,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::ProfileNotFound => StatusCode::NOT_FOUND,
            PaymentError::MissingReference | PaymentError::UnsupportedFeature => {
                StatusCode::BAD_REQUEST
            }
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Manual bank-transfer workflow: a denied user submits a transfer
/// reference, a human matches it against the account statement, and an
/// admin approval opens a 30-day premium window. There is no reject
/// transition; an unmatched reference just stays pending.
pub struct PaymentUseCase<P>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    profile_repository: Arc<P>,
    payment_account: PaymentAccount,
}

impl<P> PaymentUseCase<P>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    pub fn new(profile_repository: Arc<P>, payment_account: PaymentAccount) -> Self {
        Self {
            profile_repository,
            payment_account,
        }
    }

    /// User-side half of the workflow: store the reference and move the
    /// profile to `pending`. Resubmission overwrites a previous reference,
    /// whatever the current status — approval after a lapse re-enters here.
    pub async fn submit_reference(
        &self,
        email: &str,
        reference: &str,
    ) -> Result<(), PaymentError> {
        let reference = reference.trim();
        if reference.is_empty() {
            let err = PaymentError::MissingReference;
            warn!(
                email,
                status = err.status_code().as_u16(),
                "payments: empty reference submitted"
            );
            return Err(err);
        }

        self.profile_repository
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(email, db_error = ?err, "payments: failed to load profile");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::ProfileNotFound)?;

        self.profile_repository
            .set_payment_pending(email, reference)
            .await
            .map_err(|err| {
                error!(email, db_error = ?err, "payments: failed to persist pending payment");
                PaymentError::Internal(err)
            })?;

        info!(email, "payments: reference submitted, awaiting review");
        Ok(())
    }

    /// Admin-side half: approve one email for one feature. Only the named
    /// feature's expiry moves; video is unlocked implicitly through voice.
    pub async fn approve(
        &self,
        email: &str,
        feature: Feature,
    ) -> Result<DateTime<Utc>, PaymentError> {
        if feature == Feature::Video {
            let err = PaymentError::UnsupportedFeature;
            warn!(
                email,
                status = err.status_code().as_u16(),
                "payments: video cannot be approved directly"
            );
            return Err(err);
        }

        self.profile_repository
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(email, db_error = ?err, "payments: failed to load profile for approval");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::ProfileNotFound)?;

        let expires_at = Utc::now() + Duration::days(SUBSCRIPTION_DAYS);

        self.profile_repository
            .approve_feature(email, feature, expires_at)
            .await
            .map_err(|err| {
                error!(email, feature = %feature, db_error = ?err, "payments: failed to persist approval");
                PaymentError::Internal(err)
            })?;

        info!(
            email,
            feature = %feature,
            expires_at = %expires_at,
            "payments: approved"
        );

        Ok(expires_at)
    }

    pub fn instructions(&self, feature: Feature) -> Result<PaymentInstructionsDto, PaymentError> {
        let price_minor = match feature {
            Feature::Voice => PRICE_VOICE_MINOR,
            Feature::Image => PRICE_IMAGE_MINOR,
            // Video is sold as the voice subscription.
            Feature::Video => return self.instructions(Feature::Voice),
        };

        Ok(PaymentInstructionsDto {
            feature,
            price_minor,
            wallet_number: self.payment_account.wallet_number.clone(),
            wallet_name: self.payment_account.wallet_name.clone(),
        })
    }

    /// Every profile, newest first, for the admin review screen.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileDto>, PaymentError> {
        let profiles = self.profile_repository.list_all().await.map_err(|err| {
            error!(db_error = ?err, "payments: failed to list profiles");
            PaymentError::Internal(err)
        })?;

        Ok(profiles.into_iter().map(ProfileDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::entities::profiles::ProfileEntity;
    use crates::domain::repositories::profiles::MockProfileRepository;

    fn account() -> PaymentAccount {
        PaymentAccount {
            wallet_number: "0800-000-0000".to_string(),
            wallet_name: "VOXGEN OPERATIONS".to_string(),
        }
    }

    fn entity(email: &str, payment_status: &str) -> ProfileEntity {
        ProfileEntity {
            email: email.to_string(),
            char_count: 0,
            image_count: 0,
            voice_premium_expiry: None,
            image_premium_expiry: None,
            payment_status: payment_status.to_string(),
            last_payment_ref: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn submitting_a_reference_moves_the_profile_to_pending() {
        let mut repo = MockProfileRepository::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, "none"))));
        repo.expect_set_payment_pending()
            .withf(|email, reference| email == "user@example.com" && reference == "BUDI SANTOSO")
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        usecase
            .submit_reference("user@example.com", "  BUDI SANTOSO  ")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn resubmission_after_approval_is_allowed() {
        let mut repo = MockProfileRepository::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, "approved"))));
        repo.expect_set_payment_pending()
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        usecase
            .submit_reference("user@example.com", "SECOND TRANSFER")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_reference_is_rejected() {
        let mut repo = MockProfileRepository::new();
        repo.expect_set_payment_pending().times(0);

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        let result = usecase.submit_reference("user@example.com", "   ").await;

        assert!(matches!(result, Err(PaymentError::MissingReference)));
    }

    #[tokio::test]
    async fn approving_voice_stamps_a_thirty_day_window() {
        let mut repo = MockProfileRepository::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, "pending"))));
        repo.expect_approve_feature()
            .withf(|email, feature, expires_at| {
                let days = (*expires_at - Utc::now()).num_days();
                email == "user@example.com"
                    && *feature == Feature::Voice
                    && (29..=30).contains(&days)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        let expires_at = usecase
            .approve("user@example.com", Feature::Voice)
            .await
            .unwrap();

        let days = (expires_at - Utc::now()).num_days();
        assert!((29..=30).contains(&days));
    }

    #[tokio::test]
    async fn approving_image_never_touches_voice() {
        let mut repo = MockProfileRepository::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, "pending"))));
        repo.expect_approve_feature()
            .withf(|_, feature, _| *feature == Feature::Image)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        usecase
            .approve("user@example.com", Feature::Image)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn video_cannot_be_approved_directly() {
        let mut repo = MockProfileRepository::new();
        repo.expect_approve_feature().times(0);

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        let result = usecase.approve("user@example.com", Feature::Video).await;

        assert!(matches!(result, Err(PaymentError::UnsupportedFeature)));
    }

    #[tokio::test]
    async fn approving_an_unknown_profile_is_not_found() {
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_approve_feature().times(0);

        let usecase = PaymentUseCase::new(Arc::new(repo), account());
        let result = usecase.approve("ghost@example.com", Feature::Voice).await;

        assert!(matches!(result, Err(PaymentError::ProfileNotFound)));
    }

    #[test]
    fn video_instructions_resolve_to_the_voice_subscription() {
        let repo = MockProfileRepository::new();
        let usecase = PaymentUseCase::new(Arc::new(repo), account());

        let instructions = usecase.instructions(Feature::Video).unwrap();
        assert_eq!(instructions.feature, Feature::Voice);
        assert_eq!(instructions.price_minor, PRICE_VOICE_MINOR);

        let image = usecase.instructions(Feature::Image).unwrap();
        assert_eq!(image.price_minor, PRICE_IMAGE_MINOR);
    }
}
