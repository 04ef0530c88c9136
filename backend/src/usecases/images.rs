use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    repositories::profiles::ProfileRepository,
    value_objects::{
        enums::features::Feature,
        generation::{ImageRequest, InlineImage},
    },
};
use tracing::{error, info, warn};

use crate::usecases::{
    entitlement::EntitlementEvaluator,
    gateway::{GenAiGateway, GenerationError},
};

#[derive(Debug)]
pub enum ImageOutcome {
    Generated(InlineImage),
    PaymentRequired,
}

pub struct ImageUseCase<P, G>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    profile_repository: Arc<P>,
    genai: Arc<G>,
    evaluator: EntitlementEvaluator,
}

impl<P, G> ImageUseCase<P, G>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    pub fn new(
        profile_repository: Arc<P>,
        genai: Arc<G>,
        evaluator: EntitlementEvaluator,
    ) -> Self {
        Self {
            profile_repository,
            genai,
            evaluator,
        }
    }

    pub async fn generate(
        &self,
        email: &str,
        request: ImageRequest,
    ) -> Result<ImageOutcome, GenerationError> {
        let profile = self
            .profile_repository
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(email, db_error = ?err, "images: failed to load profile");
                GenerationError::Internal(err)
            })?
            .ok_or(GenerationError::ProfileNotFound)?;

        if !self
            .evaluator
            .is_allowed(&profile, Feature::Image, 1, Utc::now())
        {
            info!(
                email,
                used = profile.image_count,
                "images: free quota exhausted, payment required"
            );
            return Ok(ImageOutcome::PaymentRequired);
        }

        let image = self
            .genai
            .generate_image(&request.prompt, request.aspect_ratio.as_str())
            .await
            .map_err(|err| {
                warn!(email, error = %err, "images: generation failed");
                GenerationError::from(err)
            })?;

        if !self.evaluator.is_admin(email) {
            // Counter drift on failure is accepted; the image was already
            // produced upstream.
            if let Err(err) = self.profile_repository.increment_image_count(email, 1).await {
                error!(
                    email,
                    db_error = ?err,
                    "images: generated but failed to record usage"
                );
            }
        }

        info!(email, mime_type = %image.mime_type, "images: generated");
        Ok(ImageOutcome::Generated(image))
    }
}
