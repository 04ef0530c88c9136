use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use crates::domain::{
    repositories::profiles::ProfileRepository,
    value_objects::{enums::features::Feature, generation::VideoRequest},
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::config_model::VideoPolling;
use crate::usecases::{
    entitlement::EntitlementEvaluator,
    gateway::{GenAiGateway, GenerationError},
};

/// Rotating status line shown while a render is in flight. Purely
/// cosmetic; one entry per poll tick, wrapping around.
pub const PROGRESS_MESSAGES: [&str; 5] = [
    "Storyboarding your prompt...",
    "Rendering frames...",
    "Compositing motion...",
    "Color grading the cut...",
    "Packaging the final video...",
];

#[derive(Debug)]
pub enum VideoOutcome {
    Generated(GeneratedVideo),
    PaymentRequired,
}

#[derive(Debug)]
pub struct GeneratedVideo {
    pub data: Bytes,
    pub mime_type: &'static str,
}

pub struct VideoUseCase<P, G>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    profile_repository: Arc<P>,
    genai: Arc<G>,
    evaluator: EntitlementEvaluator,
    polling: VideoPolling,
}

impl<P, G> VideoUseCase<P, G>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    pub fn new(
        profile_repository: Arc<P>,
        genai: Arc<G>,
        evaluator: EntitlementEvaluator,
        polling: VideoPolling,
    ) -> Self {
        Self {
            profile_repository,
            genai,
            evaluator,
            polling,
        }
    }

    /// Submits a render job and drives it to completion: poll at a fixed
    /// interval until the operation reports done, then fetch the result.
    /// The loop is bounded by `max_attempts` and aborts early when the
    /// cancel signal flips; the remote job itself keeps running either
    /// way — there is no server-side cancel.
    pub async fn generate(
        &self,
        email: &str,
        request: VideoRequest,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<VideoOutcome, GenerationError> {
        let profile = self
            .profile_repository
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(email, db_error = ?err, "videos: failed to load profile");
                GenerationError::Internal(err)
            })?
            .ok_or(GenerationError::ProfileNotFound)?;

        // Video has no free tier: admin or an active voice subscription.
        if !self
            .evaluator
            .is_allowed(&profile, Feature::Video, 1, Utc::now())
        {
            info!(email, "videos: no active subscription, payment required");
            return Ok(VideoOutcome::PaymentRequired);
        }

        let job_id = Uuid::new_v4();
        info!(
            email,
            %job_id,
            aspect_ratio = %request.aspect_ratio,
            resolution = %request.resolution,
            "videos: submitting render job"
        );

        let mut operation = self.genai.submit_video_job(&request).await.map_err(|err| {
            warn!(email, %job_id, error = %err, "videos: job submission failed");
            GenerationError::from(err)
        })?;

        let mut attempts: u32 = 0;
        while !operation.done {
            if *cancel.borrow() {
                info!(email, %job_id, attempts, "videos: canceled while polling");
                return Err(GenerationError::Canceled);
            }

            if attempts >= self.polling.max_attempts {
                warn!(
                    email,
                    %job_id,
                    attempts,
                    "videos: render exceeded the polling deadline"
                );
                return Err(GenerationError::DeadlineExceeded);
            }

            let progress = PROGRESS_MESSAGES[attempts as usize % PROGRESS_MESSAGES.len()];
            info!(
                email,
                %job_id,
                attempt = attempts + 1,
                progress,
                "videos: render in progress"
            );

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_ok() && *cancel.borrow() {
                        info!(email, %job_id, attempts, "videos: canceled while polling");
                        return Err(GenerationError::Canceled);
                    }
                    // Cancel handle dropped; keep the pacing.
                    tokio::time::sleep(self.polling.interval).await;
                }
                _ = tokio::time::sleep(self.polling.interval) => {}
            }

            operation = self
                .genai
                .poll_video_job(&operation.name)
                .await
                .map_err(|err| {
                    warn!(email, %job_id, error = %err, "videos: poll failed");
                    GenerationError::from(err)
                })?;
            attempts += 1;
        }

        let uri = operation
            .result_uri
            .as_deref()
            .ok_or(GenerationError::NothingGenerated("video"))?;

        info!(email, %job_id, attempts, "videos: render complete, fetching result");

        let data = self.genai.fetch_video(uri).await.map_err(|err| {
            warn!(email, %job_id, error = %err, "videos: result fetch failed");
            GenerationError::from(err)
        })?;

        info!(email, %job_id, bytes = data.len(), "videos: result ready");

        Ok(VideoOutcome::Generated(GeneratedVideo {
            data,
            mime_type: "video/mp4",
        }))
    }
}
