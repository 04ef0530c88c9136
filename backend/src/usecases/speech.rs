use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    repositories::profiles::ProfileRepository,
    value_objects::{
        enums::features::Feature,
        generation::{SpeechRequest, is_known_voice},
    },
};
use tracing::{error, info, warn};

use crate::usecases::{
    entitlement::EntitlementEvaluator,
    gateway::{GenAiGateway, GenerationError},
};

/// Fixed phrase used when a user auditions a voice. Preview playback is
/// free: it never counts against the character quota.
pub const PREVIEW_PHRASE: &str = "Halo";

#[derive(Debug)]
pub enum SpeechOutcome {
    Generated(GeneratedSpeech),
    /// Quota exhausted and no subscription: the caller should open the
    /// payment flow. Not a failure.
    PaymentRequired,
}

#[derive(Debug)]
pub struct GeneratedSpeech {
    pub wav: Vec<u8>,
    pub char_count: i64,
}

pub struct SpeechUseCase<P, G>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    profile_repository: Arc<P>,
    genai: Arc<G>,
    evaluator: EntitlementEvaluator,
}

impl<P, G> SpeechUseCase<P, G>
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
        request: SpeechRequest,
    ) -> Result<SpeechOutcome, GenerationError> {
        if !is_known_voice(&request.voice_id) {
            return Err(GenerationError::UnknownVoice(request.voice_id));
        }

        let char_count = request.text.chars().count() as i64;

        let profile = self
            .profile_repository
            .find_by_email(email)
            .await
            .map_err(|err| {
                error!(email, db_error = ?err, "speech: failed to load profile");
                GenerationError::Internal(err)
            })?
            .ok_or(GenerationError::ProfileNotFound)?;

        if !self
            .evaluator
            .is_allowed(&profile, Feature::Voice, char_count, Utc::now())
        {
            info!(
                email,
                char_count,
                used = profile.char_count,
                "speech: free quota exhausted, payment required"
            );
            return Ok(SpeechOutcome::PaymentRequired);
        }

        let audio = self
            .genai
            .generate_speech(&request.text, &request.voice_id)
            .await
            .map_err(|err| {
                warn!(email, error = %err, "speech: generation failed");
                GenerationError::from(err)
            })?;

        if !self.evaluator.is_admin(email) {
            // Counter drift on failure is accepted; the audio was already
            // produced upstream.
            if let Err(err) = self
                .profile_repository
                .increment_char_count(email, char_count)
                .await
            {
                error!(
                    email,
                    char_count,
                    db_error = ?err,
                    "speech: generated but failed to record usage"
                );
            }
        }

        info!(email, char_count, "speech: generated");

        Ok(SpeechOutcome::Generated(GeneratedSpeech {
            wav: audio.to_wav(),
            char_count,
        }))
    }

    /// Plays a short fixed sample of a voice. Ungated and unmetered.
    pub async fn preview(&self, email: &str, voice_id: &str) -> Result<Vec<u8>, GenerationError> {
        if !is_known_voice(voice_id) {
            return Err(GenerationError::UnknownVoice(voice_id.to_string()));
        }

        let audio = self
            .genai
            .generate_speech(PREVIEW_PHRASE, voice_id)
            .await
            .map_err(|err| {
                warn!(email, voice_id, error = %err, "speech: preview failed");
                GenerationError::from(err)
            })?;

        info!(email, voice_id, "speech: preview generated");
        Ok(audio.to_wav())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crates::domain::{
        entities::profiles::ProfileEntity,
        repositories::profiles::MockProfileRepository,
        value_objects::generation::SpeechAudio,
    };
    use crates::genai::gemini_client::GenAiError;

    use crate::usecases::gateway::MockGenAiGateway;

    const ADMIN: &str = "admin@voxgen.dev";

    fn evaluator() -> EntitlementEvaluator {
        EntitlementEvaluator::new(ADMIN.to_string())
    }

    fn entity(email: &str, char_count: i64) -> ProfileEntity {
        ProfileEntity {
            email: email.to_string(),
            char_count,
            image_count: 0,
            voice_premium_expiry: None,
            image_premium_expiry: None,
            payment_status: "none".to_string(),
            last_payment_ref: None,
            created_at: Utc::now(),
        }
    }

    fn audio() -> SpeechAudio {
        SpeechAudio {
            pcm: vec![0u8; 96],
            sample_rate: 24_000,
            channels: 1,
        }
    }

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            voice_id: "Kore".to_string(),
        }
    }

    #[tokio::test]
    async fn generation_within_quota_increments_usage_by_text_length() {
        let mut repo = MockProfileRepository::new();
        let mut genai = MockGenAiGateway::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, 0))));
        genai
            .expect_generate_speech()
            .withf(|text, voice| text.chars().count() == 500 && voice == "Kore")
            .returning(|_, _| Ok(audio()));
        repo.expect_increment_char_count()
            .withf(|email, by| email == "user@example.com" && *by == 500)
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let text = "a".repeat(500);
        let outcome = usecase
            .generate("user@example.com", request(&text))
            .await
            .unwrap();

        match outcome {
            SpeechOutcome::Generated(generated) => {
                assert_eq!(generated.char_count, 500);
                assert_eq!(&generated.wav[0..4], b"RIFF");
            }
            SpeechOutcome::PaymentRequired => panic!("expected generation"),
        }
    }

    #[tokio::test]
    async fn exceeding_the_quota_requires_payment_without_calling_the_api() {
        let mut repo = MockProfileRepository::new();
        let mut genai = MockGenAiGateway::new();

        // 500 already used; 600 more would cross the 1000 limit.
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, 500))));
        genai.expect_generate_speech().times(0);
        repo.expect_increment_char_count().times(0);

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let text = "a".repeat(600);
        let outcome = usecase
            .generate("user@example.com", request(&text))
            .await
            .unwrap();

        assert!(matches!(outcome, SpeechOutcome::PaymentRequired));
    }

    #[tokio::test]
    async fn subscribed_user_generates_past_the_quota_and_still_accrues_usage() {
        let mut repo = MockProfileRepository::new();
        let mut genai = MockGenAiGateway::new();

        repo.expect_find_by_email().returning(|email| {
            let mut profile = entity(email, 5_000);
            profile.voice_premium_expiry = Some(Utc::now() + Duration::days(7));
            Ok(Some(profile))
        });
        genai
            .expect_generate_speech()
            .returning(|_, _| Ok(audio()));
        repo.expect_increment_char_count()
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let outcome = usecase
            .generate("user@example.com", request("subscribed text"))
            .await
            .unwrap();

        assert!(matches!(outcome, SpeechOutcome::Generated(_)));
    }

    #[tokio::test]
    async fn admin_generation_is_never_metered() {
        let mut repo = MockProfileRepository::new();
        let mut genai = MockGenAiGateway::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, 1_000_000))));
        genai
            .expect_generate_speech()
            .returning(|_, _| Ok(audio()));
        repo.expect_increment_char_count().times(0);

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let outcome = usecase.generate(ADMIN, request("admin text")).await.unwrap();

        assert!(matches!(outcome, SpeechOutcome::Generated(_)));
    }

    #[tokio::test]
    async fn preview_never_touches_the_counter() {
        let repo = {
            let mut repo = MockProfileRepository::new();
            repo.expect_increment_char_count().times(0);
            repo.expect_find_by_email().times(0);
            repo
        };
        let mut genai = MockGenAiGateway::new();
        genai
            .expect_generate_speech()
            .withf(|text, voice| text == PREVIEW_PHRASE && voice == "Zephyr")
            .returning(|_, _| Ok(audio()));

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let wav = usecase.preview("user@example.com", "Zephyr").await.unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn credential_rejection_is_surfaced_distinctly() {
        let mut repo = MockProfileRepository::new();
        let mut genai = MockGenAiGateway::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, 0))));
        genai.expect_generate_speech().returning(|_, _| {
            Err(GenAiError::Credential("API key not valid".to_string()))
        });
        repo.expect_increment_char_count().times(0);

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let result = usecase.generate("user@example.com", request("hello")).await;

        assert!(matches!(result, Err(GenerationError::Credential(_))));
    }

    #[tokio::test]
    async fn missing_audio_payload_is_a_generation_failure() {
        let mut repo = MockProfileRepository::new();
        let mut genai = MockGenAiGateway::new();

        repo.expect_find_by_email()
            .returning(|email| Ok(Some(entity(email, 0))));
        genai
            .expect_generate_speech()
            .returning(|_, _| Err(GenAiError::EmptyPayload("audio")));

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let result = usecase.generate("user@example.com", request("hello")).await;

        assert!(matches!(
            result,
            Err(GenerationError::NothingGenerated("audio"))
        ));
    }

    #[tokio::test]
    async fn unknown_voice_is_rejected_up_front() {
        let repo = MockProfileRepository::new();
        let genai = MockGenAiGateway::new();

        let usecase = SpeechUseCase::new(Arc::new(repo), Arc::new(genai), evaluator());
        let result = usecase
            .generate(
                "user@example.com",
                SpeechRequest {
                    text: "hi".to_string(),
                    voice_id: "NotAVoice".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(GenerationError::UnknownVoice(_))));
    }
}
