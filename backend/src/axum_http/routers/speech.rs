use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::profiles::ProfileRepository,
        value_objects::{
            enums::features::Feature,
            generation::{SpeechRequest, VOICES},
        },
    },
    genai::gemini_client::GeminiClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
    },
};
use serde::Deserialize;

use crate::auth::SessionUser;
use crate::axum_http::error_responses::AppError;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::{
    entitlement::EntitlementEvaluator,
    gateway::GenAiGateway,
    speech::{SpeechOutcome, SpeechUseCase},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    genai: Arc<GeminiClient>,
    config: &DotEnvyConfig,
) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let evaluator = EntitlementEvaluator::new(config.admin.email.clone());
    let speech_usecase = SpeechUseCase::new(Arc::new(profile_repository), genai, evaluator);

    Router::new()
        .route("/generate", post(generate))
        .route("/preview", post(preview))
        .route("/voices", get(list_voices))
        .with_state(Arc::new(speech_usecase))
}

pub async fn generate<P, G>(
    State(speech_usecase): State<Arc<SpeechUseCase<P, G>>>,
    session: SessionUser,
    Json(body): Json<SpeechRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    match speech_usecase.generate(&session.email, body).await? {
        SpeechOutcome::Generated(generated) => Ok((
            [
                (header::CONTENT_TYPE, "audio/wav".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"voice.wav\"".to_string(),
                ),
            ],
            generated.wav,
        )),
        SpeechOutcome::PaymentRequired => Err(AppError::PaymentRequired(Feature::Voice)),
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub voice_id: String,
}

pub async fn preview<P, G>(
    State(speech_usecase): State<Arc<SpeechUseCase<P, G>>>,
    session: SessionUser,
    Json(body): Json<PreviewRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    let wav = speech_usecase.preview(&session.email, &body.voice_id).await?;
    Ok(([(header::CONTENT_TYPE, "audio/wav".to_string())], wav))
}

pub async fn list_voices() -> impl IntoResponse {
    Json(VOICES)
}
