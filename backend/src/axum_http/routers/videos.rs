use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::header, response::IntoResponse, routing::post,
};
use crates::{
    domain::{
        repositories::profiles::ProfileRepository,
        value_objects::{enums::features::Feature, generation::VideoRequest},
    },
    genai::gemini_client::GeminiClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
    },
};
use tokio::sync::watch;

use crate::auth::SessionUser;
use crate::axum_http::error_responses::AppError;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::{
    entitlement::EntitlementEvaluator,
    gateway::GenAiGateway,
    videos::{VideoOutcome, VideoUseCase},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    genai: Arc<GeminiClient>,
    config: &DotEnvyConfig,
) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let evaluator = EntitlementEvaluator::new(config.admin.email.clone());
    let videos_usecase = VideoUseCase::new(
        Arc::new(profile_repository),
        genai,
        evaluator,
        config.video_polling.clone(),
    );

    Router::new()
        .route("/generate", post(generate))
        .with_state(Arc::new(videos_usecase))
}

pub async fn generate<P, G>(
    State(videos_usecase): State<Arc<VideoUseCase<P, G>>>,
    session: SessionUser,
    Json(body): Json<VideoRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    // Dropping this handler (client disconnect) cancels the poll loop via
    // the dropped future; the watch channel is the explicit signal for
    // callers that outlive the request.
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    match videos_usecase
        .generate(&session.email, body, cancel_rx)
        .await?
    {
        VideoOutcome::Generated(video) => Ok((
            [
                (header::CONTENT_TYPE, video.mime_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"video.mp4\"".to_string(),
                ),
            ],
            video.data,
        )),
        // Video is sold as the voice subscription.
        VideoOutcome::PaymentRequired => Err(AppError::PaymentRequired(Feature::Voice)),
    }
}
