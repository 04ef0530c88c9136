use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::header, response::IntoResponse, routing::post,
};
use crates::{
    domain::{
        repositories::profiles::ProfileRepository,
        value_objects::{enums::features::Feature, generation::ImageRequest},
    },
    genai::gemini_client::GeminiClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
    },
};

use crate::auth::SessionUser;
use crate::axum_http::error_responses::AppError;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::{
    entitlement::EntitlementEvaluator,
    gateway::GenAiGateway,
    images::{ImageOutcome, ImageUseCase},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    genai: Arc<GeminiClient>,
    config: &DotEnvyConfig,
) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let evaluator = EntitlementEvaluator::new(config.admin.email.clone());
    let images_usecase = ImageUseCase::new(Arc::new(profile_repository), genai, evaluator);

    Router::new()
        .route("/generate", post(generate))
        .with_state(Arc::new(images_usecase))
}

pub async fn generate<P, G>(
    State(images_usecase): State<Arc<ImageUseCase<P, G>>>,
    session: SessionUser,
    Json(body): Json<ImageRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
    G: GenAiGateway + 'static,
{
    match images_usecase.generate(&session.email, body).await? {
        ImageOutcome::Generated(image) => {
            let extension = mime_guess::get_mime_extensions_str(&image.mime_type)
                .and_then(|extensions| extensions.first())
                .copied()
                .unwrap_or("bin");

            Ok((
                [
                    (header::CONTENT_TYPE, image.mime_type.clone()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"image.{extension}\""),
                    ),
                ],
                image.data,
            ))
        }
        ImageOutcome::PaymentRequired => Err(AppError::PaymentRequired(Feature::Image)),
    }
}
