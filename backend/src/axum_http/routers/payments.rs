use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::profiles::ProfileRepository,
        value_objects::enums::features::Feature,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
    },
};
use serde::Deserialize;

use crate::auth::SessionUser;
use crate::axum_http::error_responses::AppError;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::payments::PaymentUseCase;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: &DotEnvyConfig) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let payments_usecase = PaymentUseCase::new(
        Arc::new(profile_repository),
        config.payment_account.clone(),
    );

    Router::new()
        .route("/confirm", post(confirm))
        .route("/instructions/:feature", get(instructions))
        .with_state(Arc::new(payments_usecase))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub reference: String,
}

pub async fn confirm<P>(
    State(payments_usecase): State<Arc<PaymentUseCase<P>>>,
    session: SessionUser,
    Json(body): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    payments_usecase
        .submit_reference(&session.email, &body.reference)
        .await?;
    Ok(Json(serde_json::json!({ "status": "pending" })))
}

pub async fn instructions<P>(
    State(payments_usecase): State<Arc<PaymentUseCase<P>>>,
    _session: SessionUser,
    Path(feature): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    let feature = Feature::from_str(&feature)
        .ok_or_else(|| AppError::BadRequest(format!("unknown feature: {feature}")))?;

    let instructions = payments_usecase.instructions(feature)?;
    Ok(Json(instructions))
}
