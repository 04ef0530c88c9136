use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
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
        .route("/profiles", get(list_profiles))
        .route("/approve", post(approve))
        .with_state(Arc::new(payments_usecase))
}

pub async fn list_profiles<P>(
    State(payments_usecase): State<Arc<PaymentUseCase<P>>>,
    session: SessionUser,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    if !session.is_admin() {
        return Err(AppError::Forbidden);
    }

    let profiles = payments_usecase.list_profiles().await?;
    Ok(Json(profiles))
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub email: String,
    pub feature: Feature,
}

pub async fn approve<P>(
    State(payments_usecase): State<Arc<PaymentUseCase<P>>>,
    session: SessionUser,
    Json(body): Json<ApproveRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    if !session.is_admin() {
        return Err(AppError::Forbidden);
    }

    let expires_at = payments_usecase.approve(&body.email, body.feature).await?;
    Ok(Json(serde_json::json!({
        "status": "approved",
        "email": body.email,
        "feature": body.feature,
        "expires_at": expires_at,
    })))
}
