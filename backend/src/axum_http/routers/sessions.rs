use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::repositories::profiles::ProfileRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
    },
};
use serde::Deserialize;

use crate::auth::SessionUser;
use crate::axum_http::error_responses::AppError;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::sessions::SessionUseCase;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: &DotEnvyConfig) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let sessions_usecase = SessionUseCase::new(
        Arc::new(profile_repository),
        config.session.clone(),
        config.admin.email.clone(),
    );

    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(Arc::new(sessions_usecase))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

pub async fn login<P>(
    State(sessions_usecase): State<Arc<SessionUseCase<P>>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    let session = sessions_usecase.login_or_register(&body.email).await?;
    Ok(Json(session))
}

pub async fn me<P>(
    State(sessions_usecase): State<Arc<SessionUseCase<P>>>,
    session: SessionUser,
) -> Result<impl IntoResponse, AppError>
where
    P: ProfileRepository + Send + Sync + 'static,
{
    let profile = sessions_usecase.current_profile(&session.email).await?;
    Ok(Json(profile))
}
