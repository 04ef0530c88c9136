use anyhow::{Ok, Result};
use std::time::Duration;

use super::config_model::{
    Admin, Database, DotEnvyConfig, Gemini, PaymentAccount, Server, SessionAuth, VideoPolling,
};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let gemini = Gemini {
        api_key: std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY is invalid"),
        base_url: std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
    };

    let session = get_session_auth()?;

    let admin = Admin {
        email: std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL is invalid"),
    };

    let video_polling = VideoPolling {
        interval: Duration::from_secs(
            std::env::var("VIDEO_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
        ),
        max_attempts: std::env::var("VIDEO_POLL_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "90".to_string())
            .parse()?,
    };

    let payment_account = PaymentAccount {
        wallet_number: std::env::var("PAYMENT_WALLET_NUMBER")
            .expect("PAYMENT_WALLET_NUMBER is invalid"),
        wallet_name: std::env::var("PAYMENT_WALLET_NAME")
            .expect("PAYMENT_WALLET_NAME is invalid"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        gemini,
        session,
        admin,
        video_polling,
        payment_account,
    })
}

pub fn get_session_auth() -> Result<SessionAuth> {
    dotenvy::dotenv().ok();

    Ok(SessionAuth {
        jwt_secret: std::env::var("SESSION_JWT_SECRET").expect("SESSION_JWT_SECRET is invalid"),
        ttl_seconds: std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()?,
    })
}
