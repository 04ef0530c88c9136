use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub gemini: Gemini,
    pub session: SessionAuth,
    pub admin: Admin,
    pub video_polling: VideoPolling,
    pub payment_account: PaymentAccount,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Gemini {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SessionAuth {
    pub jwt_secret: String,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Admin {
    pub email: String,
}

/// Pacing and bound of the video LRO poll loop. The bound keeps a stuck
/// remote job from pinning a request forever.
#[derive(Debug, Clone)]
pub struct VideoPolling {
    pub interval: Duration,
    pub max_attempts: u32,
}

/// Manual-transfer account shown in payment instructions.
#[derive(Debug, Clone)]
pub struct PaymentAccount {
    pub wallet_number: String,
    pub wallet_name: String,
}
