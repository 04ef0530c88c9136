use async_trait::async_trait;
use bytes::Bytes;
use crates::{
    domain::value_objects::generation::{
        InlineImage, SpeechAudio, VideoOperation, VideoRequest,
    },
    genai::gemini_client::GeminiClient,
};
use thiserror::Error;

pub use crates::genai::gemini_client::GenAiError;

/// Seam between the use cases and the remote generation API, so tests can
/// script responses without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenAiGateway: Send + Sync {
    async fn generate_speech(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<SpeechAudio, GenAiError>;

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<InlineImage, GenAiError>;

    async fn submit_video_job(&self, request: &VideoRequest)
    -> Result<VideoOperation, GenAiError>;

    async fn poll_video_job(&self, name: &str) -> Result<VideoOperation, GenAiError>;

    async fn fetch_video(&self, uri: &str) -> Result<Bytes, GenAiError>;
}

#[async_trait]
impl GenAiGateway for GeminiClient {
    async fn generate_speech(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<SpeechAudio, GenAiError> {
        self.generate_speech(text, voice_id).await
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<InlineImage, GenAiError> {
        self.generate_image(prompt, aspect_ratio).await
    }

    async fn submit_video_job(
        &self,
        request: &VideoRequest,
    ) -> Result<VideoOperation, GenAiError> {
        self.submit_video_job(request).await
    }

    async fn poll_video_job(&self, name: &str) -> Result<VideoOperation, GenAiError> {
        self.poll_video_job(name).await
    }

    async fn fetch_video(&self, uri: &str) -> Result<Bytes, GenAiError> {
        self.fetch_video(uri).await
    }
}

/// Failure taxonomy shared by the three generation use cases. Entitlement
/// denial is *not* here: it is an outcome, not a fault.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("profile not found")]
    ProfileNotFound,

    #[error("unknown voice: {0}")]
    UnknownVoice(String),

    #[error("generation credentials rejected: {0}")]
    Credential(String),

    #[error("no {0} was produced")]
    NothingGenerated(&'static str),

    #[error("generation service error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("generation service unreachable")]
    Transport,

    #[error("video render did not finish within the polling deadline")]
    DeadlineExceeded,

    #[error("video render was canceled")]
    Canceled,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GenerationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            GenerationError::ProfileNotFound => StatusCode::NOT_FOUND,
            GenerationError::UnknownVoice(_) => StatusCode::BAD_REQUEST,
            GenerationError::Credential(_)
            | GenerationError::NothingGenerated(_)
            | GenerationError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            GenerationError::Transport => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::Canceled => StatusCode::REQUEST_TIMEOUT,
            GenerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GenAiError> for GenerationError {
    fn from(err: GenAiError) -> Self {
        match err {
            GenAiError::Credential(message) => GenerationError::Credential(message),
            GenAiError::EmptyPayload(what) => GenerationError::NothingGenerated(what),
            GenAiError::JobFailed(message) => GenerationError::Upstream {
                status: 502,
                message,
            },
            GenAiError::Api { status, message } => GenerationError::Upstream {
                status: status.as_u16(),
                message,
            },
            GenAiError::Malformed(message) => GenerationError::Upstream {
                status: 502,
                message,
            },
            GenAiError::Transport(_) => GenerationError::Transport,
        }
    }
}
