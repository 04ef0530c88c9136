use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::value_objects::generation::{
    DEFAULT_SPEECH_SAMPLE_RATE, InlineImage, SpeechAudio, VideoOperation, VideoRequest,
};

const SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const VIDEO_MODEL: &str = "veo-3.0-generate-001";

#[derive(Debug, Error)]
pub enum GenAiError {
    /// The API rejected our key or billing state. Never retried; the
    /// operator has to fix credentials.
    #[error("generation credentials rejected: {0}")]
    Credential(String),

    /// Transport-level success but no usable part in the response.
    #[error("no {0} payload in the generation response")]
    EmptyPayload(&'static str),

    /// A long-running video job reported its own failure.
    #[error("video job failed: {0}")]
    JobFailed(String),

    #[error("generation api error (status {status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("unexpected generation response: {0}")]
    Malformed(String),

    #[error("generation api transport failure")]
    Transport(#[from] reqwest::Error),
}

/// Minimal Gemini client built on reqwest.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetails {
    code: Option<i64>,
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

impl GenerateContentResponse {
    /// The first inline-data part of the first candidate, scanning all
    /// parts the way the models interleave text and binary output.
    fn first_inline_part(&self) -> Option<&InlineData> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationError {
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoRef {
    uri: Option<String>,
}

impl OperationResponse {
    /// The result locator, nested several optionals deep when present.
    fn result_uri(&self) -> Option<String> {
        self.response
            .as_ref()
            .and_then(|result| result.generate_video_response.as_ref())
            .and_then(|videos| videos.generated_samples.first())
            .and_then(|sample| sample.video.as_ref())
            .and_then(|video| video.uri.clone())
    }

    fn into_operation(self, fallback_name: &str) -> Result<VideoOperation, GenAiError> {
        if let Some(op_error) = &self.error {
            let message = op_error
                .message
                .clone()
                .unwrap_or_else(|| format!("operation error code {:?}", op_error.code));
            return Err(GenAiError::JobFailed(message));
        }

        let result_uri = self.result_uri();
        Ok(VideoOperation {
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            done: self.done,
            result_uri,
        })
    }
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, GenAiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (api_status, message) = match serde_json::from_str::<GoogleErrorEnvelope>(&body) {
            Ok(envelope) => (
                envelope.error.status,
                envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("error code {:?}", envelope.error.code)),
            ),
            Err(_) => (None, body.clone()),
        };

        error!(
            status = %status,
            api_status = ?api_status,
            response_body = %body,
            context = %context,
            "gemini api request failed"
        );

        if is_credential_failure(status, api_status.as_deref(), &message) {
            return Err(GenAiError::Credential(message));
        }

        Err(GenAiError::Api { status, message })
    }

    fn model_url(&self, model: &str, verb: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, verb)
    }

    /// Synthesizes speech and returns raw decoded PCM samples. The caller
    /// owns playback and container encoding.
    pub async fn generate_speech(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<SpeechAudio, GenAiError> {
        let prompt = format!("Read this text clearly: \"{text}\"");
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice_id }
                    }
                }
            }
        });

        let resp = self
            .http
            .post(self.model_url(SPEECH_MODEL, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "generate speech").await?;

        let raw = resp.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|err| GenAiError::Malformed(format!("speech response: {err}")))?;

        let inline = parsed
            .first_inline_part()
            .ok_or(GenAiError::EmptyPayload("audio"))?;
        let data = inline
            .data
            .as_deref()
            .ok_or(GenAiError::EmptyPayload("audio"))?;
        let pcm = BASE64
            .decode(data)
            .map_err(|err| GenAiError::Malformed(format!("audio base64: {err}")))?;

        let sample_rate = inline
            .mime_type
            .as_deref()
            .map(sample_rate_from_mime)
            .unwrap_or(DEFAULT_SPEECH_SAMPLE_RATE);

        Ok(SpeechAudio {
            pcm,
            sample_rate,
            channels: 1,
        })
    }

    /// Generates one image and returns the first inline payload.
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<InlineImage, GenAiError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "imageConfig": { "aspectRatio": aspect_ratio }
            }
        });

        let resp = self
            .http
            .post(self.model_url(IMAGE_MODEL, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "generate image").await?;

        let raw = resp.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|err| GenAiError::Malformed(format!("image response: {err}")))?;

        let inline = parsed
            .first_inline_part()
            .ok_or(GenAiError::EmptyPayload("image"))?;
        let data = inline
            .data
            .as_deref()
            .ok_or(GenAiError::EmptyPayload("image"))?;
        let bytes = BASE64
            .decode(data)
            .map_err(|err| GenAiError::Malformed(format!("image base64: {err}")))?;

        Ok(InlineImage {
            mime_type: inline
                .mime_type
                .clone()
                .unwrap_or_else(|| "image/png".to_string()),
            data: bytes,
        })
    }

    /// Submits a video render job and returns its operation handle. The
    /// job keeps running server-side whether or not anyone polls it.
    pub async fn submit_video_job(
        &self,
        request: &VideoRequest,
    ) -> Result<VideoOperation, GenAiError> {
        let body = json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": {
                "aspectRatio": request.aspect_ratio.as_str(),
                "resolution": request.resolution.as_str()
            }
        });

        let resp = self
            .http
            .post(self.model_url(VIDEO_MODEL, "predictLongRunning"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "submit video job").await?;

        let raw = resp.text().await?;
        let parsed: OperationResponse = serde_json::from_str(&raw)
            .map_err(|err| GenAiError::Malformed(format!("video submit response: {err}")))?;

        parsed.into_operation("")
    }

    /// Re-queries a job's status by operation name.
    pub async fn poll_video_job(&self, name: &str) -> Result<VideoOperation, GenAiError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "poll video job").await?;

        let raw = resp.text().await?;
        let parsed: OperationResponse = serde_json::from_str(&raw)
            .map_err(|err| GenAiError::Malformed(format!("video poll response: {err}")))?;

        parsed.into_operation(name)
    }

    /// Downloads a finished render. The file endpoint authenticates via a
    /// key query parameter rather than a header.
    pub async fn fetch_video(&self, uri: &str) -> Result<Bytes, GenAiError> {
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{uri}{separator}key={}", self.api_key);

        let resp = self.http.get(url).send().await?;
        let resp = Self::ensure_success(resp, "fetch video result").await?;

        Ok(resp.bytes().await?)
    }
}

fn is_credential_failure(status: StatusCode, api_status: Option<&str>, message: &str) -> bool {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return true;
    }
    if matches!(api_status, Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED")) {
        return true;
    }
    // 400s with an API-key complaint are credential problems in practice.
    let lowered = message.to_ascii_lowercase();
    lowered.contains("api key") || lowered.contains("api_key_invalid")
}

/// Parses the `rate=` parameter of mimes like `audio/L16;codec=pcm;rate=24000`.
fn sample_rate_from_mime(mime: &str) -> u32 {
    mime.split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|value| value.parse().ok())
        .unwrap_or(DEFAULT_SPEECH_SAMPLE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sample_rate_from_mime() {
        assert_eq!(sample_rate_from_mime("audio/L16;codec=pcm;rate=24000"), 24_000);
        assert_eq!(sample_rate_from_mime("audio/L16;rate=16000;codec=pcm"), 16_000);
        assert_eq!(sample_rate_from_mime("audio/L16"), DEFAULT_SPEECH_SAMPLE_RATE);
        assert_eq!(sample_rate_from_mime("audio/L16;rate=abc"), DEFAULT_SPEECH_SAMPLE_RATE);
    }

    #[test]
    fn scans_parts_for_the_first_inline_payload() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image." },
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                    ]
                }
            }]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let inline = parsed.first_inline_part().unwrap();
        assert_eq!(inline.mime_type.as_deref(), Some("image/png"));
        assert_eq!(BASE64.decode(inline.data.as_deref().unwrap()).unwrap(), b"hello");
    }

    #[test]
    fn empty_candidates_has_no_inline_payload() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.first_inline_part().is_none());
    }

    #[test]
    fn maps_running_operation() {
        let raw = r#"{ "name": "models/veo-3.0-generate-001/operations/abc123" }"#;
        let parsed: OperationResponse = serde_json::from_str(raw).unwrap();
        let operation = parsed.into_operation("fallback").unwrap();

        assert_eq!(operation.name, "models/veo-3.0-generate-001/operations/abc123");
        assert!(!operation.done);
        assert!(operation.result_uri.is_none());
    }

    #[test]
    fn maps_finished_operation_with_result_uri() {
        let raw = r#"{
            "name": "models/veo-3.0-generate-001/operations/abc123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [
                        { "video": { "uri": "https://files.example/render.mp4" } }
                    ]
                }
            }
        }"#;

        let parsed: OperationResponse = serde_json::from_str(raw).unwrap();
        let operation = parsed.into_operation("fallback").unwrap();

        assert!(operation.done);
        assert_eq!(
            operation.result_uri.as_deref(),
            Some("https://files.example/render.mp4")
        );
    }

    #[test]
    fn finished_operation_without_locator_is_done_but_empty() {
        let raw = r#"{ "name": "operations/abc123", "done": true, "response": {} }"#;
        let parsed: OperationResponse = serde_json::from_str(raw).unwrap();
        let operation = parsed.into_operation("fallback").unwrap();

        assert!(operation.done);
        assert!(operation.result_uri.is_none());
    }

    #[test]
    fn failed_operation_surfaces_the_job_error() {
        let raw = r#"{
            "name": "operations/abc123",
            "done": true,
            "error": { "code": 13, "message": "internal render failure" }
        }"#;

        let parsed: OperationResponse = serde_json::from_str(raw).unwrap();
        let result = parsed.into_operation("fallback");

        assert!(matches!(result, Err(GenAiError::JobFailed(message)) if message.contains("render")));
    }

    #[test]
    fn credential_classification() {
        assert!(is_credential_failure(
            StatusCode::UNAUTHORIZED,
            None,
            "anything"
        ));
        assert!(is_credential_failure(
            StatusCode::BAD_REQUEST,
            Some("UNAUTHENTICATED"),
            "bad"
        ));
        assert!(is_credential_failure(
            StatusCode::BAD_REQUEST,
            None,
            "API key not valid. Please pass a valid API key."
        ));
        assert!(!is_credential_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some("INTERNAL"),
            "backend error"
        ));
    }
}
