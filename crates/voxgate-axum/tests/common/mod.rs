//! Shared fixtures for voxgate-axum integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use http_body_util::BodyExt;
use voxgate_axum::{AxumContext, CorsConfig, create_router};
use voxgate_core::{
    GeneratedAudio, GenerationError, GenerationRequest, InferenceSettings, SpeechGenerator,
    StatusBus,
};
use voxgate_runtime::{FallbackDecoder, WavEncoder};

/// Text that makes [`FakeGenerator`] fail.
pub const FAIL_MARKER: &str = "FAIL";

/// Multipart boundary used by [`multipart_request`].
pub const BOUNDARY: &str = "voxgate-test-boundary";

/// Generator that returns one 24 kHz sample per character and records calls.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl SpeechGenerator for FakeGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedAudio, GenerationError> {
        self.calls.lock().unwrap().push(request.clone());
        if request.text.contains(FAIL_MARKER) {
            return Err(GenerationError::Failed("model exploded".into()));
        }
        Ok(GeneratedAudio::new(
            vec![0.1; request.text.chars().count() * 100],
            24_000,
        ))
    }
}

pub struct TestApp {
    pub router: Router,
    pub generator: Arc<FakeGenerator>,
    pub status: StatusBus,
}

pub fn test_settings() -> InferenceSettings {
    InferenceSettings {
        stream_segment_chars: 20,
        status_keepalive: Duration::from_secs(15),
        ..InferenceSettings::default()
    }
}

pub fn test_app() -> TestApp {
    let generator = Arc::new(FakeGenerator::default());
    let status = StatusBus::new(test_settings().status_keepalive);
    let ctx = AxumContext::new(
        &test_settings(),
        status.clone(),
        generator.clone(),
        Arc::new(FallbackDecoder::default()),
    );

    TestApp {
        router: create_router(ctx, &CorsConfig::AllowAll),
        generator,
        status,
    }
}

pub fn json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A multipart part: `(name, optional file name, bytes)`.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A short mono WAV clip at `sample_rate`.
pub fn wav_clip(sample_rate: u32) -> Vec<u8> {
    let samples: Vec<f32> = (0..sample_rate / 4)
        .map(|i| (i as f32 * 0.05).sin() * 0.5)
        .collect();
    WavEncoder::default()
        .encode_samples(&samples, sample_rate)
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

/// Parse every `data:` payload of a finished SSE body as JSON.
pub async fn sse_events(response: axum::response::Response) -> Vec<serde_json::Value> {
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
