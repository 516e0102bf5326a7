//! Integration tests for the voice generation endpoints.
//!
//! These tests verify:
//!  - Blocking endpoints return WAV bodies with duration and sample-rate headers
//!  - Invalid input is rejected with 400 before the generator is called
//!  - Generation failures surface as 500 with a JSON error body
//!  - Streaming endpoints emit one ordered `data:` event per segment and stop
//!    at the first error
//!  - Voice clone uploads are decoded, resampled and handed to the generator

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use voxgate_core::VoiceParams;

use common::{
    FAIL_MARKER, body_bytes, body_json, json_request, multipart_request, sse_events, test_app,
    wav_clip,
};

// ── Health ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

// ── Blocking endpoints ────────────────────────────────────────────────────────

#[tokio::test]
async fn custom_voice_returns_wav_with_headers() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/custom-voice",
            &json!({"text": "Hello world.", "speaker": "Vivian", "model_size": "0.6B"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(headers["x-sample-rate"], "24000");
    // 12 characters * 100 samples at 24 kHz
    assert_eq!(headers["x-audio-duration"], "0.05");

    let body = body_bytes(response).await;
    assert_eq!(&body[..4], b"RIFF");
    assert_eq!(app.generator.calls().len(), 1);
    assert_eq!(app.generator.calls()[0].language, "Auto");
}

#[tokio::test]
async fn invalid_speaker_is_rejected_before_generation() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/custom-voice",
            &json!({"text": "Hello", "speaker": "Nobody"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid speaker 'Nobody'")
    );
    assert!(app.generator.calls().is_empty());
}

#[tokio::test]
async fn invalid_model_size_is_rejected() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/custom-voice/stream",
            &json!({"text": "Hello", "speaker": "Ryan", "model_size": "13B"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.generator.calls().is_empty());
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/voice-design",
            &json!({"text": "   ", "voice_description": "a calm narrator"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Text cannot be empty");
}

#[tokio::test]
async fn generation_failure_returns_500() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/voice-design",
            &json!({"text": FAIL_MARKER, "voice_description": "a calm narrator"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "model exploded");
    assert_eq!(body["status"], 500);
}

// ── Streaming endpoints ───────────────────────────────────────────────────────

#[tokio::test]
async fn stream_emits_ordered_segment_events() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/voice-design/stream",
            &json!({
                "text": "First sentence here. Second one follows. And a third.",
                "voice_description": "bright and quick",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let events = sse_events(response).await;
    assert_eq!(events.len(), 3);
    for (index, event) in events.iter().enumerate() {
        assert_eq!(event["index"], index);
        assert_eq!(event["total"], 3);
        let wav = STANDARD.decode(event["audio"].as_str().unwrap()).unwrap();
        assert_eq!(&wav[..4], b"RIFF");
    }

    let texts: Vec<String> = app.generator.calls().into_iter().map(|r| r.text).collect();
    assert_eq!(
        texts,
        vec!["First sentence here.", "Second one follows.", "And a third."]
    );
}

#[tokio::test]
async fn stream_stops_at_first_failed_segment() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/custom-voice/stream",
            &json!({
                "text": "This one works. FAIL right here. Never reached.",
                "speaker": "Serena",
            }),
        ))
        .await
        .unwrap();

    let events = sse_events(response).await;
    assert_eq!(events.len(), 2);
    assert!(events[0]["audio"].is_string());
    assert_eq!(
        events[1],
        json!({"index": 1, "total": 3, "error": "Generation failed: model exploded"})
    );
    assert_eq!(app.generator.calls().len(), 2);
}

#[tokio::test]
async fn dropping_stream_body_stops_generation() {
    let app = test_app();
    let text = [
        "Segment number one.",
        "Segment number two.",
        "Segment number 3.",
        "Segment number four.",
        "Segment number five.",
        "Segment number six.",
        "Segment number 7.",
        "Segment number 8.",
    ]
    .join(" ");
    let response = app
        .router
        .oneshot(json_request(
            "/api/custom-voice/stream",
            &json!({"text": text, "speaker": "Aiden"}),
        ))
        .await
        .unwrap();

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap().into_data().unwrap();
    let first = String::from_utf8(frame.to_vec()).unwrap();
    let data = first
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .unwrap();
    let event: serde_json::Value = serde_json::from_str(data.trim()).unwrap();
    assert_eq!(event["index"], 0);
    assert_eq!(event["total"], 8);

    drop(body);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let calls = app.generator.calls().len();
    assert!(calls < 8, "session kept generating after disconnect: {calls} calls");
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(app.generator.calls().len(), calls);
}

#[tokio::test]
async fn stream_validation_error_is_plain_400() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "/api/voice-design/stream",
            &json!({"text": "Hello", "voice_description": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Voice description cannot be empty"
    );
}

// ── Voice clone ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn voice_clone_resamples_reference_to_24khz() {
    let app = test_app();
    let clip = wav_clip(16_000);
    let response = app
        .router
        .oneshot(multipart_request(
            "/api/voice-clone",
            &[
                ("text", None, b"Clone this voice."),
                ("ref_text", None, b"Reference words."),
                ("language", None, b"English"),
                ("ref_audio", Some("sample.wav"), &clip),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let calls = app.generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].language, "English");
    match &calls[0].params {
        VoiceParams::VoiceClone {
            reference,
            ref_text,
            x_vector_only,
            ..
        } => {
            assert_eq!(reference.sample_rate, 24_000);
            assert!(!reference.samples.is_empty());
            assert_eq!(ref_text.as_deref(), Some("Reference words."));
            assert!(!x_vector_only);
        }
        other => panic!("unexpected params {other:?}"),
    }
}

#[tokio::test]
async fn voice_clone_stream_shares_reference_across_segments() {
    let app = test_app();
    let clip = wav_clip(24_000);
    let response = app
        .router
        .oneshot(multipart_request(
            "/api/voice-clone/stream",
            &[
                ("text", None, b"Segment number one. Segment number two."),
                ("x_vector_only", None, b"true"),
                ("ref_audio", Some("voice.wav"), &clip),
            ],
        ))
        .await
        .unwrap();

    let events = sse_events(response).await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e["audio"].is_string()));

    let calls = app.generator.calls();
    let references: Vec<_> = calls
        .iter()
        .map(|call| match &call.params {
            VoiceParams::VoiceClone { reference, .. } => reference.clone(),
            other => panic!("unexpected params {other:?}"),
        })
        .collect();
    assert!(std::sync::Arc::ptr_eq(&references[0], &references[1]));
}

#[tokio::test]
async fn voice_clone_requires_transcript_unless_x_vector_only() {
    let app = test_app();
    let clip = wav_clip(24_000);
    let response = app
        .router
        .oneshot(multipart_request(
            "/api/voice-clone",
            &[
                ("text", None, b"Hello"),
                ("ref_audio", Some("voice.wav"), &clip),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Reference text is required unless x_vector_only is enabled"
    );
    assert!(app.generator.calls().is_empty());
}

#[tokio::test]
async fn voice_clone_requires_reference_audio() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/api/voice-clone",
            &[("text", None, b"Hello"), ("x_vector_only", None, b"1")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required field: ref_audio"
    );
}

#[tokio::test]
async fn voice_clone_rejects_undecodable_upload() {
    let app = test_app();
    let response = app
        .router
        .oneshot(multipart_request(
            "/api/voice-clone",
            &[
                ("text", None, b"Hello"),
                ("x_vector_only", None, b"yes"),
                ("ref_audio", Some("noise.wav"), b"this is not audio at all"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Could not read reference audio")
    );
    assert!(app.generator.calls().is_empty());
}
