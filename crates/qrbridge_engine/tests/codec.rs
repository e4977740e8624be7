mod common;

use std::sync::Arc;
use std::time::Duration;

use qrbridge_core::{escape_html, DataUrl};
use qrbridge_engine::{
    CodecService, CodecSettings, EcLevel, EngineError, QrEngine, ENCODE_EC_LEVEL,
};

use common::{blank_png_data_url, init_logging, standard_codec};

/// Never settles, to exercise the call timeout.
struct StallingEngine;

#[async_trait::async_trait]
impl QrEngine for StallingEngine {
    async fn encode(&self, _payload: &str, _level: EcLevel) -> Result<DataUrl, EngineError> {
        std::future::pending().await
    }

    async fn decode(&self, _source: &str) -> Result<String, EngineError> {
        std::future::pending().await
    }
}

/// Echoes the source back as decoded text and records the requested level.
#[derive(Default)]
struct EchoEngine {
    levels: std::sync::Mutex<Vec<EcLevel>>,
}

#[async_trait::async_trait]
impl QrEngine for EchoEngine {
    async fn encode(&self, payload: &str, level: EcLevel) -> Result<DataUrl, EngineError> {
        self.levels.lock().unwrap().push(level);
        Ok(DataUrl::new(format!("echo:{payload}")))
    }

    async fn decode(&self, source: &str) -> Result<String, EngineError> {
        Ok(source.to_string())
    }
}

#[tokio::test]
async fn encode_produces_png_data_url() {
    init_logging();
    let codec = standard_codec();
    let image = codec.encode("hello").await.expect("encode ok");
    assert!(image.as_str().starts_with(DataUrl::PNG_PREFIX));
}

#[tokio::test]
async fn round_trip_recovers_sanitized_payload() {
    init_logging();
    let codec = standard_codec();
    for payload in ["hello", "café", "https://example.com/?a=1&b=<2>", "'quoted' \"text\""] {
        let image = codec.encode(payload).await.expect("encode ok");
        let decoded = codec.decode(image.as_str()).await.expect("decode ok");
        assert_eq!(decoded, escape_html(payload), "payload {payload:?}");
    }
}

#[tokio::test]
async fn empty_payload_is_rejected_by_engine() {
    let codec = standard_codec();
    assert_eq!(codec.encode("").await, Err(EngineError::EmptyPayload));
}

#[tokio::test]
async fn oversized_payload_fails_to_encode() {
    let codec = standard_codec();
    let huge = "x".repeat(8000);
    assert!(matches!(codec.encode(&huge).await, Err(EngineError::Encode(_))));
}

#[tokio::test]
async fn image_without_symbol_fails_to_decode() {
    let codec = standard_codec();
    let err = codec.decode(&blank_png_data_url()).await.unwrap_err();
    assert_eq!(err, EngineError::NoSymbol);
}

#[tokio::test]
async fn garbage_image_bytes_fail_to_decode() {
    let codec = standard_codec();
    let err = codec
        .decode("data:image/png;base64,bm90IGFuIGltYWdl")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidImage(_)));
}

#[tokio::test]
async fn encode_always_uses_medium_level() {
    let engine = Arc::new(EchoEngine::default());
    let codec = CodecService::with_engine(engine.clone());
    codec.encode("a").await.unwrap();

    let unbounded = CodecService::new(engine.clone(), CodecSettings { timeout: None });
    unbounded.encode("b").await.unwrap();

    assert_eq!(ENCODE_EC_LEVEL, EcLevel::Medium);
    assert_eq!(*engine.levels.lock().unwrap(), vec![EcLevel::Medium, EcLevel::Medium]);
}

#[tokio::test]
async fn decode_output_is_sanitized_only_on_success() {
    let codec = CodecService::with_engine(Arc::new(EchoEngine::default()));
    assert_eq!(
        codec.decode("<script>").await.unwrap(),
        "&lt;script&gt;"
    );
}

#[tokio::test]
async fn stalled_engine_call_times_out() {
    let settings = CodecSettings {
        timeout: Some(Duration::from_millis(30)),
    };
    let codec = CodecService::new(Arc::new(StallingEngine), settings);
    assert_eq!(
        codec.encode("hello").await,
        Err(EngineError::Timeout(Duration::from_millis(30)))
    );
    assert_eq!(
        codec.decode("data:,x").await,
        Err(EngineError::Timeout(Duration::from_millis(30)))
    );
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let codec = standard_codec();
    let (a, b, c) = tokio::join!(
        codec.encode("first"),
        codec.encode(""),
        codec.decode("ftp://nowhere/qr.png"),
    );
    assert!(a.is_ok());
    assert_eq!(b, Err(EngineError::EmptyPayload));
    assert!(matches!(c, Err(EngineError::UnsupportedSource(_))));
}
