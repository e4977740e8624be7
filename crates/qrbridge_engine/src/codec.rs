use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bridge_logging::bridge_debug;
use qrbridge_core::{escape_html, DataUrl};

use crate::{EcLevel, EngineError, QrEngine};

/// Error-correction level used for every encode.
pub const ENCODE_EC_LEVEL: EcLevel = EcLevel::Medium;

#[derive(Debug, Clone)]
pub struct CodecSettings {
    /// Upper bound on a single engine call; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Async facade over a [`QrEngine`]. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct CodecService {
    engine: Arc<dyn QrEngine>,
    settings: CodecSettings,
}

impl CodecService {
    pub fn new(engine: Arc<dyn QrEngine>, settings: CodecSettings) -> Self {
        Self { engine, settings }
    }

    pub fn with_engine(engine: Arc<dyn QrEngine>) -> Self {
        Self::new(engine, CodecSettings::default())
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    /// Encode `payload` into a QR image. Engine errors are returned unmodified.
    pub async fn encode(&self, payload: &str) -> Result<DataUrl, EngineError> {
        bridge_debug!("encode payload_len={}", payload.len());
        self.bounded(self.engine.encode(payload, ENCODE_EC_LEVEL))
            .await
    }

    /// Decode the QR symbol in `image_source` and HTML-escape the recovered text.
    pub async fn decode(&self, image_source: &str) -> Result<String, EngineError> {
        bridge_debug!("decode source_len={}", image_source.len());
        let raw = self.bounded(self.engine.decode(image_source)).await?;
        Ok(escape_html(&raw))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| EngineError::Timeout(limit))?,
            None => call.await,
        }
    }
}
