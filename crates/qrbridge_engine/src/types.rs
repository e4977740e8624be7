use std::time::Duration;

use qrbridge_core::{MenuItemId, TabId};

/// Failure raised by the QR engine or while loading its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("cannot encode an empty payload")]
    EmptyPayload,
    #[error("failed to encode payload: {0}")]
    Encode(String),
    #[error("failed to render QR image: {0}")]
    Render(String),
    #[error("unsupported image source: {0}")]
    UnsupportedSource(String),
    #[error("failed to load image: {0}")]
    Load(String),
    #[error("image request failed with http status {0}")]
    HttpStatus(u16),
    #[error("image too large (max {max_bytes} bytes, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("invalid image data: {0}")]
    InvalidImage(String),
    #[error("no QR code found in image")]
    NoSymbol,
    #[error("failed to decode QR code: {0}")]
    Decode(String),
    #[error("QR engine did not finish within {0:?}")]
    Timeout(Duration),
    #[error("QR engine worker failed: {0}")]
    Worker(String),
}

/// Failure of a host platform primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("tab {0} is no longer reachable")]
    TabClosed(TabId),
    #[error("platform call failed: {0}")]
    Platform(String),
    #[error("platform channel closed")]
    Disconnected,
}

/// Context-menu lifecycle failure; initialization is aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("failed to clear context menu entries: {0}")]
    Clear(#[source] HostError),
    #[error("failed to register context menu entry {id}: {source}")]
    Registration {
        id: MenuItemId,
        #[source]
        source: HostError,
    },
}
