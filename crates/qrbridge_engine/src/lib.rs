//! QR bridge engine: codec facade, request routing and context-menu flows.
mod background;
mod codec;
mod controller;
mod host;
mod qr;
mod reply;
mod router;
mod source;
mod types;

pub use background::Background;
pub use codec::{CodecService, CodecSettings, ENCODE_EC_LEVEL};
pub use controller::{ClickOutcome, ContextMenuController};
pub use host::{HostPlatform, MenuRegistry, ScriptInjector, TabMessenger};
pub use qr::{EcLevel, QrEngine, QrRenderSettings, StandardQrEngine};
pub use reply::{reply_channel, ReplyHandle, ReplyReceiver};
pub use router::{ActionRouter, Routed};
pub use source::{FetchSettings, ImageLoader, ImageSource};
pub use types::{EngineError, HostError, MenuError};
