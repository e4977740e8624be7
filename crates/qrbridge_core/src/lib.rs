//! QR bridge core: wire shapes and pure data model shared by the background services.
mod envelope;
mod menu;
mod request;
mod sanitize;

pub use envelope::{DataUrl, Payload, ResponseEnvelope, TabMessage, UNKNOWN_ERROR};
pub use menu::{default_entries, MenuContext, MenuEntry, MenuItemId, Operation, PayloadSource};
pub use request::{
    ActionContext, ClickEvent, ClickRejection, CodecRequest, DecodeRequest, EncodeRequest, FrameId,
    PopupAction, PopupRequest, RunAt, ScriptRequest, TabId, TabInfo, GET_QR_CODE,
    SELECTION_SCRIPT,
};
pub use sanitize::escape_html;
