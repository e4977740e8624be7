use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{MenuItemId, Operation, PayloadSource};

pub type TabId = i64;
pub type FrameId = i64;

/// The only popup action handled by the background process.
pub const GET_QR_CODE: &str = "GetQRCode";

/// Read-only script serializing the current selection of a frame.
pub const SELECTION_SCRIPT: &str = "window.getSelection().toString();";

/// Popup-originated request, `{ "action": .., "data": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupRequest {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

/// Popup request after action dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupAction {
    GetQrCode(EncodeRequest),
    /// Owned by some other listener on the same channel.
    Unrecognized(String),
}

impl PopupRequest {
    pub fn get_qr_code(data: impl Into<String>) -> Self {
        Self {
            action: GET_QR_CODE.to_string(),
            data: Value::String(data.into()),
        }
    }

    pub fn classify(self) -> PopupAction {
        if self.action == GET_QR_CODE {
            PopupAction::GetQrCode(EncodeRequest {
                payload: value_to_text(self.data),
            })
        } else {
            PopupAction::Unrecognized(self.action)
        }
    }
}

/// Strings pass through, `null` becomes empty, anything else is rendered as JSON.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    pub image_source: String,
}

/// One codec call with its resolved payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecRequest {
    Encode(EncodeRequest),
    Decode(DecodeRequest),
}

impl CodecRequest {
    pub fn new(operation: Operation, payload: String) -> Self {
        match operation {
            Operation::Encode => CodecRequest::Encode(EncodeRequest { payload }),
            Operation::Decode => CodecRequest::Decode(DecodeRequest {
                image_source: payload,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
}

/// Context-menu click as dispatched by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub menu_item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<TabInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,
    #[serde(default, alias = "imageSrc", skip_serializing_if = "Option::is_none")]
    pub src_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

/// Why a click does not start a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickRejection {
    /// Entry registered by someone else.
    UnknownMenuItem(String),
    /// No tab to reply to.
    MissingTab(MenuItemId),
}

/// Everything a click flow needs, resolved from one [`ClickEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub menu_item_id: MenuItemId,
    pub target_tab_id: TabId,
    /// Top frame (0) unless the platform reported one.
    pub frame_id: FrameId,
    /// Present for image and link clicks; selection text arrives later.
    pub raw_payload: Option<String>,
}

impl ActionContext {
    pub fn from_click(event: ClickEvent) -> Result<Self, ClickRejection> {
        let menu_item_id = MenuItemId::from_wire(&event.menu_item_id)
            .ok_or_else(|| ClickRejection::UnknownMenuItem(event.menu_item_id.clone()))?;
        let tab = event
            .tab
            .ok_or(ClickRejection::MissingTab(menu_item_id))?;
        let raw_payload = match menu_item_id.payload_source() {
            PayloadSource::ImageSrc => event.src_url,
            PayloadSource::LinkUrl => event.link_url,
            PayloadSource::Selection => None,
        };
        Ok(Self {
            menu_item_id,
            target_tab_id: tab.id,
            frame_id: event.frame_id.unwrap_or(0),
            raw_payload,
        })
    }

    /// Injection request reading the selection of the clicked frame.
    pub fn selection_script(&self) -> ScriptRequest {
        ScriptRequest {
            tab_id: self.target_tab_id,
            frame_id: self.frame_id,
            run_at: RunAt::DocumentEnd,
            code: SELECTION_SCRIPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    DocumentStart,
    DocumentEnd,
    DocumentIdle,
}

/// Script-injection request scoped to one frame of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub tab_id: TabId,
    pub frame_id: FrameId,
    pub run_at: RunAt,
    pub code: String,
}
