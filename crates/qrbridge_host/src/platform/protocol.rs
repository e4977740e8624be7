//! Newline-delimited JSON frames exchanged with the browser side.

use qrbridge_core::{
    ClickEvent, MenuEntry, PopupRequest, ResponseEnvelope, ScriptRequest, TabId, TabMessage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundFrame {
    /// Popup request awaiting a response frame with the same id.
    Request {
        id: RequestId,
        message: PopupRequest,
    },
    MenuClick {
        event: ClickEvent,
    },
    ScriptResult {
        id: RequestId,
        #[serde(default)]
        results: Vec<Value>,
    },
    ScriptError {
        id: RequestId,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundFrame {
    Response {
        id: RequestId,
        message: ResponseEnvelope,
    },
    TabMessage {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        message: TabMessage,
    },
    MenusRemoveAll,
    MenuCreate {
        entry: MenuEntry,
    },
    ExecuteScript {
        id: RequestId,
        #[serde(flatten)]
        request: ScriptRequest,
    },
}

pub fn parse_line(line: &str) -> Result<InboundFrame, serde_json::Error> {
    serde_json::from_str(line)
}

pub fn encode_frame(frame: &OutboundFrame) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}
