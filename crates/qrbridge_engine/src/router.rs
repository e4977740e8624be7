use bridge_logging::{bridge_debug, bridge_flow, bridge_warn};
use qrbridge_core::{PopupAction, PopupRequest, ResponseEnvelope, GET_QR_CODE};

use crate::{CodecService, ReplyHandle};

/// Result of routing one popup request.
#[derive(Debug)]
pub enum Routed {
    /// Exactly one reply was sent through the handle.
    Handled,
    /// Not ours: no reply was sent and the untouched handle is returned so
    /// another listener on the channel can answer.
    Ignored(ReplyHandle),
}

/// Bridges popup requests to the codec.
#[derive(Clone)]
pub struct ActionRouter {
    codec: CodecService,
}

impl ActionRouter {
    pub fn new(codec: CodecService) -> Self {
        Self { codec }
    }

    pub async fn handle(&self, request: PopupRequest, reply: ReplyHandle) -> Routed {
        match request.classify() {
            PopupAction::GetQrCode(encode) => {
                bridge_flow!(GET_QR_CODE, "encoding payload_len={}", encode.payload.len());
                let result = self.codec.encode(&encode.payload).await;
                if let Err(err) = &result {
                    bridge_warn!("{} failed: {}", GET_QR_CODE, err);
                }
                if reply.send(ResponseEnvelope::from_result(result)).is_err() {
                    bridge_debug!("{} requester went away before the reply", GET_QR_CODE);
                }
                Routed::Handled
            }
            PopupAction::Unrecognized(action) => {
                bridge_flow!(action, "not handled here, leaving reply to other listeners");
                Routed::Ignored(reply)
            }
        }
    }
}
