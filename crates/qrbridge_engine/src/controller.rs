use std::sync::Arc;

use bridge_logging::{bridge_debug, bridge_error, bridge_flow, bridge_info, bridge_warn};
use qrbridge_core::{
    default_entries, ActionContext, ClickEvent, ClickRejection, CodecRequest, PayloadSource,
    ResponseEnvelope,
};
use serde_json::Value;

use crate::{CodecService, HostError, HostPlatform, MenuError};

/// How a click flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The tab message was handed to the platform.
    Delivered,
    /// The tab message could not be sent; the flow still ended normally.
    Undelivered(HostError),
    /// The click was not one of ours, or had no tab to reply to.
    Rejected(ClickRejection),
}

/// Owns the context-menu entries and runs one flow per click.
#[derive(Clone)]
pub struct ContextMenuController {
    codec: CodecService,
    host: Arc<dyn HostPlatform>,
}

impl ContextMenuController {
    pub fn new(codec: CodecService, host: Arc<dyn HostPlatform>) -> Self {
        Self { codec, host }
    }

    /// Wipe every entry, then register the full set.
    ///
    /// Safe to call repeatedly. If any registration fails the entries created so
    /// far are removed again and the error is returned.
    pub async fn initialize(&self) -> Result<(), MenuError> {
        self.host.remove_all().await.map_err(MenuError::Clear)?;

        let entries = default_entries();
        for entry in &entries {
            if let Err(source) = self.host.create(entry).await {
                bridge_error!("Registering menu entry {} failed: {}", entry.id, source);
                if let Err(err) = self.host.remove_all().await {
                    bridge_warn!("Rolling back partial menu set failed: {}", err);
                }
                return Err(MenuError::Registration {
                    id: entry.id,
                    source,
                });
            }
        }
        bridge_info!("Registered {} context menu entries", entries.len());
        Ok(())
    }

    /// Remove every entry.
    pub async fn reset(&self) -> Result<(), MenuError> {
        self.host.remove_all().await.map_err(MenuError::Clear)?;
        bridge_info!("Context menu entries removed");
        Ok(())
    }

    pub async fn handle_click(&self, event: ClickEvent) -> ClickOutcome {
        let context = match ActionContext::from_click(event) {
            Ok(context) => context,
            Err(rejection) => {
                match &rejection {
                    ClickRejection::UnknownMenuItem(id) => {
                        bridge_debug!("Ignoring click on foreign menu item {}", id)
                    }
                    ClickRejection::MissingTab(id) => {
                        bridge_warn!("Click on {} carried no tab; nothing to reply to", id)
                    }
                }
                return ClickOutcome::Rejected(rejection);
            }
        };

        let action = context.menu_item_id;
        let tab_id = context.target_tab_id;
        bridge_flow!(action, "triggered tab={} frame={}", tab_id, context.frame_id);

        let payload = self.resolve_payload(context).await;
        bridge_flow!(action, "payload resolved len={}", payload.len());

        let envelope = self
            .invoke(CodecRequest::new(action.operation(), payload))
            .await;
        if let Some(message) = envelope.message() {
            bridge_warn!("{} failed: {}", action, message);
        }

        match self.host.send_to_tab(tab_id, envelope.tagged(action)).await {
            Ok(()) => {
                bridge_flow!(action, "replied to tab {}", tab_id);
                ClickOutcome::Delivered
            }
            Err(err) => {
                bridge_warn!("Reply for {} to tab {} not delivered: {}", action, tab_id, err);
                ClickOutcome::Undelivered(err)
            }
        }
    }

    async fn resolve_payload(&self, context: ActionContext) -> String {
        match context.menu_item_id.payload_source() {
            PayloadSource::ImageSrc | PayloadSource::LinkUrl => {
                context.raw_payload.unwrap_or_default()
            }
            PayloadSource::Selection => self.read_selection(&context).await,
        }
    }

    /// First frame result of the selection script; anything unusable becomes "".
    async fn read_selection(&self, context: &ActionContext) -> String {
        let results = match self.host.execute_script(context.selection_script()).await {
            Ok(results) => results,
            Err(err) => {
                bridge_warn!(
                    "Reading selection in tab {} frame {} failed: {}",
                    context.target_tab_id,
                    context.frame_id,
                    err
                );
                return String::new();
            }
        };
        match results.into_iter().next() {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    async fn invoke(&self, request: CodecRequest) -> ResponseEnvelope {
        match request {
            CodecRequest::Encode(encode) => {
                ResponseEnvelope::from_result(self.codec.encode(&encode.payload).await)
            }
            CodecRequest::Decode(decode) => {
                ResponseEnvelope::from_result(self.codec.decode(&decode.image_source).await)
            }
        }
    }
}
