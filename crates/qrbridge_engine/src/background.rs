use std::sync::Arc;

use qrbridge_core::{ClickEvent, PopupRequest};
use tokio::task::JoinHandle;

use crate::{
    ActionRouter, ClickOutcome, CodecService, ContextMenuController, HostPlatform, MenuError,
    ReplyHandle, Routed,
};

/// The background process: one router, one menu controller, one task per event.
///
/// Dispatch methods must be called from within a tokio runtime.
#[derive(Clone)]
pub struct Background {
    router: Arc<ActionRouter>,
    menus: Arc<ContextMenuController>,
}

impl Background {
    pub fn new(codec: CodecService, host: Arc<dyn HostPlatform>) -> Self {
        Self {
            router: Arc::new(ActionRouter::new(codec.clone())),
            menus: Arc::new(ContextMenuController::new(codec, host)),
        }
    }

    pub async fn initialize(&self) -> Result<(), MenuError> {
        self.menus.initialize().await
    }

    pub async fn reset(&self) -> Result<(), MenuError> {
        self.menus.reset().await
    }

    pub fn dispatch_request(
        &self,
        request: PopupRequest,
        reply: ReplyHandle,
    ) -> JoinHandle<Routed> {
        let router = self.router.clone();
        tokio::spawn(async move { router.handle(request, reply).await })
    }

    pub fn dispatch_click(&self, event: ClickEvent) -> JoinHandle<ClickOutcome> {
        let menus = self.menus.clone();
        tokio::spawn(async move { menus.handle_click(event).await })
    }

    pub fn router(&self) -> &ActionRouter {
        &self.router
    }

    pub fn menus(&self) -> &ContextMenuController {
        &self.menus
    }
}
