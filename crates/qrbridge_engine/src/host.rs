//! Seams to the browser runtime hosting the background process.

use qrbridge_core::{MenuEntry, ScriptRequest, TabId, TabMessage};
use serde_json::Value;

use crate::HostError;

/// Background-to-tab messaging.
#[async_trait::async_trait]
pub trait TabMessenger: Send + Sync {
    async fn send_to_tab(&self, tab_id: TabId, message: TabMessage) -> Result<(), HostError>;
}

/// Process-wide context-menu registry.
#[async_trait::async_trait]
pub trait MenuRegistry: Send + Sync {
    async fn remove_all(&self) -> Result<(), HostError>;
    async fn create(&self, entry: &MenuEntry) -> Result<(), HostError>;
}

/// Script injection; resolves to one result per frame the script ran in.
#[async_trait::async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn execute_script(&self, request: ScriptRequest) -> Result<Vec<Value>, HostError>;
}

/// Everything the context-menu flows need from the platform.
pub trait HostPlatform: TabMessenger + MenuRegistry + ScriptInjector {}

impl<T> HostPlatform for T where T: TabMessenger + MenuRegistry + ScriptInjector {}
