use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bridge_logging::{bridge_debug, bridge_error, bridge_warn};
use qrbridge_core::{MenuEntry, ScriptRequest, TabId, TabMessage};
use qrbridge_engine::{HostError, MenuRegistry, ScriptInjector, TabMessenger};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::protocol::{encode_frame, OutboundFrame, RequestId};

type ScriptReply = Result<Vec<Value>, HostError>;

#[derive(Default)]
struct PendingScripts {
    waiting: HashMap<RequestId, oneshot::Sender<ScriptReply>>,
    /// Set once the browser side is gone; no new injections are parked after that.
    closed: bool,
}

/// Host platform backed by outbound protocol frames.
///
/// Calls that need an answer from the browser (script injection) park a
/// oneshot sender until [`StdioPlatform::resolve_script`] is called with the
/// matching id. After [`StdioPlatform::abandon_pending_scripts`] new
/// injections fail immediately with [`HostError::Disconnected`].
pub struct StdioPlatform {
    frames: mpsc::UnboundedSender<OutboundFrame>,
    next_script_id: AtomicU64,
    pending_scripts: Mutex<PendingScripts>,
}

impl StdioPlatform {
    pub fn new(frames: mpsc::UnboundedSender<OutboundFrame>) -> Self {
        Self {
            frames,
            next_script_id: AtomicU64::new(1),
            pending_scripts: Mutex::new(PendingScripts::default()),
        }
    }

    pub fn emit(&self, frame: OutboundFrame) -> Result<(), HostError> {
        self.frames.send(frame).map_err(|_| HostError::Disconnected)
    }

    /// Complete a pending script injection. Unknown ids are logged and dropped.
    pub fn resolve_script(&self, id: RequestId, reply: ScriptReply) {
        let sender = match self.pending_scripts.lock() {
            Ok(mut pending) => pending.waiting.remove(&id),
            Err(_) => None,
        };
        match sender {
            Some(sender) => {
                if sender.send(reply).is_err() {
                    bridge_debug!("Script {} result arrived after its flow ended", id);
                }
            }
            None => bridge_warn!("Script result for unknown id {}", id),
        }
    }

    /// Fail every parked injection and refuse new ones; used when the browser
    /// side goes away.
    pub fn abandon_pending_scripts(&self) {
        if let Ok(mut pending) = self.pending_scripts.lock() {
            pending.closed = true;
            if !pending.waiting.is_empty() {
                bridge_warn!("Abandoning {} pending script injections", pending.waiting.len());
            }
            pending.waiting.clear();
        }
    }

    fn forget_script(&self, id: RequestId) {
        if let Ok(mut pending) = self.pending_scripts.lock() {
            pending.waiting.remove(&id);
        }
    }
}

#[async_trait::async_trait]
impl TabMessenger for StdioPlatform {
    async fn send_to_tab(&self, tab_id: TabId, message: TabMessage) -> Result<(), HostError> {
        self.emit(OutboundFrame::TabMessage { tab_id, message })
    }
}

#[async_trait::async_trait]
impl MenuRegistry for StdioPlatform {
    async fn remove_all(&self) -> Result<(), HostError> {
        self.emit(OutboundFrame::MenusRemoveAll)
    }

    async fn create(&self, entry: &MenuEntry) -> Result<(), HostError> {
        self.emit(OutboundFrame::MenuCreate {
            entry: entry.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ScriptInjector for StdioPlatform {
    async fn execute_script(&self, request: ScriptRequest) -> Result<Vec<Value>, HostError> {
        let id = self.next_script_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self
                .pending_scripts
                .lock()
                .map_err(|_| HostError::Platform("pending script table poisoned".into()))?;
            if pending.closed {
                return Err(HostError::Disconnected);
            }
            pending.waiting.insert(id, tx);
        }

        if let Err(err) = self.emit(OutboundFrame::ExecuteScript { id, request }) {
            self.forget_script(id);
            return Err(err);
        }
        rx.await.map_err(|_| HostError::Disconnected)?
    }
}

/// Drain outbound frames into `writer`, one JSON document per line.
pub fn spawn_writer<W>(
    mut writer: W,
    mut frames: mpsc::UnboundedReceiver<OutboundFrame>,
) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            let line = match encode_frame(&frame) {
                Ok(line) => line,
                Err(err) => {
                    bridge_error!("Failed to encode outbound frame {:?}: {}", frame, err);
                    continue;
                }
            };
            if let Err(err) = writer.write_all(line.as_bytes()).await {
                bridge_error!("Writing outbound frame failed: {}", err);
                break;
            }
            if let Err(err) = writer.flush().await {
                bridge_error!("Flushing outbound frame failed: {}", err);
                break;
            }
        }
    })
}
