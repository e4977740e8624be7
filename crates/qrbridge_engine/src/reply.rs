use qrbridge_core::ResponseEnvelope;
use tokio::sync::oneshot;

/// Create a one-shot reply pair for a single popup request.
pub fn reply_channel() -> (ReplyHandle, ReplyReceiver) {
    let (tx, rx) = oneshot::channel();
    (ReplyHandle { tx }, ReplyReceiver { rx })
}

/// Capability to answer one request. Consumed by [`ReplyHandle::send`], so a
/// second reply does not compile; dropping it unanswered is visible to the
/// receiver.
#[derive(Debug)]
pub struct ReplyHandle {
    tx: oneshot::Sender<ResponseEnvelope>,
}

impl ReplyHandle {
    /// Deliver the reply. Hands the envelope back if the requester is gone.
    pub fn send(self, envelope: ResponseEnvelope) -> Result<(), ResponseEnvelope> {
        self.tx.send(envelope)
    }

    /// Whether the requester stopped waiting (e.g. the popup closed).
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct ReplyReceiver {
    rx: oneshot::Receiver<ResponseEnvelope>,
}

impl ReplyReceiver {
    /// Wait for the reply; `None` means the handle was dropped without one.
    pub async fn wait(self) -> Option<ResponseEnvelope> {
        self.rx.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::reply_channel;
    use qrbridge_core::ResponseEnvelope;

    #[tokio::test]
    async fn reply_is_delivered_once() {
        let (handle, receiver) = reply_channel();
        handle.send(ResponseEnvelope::failure("nope")).unwrap();
        assert_eq!(receiver.wait().await, Some(ResponseEnvelope::failure("nope")));
    }

    #[tokio::test]
    async fn dropped_handle_means_no_reply() {
        let (handle, receiver) = reply_channel();
        drop(handle);
        assert_eq!(receiver.wait().await, None);
    }

    #[test]
    fn send_after_receiver_dropped_returns_envelope() {
        let (handle, receiver) = reply_channel();
        drop(receiver);
        assert!(handle.is_closed());
        let envelope = ResponseEnvelope::failure("late");
        assert_eq!(handle.send(envelope.clone()), Err(envelope));
    }
}
