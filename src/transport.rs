//! Outbound message channel
//!
//! Sending is fire-and-forget. Responses arrive later as `HostMessage`s fed to
//! the controller by whoever owns the receiving side.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use tracing::{trace, warn};

use crate::protocol::ClientMessage;

pub trait Transport {
    fn send(&self, msg: ClientMessage);
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn send(&self, msg: ClientMessage) {
        (**self).send(msg)
    }
}

/// JSON-encodes messages onto an mpsc channel
pub struct ChannelTransport<M> {
    tx: Sender<M>,
    wrap: fn(String) -> M,
}

impl<M> ChannelTransport<M> {
    pub fn new(tx: Sender<M>, wrap: fn(String) -> M) -> Self {
        Self { tx, wrap }
    }
}

impl<M> Transport for ChannelTransport<M> {
    fn send(&self, msg: ClientMessage) {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                trace!(%json, "sending");
                if self.tx.send((self.wrap)(json)).is_err() {
                    warn!(msg_type = msg.type_name(), "Host channel closed, message dropped");
                }
            }
            Err(e) => warn!(error = %e, msg_type = msg.type_name(), "Failed to encode message"),
        }
    }
}

/// Keeps every sent message in order
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: RefCell<Vec<ClientMessage>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything sent so far
    pub fn take(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.borrow().clone()
    }

    /// Count of sent messages with the given `type`
    pub fn count(&self, type_name: &str) -> usize {
        self.sent
            .borrow()
            .iter()
            .filter(|m| m.type_name() == type_name)
            .count()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, msg: ClientMessage) {
        self.sent.borrow_mut().push(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_channel_transport_encodes_json() {
        let (tx, rx) = channel::<String>();
        let transport = ChannelTransport::new(tx, |s| s);
        transport.send(ClientMessage::ChangeViewport { top: 5, bottom: 25 });

        let json = rx.try_recv().unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClientMessage::ChangeViewport { top: 5, bottom: 25 });
    }

    #[test]
    fn test_recording_transport() {
        let transport = Rc::new(RecordingTransport::new());
        let handle: Rc<RecordingTransport> = Rc::clone(&transport);
        handle.send(ClientMessage::AddRow);
        handle.send(ClientMessage::RemoveRow);
        assert_eq!(transport.count("add_row"), 1);
        assert_eq!(transport.take().len(), 2);
        assert!(transport.sent().is_empty());
    }
}
