//! Channel-backed transport double for session tests.
//!
//! [`fake_pair`] returns the client-side transport plus a [`FakeVendor`]
//! handle the test drives: frames the session sends arrive on
//! `from_client` in order, frames pushed into `to_client` are what the
//! session reads, and `closed` counts close calls so tests can assert the
//! connection is torn down exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Frame, FrameSink, FrameSource, Transport, TransportError};

pub(crate) struct FakeTransport {
    to_vendor: mpsc::UnboundedSender<Frame>,
    from_vendor: mpsc::UnboundedReceiver<Frame>,
    closed: Arc<AtomicUsize>,
}

/// The vendor's side of a fake connection.
pub(crate) struct FakeVendor {
    pub from_client: mpsc::UnboundedReceiver<Frame>,
    pub to_client: mpsc::UnboundedSender<Frame>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeVendor {
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub(crate) fn fake_pair() -> (FakeTransport, FakeVendor) {
    let (client_tx, vendor_rx) = mpsc::unbounded_channel();
    let (vendor_tx, client_rx) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicUsize::new(0));

    let transport = FakeTransport {
        to_vendor: client_tx,
        from_vendor: client_rx,
        closed: closed.clone(),
    };
    let vendor = FakeVendor {
        from_client: vendor_rx,
        to_client: vendor_tx,
        closed,
    };
    (transport, vendor)
}

pub(crate) struct FakeSink {
    tx: Option<mpsc::UnboundedSender<Frame>>,
    closed: Arc<AtomicUsize>,
}

pub(crate) struct FakeSource {
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl Transport for FakeTransport {
    type Sink = FakeSink;
    type Source = FakeSource;

    fn into_split(self) -> (Self::Sink, Self::Source) {
        (
            FakeSink {
                tx: Some(self.to_vendor),
                closed: self.closed,
            },
            FakeSource {
                rx: self.from_vendor,
            },
        )
    }
}

#[async_trait]
impl FrameSink for FakeSink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| TransportError::SendFailed("connection closed".to_string()))?;
        tx.send(frame)
            .map_err(|_| TransportError::SendFailed("peer dropped".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx.take();
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl FrameSource for FakeSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        Ok(self.rx.recv().await)
    }
}
