//! Moving records between peers.
//!
//! A [`Transport`] exchanges opaque bytes. A [`Channel`] sits on top of one
//! and exchanges whole [`Record`]s, stamping every request with a sequence
//! number the peer must echo back.

#[cfg(feature = "http")]
mod http;
mod service;

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use service::{Loopback, QueryService, RecordService, serve_bytes};

use crate::errors::TransportError;
use crate::pack::Record;
use crate::query::{ERROR_FIELD, text_request};

/// Control field carrying the request sequence number.
pub const SEQUENCE_FIELD: &str = "#";

/// One opaque request/response byte exchange.
pub trait Transport {
    fn send_bytes(&self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_bytes(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).send_bytes(request)
    }
}

/// Record-level access to a peer.
///
/// A channel starts uninitialized; every send fails with
/// [`TransportError::Uninitialized`] until [`Channel::init`] supplies a
/// transport.
#[derive(Default)]
pub struct Channel {
    transport: Option<Box<dyn Transport + Send + Sync>>,
    sequence: AtomicU64,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(transport: impl Transport + Send + Sync + 'static) -> Self {
        let mut channel = Self::new();
        channel.init(transport);
        channel
    }

    /// Install the transport. A second call replaces the first.
    pub fn init(&mut self, transport: impl Transport + Send + Sync + 'static) {
        if self.transport.is_some() {
            tracing::debug!("replacing channel transport");
        }
        self.transport = Some(Box::new(transport));
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// The sequence number the last request was stamped with.
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn send_bytes(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(TransportError::Uninitialized)?;
        let reply = transport.send_bytes(request)?;
        tracing::debug!(sent = request.len(), received = reply.len(), "byte round trip");
        Ok(reply)
    }

    /// Send a record and decode the reply.
    ///
    /// The request goes out with a fresh `#` sequence number. A reply that
    /// carries a different `#` belongs to some other request and is
    /// rejected; a reply without one is accepted.
    pub fn send_record(&self, record: &Record) -> Result<Record, TransportError> {
        if !self.is_initialized() {
            return Err(TransportError::Uninitialized);
        }
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut request = record.clone();
        request.add(SEQUENCE_FIELD, sequence as f64);

        let reply = Record::decode(&self.send_bytes(&request.encode()?)?)?;
        if let Some(received) = reply.number(SEQUENCE_FIELD)
            && received != sequence as f64
        {
            return Err(TransportError::SequenceMismatch {
                sent: sequence as f64,
                received,
            });
        }
        Ok(reply)
    }

    /// Send a query string, optionally prefixed `Kind|`, and return the
    /// reply. A reply carrying `!E` fails with the peer's message.
    pub fn send_query(&self, text: &str) -> Result<Record, TransportError> {
        let reply = self.send_record(&text_request(text))?;
        match reply.text(ERROR_FIELD) {
            Some(message) => Err(TransportError::Service(message.to_string())),
            None => Ok(reply),
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("initialized", &self.is_initialized())
            .field("sequence", &self.last_sequence())
            .finish()
    }
}
