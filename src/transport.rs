//! Two-party transport abstraction: a duplex [`Channel`] carrying the
//! tagged-union [`Message`] shape, with an in-process [`InMemoryChannel`]
//! pair built on [`std::sync::mpsc::sync_channel`]. Turning this into real
//! socket I/O is left to embedding applications.

use std::sync::mpsc::{Receiver, RecvError, SendError, SyncSender};

use rug::Integer;

/// The tagged union exchanged between Alice and Bob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    BigInt(Integer),
    BigIntArray(Vec<Integer>),
    SmallInt(u32),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl Message {
    pub fn into_big_int(self) -> Result<Integer, TransportError> {
        match self {
            Message::BigInt(x) => Ok(x),
            _ => Err(TransportError::UnexpectedMessage),
        }
    }

    pub fn into_big_int_array(self) -> Result<Vec<Integer>, TransportError> {
        match self {
            Message::BigIntArray(xs) => Ok(xs),
            _ => Err(TransportError::UnexpectedMessage),
        }
    }

    pub fn into_small_int(self) -> Result<u32, TransportError> {
        match self {
            Message::SmallInt(x) => Ok(x),
            _ => Err(TransportError::UnexpectedMessage),
        }
    }

    pub fn into_bool(self) -> Result<bool, TransportError> {
        match self {
            Message::Bool(x) => Ok(x),
            _ => Err(TransportError::UnexpectedMessage),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, TransportError> {
        match self {
            Message::Bytes(x) => Ok(x),
            _ => Err(TransportError::UnexpectedMessage),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the channel, or it was dropped, mid sub-protocol.
    #[error("transport closed")]
    Closed,
    /// A message of the wrong variant was received for the step of the
    /// sub-protocol being run.
    #[error("received message of unexpected shape")]
    UnexpectedMessage,
}

/// A duplex message channel between the two parties of a protocol session.
///
/// Reads block on the peer (§5's cooperative single-threaded exchange
/// model): a session is strictly request/response, so `send`/`recv` calls
/// alternate between the two sides of one sub-protocol.
pub trait Channel {
    fn send(&self, message: Message) -> Result<(), TransportError>;
    fn recv(&self) -> Result<Message, TransportError>;
}

/// One end of an in-process duplex channel, built on two bounded
/// `std::sync::mpsc` channels (one per direction).
pub struct InMemoryChannel {
    tx: SyncSender<Message>,
    rx: Receiver<Message>,
}

impl InMemoryChannel {
    /// Builds a connected pair: `(alice_end, bob_end)`.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = std::sync::mpsc::sync_channel(1);
        let (tx_b, rx_b) = std::sync::mpsc::sync_channel(1);
        (
            InMemoryChannel { tx: tx_a, rx: rx_b },
            InMemoryChannel { tx: tx_b, rx: rx_a },
        )
    }
}

impl Channel for InMemoryChannel {
    fn send(&self, message: Message) -> Result<(), TransportError> {
        self.tx.send(message).map_err(|SendError(_)| TransportError::Closed)
    }

    fn recv(&self) -> Result<Message, TransportError> {
        self.rx.recv().map_err(|RecvError| TransportError::Closed)
    }
}
