/// Wire format of inbound datagrams.
///
/// ```text
/// +----------------------+----------------------+
/// | offset (u32, LE)     | payload (N bytes)    |
/// +----------------------+----------------------+
/// ```
///
/// The payload is written verbatim into the input buffer at `offset`.
/// Outbound datagrams carry no header: they are the raw output buffer.
use crate::datastore::Datastore;

/// Length of the address prefix
pub const OFFSET_PREFIX_LEN: usize = 4;

/// Largest UDP payload over IPv4
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Parsed view of an inbound datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundPacket<'a> {
    pub offset: u32,
    pub payload: &'a [u8],
}

impl<'a> InboundPacket<'a> {
    /// Split a datagram into offset and payload.
    ///
    /// Returns `None` for datagrams too short to carry the offset prefix.
    pub fn parse(datagram: &'a [u8]) -> Option<Self> {
        let (prefix, payload) = datagram.split_first_chunk::<OFFSET_PREFIX_LEN>()?;
        Some(Self {
            offset: u32::from_le_bytes(*prefix),
            payload,
        })
    }

    /// Build an inbound datagram, as a remote peer would
    pub fn encode(offset: u32, payload: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(OFFSET_PREFIX_LEN + payload.len());
        buffer.extend_from_slice(&offset.to_le_bytes());
        buffer.extend_from_slice(payload);
        buffer
    }

    /// Write the payload into the datastore's input buffer
    pub fn apply(&self, datastore: &Datastore) {
        datastore.write_input(self.offset, self.payload);
    }
}
