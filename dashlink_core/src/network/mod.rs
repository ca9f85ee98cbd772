/// Network transport for dashlink
///
/// Keeps the datastore synchronized with a remote peer over UDP multicast:
/// - Inbound datagrams carry a 4-byte offset and a payload for the input buffer
/// - Outbound datagrams are the raw output buffer, sent once per tick
/// - Best effort only: no acknowledgment, retry or reordering
pub mod packet;
pub mod sink;
pub mod state;
pub mod transport;

pub use packet::{InboundPacket, MAX_DATAGRAM_SIZE, OFFSET_PREFIX_LEN};
pub use sink::{OutputSink, RecordingSink};
pub use state::{StatsSnapshot, TransportState, TransportStats};
pub use transport::{ingest_datagram, open_multicast_socket, MulticastTransport};
