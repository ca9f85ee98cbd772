use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle of the multicast transport.
///
/// `Stopped → Starting → Receiving → Stopping → Stopped`, with
/// `Starting → Stopped` when socket setup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransportState {
    Stopped = 0,
    Starting = 1,
    Receiving = 2,
    Stopping = 3,
}

impl TransportState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Receiving,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "Stopped"),
            TransportState::Starting => write!(f, "Starting"),
            TransportState::Receiving => write!(f, "Receiving"),
            TransportState::Stopping => write!(f, "Stopping"),
        }
    }
}

/// Lock-free cell holding a [`TransportState`]
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: TransportState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn get(&self) -> TransportState {
        TransportState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: TransportState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move to `to` only if currently in `from`
    pub(crate) fn transition(&self, from: TransportState, to: TransportState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Traffic counters, updated from both the receive thread and the sender
#[derive(Debug, Default)]
pub struct TransportStats {
    datagrams_received: AtomicU64,
    datagrams_dropped: AtomicU64,
    bytes_written: AtomicU64,
    datagrams_sent: AtomicU64,
    send_failures: AtomicU64,
}

/// Point-in-time copy of [`TransportStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub datagrams_received: u64,
    pub datagrams_dropped: u64,
    pub bytes_written: u64,
    pub datagrams_sent: u64,
    pub send_failures: u64,
}

impl TransportStats {
    pub(crate) fn record_received(&self, payload_len: usize) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(payload_len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.datagrams_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sent(&self) {
        self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            datagrams_dropped: self.datagrams_dropped.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} ({} dropped, {} bytes), sent {} ({} failed)",
            self.datagrams_received,
            self.datagrams_dropped,
            self.bytes_written,
            self.datagrams_sent,
            self.send_failures
        )
    }
}
