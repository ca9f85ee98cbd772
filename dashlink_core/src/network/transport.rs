/// UDP multicast transport keeping the datastore in sync with a remote peer.
///
/// A background thread receives datagrams from the group and writes their
/// payload into the input buffer. Sends go out from the caller's thread, once
/// per sync tick, as a single datagram holding the whole output buffer.
use super::packet::{InboundPacket, MAX_DATAGRAM_SIZE};
use super::sink::OutputSink;
use super::state::{StateCell, StatsSnapshot, TransportState, TransportStats};
use crate::config::TransportConfig;
use crate::datastore::{Datastore, OutputBuffer};
use crate::error::{DashError, DashResult};
use parking_lot::Mutex;
use socket2::{Domain, Protocol, SockRef, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// State shared between the handle and the receive thread
#[derive(Debug)]
struct Shared {
    state: StateCell,
    stop: AtomicBool,
    socket: Mutex<Option<Arc<UdpSocket>>>,
    stats: TransportStats,
}

impl Shared {
    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Receive thread exit path: release the socket and settle in `Stopped`.
    fn finish(&self) {
        self.state
            .transition(TransportState::Receiving, TransportState::Stopping);
        self.socket.lock().take();
        self.state.set(TransportState::Stopped);
    }
}

/// Multicast transport bound to one datastore
pub struct MulticastTransport {
    config: TransportConfig,
    datastore: Arc<Datastore>,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MulticastTransport {
    pub fn new(config: TransportConfig, datastore: Arc<Datastore>) -> Self {
        Self {
            config,
            datastore,
            shared: Arc::new(Shared {
                state: StateCell::new(TransportState::Stopped),
                stop: AtomicBool::new(false),
                socket: Mutex::new(None),
                stats: TransportStats::default(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Open the socket, join the group and spawn the receive thread.
    ///
    /// Setup failures are logged and leave the transport `Stopped`; the rest
    /// of the dashboard keeps running without network traffic. Returns the
    /// state reached.
    pub fn start(&self) -> TransportState {
        match self.try_start() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("{}", e);
                TransportState::Stopped
            }
        }
    }

    /// Like [`start`](Self::start), but reports setup failures as
    /// [`DashError::Network`]. The transport is `Stopped` after an error.
    ///
    /// Calling it while not `Stopped` is a no-op returning the current state.
    pub fn try_start(&self) -> DashResult<TransportState> {
        let mut worker = self.worker.lock();
        if !self
            .shared
            .state
            .transition(TransportState::Stopped, TransportState::Starting)
        {
            return Ok(self.state());
        }
        if let Some(previous) = worker.take() {
            let _ = previous.join();
        }
        self.shared.stop.store(false, Ordering::Release);

        let socket = match open_multicast_socket(&self.config) {
            Ok(socket) => Arc::new(socket),
            Err(e) => {
                self.shared.state.set(TransportState::Stopped);
                return Err(DashError::network(format!(
                    "multicast setup failed for {}:{}: {}",
                    self.config.group, self.config.local_port, e
                )));
            }
        };

        *self.shared.socket.lock() = Some(Arc::clone(&socket));
        self.shared.state.set(TransportState::Receiving);

        let shared = Arc::clone(&self.shared);
        let datastore = Arc::clone(&self.datastore);
        let spawned = std::thread::Builder::new()
            .name("dashlink-rx".to_string())
            .spawn(move || {
                receive_loop(&socket, &datastore, &shared);
                shared.finish();
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                log::info!(
                    "Multicast transport receiving on {}:{}, sending to {}:{}",
                    self.config.group,
                    self.config.local_port,
                    self.config.group,
                    self.config.dest_port
                );
                Ok(TransportState::Receiving)
            }
            Err(e) => {
                self.shared.socket.lock().take();
                self.shared.state.set(TransportState::Stopped);
                Err(DashError::network(format!(
                    "failed to spawn receive thread: {}",
                    e
                )))
            }
        }
    }

    /// Stop the receive thread and close the socket.
    ///
    /// Idempotent. The socket is shut down so a blocked receive returns
    /// immediately; the receive poll interval bounds the wait on platforms
    /// where shutdown does not wake it.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        self.shared.stop.store(true, Ordering::Release);
        self.shared
            .state
            .transition(TransportState::Receiving, TransportState::Stopping);

        if let Some(socket) = self.shared.socket.lock().take() {
            let _ = SockRef::from(socket.as_ref()).shutdown(Shutdown::Both);
        }

        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                log::warn!("Receive thread panicked");
            }
            log::info!("Multicast transport stopped ({})", self.stats());
        }
        self.shared.state.set(TransportState::Stopped);
    }

    /// Send the whole output buffer as one datagram to the group.
    ///
    /// Failures are counted and otherwise ignored.
    pub fn send_output(&self, output: &OutputBuffer) {
        let Some(socket) = self.shared.socket.lock().as_ref().map(Arc::clone) else {
            return;
        };
        let destination = SocketAddrV4::new(self.config.group, self.config.dest_port);
        match socket.send_to(output.as_bytes(), destination) {
            Ok(_) => self.shared.stats.record_sent(),
            Err(e) => {
                self.shared.stats.record_send_failure();
                log::trace!("Send to {} failed: {}", destination, e);
            }
        }
    }

    pub fn state(&self) -> TransportState {
        self.shared.state.get()
    }

    pub fn is_receiving(&self) -> bool {
        self.state() == TransportState::Receiving
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Local address of the open socket, if running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.shared
            .socket
            .lock()
            .as_ref()
            .and_then(|socket| socket.local_addr().ok())
    }
}

impl OutputSink for MulticastTransport {
    fn send_output(&self, output: &OutputBuffer) {
        MulticastTransport::send_output(self, output)
    }
}

impl Drop for MulticastTransport {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MulticastTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MulticastTransport")
            .field("group", &self.config.group)
            .field("local_port", &self.config.local_port)
            .field("dest_port", &self.config.dest_port)
            .field("state", &self.state())
            .finish()
    }
}

/// Apply one inbound datagram to the datastore.
///
/// Returns `false` when the datagram was dropped as malformed.
pub fn ingest_datagram(datastore: &Datastore, datagram: &[u8], stats: &TransportStats) -> bool {
    match InboundPacket::parse(datagram) {
        Some(packet) => {
            packet.apply(datastore);
            stats.record_received(packet.payload.len());
            true
        }
        None => {
            stats.record_dropped();
            log::debug!("Dropped {}-byte datagram without offset prefix", datagram.len());
            false
        }
    }
}

/// Bind `config.local_port`, join the group and apply the multicast options.
///
/// The returned socket has a read timeout of `config.poll_interval()`. Also
/// used by peer-side tools that listen on the dashboard's destination port.
pub fn open_multicast_socket(config: &TransportConfig) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_multicast_ttl_v4(config.multicast_ttl)?;

    // Some platforms only deliver group traffic to a socket bound to the
    // group address itself.
    let wildcard = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.local_port);
    if let Err(e) = socket.bind(&wildcard.into()) {
        log::debug!("Wildcard bind failed ({}), binding group address", e);
        let group = SocketAddrV4::new(config.group, config.local_port);
        socket.bind(&group.into())?;
    }

    socket.join_multicast_v4(&config.group, &config.interface)?;
    if !config.interface.is_unspecified() {
        socket.set_multicast_if_v4(&config.interface)?;
    }
    socket.set_read_timeout(Some(config.poll_interval()))?;
    Ok(socket.into())
}

fn receive_loop(socket: &UdpSocket, datastore: &Datastore, shared: &Shared) {
    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

    while !shared.stop_requested() {
        match socket.recv_from(&mut buffer) {
            Ok((size, _src_addr)) => {
                ingest_datagram(datastore, &buffer[..size], &shared.stats);
            }
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                if !shared.stop_requested() {
                    log::warn!("Receive failed, stopping transport: {}", e);
                }
                break;
            }
        }
    }
}
