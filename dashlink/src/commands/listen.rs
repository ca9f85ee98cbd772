use super::inject::format_hex;
use colored::*;
use dashlink_core::network::{open_multicast_socket, MAX_DATAGRAM_SIZE};
use dashlink_core::TransportConfig;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Print outbound dashboard datagrams as hex, acting as the remote peer.
///
/// Joins the group on `port` (normally the dashboard's `dest_port`) and stops
/// after `count` datagrams, or on Ctrl+C. Returns the number printed.
pub fn execute_listen(
    transport: &TransportConfig,
    port: u16,
    count: Option<usize>,
) -> anyhow::Result<usize> {
    let config = TransportConfig {
        local_port: port,
        ..transport.clone()
    };
    let socket = open_multicast_socket(&config)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(false, Ordering::Release)) {
        tracing::warn!("Failed to set signal handler: {}", e);
    }

    println!(
        "{} Listening for dashboard output on {}:{}",
        "→".cyan(),
        config.group,
        port
    );

    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut received = 0usize;
    while running.load(Ordering::Acquire) && count.map_or(true, |limit| received < limit) {
        match socket.recv_from(&mut buffer) {
            Ok((size, source)) => {
                received += 1;
                println!(
                    "{} {} {} bytes: {}",
                    format!("[{}]", received).dimmed(),
                    source.to_string().cyan(),
                    size,
                    format_hex(&buffer[..size])
                );
            }
            Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(received)
}
