use colored::*;
use dashlink_core::InboundPacket;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

/// Parse hex bytes, ignoring whitespace, `:` and `-` separators.
pub fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("hex payload contains non-hex characters: '{}'", text);
    }
    if digits.len() % 2 != 0 {
        anyhow::bail!("hex payload has an odd number of digits: '{}'", text);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| anyhow::anyhow!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}

/// Render bytes as space separated lowercase hex
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Send one inbound packet to a dashboard, acting as the remote peer.
///
/// Returns the datagram that was sent.
pub fn execute_inject(
    group: Ipv4Addr,
    port: u16,
    ttl: u32,
    offset: u32,
    payload: &[u8],
) -> anyhow::Result<Vec<u8>> {
    let datagram = InboundPacket::encode(offset, payload);
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.set_multicast_ttl_v4(ttl)?;
    let destination = SocketAddrV4::new(group, port);
    socket.send_to(&datagram, destination)?;

    println!(
        "{} Sent {} bytes at offset {} to {}",
        "✓".green(),
        payload.len(),
        offset,
        destination.to_string().cyan()
    );
    Ok(datagram)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_accepts_separators() {
        assert_eq!(parse_hex("deadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(parse_hex("0x00FF").unwrap(), vec![0x00, 0xff]);
        assert_eq!(parse_hex("01 02:03-04").unwrap(), vec![1, 2, 3, 4]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_rejects_bad_input() {
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("é1").is_err());
        assert!(parse_hex("+f").is_err());
        assert!(parse_hex("0a+f").is_err());
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0, 15, 255]), "00 0f ff");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_inject_to_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();

        // Loopback stands in for the group; the datagram format is the same.
        let sent = execute_inject(Ipv4Addr::LOCALHOST, port, 1, 3, &[9, 8]).unwrap();
        let mut buffer = [0u8; 16];
        let (size, _) = receiver.recv_from(&mut buffer).unwrap();

        assert_eq!(&buffer[..size], sent.as_slice());
        assert_eq!(&buffer[..size], &[3, 0, 0, 0, 9, 8]);
    }
}
