//! Minimal SNTPv3 client packet handling (RFC 4330).

pub const PACKET_LEN: usize = 48;
pub const SNTP_PORT: u16 = 123;

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

// LI = 0, VN = 3, Mode = 3 (client)
const CLIENT_HEADER: u8 = 0x1B;

const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;

const TRANSMIT_TIMESTAMP: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Truncated(usize),
    UnexpectedMode(u8),
    /// Stratum 0, the server asked us to back off
    KissOfDeath,
    ZeroTimestamp,
}

pub fn request() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    packet
}

/// Whether another request follows `attempt` (1-based) out of `attempts`.
pub fn retry_follows(attempt: u8, attempts: u8) -> bool {
    attempt < attempts
}

/// Extracts the server transmit time as unix seconds.
pub fn parse_response(packet: &[u8]) -> Result<u64, Error> {
    if packet.len() < PACKET_LEN {
        return Err(Error::Truncated(packet.len()));
    }

    let mode = packet[0] & 0x07;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(Error::UnexpectedMode(mode));
    }

    if packet[1] == 0 {
        return Err(Error::KissOfDeath);
    }

    let mut seconds = [0u8; 4];
    seconds.copy_from_slice(&packet[TRANSMIT_TIMESTAMP..TRANSMIT_TIMESTAMP + 4]);
    let ntp_seconds = u32::from_be_bytes(seconds) as u64;
    if ntp_seconds == 0 {
        return Err(Error::ZeroTimestamp);
    }

    // Era 1 starts in 2036, when the 32-bit seconds field wraps
    let ntp_seconds = if ntp_seconds < NTP_UNIX_OFFSET {
        ntp_seconds + (1 << 32)
    } else {
        ntp_seconds
    };

    Ok(ntp_seconds - NTP_UNIX_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(mode: u8, stratum: u8, ntp_seconds: u32) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[0] = 0x18 | mode;
        packet[1] = stratum;
        packet[TRANSMIT_TIMESTAMP..TRANSMIT_TIMESTAMP + 4]
            .copy_from_slice(&ntp_seconds.to_be_bytes());
        packet
    }

    #[test]
    fn request_is_client_v3() {
        let packet = request();
        assert_eq!(packet[0], 0x1B);
        assert!(packet[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn server_response_converts_to_unix() {
        let ntp = (1_704_067_200u64 + NTP_UNIX_OFFSET) as u32;
        assert_eq!(parse_response(&response(4, 2, ntp)), Ok(1_704_067_200));
        assert_eq!(parse_response(&response(5, 1, ntp)), Ok(1_704_067_200));
    }

    #[test]
    fn era_rollover_is_handled() {
        // 2036-02-07 06:28:16 UTC wraps the seconds field to 0; 10 s later reads 10
        let era1_start = (1u64 << 32) - NTP_UNIX_OFFSET;
        assert_eq!(parse_response(&response(4, 2, 10)), Ok(era1_start + 10));
    }

    #[test]
    fn no_pause_after_the_last_attempt() {
        assert!(retry_follows(1, 3));
        assert!(retry_follows(2, 3));
        assert!(!retry_follows(3, 3));
        assert!(!retry_follows(1, 1));
    }

    #[test]
    fn rejects_bad_responses() {
        let ntp = (1_704_067_200u64 + NTP_UNIX_OFFSET) as u32;
        assert_eq!(parse_response(&[0u8; 20]), Err(Error::Truncated(20)));
        assert_eq!(
            parse_response(&response(3, 2, ntp)),
            Err(Error::UnexpectedMode(3))
        );
        assert_eq!(parse_response(&response(4, 0, ntp)), Err(Error::KissOfDeath));
        assert_eq!(parse_response(&response(4, 2, 0)), Err(Error::ZeroTimestamp));
    }
}
