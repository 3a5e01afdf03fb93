use embassy_net::{
    udp::{PacketMetadata, UdpSocket},
    IpEndpoint, Stack,
};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use light_sensor_core::sntp;
use light_sensor_core::timestamp::{format_timestamp, Timestamp, WallClock};
use log::{info, warn};

use crate::constants::*;
use crate::transport;

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    Resolve(transport::Error),
    Bind,
    Send,
    Receive,
    Timeout,
    #[allow(dead_code)]
    Sntp(sntp::Error),
}

/// Wall clock shared by every reading.
#[derive(Debug, Default, Clone, Copy)]
pub struct Clock {
    wall: WallClock,
}

impl Clock {
    /// Queries the SNTP server, keeping the unsynced clock if every attempt fails.
    pub async fn sync(stack: Stack<'static>, server: &str) -> Self {
        for attempt in 1..=SNTP_ATTEMPTS {
            match query(stack, server).await {
                Ok(unix) => {
                    let wall = WallClock::synced(unix, uptime());
                    info!("Clock synced: {}", format_timestamp(unix));
                    return Self { wall };
                }
                Err(e) => {
                    warn!("SNTP attempt {}/{} failed: {:?}", attempt, SNTP_ATTEMPTS, e);
                    if sntp::retry_follows(attempt, SNTP_ATTEMPTS) {
                        Timer::after(Duration::from_millis(SNTP_RETRY_DELAY_MS)).await;
                    }
                }
            }
        }
        warn!("Clock not synced, timestamps count from boot");
        Self::default()
    }

    pub fn timestamp(&self) -> Timestamp {
        format_timestamp(self.wall.now(uptime()))
    }
}

fn uptime() -> u64 {
    Instant::now().as_secs()
}

async fn query(stack: Stack<'static>, server: &str) -> Result<u64, Error> {
    let addr = transport::resolve(stack, server)
        .await
        .map_err(Error::Resolve)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; sntp::PACKET_LEN * 2];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; sntp::PACKET_LEN];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(SNTP_LOCAL_PORT).map_err(|_| Error::Bind)?;

    socket
        .send_to(&sntp::request(), IpEndpoint::new(addr, sntp::SNTP_PORT))
        .await
        .map_err(|_| Error::Send)?;

    let mut packet = [0u8; sntp::PACKET_LEN];
    let (len, _) = with_timeout(
        Duration::from_secs(SNTP_TIMEOUT_SECS),
        socket.recv_from(&mut packet),
    )
    .await
    .map_err(|_| Error::Timeout)?
    .map_err(|_| Error::Receive)?;

    sntp::parse_response(&packet[..len]).map_err(Error::Sntp)
}
