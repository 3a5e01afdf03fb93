use core::net::Ipv4Addr;

use embassy_net::{
    dns::{DnsQueryType, Error as DNSError},
    tcp::{ConnectError, TcpSocket},
    IpAddress, Stack,
};
use embassy_time::Duration;

use crate::constants::HTTP_TIMEOUT_SECS;

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    DNSQueryFailed(DNSError),
    DNSLookupFailed,
    #[allow(dead_code)]
    SocketConnectionError(ConnectError),
}

/// Resolves an IPv4 literal directly, anything else through DNS.
pub async fn resolve(stack: Stack<'static>, hostname: &str) -> Result<IpAddress, Error> {
    if let Ok(addr) = hostname.parse::<Ipv4Addr>() {
        return Ok(IpAddress::Ipv4(addr));
    }

    stack
        .dns_query(hostname, DnsQueryType::A)
        .await
        .map_err(Error::DNSQueryFailed)?
        .first()
        .copied()
        .ok_or(Error::DNSLookupFailed)
}

/// Opens a plain TCP connection to `hostname:port`.
pub async fn connect<'a>(
    stack: Stack<'static>,
    rx_buffer: &'a mut [u8],
    tx_buffer: &'a mut [u8],
    hostname: &str,
    port: u16,
) -> Result<TcpSocket<'a>, Error> {
    let addr = resolve(stack, hostname).await?;

    let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)));

    log::debug!("Connecting TCP socket to {}:{}", addr, port);
    socket
        .connect((addr, port))
        .await
        .map_err(Error::SocketConnectionError)?;

    Ok(socket)
}
