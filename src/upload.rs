use embassy_net::Stack;
use embedded_io_async::{Read, Write};
use light_sensor_core::http;
use static_cell::StaticCell;

use crate::config::CONFIG;
use crate::constants::*;
use crate::transport;

static RX_BUF: StaticCell<[u8; RX_BUFFER_SIZE]> = StaticCell::new();
static TX_BUF: StaticCell<[u8; TX_BUFFER_SIZE]> = StaticCell::new();

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    Transport(transport::Error),
    Format,
    Write,
    Read,
    #[allow(dead_code)]
    Response(http::Error),
    #[allow(dead_code)]
    Status(u16),
}

/// Posts readings to the collector, one connection per request.
pub struct Uploader {
    stack: Stack<'static>,
    rx_buf: &'static mut [u8; RX_BUFFER_SIZE],
    tx_buf: &'static mut [u8; TX_BUFFER_SIZE],
    response: [u8; HTTP_RESPONSE_BUFFER_SIZE],
}

impl Uploader {
    pub fn new(stack: Stack<'static>) -> Self {
        Self {
            stack,
            rx_buf: RX_BUF.init([0; RX_BUFFER_SIZE]),
            tx_buf: TX_BUF.init([0; TX_BUFFER_SIZE]),
            response: [0; HTTP_RESPONSE_BUFFER_SIZE],
        }
    }

    /// Whether the station currently holds an address to send from.
    pub fn is_online(&self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }

    pub async fn post(&mut self, body: &str) -> Result<u16, Error> {
        let mut socket = transport::connect(
            self.stack,
            &mut self.rx_buf[..],
            &mut self.tx_buf[..],
            CONFIG.server_hostname,
            CONFIG.server_port,
        )
        .await
        .map_err(Error::Transport)?;

        let head = http::post_head(
            CONFIG.server_hostname,
            CONFIG.server_port,
            CONFIG.server_path,
            body.len(),
        )
        .map_err(|_| Error::Format)?;

        socket
            .write_all(head.as_bytes())
            .await
            .map_err(|_| Error::Write)?;
        socket
            .write_all(body.as_bytes())
            .await
            .map_err(|_| Error::Write)?;
        socket.flush().await.map_err(|_| Error::Write)?;

        // only the status line and headers are of interest
        let mut received = 0;
        while received < self.response.len() {
            let n = socket
                .read(&mut self.response[received..])
                .await
                .map_err(|_| Error::Read)?;
            if n == 0 {
                break;
            }
            received += n;
            if http::find_header_end(&self.response[..received]).is_some() {
                break;
            }
        }
        socket.close();

        let status = http::parse_status(&self.response[..received]).map_err(Error::Response)?;
        if !http::is_success(status) {
            return Err(Error::Status(status));
        }

        Ok(status)
    }
}
