//! Local access point, hosted in config mode or once the station connection is given up.

use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use edge_dhcp::{
    io::{self, DEFAULT_SERVER_PORT},
    server::{Server, ServerOptions},
};
use edge_nal::UdpBind;
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AccessPointConfig, AuthMethod, ModeConfig, WifiController, WifiError, WifiEvent,
};
use log::{error, info, warn};

use crate::config::CONFIG;
use crate::constants::*;

pub async fn start(controller: &mut WifiController<'static>) -> Result<(), WifiError> {
    if matches!(controller.is_started(), Ok(true)) {
        controller.stop_async().await?;
    }

    let auth_method = if CONFIG.ap_psk.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::Wpa2Personal
    };

    let ap_config = AccessPointConfig::default()
        .with_ssid(CONFIG.ap_ssid.into())
        .with_password(CONFIG.ap_psk.into())
        .with_auth_method(auth_method)
        .with_channel(CONFIG.ap_channel)
        .with_max_connections(CONFIG.ap_max_connections);

    info!(
        "Starting access point {:?} on channel {} ({:?})",
        CONFIG.ap_ssid, CONFIG.ap_channel, auth_method
    );
    controller.set_config(&ModeConfig::AccessPoint(ap_config))?;
    controller.start_async().await?;
    info!("Access point started");

    Ok(())
}

/// Logs stations joining and leaving the access point, forever.
pub async fn watch(controller: &mut WifiController<'static>) -> ! {
    let mut joined: u16 = 0;
    loop {
        let events = controller
            .wait_for_events(
                WifiEvent::ApStaConnected | WifiEvent::ApStaDisconnected,
                true,
            )
            .await;

        if events.contains(WifiEvent::ApStaConnected) {
            joined = joined.saturating_add(1);
            info!("Station joined access point ({} connected)", joined);
        }
        if events.contains(WifiEvent::ApStaDisconnected) {
            joined = joined.saturating_sub(1);
            warn!("Station left access point ({} connected)", joined);
        }
    }
}

/// Hands out leases on the access point network, the gateway being this device.
#[embassy_executor::task]
pub async fn dhcp_server(stack: Stack<'static>) {
    let gateway = Ipv4Addr::from(AP_GATEWAY);

    let mut buf = [0u8; DHCP_BUFFER_SIZE];
    let mut gateways = [gateway];

    let buffers = UdpBuffers::<1, DHCP_BUFFER_SIZE, DHCP_BUFFER_SIZE, 4>::new();
    let udp = Udp::new(stack, &buffers);
    let mut socket = match udp
        .bind(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::UNSPECIFIED,
            DEFAULT_SERVER_PORT,
        )))
        .await
    {
        Ok(socket) => socket,
        Err(e) => {
            error!("Failed to bind DHCP server: {:?}", e);
            return;
        }
    };

    info!("DHCP server listening on {}", gateway);
    loop {
        if let Err(e) = io::server::run(
            &mut Server::<_, DHCP_MAX_LEASES>::new_with_et(gateway),
            &ServerOptions::new(gateway, Some(&mut gateways)),
            &mut socket,
            &mut buf,
        )
        .await
        {
            warn!("DHCP server error: {:?}", e);
        }
        Timer::after(Duration::from_millis(DHCP_RESTART_DELAY_MS)).await;
    }
}
