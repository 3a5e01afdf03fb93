use embassy_executor::Spawner;
use embassy_net::{Ipv4Address, Ipv4Cidr, Runner, Stack, StackResources, StaticConfigV4};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{with_timeout, Duration, Timer};

use esp_hal::rng::Rng;
use esp_radio::{
    wifi::{ClientConfig, Config, ModeConfig, WifiController, WifiDevice, WifiEvent},
    Controller,
};

use core::str::FromStr;
use heapless::String;
use light_sensor_core::supervisor::{Action, ConnectionSupervisor, FailurePolicy, LinkEvent};
pub use light_sensor_core::supervisor::LinkMode;
use log::{error, info, warn};
use static_cell::StaticCell;

use crate::access_point;
use crate::config::CONFIG;
use crate::constants::*;

static STA_RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
static AP_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

static LINK: Signal<CriticalSectionRawMutex, Outcome> = Signal::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Connected(LinkMode),
    Failed,
}

pub struct Wifi {
    pub stack: Stack<'static>,
    pub ap_stack: Stack<'static>,
}

#[derive(Debug)]
pub enum Error {
    WifiInitFailed,
    HostnameTooLong,
    ConnectFailed,
}

impl Wifi {
    /// `config_mode` skips the station and hosts the access point straight away.
    pub async fn new(
        init: &'static Controller<'static>,
        wifi: esp_hal::peripherals::WIFI<'static>,
        rng: Rng,
        config_mode: bool,
        spawner: Spawner,
    ) -> Result<Self, Error> {
        let (controller, interfaces) = esp_radio::wifi::new(init, wifi, Config::default())
            .map_err(|_| Error::WifiInitFailed)?;

        let mut dhcp_config = embassy_net::DhcpConfig::default();
        dhcp_config.hostname = Some(
            String::<32>::from_str(CONFIG.device_id).map_err(|_| Error::HostnameTooLong)?,
        );

        let seed = (rng.random() as u64) << 32 | rng.random() as u64;

        let (stack, runner) = embassy_net::new(
            interfaces.sta,
            embassy_net::Config::dhcpv4(dhcp_config),
            STA_RESOURCES.init(StackResources::new()),
            seed,
        );

        let gateway = Ipv4Address::from(AP_GATEWAY);
        let ap_config = embassy_net::Config::ipv4_static(StaticConfigV4 {
            address: Ipv4Cidr::new(gateway, AP_PREFIX_LEN),
            gateway: Some(gateway),
            dns_servers: Default::default(),
        });
        let (ap_stack, ap_runner) = embassy_net::new(
            interfaces.ap,
            ap_config,
            AP_RESOURCES.init(StackResources::new()),
            seed.rotate_left(32),
        );

        let policy = if CONFIG.wifi_ap_fallback {
            FailurePolicy::AccessPointFallback
        } else {
            FailurePolicy::GiveUp
        };
        let supervisor = ConnectionSupervisor::new(CONFIG.wifi_max_retry, policy);

        spawner.must_spawn(connection(
            controller,
            stack,
            ap_stack,
            supervisor,
            config_mode,
            spawner,
        ));
        spawner.must_spawn(net_task(runner));
        spawner.must_spawn(net_task(ap_runner));

        Ok(Self { stack, ap_stack })
    }

    /// Blocks until the connection task reports a terminal outcome.
    pub async fn connect(&self) -> Result<LinkMode, Error> {
        info!("Waiting for the network link...");
        match LINK.wait().await {
            Outcome::Connected(LinkMode::Station) => {
                if let Some(config) = self.stack.config_v4() {
                    info!("Got IP: {}", config.address);
                }
                Ok(LinkMode::Station)
            }
            Outcome::Connected(LinkMode::AccessPoint) => {
                if let Some(config) = self.ap_stack.config_v4() {
                    info!("Serving access point {:?} at {}", CONFIG.ap_ssid, config.address);
                }
                Ok(LinkMode::AccessPoint)
            }
            Outcome::Failed => Err(Error::ConnectFailed),
        }
    }
}

#[embassy_executor::task]
async fn connection(
    mut controller: WifiController<'static>,
    stack: Stack<'static>,
    ap_stack: Stack<'static>,
    mut supervisor: ConnectionSupervisor,
    config_mode: bool,
    spawner: Spawner,
) {
    info!(
        "Start connection task, device capabilities: {:?}",
        controller.capabilities()
    );

    let mut event = if config_mode {
        LinkEvent::AccessPointRequested
    } else {
        start_station(&mut controller).await
    };

    loop {
        event = match supervisor.handle(event) {
            Action::Connect { attempt } => {
                if attempt > 0 {
                    Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await;
                }
                attempt_connection(&mut controller, stack).await
            }
            Action::SignalConnected => {
                LINK.signal(Outcome::Connected(LinkMode::Station));
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("Wifi connection lost");
                LinkEvent::Disconnected
            }
            Action::GiveUp => {
                error!("Failed to connect to {:?}, giving up", CONFIG.wifi_ssid);
                if let Err(e) = controller.stop_async().await {
                    warn!("Failed to stop WiFi: {:?}", e);
                }
                LINK.signal(Outcome::Failed);
                return;
            }
            Action::FallBackToAccessPoint => {
                if let Err(e) = access_point::start(&mut controller).await {
                    error!("Failed to start access point: {:?}", e);
                    LINK.signal(Outcome::Failed);
                    return;
                }
                spawner.must_spawn(access_point::dhcp_server(ap_stack));
                LINK.signal(Outcome::Connected(LinkMode::AccessPoint));
                access_point::watch(&mut controller).await
            }
            Action::None => return,
        };
    }
}

async fn start_station(controller: &mut WifiController<'static>) -> LinkEvent {
    let client_config = ClientConfig::default()
        .with_ssid(CONFIG.wifi_ssid.into())
        .with_password(CONFIG.wifi_psk.into());
    let config = ModeConfig::Client(client_config);

    loop {
        if let Err(e) = controller.set_config(&config) {
            error!("Failed to set WiFi config: {:?}. Retrying...", e);
            Timer::after(Duration::from_millis(WIFI_START_RETRY_DELAY_MS)).await;
            continue;
        }
        info!("Starting wifi");
        if let Err(e) = controller.start_async().await {
            error!("Failed to start WiFi: {:?}. Retrying...", e);
            Timer::after(Duration::from_millis(WIFI_START_RETRY_DELAY_MS)).await;
            continue;
        }
        info!("Wifi started!");
        return LinkEvent::Started;
    }
}

async fn attempt_connection(
    controller: &mut WifiController<'static>,
    stack: Stack<'static>,
) -> LinkEvent {
    info!("About to connect to {:?}...", CONFIG.wifi_ssid);
    match with_timeout(
        Duration::from_secs(WIFI_CONNECT_TIMEOUT_SECS),
        controller.connect_async(),
    )
    .await
    {
        Ok(Ok(())) => info!("Wifi connected!"),
        Ok(Err(e)) => {
            info!("Failed to connect to wifi: {e:?}");
            return LinkEvent::Disconnected;
        }
        Err(_) => {
            info!("Wifi connection timed out");
            if let Err(e) = controller.disconnect_async().await {
                warn!("Failed to disconnect WiFi: {:?}", e);
            }
            return LinkEvent::Disconnected;
        }
    }

    match with_timeout(
        Duration::from_secs(WIFI_DHCP_TIMEOUT_SECS),
        stack.wait_config_up(),
    )
    .await
    {
        Ok(()) => LinkEvent::AddressAcquired,
        Err(_) => {
            warn!("No DHCP lease after {}s", WIFI_DHCP_TIMEOUT_SECS);
            if let Err(e) = controller.disconnect_async().await {
                warn!("Failed to disconnect WiFi: {:?}", e);
            }
            LinkEvent::Disconnected
        }
    }
}

#[embassy_executor::task(pool_size = 2)]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
