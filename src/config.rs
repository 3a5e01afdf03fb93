pub struct Config {
    // Device ID (used as DHCP hostname)
    pub device_id: &'static str,

    // Wi-Fi SSID to connect to
    pub wifi_ssid: &'static str,

    // Wi-Fi pre-shared key (password)
    pub wifi_psk: &'static str,

    // Reconnect attempts after the initial one before the link is declared failed
    pub wifi_max_retry: u8,

    // Host an access point when the station connection fails
    pub wifi_ap_fallback: bool,

    // Holding the GPIO4 button at boot starts the access point directly
    pub wifi_config_button: bool,

    // Access point SSID used by the fallback
    pub ap_ssid: &'static str,

    // Access point password, empty for an open network
    pub ap_psk: &'static str,

    // Access point channel
    pub ap_channel: u8,

    // Maximum number of stations joined to the access point
    pub ap_max_connections: u16,

    // Collector hostname or IP address
    pub server_hostname: &'static str,

    // Collector port
    pub server_port: u16,

    // Collector endpoint receiving readings
    pub server_path: &'static str,

    // SNTP server hostname or IP address
    pub ntp_server: &'static str,

    // Delay between two sensor polls in milliseconds
    pub measurement_interval_ms: u32,

    // BH1750 ADDR pin tied high (0x5C) instead of low (0x23)
    pub bh1750_address_high: bool,

    // BH1750 measurement time register, sensor default when unset
    pub bh1750_measurement_time: Option<u8>,
}

// config values are generated at compile time
include!(concat!(env!("OUT_DIR"), "/config.rs"));
