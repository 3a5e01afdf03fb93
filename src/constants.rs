/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the heap in DRAM (esp-radio allocates from it)
pub const HEAP_SIZE: usize = 72 * 1024;

/// I2C bus frequency in kHz
pub const I2C_FREQUENCY_KHZ: u32 = 100;

/// Pull-up settle time before sampling the config button
pub const BUTTON_SETTLE_MS: u64 = 10;

/// Size of the TCP socket receive buffer
pub const RX_BUFFER_SIZE: usize = 1024;
/// Size of the TCP socket transmit buffer
pub const TX_BUFFER_SIZE: usize = 1024;
/// Buffer for the collector's HTTP response (status line and headers)
pub const HTTP_RESPONSE_BUFFER_SIZE: usize = 512;
/// Socket timeout for the collector connection
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Maximum time for a single association attempt
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 20;
/// Maximum time to wait for a DHCP lease after association
pub const WIFI_DHCP_TIMEOUT_SECS: u64 = 15;
/// Fixed pause between two connection attempts
pub const WIFI_RECONNECT_DELAY_MS: u64 = 1000;
/// Pause before retrying a failed radio configuration or start
pub const WIFI_START_RETRY_DELAY_MS: u64 = 2000;

/// Gateway address of the fallback access point
pub const AP_GATEWAY: [u8; 4] = [192, 168, 4, 1];
/// Prefix length of the fallback access point network
pub const AP_PREFIX_LEN: u8 = 24;
/// DHCP packet buffer for the access point network
pub const DHCP_BUFFER_SIZE: usize = 1500;
/// Leases tracked by the access point DHCP server
pub const DHCP_MAX_LEASES: usize = 8;
/// Pause before restarting the DHCP server after an error
pub const DHCP_RESTART_DELAY_MS: u64 = 500;

/// Local UDP port for SNTP requests
pub const SNTP_LOCAL_PORT: u16 = 50123;
/// Time to wait for an SNTP reply
pub const SNTP_TIMEOUT_SECS: u64 = 5;
/// Number of SNTP requests before keeping the unsynced clock
pub const SNTP_ATTEMPTS: u8 = 3;
/// Pause between two SNTP attempts
pub const SNTP_RETRY_DELAY_MS: u64 = 1000;
