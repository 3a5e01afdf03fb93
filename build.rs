use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

const CONFIG_FILE: &str = "cfg.toml";
const EXAMPLE_CONFIG_FILE: &str = "cfg.toml.example";

#[derive(Deserialize)]
struct RawConfig {
    device_id: String,
    wifi_ssid: String,
    wifi_psk: String,
    #[serde(default = "default_wifi_max_retry")]
    wifi_max_retry: u8,
    #[serde(default)]
    wifi_ap_fallback: bool,
    #[serde(default = "default_wifi_config_button")]
    wifi_config_button: bool,
    #[serde(default = "default_ap_ssid")]
    ap_ssid: String,
    #[serde(default)]
    ap_psk: String,
    #[serde(default = "default_ap_channel")]
    ap_channel: u8,
    #[serde(default = "default_ap_max_connections")]
    ap_max_connections: u16,
    server_hostname: String,
    #[serde(default = "default_server_port")]
    server_port: u16,
    #[serde(default = "default_server_path")]
    server_path: String,
    #[serde(default = "default_ntp_server")]
    ntp_server: String,
    #[serde(default = "default_measurement_interval_ms")]
    measurement_interval_ms: u32,
    #[serde(default)]
    bh1750_address_high: bool,
    bh1750_measurement_time: Option<u8>,
}

fn default_wifi_max_retry() -> u8 {
    3
}

fn default_wifi_config_button() -> bool {
    true
}

fn default_ap_ssid() -> String {
    "esp32-light-sensor".into()
}

fn default_ap_channel() -> u8 {
    1
}

fn default_ap_max_connections() -> u16 {
    3
}

fn default_server_port() -> u16 {
    5000
}

fn default_server_path() -> String {
    "/api/data".into()
}

fn default_ntp_server() -> String {
    "pool.ntp.org".into()
}

fn default_measurement_interval_ms() -> u32 {
    1000
}

fn main() -> Result<(), Box<dyn Error>> {
    // Tell Cargo to rerun if toml changes
    println!("cargo:rerun-if-changed={CONFIG_FILE}");
    println!("cargo:rerun-if-changed={EXAMPLE_CONFIG_FILE}");

    if env::var("TARGET")?.starts_with("xtensa") {
        println!("cargo:rustc-link-arg=-Tlinkall.x");
    }

    let toml_str = match fs::read_to_string(CONFIG_FILE) {
        Ok(s) => s,
        Err(_) => {
            println!("cargo:warning={CONFIG_FILE} not found, building with {EXAMPLE_CONFIG_FILE}");
            fs::read_to_string(EXAMPLE_CONFIG_FILE)?
        }
    };
    let raw: RawConfig = toml::from_str(&toml_str)?;

    if !raw.ap_psk.is_empty() && raw.ap_psk.len() < 8 {
        return Err("ap_psk must be empty (open network) or at least 8 characters".into());
    }

    // Generate Rust code
    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    let code = format!(
        r#"
        pub const CONFIG: Config = Config {{
            device_id: {device_id:?},
            wifi_ssid: {ssid:?},
            wifi_psk: {psk:?},
            wifi_max_retry: {max_retry},
            wifi_ap_fallback: {ap_fallback},
            wifi_config_button: {config_button},
            ap_ssid: {ap_ssid:?},
            ap_psk: {ap_psk:?},
            ap_channel: {ap_channel},
            ap_max_connections: {ap_max},
            server_hostname: {server_host:?},
            server_port: {server_port},
            server_path: {server_path:?},
            ntp_server: {ntp:?},
            measurement_interval_ms: {intv},
            bh1750_address_high: {addr_high},
            bh1750_measurement_time: {mtreg:?},
        }};
    "#,
        device_id = raw.device_id,
        ssid = raw.wifi_ssid,
        psk = raw.wifi_psk,
        max_retry = raw.wifi_max_retry,
        ap_fallback = raw.wifi_ap_fallback,
        config_button = raw.wifi_config_button,
        ap_ssid = raw.ap_ssid,
        ap_psk = raw.ap_psk,
        ap_channel = raw.ap_channel,
        ap_max = raw.ap_max_connections,
        server_host = raw.server_hostname,
        server_port = raw.server_port,
        server_path = raw.server_path,
        ntp = raw.ntp_server,
        intv = raw.measurement_interval_ms,
        addr_high = raw.bh1750_address_high,
        mtreg = raw.bh1750_measurement_time,
    );

    fs::write(dest_path, code)?;
    Ok(())
}
