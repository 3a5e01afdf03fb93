#![no_std]
#![no_main]

use static_cell::StaticCell;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{self as hal};
use esp_println::logger::init_logger;
use esp_radio::Controller;

use hal::{
    gpio::{Input, InputConfig, Pull},
    i2c::master::{BusTimeout, I2c},
    rng::Rng,
    time::Rate,
    timer::timg::TimerGroup,
    Async,
};
use light_sensor_core::bh1750::Address;

extern crate alloc;

mod access_point;
mod clock;
pub mod config;
pub mod constants;
mod measurement;
pub mod sensors;
pub mod transport;
mod upload;
mod wifi;

use clock::Clock;
use config::CONFIG;
use constants::*;
use measurement::Measurement;
use sensors::bh1750::Bh1750;
use upload::Uploader;
use wifi::Wifi;

esp_bootloader_esp_idf::esp_app_desc!();

static RADIO: StaticCell<Controller<'static>> = StaticCell::new();

type LightSensor = Bh1750<I2c<'static, Async>>;

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    init_logger(log::LevelFilter::Info);
    log::info!("esp32-light-sensor v{}", VERSION);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let rng = Rng::new();

    let i2c_config = hal::i2c::master::Config::default()
        .with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ))
        .with_timeout(BusTimeout::BusCycles(24));

    let i2c = I2c::new(peripherals.I2C0, i2c_config)
        .expect("Failed to configure I2C master")
        .with_sda(peripherals.GPIO21)
        .with_scl(peripherals.GPIO22)
        .into_async();
    log::info!("I2C master ready at {} kHz", I2C_FREQUENCY_KHZ);

    let address = if CONFIG.bh1750_address_high {
        Address::High
    } else {
        Address::Low
    };
    let sensor = Bh1750::new(i2c, address, CONFIG.bh1750_measurement_time)
        .await
        .expect("Failed to initialise BH1750");

    let config_mode = if CONFIG.wifi_config_button {
        let button = Input::new(
            peripherals.GPIO4,
            InputConfig::default().with_pull(Pull::Up),
        );
        Timer::after(Duration::from_millis(BUTTON_SETTLE_MS)).await;
        button.is_low()
    } else {
        false
    };
    if config_mode {
        log::info!("Config button held, starting access point");
    }

    let radio = RADIO.init(esp_radio::init().expect("Failed to initialise radio"));

    let wifi = Wifi::new(radio, peripherals.WIFI, rng, config_mode, spawner)
        .await
        .expect("Failed to initialise WiFi");

    let link = match wifi.connect().await {
        Ok(mode) => Some(mode),
        Err(e) => {
            log::error!("WiFi error: {:?}, continuing offline", e);
            None
        }
    };

    let clock = match link {
        Some(wifi::LinkMode::Station) => Clock::sync(wifi.stack, CONFIG.ntp_server).await,
        _ => Clock::default(),
    };

    let measurement = Measurement::new(sensor, clock, link, Uploader::new(wifi.stack));

    spawner.must_spawn(main_task(measurement));
}

#[embassy_executor::task]
async fn main_task(mut measurement: Measurement<LightSensor>) {
    loop {
        if let Err(e) = measurement.take().await {
            log::error!("Measurement error: {:?}", e);
        }

        Timer::after(Duration::from_millis(CONFIG.measurement_interval_ms.into())).await;
    }
}
