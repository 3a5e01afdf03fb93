use embassy_time::Delay;
use embedded_hal_async::i2c::I2c;
use log::{error, info};

use light_sensor_core::bh1750::{Address, Bh1750 as Bh1750Sensor, Resolution};

use super::{Sensor, SensorError};

pub struct Bh1750<I2C> {
    sensor: Bh1750Sensor<I2C, Delay>,
}

impl<I2C: I2c> Bh1750<I2C> {
    pub async fn new(
        i2c: I2C,
        address: Address,
        measurement_time: Option<u8>,
    ) -> Result<Self, SensorError> {
        info!("Initialising BH1750 at {:#04x}...", address as u8);
        let mut sensor = Bh1750Sensor::new(i2c, Delay, address);

        sensor.power_on().await.map_err(|e| {
            error!("BH1750: Failed to power on: {:?}", e);
            SensorError::InitFailure
        })?;

        if let Some(mtreg) = measurement_time {
            sensor.set_measurement_time(mtreg).await.map_err(|e| {
                error!("BH1750: Failed to set measurement time {}: {:?}", mtreg, e);
                SensorError::InitFailure
            })?;
        }

        sensor
            .start_continuous(Resolution::High)
            .await
            .map_err(|e| {
                error!("BH1750: Failed to start continuous measurement: {:?}", e);
                SensorError::InitFailure
            })?;

        info!("Initialised BH1750");

        Ok(Self { sensor })
    }
}

impl<I2C: I2c> Sensor for Bh1750<I2C> {
    async fn measure(&mut self) -> Result<f32, SensorError> {
        self.sensor.read().await.map_err(|e| {
            error!("BH1750: Error reading measurement: {:?}", e);
            SensorError::MeasurementFailure
        })
    }
}
