#![allow(async_fn_in_trait)]

pub mod bh1750;

#[derive(Debug)]
pub enum SensorError {
    InitFailure,
    MeasurementFailure,
}

pub trait Sensor {
    /// Illuminance in lux
    async fn measure(&mut self) -> Result<f32, SensorError>;
}
