use light_sensor_core::reading::{self, Reading};
use light_sensor_core::supervisor::LinkMode;

use crate::clock::Clock;
use crate::sensors::{Sensor, SensorError};
use crate::upload::{self, Uploader};

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    Sensor(SensorError),
    Format,
    #[allow(dead_code)]
    Upload(upload::Error),
}

pub struct Measurement<S> {
    sensor: S,
    clock: Clock,
    uploader: Option<Uploader>,
}

impl<S: Sensor> Measurement<S> {
    /// Readings are uploaded only while joined to the configured network.
    pub fn new(sensor: S, clock: Clock, link: Option<LinkMode>, uploader: Uploader) -> Self {
        let uploader = reading::should_upload(link, cfg!(feature = "upload")).then_some(uploader);

        Self {
            sensor,
            clock,
            uploader,
        }
    }

    pub async fn take(&mut self) -> Result<(), Error> {
        let lux = self.sensor.measure().await.map_err(Error::Sensor)?;
        let reading = Reading::new(lux, self.clock.timestamp());

        let payload = reading.to_json().map_err(|_| Error::Format)?;
        log::info!("{}", payload);

        let Some(uploader) = self.uploader.as_mut() else {
            return Ok(());
        };

        if !uploader.is_online() {
            log::warn!("Network down, reading not uploaded");
            return Ok(());
        }

        let status = uploader
            .post(payload.as_str())
            .await
            .map_err(Error::Upload)?;
        log::debug!("Collector replied {}", status);

        Ok(())
    }
}
