//! BH1750 ambient light sensor register protocol.
//!
//! The sensor has no register map: every command is a single opcode byte and
//! a measurement is a two byte big-endian count.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

const POWER_DOWN: u8 = 0x00;
const POWER_ON: u8 = 0x01;
const RESET: u8 = 0x07;

// The 8-bit MTreg is written as two instructions carrying 3 and 5 bits.
const MTREG_HIGH: u8 = 0x40;
const MTREG_LOW: u8 = 0x60;

pub const MTREG_MIN: u8 = 31;
pub const MTREG_MAX: u8 = 254;
pub const MTREG_DEFAULT: u8 = 69;

/// Counts per lux at the default measurement time
const COUNTS_PER_LUX: f32 = 1.2;

/// Time the sensor needs after power on before accepting a mode command
const POWER_ON_SETTLE_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    I2c(E),
    /// `read` called before `start_continuous`
    NotMeasuring,
    /// MTreg outside `MTREG_MIN..=MTREG_MAX`
    InvalidMeasurementTime(u8),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}

/// I2C address, selected by the ADDR pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// ADDR low or floating
    Low = 0x23,
    /// ADDR high
    High = 0x5C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 1 lx per count
    High,
    /// 0.5 lx per count
    High2,
    /// 4 lx resolution, short measurement time
    Low,
}

impl Resolution {
    const fn continuous_opcode(self) -> u8 {
        match self {
            Self::High => 0x10,
            Self::High2 => 0x11,
            Self::Low => 0x13,
        }
    }

    const fn one_time_opcode(self) -> u8 {
        match self {
            Self::High => 0x20,
            Self::High2 => 0x21,
            Self::Low => 0x23,
        }
    }

    /// Worst case measurement time at the default MTreg
    const fn max_measurement_time_ms(self) -> u32 {
        match self {
            Self::High | Self::High2 => 180,
            Self::Low => 24,
        }
    }

    const fn lux_per_count(self) -> f32 {
        match self {
            Self::High | Self::Low => 1.0,
            Self::High2 => 0.5,
        }
    }
}

/// Converts a raw sensor count into lux
pub fn raw_to_lux(raw: u16, resolution: Resolution, mtreg: u8) -> f32 {
    let scale = MTREG_DEFAULT as f32 / mtreg as f32;
    raw as f32 / COUNTS_PER_LUX * scale * resolution.lux_per_count()
}

/// Measurement time for `resolution` with a non-default MTreg
pub fn measurement_time_ms(resolution: Resolution, mtreg: u8) -> u32 {
    let base = resolution.max_measurement_time_ms();
    (base * mtreg as u32).div_ceil(MTREG_DEFAULT as u32)
}

pub struct Bh1750<I2C, D> {
    i2c: I2C,
    delay: D,
    address: Address,
    mtreg: u8,
    continuous: Option<Resolution>,
}

impl<I2C, D> Bh1750<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, address: Address) -> Self {
        Self {
            i2c,
            delay,
            address,
            mtreg: MTREG_DEFAULT,
            continuous: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn measurement_time(&self) -> u8 {
        self.mtreg
    }

    pub async fn power_on(&mut self) -> Result<(), Error<I2C::Error>> {
        self.send(POWER_ON).await?;
        self.delay.delay_ms(POWER_ON_SETTLE_MS).await;
        Ok(())
    }

    /// Power down also ends continuous measurement.
    pub async fn power_down(&mut self) -> Result<(), Error<I2C::Error>> {
        self.send(POWER_DOWN).await?;
        self.continuous = None;
        Ok(())
    }

    /// Clears the data register. Only valid while powered on.
    pub async fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.send(RESET).await
    }

    pub async fn set_measurement_time(&mut self, mtreg: u8) -> Result<(), Error<I2C::Error>> {
        if !(MTREG_MIN..=MTREG_MAX).contains(&mtreg) {
            return Err(Error::InvalidMeasurementTime(mtreg));
        }

        self.send(MTREG_HIGH | (mtreg >> 5)).await?;
        self.send(MTREG_LOW | (mtreg & 0x1F)).await?;
        self.mtreg = mtreg;
        Ok(())
    }

    /// Switches to continuous measurement and waits for the first sample.
    pub async fn start_continuous(
        &mut self,
        resolution: Resolution,
    ) -> Result<(), Error<I2C::Error>> {
        self.send(resolution.continuous_opcode()).await?;
        self.continuous = Some(resolution);
        self.delay
            .delay_ms(measurement_time_ms(resolution, self.mtreg))
            .await;
        Ok(())
    }

    /// Latest continuous-mode sample in lux.
    pub async fn read(&mut self) -> Result<f32, Error<I2C::Error>> {
        let resolution = self.continuous.ok_or(Error::NotMeasuring)?;
        let raw = self.read_raw().await?;
        Ok(raw_to_lux(raw, resolution, self.mtreg))
    }

    /// Single measurement; the sensor powers down afterwards.
    pub async fn one_time(&mut self, resolution: Resolution) -> Result<f32, Error<I2C::Error>> {
        self.send(resolution.one_time_opcode()).await?;
        self.continuous = None;
        self.delay
            .delay_ms(measurement_time_ms(resolution, self.mtreg))
            .await;
        let raw = self.read_raw().await?;
        Ok(raw_to_lux(raw, resolution, self.mtreg))
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    async fn send(&mut self, opcode: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.address as u8, &[opcode]).await?;
        Ok(())
    }

    async fn read_raw(&mut self) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c.read(self.address as u8, &mut buf).await?;
        Ok(u16::from_be_bytes(buf))
    }
}
