use core::fmt::{self, Write};

use heapless::String;

use crate::supervisor::LinkMode;
use crate::timestamp::{Timestamp, TIMESTAMP_MAX};

/// Upper bound of a serialized reading
pub const PAYLOAD_MAX: usize = 40 + 2 * TIMESTAMP_MAX;

/// One poll cycle worth of data
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub lux: f32,
    pub timestamp: Timestamp,
}

impl Reading {
    pub fn new(lux: f32, timestamp: Timestamp) -> Self {
        Self { lux, timestamp }
    }

    /// `{"light": <number>, "timestamp": "<string>"}`
    pub fn to_json(&self) -> Result<String<PAYLOAD_MAX>, fmt::Error> {
        let mut payload: String<PAYLOAD_MAX> = String::new();

        write!(payload, "{{\"light\": ")?;
        if self.lux.is_finite() {
            write!(payload, "{}", self.lux)?;
        } else {
            write!(payload, "null")?;
        }
        write!(payload, ", \"timestamp\": \"")?;
        write_escaped(&mut payload, &self.timestamp)?;
        write!(payload, "\"}}")?;

        Ok(payload)
    }
}

/// Readings go to the collector only from the configured network.
pub fn should_upload(link: Option<LinkMode>, enabled: bool) -> bool {
    enabled && link == Some(LinkMode::Station)
}

fn write_escaped<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp(s: &str) -> Timestamp {
        Timestamp::try_from(s).unwrap()
    }

    #[test]
    fn payload_shape_is_exact() {
        let reading = Reading::new(123.45, timestamp("Mon Jan 1 00:00:00 2024"));
        assert_eq!(
            reading.to_json().unwrap().as_str(),
            r#"{"light": 123.45, "timestamp": "Mon Jan 1 00:00:00 2024"}"#
        );
    }

    #[test]
    fn whole_and_tiny_values() {
        let reading = Reading::new(100.0, timestamp("Thu Jan 1 00:00:05 1970"));
        assert_eq!(
            reading.to_json().unwrap().as_str(),
            r#"{"light": 100, "timestamp": "Thu Jan 1 00:00:05 1970"}"#
        );

        let reading = Reading::new(0.5, timestamp("t"));
        assert_eq!(
            reading.to_json().unwrap().as_str(),
            r#"{"light": 0.5, "timestamp": "t"}"#
        );
    }

    #[test]
    fn non_finite_lux_is_null() {
        let reading = Reading::new(f32::NAN, timestamp("t"));
        assert_eq!(
            reading.to_json().unwrap().as_str(),
            r#"{"light": null, "timestamp": "t"}"#
        );
    }

    #[test]
    fn timestamp_is_escaped() {
        let reading = Reading::new(1.0, timestamp("a\"b\\c\n"));
        assert_eq!(
            reading.to_json().unwrap().as_str(),
            r#"{"light": 1, "timestamp": "a\"b\\c\n"}"#
        );
    }

    #[test]
    fn uploads_only_from_station_link() {
        assert!(should_upload(Some(LinkMode::Station), true));
        assert!(!should_upload(Some(LinkMode::AccessPoint), true));
        assert!(!should_upload(None, true));
    }

    #[test]
    fn disabled_upload_wins_over_link() {
        assert!(!should_upload(Some(LinkMode::Station), false));
        assert!(!should_upload(Some(LinkMode::AccessPoint), false));
        assert!(!should_upload(None, false));
    }

    #[test]
    fn largest_sensor_value_fits() {
        let reading = Reading::new(54612.5, timestamp("Wed Sep 30 23:59:59 2026"));
        let json = reading.to_json().unwrap();
        assert!(json.starts_with(r#"{"light": 54612.5, "#));
    }
}
