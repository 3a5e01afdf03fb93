use core::fmt::Write;

use heapless::String;

pub const TIMESTAMP_MAX: usize = 32;

pub type Timestamp = String<TIMESTAMP_MAX>;

const SECONDS_PER_DAY: u64 = 86_400;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Wall clock anchored to a known unix time at a known uptime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    unix_at_anchor: u64,
    uptime_at_anchor: u64,
    synced: bool,
}

impl WallClock {
    /// Clock counting from the epoch at boot, like an unsynced RTC
    pub const fn unsynced() -> Self {
        Self {
            unix_at_anchor: 0,
            uptime_at_anchor: 0,
            synced: false,
        }
    }

    pub const fn synced(unix_seconds: u64, uptime_seconds: u64) -> Self {
        Self {
            unix_at_anchor: unix_seconds,
            uptime_at_anchor: uptime_seconds,
            synced: true,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn now(&self, uptime_seconds: u64) -> u64 {
        self.unix_at_anchor
            .saturating_add(uptime_seconds.saturating_sub(self.uptime_at_anchor))
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::unsynced()
    }
}

/// Formats unix seconds (UTC) as `Www Mmm D HH:MM:SS YYYY`.
pub fn format_timestamp(unix_seconds: u64) -> Timestamp {
    let days = unix_seconds / SECONDS_PER_DAY;
    let seconds_of_day = unix_seconds % SECONDS_PER_DAY;
    let (year, month, day) = civil_from_days(days);
    // 1970-01-01 was a Thursday
    let weekday = ((days + 4) % 7) as usize;

    let hours = seconds_of_day / 3_600;
    let minutes = (seconds_of_day / 60) % 60;
    let seconds = seconds_of_day % 60;

    let mut out = Timestamp::new();
    let _ = write!(
        out,
        "{} {} {} {hours:02}:{minutes:02}:{seconds:02} {year}",
        WEEKDAYS[weekday],
        MONTHS[(month - 1) as usize],
        day,
    );
    out
}

/// Days since 1970-01-01 to (year, month 1..=12, day 1..=31), proleptic Gregorian.
fn civil_from_days(days: u64) -> (u64, u32, u32) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
