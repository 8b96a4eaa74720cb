//! Timestamp codec: monotonic milliseconds → fixed-width `HHMMSSmmm`.
//!
//! The 9-digit form sorts lexically in time order within one day and is used
//! both in CSV records and in capture file names. Hours wrap modulo 24, so
//! stamps more than a day apart collide; that is accepted.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::error::PipelineError;

pub const TIMESTAMP_LEN: usize = 9;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;

/// Nine ASCII digits, always well formed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp([u8; TIMESTAMP_LEN]);

impl Timestamp {
    pub fn from_millis(total_ms: u64) -> Self {
        let h = (total_ms / MS_PER_HOUR) % 24;
        let m = (total_ms / MS_PER_MINUTE) % 60;
        let s = (total_ms / MS_PER_SECOND) % 60;
        let ms = total_ms % 1000;

        let mut digits = [b'0'; TIMESTAMP_LEN];
        write_padded(&mut digits[0..2], h);
        write_padded(&mut digits[2..4], m);
        write_padded(&mut digits[4..6], s);
        write_padded(&mut digits[6..9], ms);
        Self(digits)
    }

    /// Capture clocks report `(seconds, microseconds)`; sub-millisecond
    /// precision is truncated.
    pub fn from_capture_time(secs: u64, micros: u32) -> Self {
        let total_ms = secs
            .wrapping_mul(MS_PER_SECOND)
            .wrapping_add(u64::from(micros) / 1000);
        Self::from_millis(total_ms)
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("000000000")
    }

    /// Decodes back into `(hours, minutes, seconds, millis)`.
    pub fn parts(&self) -> (u32, u32, u32, u32) {
        (
            read_digits(&self.0[0..2]),
            read_digits(&self.0[2..4]),
            read_digits(&self.0[4..6]),
            read_digits(&self.0[6..9]),
        )
    }

    /// Milliseconds since the start of the (wrapped) day.
    pub fn millis_of_day(&self) -> u64 {
        let (h, m, s, ms) = self.parts();
        u64::from(h) * MS_PER_HOUR
            + u64::from(m) * MS_PER_MINUTE
            + u64::from(s) * MS_PER_SECOND
            + u64::from(ms)
    }
}

/// Free-function form of [`Timestamp::from_millis`].
pub fn to_timestamp(total_ms: u64) -> Timestamp {
    Timestamp::from_millis(total_ms)
}

fn write_padded(out: &mut [u8], mut value: u64) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

fn read_digits(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'))
}

impl FromStr for Timestamp {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != TIMESTAMP_LEN || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(PipelineError::MalformedRecord(format!(
                "timestamp must be {} digits, got {:?}",
                TIMESTAMP_LEN, s
            )));
        }

        let mut digits = [0u8; TIMESTAMP_LEN];
        digits.copy_from_slice(bytes);
        let stamp = Self(digits);

        let (h, m, s, _) = stamp.parts();
        if h > 23 || m > 59 || s > 59 {
            return Err(PipelineError::MalformedRecord(format!(
                "timestamp out of range: {:?}",
                stamp.as_str()
            )));
        }
        Ok(stamp)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.as_str())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_value() {
        assert_eq!(to_timestamp(90_061_123).as_str(), "010101123");
        assert_eq!(to_timestamp(0).as_str(), "000000000");
        assert_eq!(to_timestamp(86_399_999).as_str(), "235959999");
    }

    #[test]
    fn wraps_past_one_day() {
        assert_eq!(to_timestamp(86_400_000).as_str(), "000000000");
        assert_eq!(to_timestamp(86_400_000 + 61_001), to_timestamp(61_001));
    }

    #[test]
    fn every_stamp_in_a_day_decodes_to_its_formula() {
        // Step through the day with a stride that hits every field boundary.
        let mut ms = 0u64;
        while ms < 86_400_000 {
            let stamp = to_timestamp(ms);
            assert_eq!(stamp.as_str().len(), TIMESTAMP_LEN);
            assert!(stamp.as_str().bytes().all(|b| b.is_ascii_digit()));

            let (h, m, s, milli) = stamp.parts();
            assert_eq!(u64::from(h), (ms / 3_600_000) % 24);
            assert_eq!(u64::from(m), (ms / 60_000) % 60);
            assert_eq!(u64::from(s), (ms / 1000) % 60);
            assert_eq!(u64::from(milli), ms % 1000);
            assert_eq!(stamp.millis_of_day(), ms);

            ms += 7_919;
        }
    }

    #[test]
    fn capture_time_truncates_micros() {
        let stamp = Timestamp::from_capture_time(3_661, 999_999);
        assert_eq!(stamp.as_str(), "010101999");
        assert_eq!(Timestamp::from_capture_time(1, 500).as_str(), "000001000");
    }

    #[test]
    fn parses_and_rejects() {
        let stamp: Timestamp = "235959999".parse().unwrap();
        assert_eq!(stamp.parts(), (23, 59, 59, 999));
        assert!("12345678".parse::<Timestamp>().is_err());
        assert!("12345678a".parse::<Timestamp>().is_err());
        assert!("246000000".parse::<Timestamp>().is_err());
    }

    #[test]
    fn orders_like_time() {
        assert!(to_timestamp(999) < to_timestamp(1_000));
        assert!(to_timestamp(3_599_999) < to_timestamp(3_600_000));
    }
}
