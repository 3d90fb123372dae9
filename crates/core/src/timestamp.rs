//! Deterministic transaction timestamps.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Timestamp assigned to a transaction by its proposer.
///
/// Every replica sees the same value for the same transaction, so it is the
/// only clock lifecycle operations may read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxTimestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Parse a stored RFC3339 value (any offset) back into a timestamp.
    ///
    /// Stored values are record fields, so a bad one is a `Decode` error.
    pub fn parse_rfc3339(value: &str) -> ContractResult<Self> {
        let at = DateTime::parse_from_rfc3339(value)
            .map_err(|e| ContractError::Decode(format!("invalid timestamp '{value}': {e}")))?
            .with_timezone(&Utc);
        Ok(Self {
            seconds: at.timestamp(),
            // a parsed leap second folds into the preceding second
            nanos: at.timestamp_subsec_nanos().min(NANOS_PER_SECOND as u32 - 1) as i32,
        })
    }

    /// `nanos` must lie in `0..1_000_000_000`; chrono would otherwise read
    /// the overflow as a leap second.
    pub fn to_datetime(self) -> ContractResult<DateTime<Utc>> {
        if !(0..NANOS_PER_SECOND).contains(&self.nanos) {
            return Err(ContractError::timestamp(format!(
                "nanos {} outside 0..{NANOS_PER_SECOND}",
                self.nanos
            )));
        }
        DateTime::<Utc>::from_timestamp(self.seconds, self.nanos as u32).ok_or_else(|| {
            ContractError::timestamp(format!(
                "out of range: {}s {}ns",
                self.seconds, self.nanos
            ))
        })
    }

    /// RFC3339 rendering, UTC with second precision (`2024-05-01T12:00:00Z`).
    pub fn to_rfc3339(self) -> ContractResult<String> {
        Ok(self
            .to_datetime()?
            .to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_utc_seconds() {
        let ts = TxTimestamp::new(1_714_564_800, 999_000_000);
        assert_eq!(ts.to_rfc3339().unwrap(), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn epoch_renders() {
        assert_eq!(
            TxTimestamp::new(0, 0).to_rfc3339().unwrap(),
            "1970-01-01T00:00:00Z"
        );
    }

    #[test]
    fn rejects_negative_nanos() {
        let err = TxTimestamp::new(10, -1).to_rfc3339().unwrap_err();
        assert!(matches!(err, ContractError::Timestamp(_)));
    }

    #[test]
    fn rejects_nanos_of_a_full_second_or_more() {
        for nanos in [NANOS_PER_SECOND, 1_500_000_000, i32::MAX] {
            let err = TxTimestamp::new(59, nanos).to_rfc3339().unwrap_err();
            assert!(matches!(err, ContractError::Timestamp(_)), "{nanos}");
        }
        assert_eq!(
            TxTimestamp::new(59, NANOS_PER_SECOND - 1).to_rfc3339().unwrap(),
            "1970-01-01T00:00:59Z"
        );
    }

    #[test]
    fn rejects_out_of_range_seconds() {
        let err = TxTimestamp::new(i64::MAX, 0).to_rfc3339().unwrap_err();
        assert!(matches!(err, ContractError::Timestamp(_)));
    }

    #[test]
    fn rendering_preserves_order_at_second_granularity() {
        let a = TxTimestamp::new(100, 0).to_rfc3339().unwrap();
        let b = TxTimestamp::new(100, 500).to_rfc3339().unwrap();
        let c = TxTimestamp::new(101, 0).to_rfc3339().unwrap();
        assert_eq!(a, b);
        assert!(b < c);
    }

    #[test]
    fn parse_accepts_offsets_and_normalizes_to_utc() {
        let ts = TxTimestamp::parse_rfc3339("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(ts, TxTimestamp::new(1_714_564_800, 0));
    }

    #[test]
    fn parse_folds_leap_second_into_a_valid_timestamp() {
        let ts = TxTimestamp::parse_rfc3339("2016-12-31T23:59:60Z").unwrap();
        assert_eq!(ts.nanos, NANOS_PER_SECOND - 1);
        assert_eq!(ts.to_rfc3339().unwrap(), "2016-12-31T23:59:59Z");
    }

    #[test]
    fn parse_rejects_garbage_as_decode_error() {
        let err = TxTimestamp::parse_rfc3339("yesterday").unwrap_err();
        assert!(matches!(err, ContractError::Decode(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: rendering then parsing keeps the whole seconds.
            #[test]
            fn render_then_parse_truncates_to_seconds(
                seconds in 0i64..253_402_300_799, // up to 9999-12-31T23:59:59Z
                nanos in 0i32..NANOS_PER_SECOND,
            ) {
                let rendered = TxTimestamp::new(seconds, nanos).to_rfc3339().unwrap();
                let parsed = TxTimestamp::parse_rfc3339(&rendered).unwrap();
                prop_assert_eq!(parsed, TxTimestamp::new(seconds, 0));
            }

            /// Property: rendered strings sort like the timestamps they encode.
            #[test]
            fn rendering_is_monotone(
                a in 0i64..253_402_300_799,
                b in 0i64..253_402_300_799,
            ) {
                let ra = TxTimestamp::new(a, 0).to_rfc3339().unwrap();
                let rb = TxTimestamp::new(b, 0).to_rfc3339().unwrap();
                prop_assert_eq!(a.cmp(&b), ra.cmp(&rb));
            }
        }
    }
}
