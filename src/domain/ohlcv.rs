//! OHLCV bar representation and input-series validation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::SmacrossError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Check the engine's input contract before any backtest work: a non-empty
/// series with strictly ascending unique timestamps, positive finite closes,
/// and non-negative volume. A zero or negative close would divide a buy into
/// garbage downstream, so it is rejected here rather than tolerated.
pub fn validate_series(bars: &[OhlcvBar]) -> Result<(), SmacrossError> {
    if bars.is_empty() {
        return Err(SmacrossError::EmptySeries);
    }

    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(SmacrossError::BadBar {
                timestamp: bar.timestamp,
                reason: format!("non-positive close {}", bar.close),
            });
        }
        if bar.volume < 0.0 {
            return Err(SmacrossError::BadBar {
                timestamp: bar.timestamp,
                reason: format!("negative volume {}", bar.volume),
            });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(SmacrossError::BadBar {
                timestamp: bar.timestamp,
                reason: "timestamps not strictly ascending".into(),
            });
        }
    }

    Ok(())
}

/// Parse a bar timestamp. Daily exports carry bare dates, intraday ones a
/// full datetime; both are accepted, dates landing at midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn valid_series_passes() {
        let bars = vec![bar(1, 100.0), bar(2, 101.0), bar(3, 99.5)];
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn empty_series_rejected() {
        let result = validate_series(&[]);
        assert!(matches!(result, Err(SmacrossError::EmptySeries)));
    }

    #[test]
    fn zero_close_rejected() {
        let bars = vec![bar(1, 100.0), bar(2, 0.0)];
        let result = validate_series(&bars);
        match result {
            Err(SmacrossError::BadBar { timestamp, reason }) => {
                assert_eq!(timestamp, bars[1].timestamp);
                assert!(reason.contains("non-positive close"));
            }
            other => panic!("expected BadBar, got {other:?}"),
        }
    }

    #[test]
    fn negative_close_rejected() {
        let bars = vec![bar(1, -5.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(SmacrossError::BadBar { .. })
        ));
    }

    #[test]
    fn nan_close_rejected() {
        let bars = vec![bar(1, f64::NAN)];
        assert!(matches!(
            validate_series(&bars),
            Err(SmacrossError::BadBar { .. })
        ));
    }

    #[test]
    fn negative_volume_rejected() {
        let mut bars = vec![bar(1, 100.0)];
        bars[0].volume = -1.0;
        assert!(matches!(
            validate_series(&bars),
            Err(SmacrossError::BadBar { .. })
        ));
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let bars = vec![bar(1, 100.0), bar(1, 101.0)];
        let result = validate_series(&bars);
        match result {
            Err(SmacrossError::BadBar { reason, .. }) => {
                assert!(reason.contains("ascending"));
            }
            other => panic!("expected BadBar, got {other:?}"),
        }
    }

    #[test]
    fn descending_timestamp_rejected() {
        let bars = vec![bar(2, 100.0), bar(1, 101.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(SmacrossError::BadBar { .. })
        ));
    }

    #[test]
    fn parse_timestamp_accepts_datetime() {
        let ts = parse_timestamp("2024-01-15 13:00:00").unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn parse_timestamp_accepts_bare_date() {
        let ts = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("15/01/2024").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
