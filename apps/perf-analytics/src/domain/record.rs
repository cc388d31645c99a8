//! Period record and sequence validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// One sampled time interval of strategy results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Interval timestamp (UTC).
    pub timestamp: DateTime<Utc>,
    /// Fractional P&L contribution of the period.
    pub return_value: f64,
    /// Net position size at/after the period.
    pub inventory: f64,
    /// Quoted bid-ask width for the period.
    pub spread: f64,
}

impl PeriodRecord {
    /// Create a new period record.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        return_value: f64,
        inventory: f64,
        spread: f64,
    ) -> Self {
        Self {
            timestamp,
            return_value,
            inventory,
            spread,
        }
    }

    /// Check if the period was profitable.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.return_value > 0.0
    }
}

/// Validate a record sequence against the calculator input contract.
///
/// The sequence must be non-empty, strictly increasing in `timestamp`,
/// carry finite values and a non-negative spread.
pub fn validate_records(records: &[PeriodRecord]) -> AnalyticsResult<()> {
    if records.is_empty() {
        return Err(AnalyticsError::invalid_input("record sequence is empty"));
    }

    for (idx, record) in records.iter().enumerate() {
        if !record.return_value.is_finite() {
            return Err(AnalyticsError::invalid_input(format!(
                "record {idx}: return_value is not finite"
            )));
        }
        if !record.inventory.is_finite() {
            return Err(AnalyticsError::invalid_input(format!(
                "record {idx}: inventory is not finite"
            )));
        }
        if !record.spread.is_finite() || record.spread < 0.0 {
            return Err(AnalyticsError::invalid_input(format!(
                "record {idx}: spread must be a non-negative number, got {}",
                record.spread
            )));
        }
    }

    for (idx, pair) in records.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(AnalyticsError::invalid_input(format!(
                "timestamps must be strictly increasing: record {} ({}) does not follow record {} ({})",
                idx + 1,
                pair[1].timestamp.to_rfc3339(),
                idx,
                pair[0].timestamp.to_rfc3339()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn test_valid_sequence() {
        let records = vec![
            PeriodRecord::new(ts(0), 0.01, 10.0, 0.05),
            PeriodRecord::new(ts(1), -0.02, 5.0, 0.06),
        ];
        assert!(validate_records(&records).is_ok());
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = validate_records(&[]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let records = vec![
            PeriodRecord::new(ts(0), 0.01, 0.0, 0.0),
            PeriodRecord::new(ts(0), 0.02, 0.0, 0.0),
        ];
        let err = validate_records(&records).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let records = vec![
            PeriodRecord::new(ts(2), 0.01, 0.0, 0.0),
            PeriodRecord::new(ts(1), 0.02, 0.0, 0.0),
        ];
        assert!(validate_records(&records).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_negative_spread_rejected() {
        let records = vec![PeriodRecord::new(ts(0), 0.01, 0.0, -0.1)];
        let err = validate_records(&records).unwrap_err();
        assert!(err.to_string().contains("spread"));
    }

    #[test]
    fn test_non_finite_return_rejected() {
        let records = vec![PeriodRecord::new(ts(0), f64::NAN, 0.0, 0.0)];
        assert!(validate_records(&records).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_is_winner() {
        assert!(PeriodRecord::new(ts(0), 0.001, 0.0, 0.0).is_winner());
        assert!(!PeriodRecord::new(ts(0), 0.0, 0.0, 0.0).is_winner());
    }
}
