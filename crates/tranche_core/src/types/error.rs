//! Error types for structured error handling.
//!
//! Every fallible engine operation returns [`TrancheError`]. Validation
//! failures are raised at the API boundary before any computation starts;
//! loss overflow is normally reported as data and only becomes an error
//! when a caller asks for it explicitly.

use thiserror::Error;

/// Convenience alias used throughout the engine crates.
pub type TrancheResult<T> = Result<T, TrancheError>;

/// Categorised engine errors.
///
/// # Examples
/// ```
/// use tranche_core::types::TrancheError;
///
/// let err = TrancheError::SegmentOutOfRange { segment: 120 };
/// assert_eq!(format!("{}", err), "Segment 120 outside valid domain [0, 99]");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrancheError {
    /// Segment index outside [0, 99].
    #[error("Segment {segment} outside valid domain [0, 99]")]
    SegmentOutOfRange {
        /// The offending index
        segment: i64,
    },

    /// Risk range whose lower bound exceeds its upper bound.
    #[error("Invalid risk range: min {min} > max {max}")]
    InvertedRange {
        /// Lower bound supplied
        min: i64,
        /// Upper bound supplied
        max: i64,
    },

    /// Capital, TVL, yield or loss amount is negative.
    #[error("Negative amount for {name}: {value}")]
    NegativeAmount {
        /// Which input was negative
        name: &'static str,
        /// The value supplied
        value: f64,
    },

    /// Amount is NaN or infinite.
    #[error("Non-finite amount for {name}")]
    NonFiniteAmount {
        /// Which input was non-finite
        name: &'static str,
    },

    /// Stress severity outside [0, 1].
    #[error("Invalid severity {0}: must be within [0, 1]")]
    InvalidSeverity(f64),

    /// Severity that is neither a preset name nor a number.
    #[error("Unknown stress severity '{0}': expected a preset name or a fraction in [0, 1]")]
    UnknownSeverity(String),

    /// Malformed liquidity profile.
    #[error("Invalid liquidity profile: {0}")]
    InvalidProfile(String),

    /// Engine configuration violates an invariant.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration version this build does not understand.
    #[error("Unsupported configuration version: {0}")]
    UnsupportedVersion(u32),

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    /// Total loss exceeded the combined absorption capacity.
    #[error("Loss overflow: {unabsorbed} left unabsorbed")]
    OverflowLoss {
        /// Loss no tier could absorb
        unabsorbed: f64,
    },
}

impl TrancheError {
    /// Whether the error is a reportable stress outcome rather than bad input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrancheError::OverflowLoss { .. })
    }
}

/// Validate that an amount is finite and non-negative.
///
/// # Examples
/// ```
/// use tranche_core::types::error::ensure_amount;
///
/// assert!(ensure_amount("amount", 10.0).is_ok());
/// assert!(ensure_amount("amount", -1.0).is_err());
/// assert!(ensure_amount("amount", f64::NAN).is_err());
/// ```
pub fn ensure_amount(name: &'static str, value: f64) -> TrancheResult<f64> {
    if !value.is_finite() {
        return Err(TrancheError::NonFiniteAmount { name });
    }
    if value < 0.0 {
        return Err(TrancheError::NegativeAmount { name, value });
    }
    Ok(value)
}

/// Validate a stress severity expressed as a fraction of TVL.
pub fn ensure_severity(severity: f64) -> TrancheResult<f64> {
    if !severity.is_finite() || !(0.0..=1.0).contains(&severity) {
        return Err(TrancheError::InvalidSeverity(severity));
    }
    Ok(severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_out_of_range() {
        let err = TrancheError::SegmentOutOfRange { segment: -1 };
        assert_eq!(format!("{}", err), "Segment -1 outside valid domain [0, 99]");
    }

    #[test]
    fn test_error_display_inverted_range() {
        let err = TrancheError::InvertedRange { min: 40, max: 10 };
        assert_eq!(format!("{}", err), "Invalid risk range: min 40 > max 10");
    }

    #[test]
    fn test_error_display_negative_amount() {
        let err = TrancheError::NegativeAmount {
            name: "total_tvl",
            value: -5.0,
        };
        assert_eq!(format!("{}", err), "Negative amount for total_tvl: -5");
    }

    #[test]
    fn test_error_display_overflow() {
        let err = TrancheError::OverflowLoss { unabsorbed: 250.5 };
        assert!(format!("{}", err).contains("250.5"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validation_errors_not_recoverable() {
        assert!(!TrancheError::InvalidSeverity(2.0).is_recoverable());
        assert!(!TrancheError::InvertedRange { min: 2, max: 1 }.is_recoverable());
    }

    #[test]
    fn test_error_display_unknown_severity() {
        let err = TrancheError::UnknownSeverity("apocalyptic".to_string());
        assert!(err.to_string().contains("'apocalyptic'"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_ensure_amount() {
        assert_eq!(ensure_amount("x", 0.0), Ok(0.0));
        assert_eq!(
            ensure_amount("x", -0.5),
            Err(TrancheError::NegativeAmount {
                name: "x",
                value: -0.5
            })
        );
        assert_eq!(
            ensure_amount("x", f64::INFINITY),
            Err(TrancheError::NonFiniteAmount { name: "x" })
        );
    }

    #[test]
    fn test_ensure_severity() {
        assert!(ensure_severity(0.0).is_ok());
        assert!(ensure_severity(1.0).is_ok());
        assert!(ensure_severity(1.01).is_err());
        assert!(ensure_severity(-0.01).is_err());
        assert!(ensure_severity(f64::NAN).is_err());
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> =
            Box::new(TrancheError::InvalidProfile("short".to_string()));
        assert!(err.to_string().contains("short"));
    }
}
