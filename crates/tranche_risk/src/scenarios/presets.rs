//! Preset stress severities.

use std::fmt;
use std::str::FromStr;
use tranche_core::types::error::ensure_severity;
use tranche_core::types::TrancheError;

/// Fraction of pool TVL lost in a stress scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StressSeverity {
    /// 1% of TVL lost
    Mild,
    /// 5% of TVL lost
    Moderate,
    /// 10% of TVL lost
    Severe,
    /// 20% of TVL lost
    Extreme,
    /// Caller-chosen fraction in [0, 1]
    Custom(f64),
}

impl StressSeverity {
    /// All named presets, mildest first.
    pub fn presets() -> Vec<Self> {
        vec![Self::Mild, Self::Moderate, Self::Severe, Self::Extreme]
    }

    /// Named preset for `value`, or `Custom`.
    pub fn from_value(value: f64) -> Self {
        Self::presets()
            .into_iter()
            .find(|preset| preset.value() == value)
            .unwrap_or(Self::Custom(value))
    }

    /// Loss as a fraction of TVL.
    pub fn value(self) -> f64 {
        match self {
            Self::Mild => 0.01,
            Self::Moderate => 0.05,
            Self::Severe => 0.10,
            Self::Extreme => 0.20,
            Self::Custom(value) => value,
        }
    }

    /// Get human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Extreme => "Extreme",
            Self::Custom(_) => "Custom",
        }
    }

    /// Get description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Mild => "Routine drawdown, 1% of pool TVL",
            Self::Moderate => "Protocol incident, 5% of pool TVL",
            Self::Severe => "Major exploit, 10% of pool TVL",
            Self::Extreme => "Systemic failure, 20% of pool TVL",
            Self::Custom(_) => "User-defined loss severity",
        }
    }

    /// Percentage label, e.g. `"5%"`.
    pub fn label(self) -> String {
        severity_label(self.value())
    }
}

impl fmt::Display for StressSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.label())
    }
}

impl FromStr for StressSeverity {
    type Err = TrancheError;

    /// Parse a preset name (any case) or a fraction such as `0.15`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(preset) = Self::presets()
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(trimmed))
        {
            return Ok(preset);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| TrancheError::UnknownSeverity(s.to_string()))?;
        Ok(Self::from_value(ensure_severity(value)?))
    }
}

/// Percentage label for a severity fraction.
///
/// Whole percentages print without decimals; others keep up to two.
///
/// # Examples
/// ```
/// use tranche_risk::scenarios::severity_label;
///
/// assert_eq!(severity_label(0.05), "5%");
/// assert_eq!(severity_label(0.2), "20%");
/// assert_eq!(severity_label(0.025), "2.5%");
/// ```
pub fn severity_label(severity: f64) -> String {
    let percent = severity * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{}%", percent.round() as i64)
    } else {
        let text = format!("{:.2}", percent);
        format!("{}%", text.trim_end_matches('0').trim_end_matches('.'))
    }
}
