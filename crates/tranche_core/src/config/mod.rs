//! Versioned engine configuration.
//!
//! Every constant the engine uses (tier boundaries, curve rates, growth
//! bases, range policy, absorption rates, TVL split and stress severities)
//! lives in one [`EngineConfig`] that is handed to each component at
//! construction time.
//!
//! # Loading
//!
//! ```
//! use tranche_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     version = 1
//!     stress_severities = [0.01, 0.05, 0.10]
//!
//!     [rates]
//!     equity_growth_base = 1.02
//! "#).unwrap();
//!
//! assert_eq!(config.stress_severities, vec![0.01, 0.05, 0.10]);
//! assert_eq!(config.rates.equity_growth_base, 1.02);
//! // Fields not present in the file keep their defaults
//! assert_eq!(config.rates.junior_end_apy, 0.15);
//! ```

mod params;
mod tiers;

pub use params::{
    capacity_growth, default_absorption, default_stress_severities, default_tvl_shares,
    AbsorptionParams, AbsorptionRate, RangePolicy, RateParams,
};
pub use tiers::{SegmentSpan, TierLayout, MIN_INTERPOLATED_WIDTH};

use crate::types::{Tier, TierTable, TrancheError, TrancheResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Configuration schema version understood by this build.
pub const CONFIG_VERSION: u32 = 1;

/// Tolerance used when checking that TVL shares sum to one.
const SHARE_TOLERANCE: f64 = 1e-9;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Schema version
    pub version: u32,
    /// Severities run when a stress request names none
    #[serde(default = "default_stress_severities")]
    pub stress_severities: Vec<f64>,
    /// Tier boundaries
    pub tiers: TierLayout,
    /// APY curve parameters
    pub rates: RateParams,
    /// Range reduction policy
    pub range_policy: RangePolicy,
    /// Per-tier loss absorption rates
    #[serde(default = "default_absorption")]
    pub absorption: AbsorptionParams,
    /// Split of a total TVL across tiers
    #[serde(default = "default_tvl_shares")]
    pub tvl_shares: TierTable<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            stress_severities: default_stress_severities(),
            tiers: TierLayout::default(),
            rates: RateParams::default(),
            range_policy: RangePolicy::default(),
            absorption: default_absorption(),
            tvl_shares: default_tvl_shares(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> TrancheResult<Self> {
        let config: EngineConfig = toml::from_str(raw)
            .map_err(|e| TrancheError::ConfigFile(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> TrancheResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrancheError::ConfigFile(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), version = config.version, "engine configuration loaded");
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> TrancheResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TrancheError::ConfigFile(format!("Failed to render TOML: {}", e)))
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> TrancheResult<()> {
        if self.version != CONFIG_VERSION {
            return Err(TrancheError::UnsupportedVersion(self.version));
        }
        self.tiers.validate()?;
        self.validate_rates()?;
        self.validate_range_policy()?;
        self.validate_absorption()?;
        self.validate_shares()?;
        for &severity in &self.stress_severities {
            crate::types::error::ensure_severity(severity)?;
        }
        Ok(())
    }

    fn validate_rates(&self) -> TrancheResult<()> {
        let r = &self.rates;
        let finite_positive = [
            ("base_rate", r.base_rate),
            ("senior_multiplier", r.senior_multiplier),
            ("mezzanine_end_apy", r.mezzanine_end_apy),
            ("junior_end_apy", r.junior_end_apy),
            ("junior_exponent", r.junior_exponent),
            ("equity_growth_base", r.equity_growth_base),
        ];
        for (name, value) in finite_positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{} must be finite and positive, got {}", name, value)));
            }
        }
        if r.senior_apy() > r.mezzanine_end_apy {
            return Err(invalid(format!(
                "senior APY {} exceeds mezzanine end APY {}",
                r.senior_apy(),
                r.mezzanine_end_apy
            )));
        }
        if r.mezzanine_end_apy > r.junior_end_apy {
            return Err(invalid(format!(
                "mezzanine end APY {} exceeds junior end APY {}",
                r.mezzanine_end_apy, r.junior_end_apy
            )));
        }
        if r.equity_growth_base < 1.0 {
            return Err(invalid(format!(
                "equity_growth_base must be >= 1, got {}",
                r.equity_growth_base
            )));
        }
        if let Some(cap) = r.apy_cap {
            if !cap.is_finite() || cap < r.junior_end_apy {
                return Err(invalid(format!(
                    "apy_cap {} must be finite and >= junior end APY {}",
                    cap, r.junior_end_apy
                )));
            }
        }
        Ok(())
    }

    fn validate_range_policy(&self) -> TrancheResult<()> {
        if let RangePolicy::RadialBlend {
            safe_apy,
            ceiling_apy,
            exponent,
        } = self.range_policy
        {
            if !(safe_apy.is_finite() && ceiling_apy.is_finite() && exponent.is_finite()) {
                return Err(invalid("radial blend parameters must be finite".to_string()));
            }
            if safe_apy < 0.0 || safe_apy > ceiling_apy {
                return Err(invalid(format!(
                    "radial blend requires 0 <= safe_apy <= ceiling_apy, got {} and {}",
                    safe_apy, ceiling_apy
                )));
            }
            if exponent <= 0.0 {
                return Err(invalid(format!("radial blend exponent must be positive, got {}", exponent)));
            }
        }
        Ok(())
    }

    fn validate_absorption(&self) -> TrancheResult<()> {
        for (tier, rate) in self.absorption.iter() {
            if !rate.base.is_finite() || !(0.0..=1.0).contains(&rate.base) {
                return Err(invalid(format!(
                    "{} absorption base must be within [0, 1], got {}",
                    tier, rate.base
                )));
            }
            if !rate.severity_scaling.is_finite() || rate.severity_scaling < 0.0 {
                return Err(invalid(format!(
                    "{} severity scaling must be non-negative, got {}",
                    tier, rate.severity_scaling
                )));
            }
        }
        if self.absorption.get(Tier::Senior).severity_scaling != 0.0 {
            return Err(invalid("senior absorption rate must be constant".to_string()));
        }
        Ok(())
    }

    fn validate_shares(&self) -> TrancheResult<()> {
        for (tier, &share) in self.tvl_shares.iter() {
            if !share.is_finite() || share < 0.0 {
                return Err(invalid(format!("{} TVL share must be non-negative, got {}", tier, share)));
            }
        }
        let total: f64 = self.tvl_shares.values().iter().sum();
        if (total - 1.0).abs() > SHARE_TOLERANCE {
            return Err(invalid(format!("TVL shares must sum to 1, got {}", total)));
        }
        let growth = capacity_growth(&self.absorption, &self.tvl_shares);
        if growth > 1.0 + SHARE_TOLERANCE {
            return Err(invalid(format!(
                "absorption capacity grows faster than loss ({} > 1); stress results would not be monotone",
                growth
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> TrancheError {
    TrancheError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::default();
        config.rates.apy_cap = Some(0.35);
        config.range_policy = RangePolicy::radial_default();
        let rendered = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = EngineConfig::from_toml_str("version = 2").unwrap_err();
        assert_eq!(err, TrancheError::UnsupportedVersion(2));
    }

    #[test]
    fn test_rejects_bad_partition() {
        let raw = r#"
            [tiers]
            senior = { start = 0, end = 9 }
            mezzanine = { start = 10, end = 29 }
            junior = { start = 30, end = 50 }
            equity = { start = 60, end = 99 }
        "#;
        assert!(matches!(
            EngineConfig::from_toml_str(raw),
            Err(TrancheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_decreasing_rates() {
        let mut config = EngineConfig::default();
        config.rates.mezzanine_end_apy = 0.02;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.rates.equity_growth_base = 0.99;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.rates.apy_cap = Some(0.10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_shares() {
        let mut config = EngineConfig::default();
        config.tvl_shares.senior = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_fast_capacity_growth() {
        let mut config = EngineConfig::default();
        config.absorption.equity.severity_scaling = 10.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("monotone"));
    }

    #[test]
    fn test_rejects_scaling_senior_absorption() {
        let mut config = EngineConfig::default();
        config.absorption.senior.severity_scaling = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_severity() {
        let mut config = EngineConfig::default();
        config.stress_severities = vec![0.05, 1.5];
        assert_eq!(config.validate(), Err(TrancheError::InvalidSeverity(1.5)));
    }

    #[test]
    fn test_rejects_bad_radial_policy() {
        let mut config = EngineConfig::default();
        config.range_policy = RangePolicy::RadialBlend {
            safe_apy: 0.5,
            ceiling_apy: 0.1,
            exponent: 1.5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineConfig::from_toml_str("version = ").unwrap_err();
        assert!(matches!(err, TrancheError::ConfigFile(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/tranche.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
