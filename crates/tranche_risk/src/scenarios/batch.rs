//! Rayon-based batch stress runs.

use super::engine::{ensure_tvl, StressReport, StressRunner};
use rayon::prelude::*;
use tracing::debug;
use tranche_core::types::{Position, TrancheResult};
use tranche_core::EngineConfig;

/// Stresses many positions against the same pool in parallel.
///
/// Reports come back in input order and are identical to running each
/// position through [`StressRunner`] on its own.
///
/// # Examples
///
/// ```
/// use tranche_core::{EngineConfig, Position, RiskRange};
/// use tranche_risk::scenarios::BatchStressRunner;
///
/// let batch = BatchStressRunner::new(&EngineConfig::default()).unwrap();
/// let positions = [
///     Position::new(1_000.0, RiskRange::new(0, 9).unwrap()).unwrap(),
///     Position::new(1_000.0, RiskRange::new(60, 99).unwrap()).unwrap(),
/// ];
/// let reports = batch.run(&positions, 1_000_000.0).unwrap();
/// assert_eq!(reports.len(), 2);
/// assert!(reports[0].worst_case().unwrap().dollar_loss < reports[1].worst_case().unwrap().dollar_loss);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStressRunner {
    runner: StressRunner,
}

impl BatchStressRunner {
    /// Build a batch runner from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        Ok(Self::from_runner(StressRunner::new(config)?))
    }

    /// Wrap an existing runner.
    pub fn from_runner(runner: StressRunner) -> Self {
        Self { runner }
    }

    /// Underlying single-position runner.
    #[inline]
    pub fn runner(&self) -> &StressRunner {
        &self.runner
    }

    /// Stress every position with the configured severities.
    pub fn run(&self, positions: &[Position], total_tvl: f64) -> TrancheResult<Vec<StressReport>> {
        self.run_with_severities(positions, total_tvl, self.runner.severities())
    }

    /// Stress every position with explicit severities.
    ///
    /// # Errors
    ///
    /// The first error any position produces; no partial output is returned.
    pub fn run_with_severities(
        &self,
        positions: &[Position],
        total_tvl: f64,
        severities: &[f64],
    ) -> TrancheResult<Vec<StressReport>> {
        ensure_tvl(total_tvl)?;
        debug!(positions = positions.len(), total_tvl, "running batch stress");

        positions
            .par_iter()
            .map(|p| self.runner.run_range(p.amount, p.range, total_tvl, severities))
            .collect()
    }
}
