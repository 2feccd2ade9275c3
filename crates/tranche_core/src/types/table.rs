//! Fixed four-entry table keyed by [`Tier`].

use super::segment::Tier;
use serde::{Deserialize, Serialize};

/// One value per tier.
///
/// Serialises as a map with `senior`, `mezzanine`, `junior` and `equity`
/// keys, which keeps TOML configuration files readable.
///
/// # Examples
/// ```
/// use tranche_core::types::{Tier, TierTable};
///
/// let tvl = TierTable::new(400.0, 300.0, 200.0, 100.0);
/// assert_eq!(*tvl.get(Tier::Junior), 200.0);
/// assert_eq!(tvl.values().iter().sum::<f64>(), 1_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierTable<T> {
    /// Senior entry
    pub senior: T,
    /// Mezzanine entry
    pub mezzanine: T,
    /// Junior entry
    pub junior: T,
    /// Equity entry
    pub equity: T,
}

impl<T> TierTable<T> {
    /// Build a table from entries listed lowest risk first.
    pub const fn new(senior: T, mezzanine: T, junior: T, equity: T) -> Self {
        Self {
            senior,
            mezzanine,
            junior,
            equity,
        }
    }

    /// Entry for `tier`.
    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Senior => &self.senior,
            Tier::Mezzanine => &self.mezzanine,
            Tier::Junior => &self.junior,
            Tier::Equity => &self.equity,
        }
    }

    /// Mutable entry for `tier`.
    pub fn get_mut(&mut self, tier: Tier) -> &mut T {
        match tier {
            Tier::Senior => &mut self.senior,
            Tier::Mezzanine => &mut self.mezzanine,
            Tier::Junior => &mut self.junior,
            Tier::Equity => &mut self.equity,
        }
    }

    /// Apply `f` to every entry.
    pub fn map<U>(&self, mut f: impl FnMut(Tier, &T) -> U) -> TierTable<U> {
        TierTable {
            senior: f(Tier::Senior, &self.senior),
            mezzanine: f(Tier::Mezzanine, &self.mezzanine),
            junior: f(Tier::Junior, &self.junior),
            equity: f(Tier::Equity, &self.equity),
        }
    }

    /// Entries paired with their tier, lowest risk first.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }
}

impl<T: Copy> TierTable<T> {
    /// Build a table by evaluating `f` for every tier.
    pub fn from_fn(mut f: impl FnMut(Tier) -> T) -> Self {
        Self::new(
            f(Tier::Senior),
            f(Tier::Mezzanine),
            f(Tier::Junior),
            f(Tier::Equity),
        )
    }

    /// Entries as an array, lowest risk first.
    pub fn values(&self) -> [T; 4] {
        [self.senior, self.mezzanine, self.junior, self.equity]
    }
}
