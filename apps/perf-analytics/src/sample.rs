//! Synthetic market-making session generator.
//!
//! Produces one trading day of one-minute periods with:
//! - inventory following a mean-reverting random walk clipped to `±max_inventory`
//! - returns drawn around a base edge minus an inventory penalty
//! - spreads widening with short-term volatility and inventory
//!
//! The same seed always yields the same records.

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::PeriodRecord;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::PERIODS_PER_DAY;

/// Standard deviation of the short-term market volatility driving spreads.
const MARKET_VOL_STD: f64 = 0.001;

/// Parameters of the synthetic session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConfig {
    /// Number of one-minute periods.
    pub periods: usize,
    /// RNG seed.
    pub seed: u64,
    /// Timestamp of the first period.
    pub start: DateTime<Utc>,
    /// Mean per-period return before the inventory penalty.
    pub base_return: f64,
    /// Per-period return volatility.
    pub volatility: f64,
    /// Return penalty per unit of absolute inventory.
    pub inventory_penalty: f64,
    /// Fraction of inventory unwound each period.
    pub reversion: f64,
    /// Standard deviation of the inventory shock.
    pub inventory_shock: f64,
    /// Inventory clip bound.
    pub max_inventory: f64,
    /// Spread floor.
    pub base_spread: f64,
}

impl SampleConfig {
    /// Defaults for a session of `periods` minutes starting at `start`.
    #[must_use]
    pub const fn new(periods: usize, seed: u64, start: DateTime<Utc>) -> Self {
        Self {
            periods,
            seed,
            start,
            base_return: 0.0001,
            volatility: 0.002,
            inventory_penalty: 0.0001,
            reversion: 0.1,
            inventory_shock: 50.0,
            max_inventory: 1000.0,
            base_spread: 0.05,
        }
    }

    /// One full trading day (390 periods).
    #[must_use]
    pub fn trading_day(seed: u64, start: DateTime<Utc>) -> Self {
        Self::new(PERIODS_PER_DAY as usize, seed, start)
    }
}

/// Seeded generator of [`PeriodRecord`]s.
#[derive(Debug)]
pub struct SampleGenerator {
    config: SampleConfig,
    rng: StdRng,
    return_noise: Normal<f64>,
    inventory_shock: Normal<f64>,
    market_vol: Normal<f64>,
}

impl SampleGenerator {
    /// Create a generator seeded from the config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when a volatility parameter is negative or not
    /// finite.
    pub fn new(config: SampleConfig) -> AnalyticsResult<Self> {
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            return_noise: noise("volatility", config.volatility)?,
            inventory_shock: noise("inventory_shock", config.inventory_shock)?,
            market_vol: noise("market volatility", MARKET_VOL_STD)?,
            config,
        })
    }

    /// Generate the full session.
    pub fn generate(&mut self) -> Vec<PeriodRecord> {
        let c = self.config;
        let mut inventory: f64 = 0.0;
        let mut records = Vec::with_capacity(c.periods);

        for i in 0..c.periods {
            let penalty = inventory.abs() * c.inventory_penalty;
            let period_return = c.base_return - penalty + self.return_noise.sample(&mut self.rng);

            let change = -inventory * c.reversion + self.inventory_shock.sample(&mut self.rng);
            inventory = (inventory + change).clamp(-c.max_inventory, c.max_inventory);

            let market_vol = self.market_vol.sample(&mut self.rng).abs();
            let spread = inventory.abs().mul_add(0.000_01, market_vol.mul_add(100.0, c.base_spread));

            records.push(PeriodRecord::new(
                c.start + Duration::minutes(i as i64),
                period_return,
                inventory,
                spread,
            ));
        }

        tracing::debug!(periods = c.periods, seed = c.seed, "Generated sample session");
        records
    }
}

fn noise(name: &str, std_dev: f64) -> AnalyticsResult<Normal<f64>> {
    Normal::new(0.0, std_dev).map_err(|e| {
        AnalyticsError::invalid_input(format!("sample {name} {std_dev} is invalid: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::validate_records;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_same_seed_same_records() {
        let a = SampleGenerator::new(SampleConfig::trading_day(42, start())).unwrap().generate();
        let b = SampleGenerator::new(SampleConfig::trading_day(42, start())).unwrap().generate();
        assert_eq!(a, b);
        assert_eq!(a.len(), 390);
    }

    #[test]
    fn test_different_seed_differs() {
        let a = SampleGenerator::new(SampleConfig::new(50, 1, start())).unwrap().generate();
        let b = SampleGenerator::new(SampleConfig::new(50, 2, start())).unwrap().generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_records_are_valid() {
        let records = SampleGenerator::new(SampleConfig::trading_day(7, start())).unwrap().generate();

        assert!(validate_records(&records).is_ok());
        assert!(records.iter().all(|r| r.inventory.abs() <= 1000.0));
        assert!(records.iter().all(|r| r.spread >= 0.05));
        assert_eq!(records[1].timestamp - records[0].timestamp, Duration::minutes(1));
    }

    #[test]
    fn test_invalid_volatility_rejected() {
        let mut config = SampleConfig::new(10, 1, start());
        config.volatility = f64::NAN;
        let err = SampleGenerator::new(config).unwrap_err();
        assert!(err.is_invalid_input());

        let mut config = SampleConfig::new(10, 1, start());
        config.inventory_shock = -1.0;
        assert!(SampleGenerator::new(config).is_err());
    }

    #[test]
    fn test_zero_volatility_leaves_only_penalty() {
        let mut config = SampleConfig::new(20, 3, start());
        config.volatility = 0.0;
        let records = SampleGenerator::new(config).unwrap().generate();
        // without return noise only the inventory penalty moves returns
        assert!(records.iter().all(|r| r.return_value <= config.base_return));
    }
}
