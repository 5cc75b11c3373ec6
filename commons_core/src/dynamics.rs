//! Stock regeneration.

use crate::config::{EngineConfig, RegenerationLaw};

/// Next-period stock calculation, fixed once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceDynamics {
    law: RegenerationLaw,
    rate: f64,
    capacity: f64,
}

/// Stock values produced by one regeneration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockUpdate {
    /// `R - H`, before growth and bonus
    pub after_harvest: f64,

    /// Growth term contributed by the regeneration law
    pub growth: f64,

    /// `R'`, clamped to `[0, K]`
    pub next: f64,
}

impl ResourceDynamics {
    pub fn new(law: RegenerationLaw, rate: f64, capacity: f64) -> Self {
        Self { law, rate, capacity }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.regeneration, config.regen_rate, config.capacity)
    }

    pub fn law(&self) -> RegenerationLaw {
        self.law
    }

    /// Growth term for a given pre-harvest stock.
    ///
    /// Logistic growth is evaluated on `R`, not on `R - H`.
    pub fn growth(&self, stock: f64) -> f64 {
        match self.law {
            RegenerationLaw::Logistic => self.rate * stock * (1.0 - stock / self.capacity),
            RegenerationLaw::Linear => self.rate,
        }
    }

    /// Computes `R' = clamp(R - H + growth(R) + G, 0, K)`.
    pub fn next_stock(&self, stock: f64, harvest: f64, bonus: f64) -> StockUpdate {
        let after_harvest = stock - harvest;
        let growth = self.growth(stock);
        let next = (after_harvest + growth + bonus).clamp(0.0, self.capacity);
        StockUpdate { after_harvest, growth, next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_logistic_half_capacity() {
        let d = ResourceDynamics::new(RegenerationLaw::Logistic, 0.1, 100.0);
        let up = d.next_stock(50.0, 50.0, 0.0);
        assert_eq!(up.after_harvest, 0.0);
        assert_relative_eq!(up.growth, 2.5);
        assert_relative_eq!(up.next, 2.5);
    }

    #[test]
    fn test_logistic_fixed_points() {
        let d = ResourceDynamics::new(RegenerationLaw::Logistic, 0.3, 100.0);
        assert_eq!(d.next_stock(0.0, 0.0, 0.0).next, 0.0);
        assert_eq!(d.next_stock(100.0, 0.0, 0.0).next, 100.0);
    }

    #[test]
    fn test_logistic_monotone_approach() {
        let d = ResourceDynamics::new(RegenerationLaw::Logistic, 0.2, 100.0);
        let mut stock = 5.0;
        for _ in 0..100 {
            let next = d.next_stock(stock, 0.0, 0.0).next;
            assert!(next >= stock);
            assert!(next <= 100.0);
            if stock < 100.0 {
                assert!(next > stock || next == 100.0);
            }
            stock = next;
        }
        assert!(stock > 99.0);
    }

    #[test]
    fn test_linear_adds_constant() {
        let d = ResourceDynamics::new(RegenerationLaw::Linear, 0.1, 100.0);
        let up = d.next_stock(50.0, 10.0, 0.0);
        assert_eq!(up.after_harvest, 40.0);
        assert_relative_eq!(up.next, 40.1);
        assert!(up.next > up.after_harvest);
    }

    #[test]
    fn test_clamped_to_capacity() {
        let d = ResourceDynamics::new(RegenerationLaw::Linear, 5.0, 100.0);
        assert_eq!(d.next_stock(99.0, 0.0, 10.0).next, 100.0);
    }

    #[test]
    fn test_clamped_to_zero() {
        let d = ResourceDynamics::new(RegenerationLaw::Linear, -3.0, 100.0);
        assert_eq!(d.next_stock(1.0, 1.0, 0.0).next, 0.0);
    }

    #[test]
    fn test_bonus_added_to_stock() {
        let d = ResourceDynamics::new(RegenerationLaw::Logistic, 0.0, 100.0);
        assert_relative_eq!(d.next_stock(30.0, 10.0, 4.0).next, 24.0);
    }
}
