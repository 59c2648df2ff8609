//! Run-scoped spend tracking against a fixed ceiling.
//!
//! Amounts are kept as integer micro-dollars so that adding the same decimal
//! estimate many times lands exactly on the ceiling.

use tracing::debug;

const MICROS_PER_USD: f64 = 1_000_000.0;

/// Convert a USD amount to micro-dollars. Non-finite and non-positive amounts
/// count as zero.
pub fn usd_to_micros(usd: f64) -> u64 {
    if !usd.is_finite() || usd <= 0.0 {
        return 0;
    }
    (usd * MICROS_PER_USD).round() as u64
}

fn micros_to_usd(micros: u64) -> f64 {
    micros as f64 / MICROS_PER_USD
}

/// Running estimate of spend used to gate billable calls.
///
/// The gate is checked before a call and the estimate is charged after it, so
/// the total may end up above the ceiling by at most one charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLedger {
    spent_micros: u64,
    ceiling_micros: u64,
    charges: u32,
}

impl CostLedger {
    pub fn new(ceiling_usd: f64) -> Self {
        Self {
            spent_micros: 0,
            ceiling_micros: usd_to_micros(ceiling_usd),
            charges: 0,
        }
    }

    /// True while the accumulated cost is strictly below the ceiling.
    pub fn remaining_budget(&self) -> bool {
        self.spent_micros < self.ceiling_micros
    }

    /// Add one call's estimated cost. Never fails and never decreases the total.
    pub fn charge(&mut self, amount_usd: f64) {
        self.spent_micros = self.spent_micros.saturating_add(usd_to_micros(amount_usd));
        self.charges += 1;
        debug!(
            "💰 Charged ${:.4}, total ${:.4} of ${:.4}",
            amount_usd,
            self.spent_usd(),
            self.ceiling_usd()
        );
    }

    pub fn spent_usd(&self) -> f64 {
        micros_to_usd(self.spent_micros)
    }

    pub fn ceiling_usd(&self) -> f64 {
        micros_to_usd(self.ceiling_micros)
    }

    pub fn charges(&self) -> u32 {
        self.charges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ceiling_has_no_budget() {
        let ledger = CostLedger::new(0.0);
        assert!(!ledger.remaining_budget());
    }

    #[test]
    fn test_gate_closes_exactly_at_ceiling() {
        let mut ledger = CostLedger::new(0.02);
        assert!(ledger.remaining_budget());
        ledger.charge(0.01);
        assert!(ledger.remaining_budget());
        ledger.charge(0.01);
        assert!(!ledger.remaining_budget());
        assert_eq!(ledger.charges(), 2);
    }

    #[test]
    fn test_repeated_decimal_charges_do_not_drift() {
        let mut ledger = CostLedger::new(0.25);
        let mut calls = 0;
        while ledger.remaining_budget() {
            ledger.charge(0.01);
            calls += 1;
        }
        assert_eq!(calls, 25);
        assert_eq!(ledger.spent_usd(), 0.25);
    }

    #[test]
    fn test_overshoot_is_bounded_by_one_charge() {
        let mut ledger = CostLedger::new(0.05);
        while ledger.remaining_budget() {
            ledger.charge(0.02);
        }
        assert_eq!(ledger.charges(), 3);
        assert!(ledger.spent_usd() - ledger.ceiling_usd() < 0.02);
    }

    #[test]
    fn test_spend_is_monotonic() {
        let mut ledger = CostLedger::new(1.0);
        let mut last = ledger.spent_usd();
        for amount in [0.1, 0.0, -5.0, f64::NAN, 0.3] {
            ledger.charge(amount);
            assert!(ledger.spent_usd() >= last);
            last = ledger.spent_usd();
        }
        assert!((ledger.spent_usd() - 0.4).abs() < 1e-9);
    }
}
