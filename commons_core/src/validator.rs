//! Action validation: repair raw agent actions into legal bounds.
//!
//! Validation never fails. Every raw action is mapped to
//! `h ∈ [0, h_max]` and `c ∈ [0, w_i]` (with `w_i` the agent's wealth at the
//! start of the step) and the repair is reported back per agent.

use commons_env::Action;
use serde::{Deserialize, Serialize};

/// Which components of an agent's action were changed during repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampFlags {
    pub harvest: bool,
    pub contribute: bool,
}

impl ClampFlags {
    pub fn any(&self) -> bool {
        self.harvest || self.contribute
    }
}

/// Actions after repair, indexed by agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedActions {
    pub harvests: Vec<f64>,
    pub contributions: Vec<f64>,
    pub clamped: Vec<ClampFlags>,

    /// Agents that supplied no action and were treated as idle
    pub missing: usize,

    /// Surplus actions beyond the agent count that were dropped
    pub surplus: usize,
}

/// Clamps `value` into `[lo, hi]`, mapping NaN to `lo`.
fn repair(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

/// Repairs one step's raw actions.
///
/// `wealth` defines the agent count. Missing trailing actions count as
/// `(0, 0)`; surplus actions are ignored. With governance disabled every
/// contribution is forced to zero.
pub fn validate_actions(
    raw: &[Action],
    wealth: &[f64],
    max_harvest: f64,
    governance_enabled: bool,
) -> ValidatedActions {
    let n = wealth.len();
    let mut harvests = Vec::with_capacity(n);
    let mut contributions = Vec::with_capacity(n);
    let mut clamped = Vec::with_capacity(n);

    for (i, w) in wealth.iter().enumerate() {
        let action = raw.get(i).copied().unwrap_or_default();
        let contribute_cap = if governance_enabled { *w } else { 0.0 };

        let h = repair(action.harvest, 0.0, max_harvest);
        let c = repair(action.contribute, 0.0, contribute_cap);

        // NaN compares unequal, so a repaired NaN is flagged too
        clamped.push(ClampFlags {
            harvest: h != action.harvest,
            contribute: c != action.contribute,
        });
        harvests.push(h);
        contributions.push(c);
    }

    ValidatedActions {
        harvests,
        contributions,
        clamped,
        missing: n.saturating_sub(raw.len()),
        surplus: raw.len().saturating_sub(n),
    }
}
