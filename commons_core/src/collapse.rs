//! Collapse detection.
//!
//! Two states, `Running` and `Collapsed`. A step collapses the run when its
//! post-update stock is below the critical threshold, or when the stock has
//! been exactly zero for `k` consecutive steps. Once collapsed, the status
//! stays collapsed; whether that ends the run is the engine's call.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};

/// Position in the collapse state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseStatus {
    #[default]
    Running,
    Collapsed,
}

/// Why a step triggered collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseCause {
    /// Stock fell below `R_critical`
    BelowThreshold,

    /// Stock sat at zero for `k` consecutive steps
    ZeroStreak,
}

/// Result of checking one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapseAssessment {
    /// Updated consecutive-zero counter
    pub zero_streak: u32,

    /// Status after this step
    pub status: CollapseStatus,

    /// Set only on the step that moves `Running` to `Collapsed`
    pub triggered: Option<CollapseCause>,
}

/// Collapse thresholds taken from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseMonitor {
    threshold: f64,
    zero_streak_limit: u32,
}

impl CollapseMonitor {
    pub fn new(threshold: f64, zero_streak_limit: u32) -> Self {
        Self { threshold, zero_streak_limit }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.collapse_threshold, config.zero_streak_limit)
    }

    /// Checks the post-update stock against both collapse conditions.
    pub fn assess(&self, stock: f64, zero_streak: u32, status: CollapseStatus) -> CollapseAssessment {
        let zero_streak = if stock == 0.0 { zero_streak.saturating_add(1) } else { 0 };

        let cause = if stock < self.threshold {
            Some(CollapseCause::BelowThreshold)
        } else if zero_streak >= self.zero_streak_limit {
            Some(CollapseCause::ZeroStreak)
        } else {
            None
        };

        match (status, cause) {
            (CollapseStatus::Running, Some(cause)) => CollapseAssessment {
                zero_streak,
                status: CollapseStatus::Collapsed,
                triggered: Some(cause),
            },
            _ => CollapseAssessment { zero_streak, status, triggered: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_collapses() {
        let monitor = CollapseMonitor::new(5.0, 3);
        let a = monitor.assess(3.0, 0, CollapseStatus::Running);
        assert_eq!(a.status, CollapseStatus::Collapsed);
        assert_eq!(a.triggered, Some(CollapseCause::BelowThreshold));
        assert_eq!(a.zero_streak, 0);
    }

    #[test]
    fn test_at_threshold_keeps_running() {
        let monitor = CollapseMonitor::new(5.0, 3);
        let a = monitor.assess(5.0, 0, CollapseStatus::Running);
        assert_eq!(a.status, CollapseStatus::Running);
        assert_eq!(a.triggered, None);
    }

    #[test]
    fn test_zero_streak_collapses_after_k_steps() {
        let monitor = CollapseMonitor::new(0.0, 3);
        let mut streak = 0;
        let mut status = CollapseStatus::Running;

        for expected in [CollapseStatus::Running, CollapseStatus::Running, CollapseStatus::Collapsed] {
            let a = monitor.assess(0.0, streak, status);
            streak = a.zero_streak;
            status = a.status;
            assert_eq!(status, expected);
        }
        assert_eq!(streak, 3);
    }

    #[test]
    fn test_nonzero_stock_resets_streak() {
        let monitor = CollapseMonitor::new(0.0, 3);
        let a = monitor.assess(0.0, 1, CollapseStatus::Running);
        assert_eq!(a.zero_streak, 2);
        let a = monitor.assess(0.5, a.zero_streak, a.status);
        assert_eq!(a.zero_streak, 0);
        assert_eq!(a.status, CollapseStatus::Running);
    }

    #[test]
    fn test_collapsed_is_sticky_and_triggers_once() {
        let monitor = CollapseMonitor::new(5.0, 1);
        let a = monitor.assess(80.0, 0, CollapseStatus::Collapsed);
        assert_eq!(a.status, CollapseStatus::Collapsed);
        assert_eq!(a.triggered, None);

        let a = monitor.assess(1.0, 0, CollapseStatus::Collapsed);
        assert_eq!(a.triggered, None);
    }
}
