//! Proportional rationing of harvest requests.

use serde::{Deserialize, Serialize};

/// Result of resolving one step's harvest requests against the stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// Realized harvest per agent `h̃_i`
    pub realized: Vec<f64>,

    /// Common scaling factor `φ ∈ [0, 1]`
    pub scale: f64,

    /// Total realized harvest `H`, never above the stock
    pub total: f64,
}

/// Scales every request by the same factor so the total fits the stock.
///
/// `φ = 1` when nothing is requested, otherwise `min(1, R / H_req)`.
/// Every agent gets `φ·h_i`; nobody is served first. Requests must be
/// finite and non-negative, which validation guarantees.
pub fn allocate(requests: &[f64], stock: f64) -> AllocationOutcome {
    let requested: f64 = requests.iter().sum();

    let scale = if !requested.is_finite() {
        // H_req overflowed: ration against the largest request instead
        let largest = requests.iter().copied().fold(0.0, f64::max);
        let relative: f64 = requests.iter().map(|h| h / largest).sum();
        ((stock / largest) / relative).min(1.0)
    } else if requested > 0.0 {
        (stock / requested).min(1.0)
    } else {
        1.0
    };

    let realized: Vec<f64> = requests.iter().map(|h| scale * h).collect();

    // Rounding in φ·h_i can push the sum an ulp past the stock
    let total = realized.iter().sum::<f64>().min(stock);

    AllocationOutcome { realized, scale, total }
}
