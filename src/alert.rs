//! Consecutive high-temperature streak tracking.

use serde::Serialize;

use crate::AlertDecision;

// ---

/// Threshold and streak length an alert is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertPolicy {
    // ---
    /// Readings strictly above this temperature (°C) count as a breach.
    pub threshold: f64,

    /// Number of consecutive breaches before the alert fires.
    pub required_streak: u32,
}

/// Counter of consecutive readings above the threshold.
///
/// Owned by the monitor and lent to each poll cycle; the count starts at zero
/// and is lost on restart.
#[derive(Debug, Default)]
pub struct AlertTracker {
    consecutive_high_count: u32,
}

impl AlertTracker {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Current run of consecutive breaches.
    pub fn streak(&self) -> u32 {
        self.consecutive_high_count
    }

    /// Feed one temperature into the tracker.
    ///
    /// A breach extends the streak and fires once it reaches
    /// `required_streak`. The streak is not reset on firing, so every further
    /// breach fires too. Anything at or below the threshold resets it.
    pub fn evaluate(
        &mut self,
        temperature: f64,
        threshold: f64,
        required_streak: u32,
    ) -> AlertDecision {
        // ---
        if temperature > threshold {
            self.consecutive_high_count = self.consecutive_high_count.saturating_add(1);
            if self.consecutive_high_count >= required_streak {
                return AlertDecision::Fire {
                    streak: self.consecutive_high_count,
                };
            }
        } else {
            self.consecutive_high_count = 0;
        }
        AlertDecision::NoAlert
    }

    /// [`evaluate`](Self::evaluate) against a policy.
    pub fn evaluate_policy(&mut self, temperature: f64, policy: &AlertPolicy) -> AlertDecision {
        self.evaluate(temperature, policy.threshold, policy.required_streak)
    }
}
