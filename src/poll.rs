//! One fetch → store → alert-check cycle.

use anyhow::Result;

use crate::{AlertDecision, AlertPolicy, AlertTracker, Reading, ReadingStore, WeatherSource};

// ---

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The fetch failed; nothing was stored and the tracker is untouched.
    Skipped,
    /// The reading was stored and evaluated.
    Recorded {
        reading: Reading,
        decision: AlertDecision,
    },
}

/// Run one poll cycle.
///
/// A fetch failure is logged and skips the cycle without retrying. On success
/// the reading is appended first and only then fed to the tracker, so a store
/// error leaves the streak unchanged. Store errors are returned to the caller.
pub async fn run_cycle<W, S>(
    source: &W,
    store: &S,
    tracker: &mut AlertTracker,
    policy: &AlertPolicy,
) -> Result<CycleOutcome>
where
    W: WeatherSource,
    S: ReadingStore,
{
    // ---
    let reading = match source.fetch().await {
        Ok(reading) => reading,
        Err(e) => {
            tracing::warn!("Error fetching data: {}", e);
            return Ok(CycleOutcome::Skipped);
        }
    };

    store.append(&reading).await?;
    tracing::info!(
        "Recorded reading: {} {:.2}°C (feels like {:.2}°C) at {}",
        reading.condition,
        reading.temperature,
        reading.feels_like,
        reading.observed_at
    );

    let decision = tracker.evaluate_policy(reading.temperature, policy);
    if let AlertDecision::Fire { streak } = decision {
        tracing::warn!(
            streak,
            "ALERT! Temperature has exceeded {}°C for {} consecutive updates.",
            policy.threshold,
            policy.required_streak
        );
    }

    Ok(CycleOutcome::Recorded { reading, decision })
}
