//! Periodic packets-per-second estimation.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use netvakt_core::MonitorState;

/// Samples the monotonic packet counter on a fixed interval and slides the
/// delta into the rate history.
///
/// Runs on a drift-corrected ticker rather than sleep-loop arithmetic, and
/// skips (not bursts) missed ticks so a stalled runtime cannot flood the
/// history with zero-length intervals.
pub struct RateEstimator {
    state: Arc<MonitorState>,
    period: Duration,
}

impl RateEstimator {
    pub fn new(state: Arc<MonitorState>, period: Duration) -> Self {
        Self { state, period }
    }

    /// Runs until the state stops; observes shutdown within one tick.
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; use it as the baseline.
        ticker.tick().await;
        let mut last = self.state.packet_count();

        debug!(period = ?self.period, "rate estimator started");
        while self.state.is_running() {
            ticker.tick().await;
            let now = self.state.packet_count();
            // A reset may have moved the counter backwards; clamp to zero
            // instead of corrupting the history.
            let delta = now.saturating_sub(last);
            self.state.push_pps_sample(delta);
            trace!(delta, "pps sample");
            last = now;
        }
        debug!("rate estimator stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netvakt_core::state::{ResetPolicy, StateOptions, PPS_WINDOW};

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn samples_the_counter_delta_per_tick() {
        let state = Arc::new(MonitorState::new(StateOptions::default()));
        let task = tokio::spawn(
            RateEstimator::new(Arc::clone(&state), Duration::from_secs(1)).run(),
        );
        settle().await;

        for _ in 0..5 {
            state.advance_packet_counter();
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;

        let history = state.snapshot().pps_history;
        assert_eq!(history.len(), PPS_WINDOW);
        assert_eq!(*history.last().unwrap(), 5);

        state.shutdown();
        tokio::time::advance(Duration::from_secs(1)).await;
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn backwards_counter_clamps_to_zero() {
        let state = Arc::new(MonitorState::new(StateOptions {
            reset_policy: ResetPolicy::ClearCounters,
            ..StateOptions::default()
        }));
        let task = tokio::spawn(
            RateEstimator::new(Arc::clone(&state), Duration::from_secs(1)).run(),
        );
        settle().await;

        for _ in 0..7 {
            state.advance_packet_counter();
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(*state.snapshot().pps_history.last().unwrap(), 7);

        // Reset zeroes the counter between ticks.
        state.reset_stats();
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(*state.snapshot().pps_history.last().unwrap(), 0);

        state.shutdown();
        tokio::time::advance(Duration::from_secs(1)).await;
        task.await.unwrap();
    }
}
