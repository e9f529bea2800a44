use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// A periodic ticker whose first tick fires one full `period` after creation.
///
/// If a tick is handled late, the following tick is scheduled one `period`
/// after the late one rather than firing a burst to catch up.
pub fn interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_one_period_out() {
        let start = Instant::now();
        let mut ticker = interval(Duration::from_secs(2));

        ticker.tick().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_millis(2100));

        ticker.tick().await;
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_tick_does_not_burst() {
        let start = Instant::now();
        let mut ticker = interval(Duration::from_secs(1));

        ticker.tick().await;
        tokio::time::sleep(Duration::from_millis(3500)).await;

        // the missed ticks collapse into one immediate tick
        ticker.tick().await;
        let late = start.elapsed();
        assert!(late < Duration::from_millis(4600));

        ticker.tick().await;
        assert!(start.elapsed() >= late + Duration::from_secs(1));
    }
}
