use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Drive `work` to completion, calling `report` with the elapsed time every
/// `every` while it runs. The first report happens after one full interval.
pub async fn with_progress<F, R>(work: F, every: Duration, mut report: R) -> F::Output
where
    F: Future,
    R: FnMut(Duration),
{
    let started = Instant::now();
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(work);

    loop {
        tokio::select! {
            output = &mut work => return output,
            _ = ticker.tick() => report(started.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reports_while_waiting() {
        let mut reports = 0;
        let value = with_progress(
            async {
                tokio::time::sleep(Duration::from_millis(3500)).await;
                42
            },
            Duration::from_secs(1),
            |_| reports += 1,
        )
        .await;

        assert_eq!(value, 42);
        assert_eq!(reports, 3);
    }

    #[tokio::test]
    async fn test_fast_work_never_reports() {
        let mut reports = 0;
        let value = with_progress(async { "done" }, Duration::from_secs(5), |_| reports += 1).await;
        assert_eq!(value, "done");
        assert_eq!(reports, 0);
    }
}
