use std::{sync::Arc, time::Duration};

use time::Time;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use super::clock::Clock;
use crate::models::timetable::Period;

/// Index of the period running at `now`: `start <= now < end`. Overlapping
/// periods resolve to the first one in template order.
pub fn current_period_index(periods: &[Period], now: Time) -> Option<i64> {
    periods
        .iter()
        .find(|p| p.start_time <= now && now < p.end_time)
        .map(|p| p.period_index)
}

/// Whole seconds from `from` to `to` on the same day; negative once passed.
pub fn seconds_between(from: Time, to: Time) -> i64 {
    (to - from).whole_seconds()
}

/// Re-evaluates the current period on a timer and publishes changes.
/// Dropping the tracker stops the timer.
pub struct CurrentPeriodTracker {
    rx: watch::Receiver<Option<i64>>,
    task: JoinHandle<()>,
}

impl CurrentPeriodTracker {
    pub fn spawn(periods: Vec<Period>, clock: Arc<dyn Clock>, every: Duration) -> Self {
        let initial = current_period_index(&periods, clock.now().time);
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every.max(Duration::from_millis(10)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let next = current_period_index(&periods, clock.now().time);
                tx.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    tracing::debug!("Current period {:?} -> {:?}", current, next);
                    *current = next;
                    true
                });
            }
        });

        Self { rx, task }
    }

    pub fn current(&self) -> Option<i64> {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<i64>> {
        self.rx.clone()
    }
}

impl Drop for CurrentPeriodTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
