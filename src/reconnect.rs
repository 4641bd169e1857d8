use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::tui::{AppEvent, EventSender};

/// Periodic reconnect tick. Emits [`AppEvent::ReconnectDue`] every `period`
/// until dropped; whether a probe actually runs is up to the receiver.
pub struct ReconnectTimer {
    handle: JoinHandle<()>,
}

impl ReconnectTimer {
    pub fn spawn(period: Duration, tx: EventSender) -> Self {
        let handle = tokio::spawn(async move {
            // The initial probe happens at startup, so skip the immediate tick.
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::ReconnectDue).is_err() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_each_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = ReconnectTimer::spawn(Duration::from_secs(30), tx);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ReconnectDue)));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ReconnectDue)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = ReconnectTimer::spawn(Duration::from_secs(30), tx);
        drop(timer);

        // The task owned the only sender, so the channel closes once it is gone.
        assert!(rx.recv().await.is_none());
    }
}
