use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic wall-clock ticker. The background task stops when this handle
/// is dropped.
#[derive(Debug)]
pub struct ClockTask {
    handle: JoinHandle<()>,
}

impl ClockTask {
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<DateTime<Utc>>) {
        let (tx, rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                match tx.try_send(Utc::now()) {
                    // A tick still waiting to be read is as good as a new one.
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => break,
                }
            }
            tracing::trace!("clock task finished");
        });

        (Self { handle }, rx)
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ClockTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_dropped() {
        let (clock, mut ticks) = ClockTask::spawn(TICK_PERIOD);

        for _ in 0..3 {
            assert!(ticks.recv().await.is_some());
        }
        assert!(clock.is_running());

        drop(clock);
        // Buffered tick (if any) then the channel closes.
        while ticks.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_receiver_goes_away() {
        let (clock, ticks) = ClockTask::spawn(TICK_PERIOD);
        drop(ticks);

        time::sleep(TICK_PERIOD * 3).await;
        tokio::task::yield_now().await;
        assert!(!clock.is_running());
    }
}
