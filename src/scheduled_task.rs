use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use rocket::tokio::{
    self,
    sync::Notify,
    task::{JoinError, JoinHandle},
    time::Duration,
};

/// A task scheduled for a specific point in the future.
/// It executes at that point, or earlier if triggered; it can also be
/// cancelled outright.
pub struct ScheduledTask<T> {
    handle: JoinHandle<T>,
    trigger: Arc<Notify>,
}

impl<T> ScheduledTask<T>
where
    T: Send + 'static,
{
    /// Schedule the given task to execute at time `run_at`.
    /// If `run_at` is in the past, the task executes immediately.
    pub fn new<Fut>(task: Fut, run_at: DateTime<Utc>) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let trigger = Arc::new(Notify::new());
        let notified = trigger.clone();
        let delay = duration_until(run_at);
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = notified.notified() => {}
            }
            task.await
        });
        Self { handle, trigger }
    }

    /// Cancel the task. Returns true iff it had already completed before we
    /// could cancel it.
    pub async fn cancel(self) -> bool {
        self.handle.abort();
        self.handle.await.is_ok()
    }

    /// Run the task now instead of waiting for the scheduled time.
    pub fn trigger_now(&self) {
        self.trigger.notify_one();
    }
}

/// `ScheduledTask` can be awaited directly for the task's result.
impl<T> Future for ScheduledTask<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx)
    }
}

/// How long from now until `datetime`; zero if it has already passed.
fn duration_until(datetime: DateTime<Utc>) -> Duration {
    let millis = datetime.timestamp_millis() - Utc::now().timestamp_millis();
    Duration::from_millis(u64::try_from(millis).unwrap_or(0))
}
