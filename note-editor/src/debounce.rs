use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

type InFlight = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Runs the most recently scheduled task once no new task has been
/// scheduled for `delay`. Each instance keeps its own timer.
///
/// Fired tasks run one after another in firing order. Cancelling stops the
/// timer only; a task that already fired runs to completion.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    timer: Option<JoinHandle<()>>,
    in_flight: InFlight,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: None,
            in_flight: Arc::default(),
        }
    }

    /// Replaces any pending task. Must be called within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let in_flight = self.in_flight.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // no await from here on, so an abort can no longer drop the task
            let mut slot = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = slot.take();
            *slot = Some(tokio::spawn(async move {
                if let Some(previous) = previous {
                    let _ = previous.await;
                }
                task.await;
            }));
        }));
    }

    /// Drops the task waiting on the timer, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Waits for every task that already fired.
    pub async fn settle(&mut self) {
        let running = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(running) = running {
            if let Err(err) = running.await {
                tracing::warn!("debounced task failed: {err}");
            }
        }
    }

    /// True while a task waits on the timer or is still running.
    pub fn is_pending(&self) -> bool {
        let timer_pending = self.timer.as_ref().is_some_and(|timer| !timer.is_finished());
        let running = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|running| !running.is_finished());
        timer_pending || running
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>>) {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = count.clone();
        let task = move || {
            let count = task_count.clone();
            Box::pin(async move {
                count.fetch_add(1, Ordering::SeqCst);
            }) as std::pin::Pin<Box<dyn Future<Output = ()> + Send>>
        };
        (count, task)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_delay() {
        let (count, task) = counter();
        let mut debouncer = Debouncer::default();

        debouncer.schedule(task());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_restarts_timer() {
        let (count, task) = counter();
        let mut debouncer = Debouncer::default();

        for _ in 0..5 {
            debouncer.schedule(task());
            tokio::time::sleep(Duration::from_millis(1000)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop() {
        let (count, task) = counter();

        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule(task());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        let mut dropped = Debouncer::new(Duration::from_millis(100));
        dropped.schedule(task());
        drop(dropped);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fired_tasks_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::default();

        let first = order.clone();
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            first.lock().unwrap().push("first");
        });
        tokio::time::sleep(Duration::from_millis(1600)).await;

        let second = order.clone();
        debouncer.schedule(async move {
            second.lock().unwrap().push("second");
        });
        debouncer.cancel();
        assert!(debouncer.is_pending());

        let third = order.clone();
        debouncer.schedule(async move {
            third.lock().unwrap().push("third");
        });
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(order.lock().unwrap().is_empty());

        debouncer.settle().await;
        assert_eq!(*order.lock().unwrap(), vec!["first", "third"]);
        assert!(!debouncer.is_pending());
    }
}
