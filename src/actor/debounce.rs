//! Trailing-call debounce.
//!
//! Every call restarts the quiet window and replaces the pending arguments,
//! so a burst of calls runs the wrapped function once with the last
//! arguments. Pending calls are dropped when the input channel closes.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Sleep used while nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Pure debounce state: timing plus the latest arguments.
#[derive(Debug)]
pub struct Debounce<A> {
    window: Duration,
    pending: Option<A>,
    deadline: Option<Instant>,
}

impl<A> Debounce<A> {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    /// Schedule a trailing run with `args`, discarding earlier pending args.
    pub fn call(&mut self, args: A) {
        self.pending = Some(args);
        self.deadline = Some(Instant::now() + self.window);
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time until the pending call is due.
    pub fn sleep_duration(&self) -> Duration {
        self.deadline
            .map_or(IDLE, |deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Take the pending arguments once the quiet window has elapsed.
    pub fn take_if_ready(&mut self) -> Option<A> {
        let deadline = self.deadline?;
        if Instant::now() < deadline {
            return None;
        }
        self.flush()
    }

    /// Take the pending arguments regardless of timing.
    pub fn flush(&mut self) -> Option<A> {
        self.deadline = None;
        self.pending.take()
    }
}

/// Feed `rx` through a [`Debounce`] and await `f` for every trailing call.
///
/// Calls arriving while `f` runs are collected and coalesced into the next
/// run. Returns when `rx` closes.
pub async fn drive<A, F, Fut>(mut rx: mpsc::UnboundedReceiver<A>, window: Duration, mut f: F)
where
    F: FnMut(A) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut debounce = Debounce::new(window);

    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(args) => debounce.call(args),
                None => break,
            },
            _ = tokio::time::sleep(debounce.sleep_duration()) => {
                if let Some(args) = debounce.take_if_ready() {
                    f(args).await;
                }
            }
        }
    }

    if debounce.is_pending() {
        crate::debug!("debounce"; "dropping pending call on close");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_inside_window() {
        let mut debounce = Debounce::new(WINDOW);
        debounce.call(1);

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(debounce.take_if_ready(), None);
        assert_eq!(debounce.sleep_duration(), Duration::from_millis(50));

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(debounce.take_if_ready(), Some(1));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.sleep_duration(), IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_restarts_window_and_replaces_args() {
        let mut debounce = Debounce::new(WINDOW);
        debounce.call("first");
        tokio::time::advance(Duration::from_millis(80)).await;
        debounce.call("second");
        tokio::time::advance(Duration::from_millis(80)).await;

        // 160ms after the first call, but only 80ms after the second
        assert_eq!(debounce.take_if_ready(), None);

        tokio::time::advance(Duration::from_millis(20)).await;
        assert_eq!(debounce.take_if_ready(), Some("second"));
    }

    #[test]
    fn test_flush_ignores_timing() {
        let mut debounce = Debounce::new(WINDOW);
        assert_eq!(debounce.flush(), None::<u8>);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_with_last_args() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();

        let recorded = Arc::clone(&calls);
        let driver = tokio::spawn(drive(rx, WINDOW, move |args: u32| {
            recorded.lock().push(args);
            async {}
        }));

        for k in [1usize, 2, 7] {
            calls.lock().clear();
            for i in 0..k {
                tx.send(i as u32).unwrap();
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
            assert_eq!(*calls.lock(), vec![k as u32 - 1], "burst of {k}");
        }

        drop(tx);
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_during_run_are_coalesced() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();

        let recorded = Arc::clone(&calls);
        let driver = tokio::spawn(drive(rx, WINDOW, move |args: u32| {
            recorded.lock().push(args);
            // A slow rebuild
            tokio::time::sleep(Duration::from_millis(500))
        }));

        tx.send(1).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        // Rebuild of `1` is in flight
        tx.send(2).unwrap();
        tx.send(3).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(*calls.lock(), vec![1, 3]);

        drop(tx);
        driver.await.unwrap();
    }
}
