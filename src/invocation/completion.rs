use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// One-shot completion signal.
///
/// Starts unfired and fires at most once. Any number of threads (or tasks, via
/// [`CompletionSignal::wait_async`]) may wait on it before or after it fires.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    fired: Mutex<bool>,
    cond: Condvar,
    notify: Notify,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Returns true only for the call that actually fired it;
    /// every later call is a no-op returning false.
    pub fn fire(&self) -> bool {
        {
            let mut fired = self.fired.lock().unwrap_or_else(PoisonError::into_inner);
            if *fired {
                return false;
            }
            *fired = true;
        }

        self.cond.notify_all();
        self.notify.notify_waiters();
        true
    }

    pub fn is_fired(&self) -> bool {
        *self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parks the calling thread until the signal fires or `timeout` elapses.
    /// A poisoned lock counts as "not completed".
    pub fn wait(&self, timeout: Duration) -> bool {
        let Ok(fired) = self.fired.lock() else {
            return false;
        };

        match self.cond.wait_timeout_while(fired, timeout, |fired| !*fired) {
            Ok((fired, _)) => *fired,
            Err(_) => false,
        }
    }

    /// Async flavour of [`CompletionSignal::wait`]. Needs a tokio runtime with
    /// the time driver enabled.
    pub async fn wait_async(&self, timeout: Duration) -> bool {
        let fired = async {
            loop {
                // Register interest before checking the flag so a fire in between is not lost
                let notified = self.notify.notified();
                if self.is_fired() {
                    return;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, fired).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn starts_unfired_and_fires_once() {
        let signal = CompletionSignal::new();
        assert!(!signal.is_fired());

        assert!(signal.fire());
        assert!(signal.is_fired());

        // repeated firing is a no-op
        assert!(!signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn wait_times_out_when_never_fired() {
        let signal = CompletionSignal::new();

        let started = Instant::now();
        assert!(!signal.wait(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn wait_returns_immediately_after_fire() {
        let signal = CompletionSignal::new();
        signal.fire();

        let started = Instant::now();
        assert!(signal.wait(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn fire_from_other_thread_wakes_all_waiters() {
        let signal = Arc::new(CompletionSignal::new());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let s = signal.clone();
                thread::spawn(move || s.wait(Duration::from_secs(5)))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        signal.fire();

        for w in waiters {
            assert!(w.join().unwrap());
        }
    }

    #[tokio::test]
    async fn async_wait_sees_fire_from_blocking_thread() {
        let signal = Arc::new(CompletionSignal::new());

        let s = signal.clone();
        let firing = tokio::task::spawn_blocking(move || {
            std::thread::sleep(Duration::from_millis(20));
            s.fire()
        });

        assert!(signal.wait_async(Duration::from_secs(5)).await);
        assert!(firing.await.unwrap());
    }

    #[tokio::test]
    async fn async_wait_times_out() {
        let signal = CompletionSignal::new();
        assert!(!signal.wait_async(Duration::from_millis(20)).await);

        signal.fire();
        assert!(signal.wait_async(Duration::from_millis(20)).await);
    }
}
