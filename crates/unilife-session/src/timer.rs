//! The single pending refresh.
//!
//! Scheduling always aborts the previous timer first, so at most one wake-up
//! is ever outstanding. Every timer carries an id; a wake-up that was
//! already queued when its timer got replaced is recognised as stale through
//! [`RefreshTimer::take_fired`].

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

struct Pending {
    id: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// One cancellable, replaceable timer. Must be used inside a tokio runtime.
#[derive(Default)]
pub struct RefreshTimer {
    next_id: u64,
    pending: Option<Pending>,
}

impl RefreshTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer `delay` from now, replacing whatever was pending.
    ///
    /// `on_fire` runs on a spawned task with the id returned here.
    pub fn schedule<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let deadline = far_deadline(delay);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire(id);
        });

        self.pending = Some(Pending {
            id,
            deadline,
            handle,
        });
        id
    }

    /// Abort the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Claim a fired wake-up. `true` only if `id` is the timer still
    /// pending; the timer is then cleared.
    pub fn take_fired(&mut self, id: u64) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// Out-of-range delays wait "forever" instead of overflowing the clock.
fn far_deadline(delay: Duration) -> Instant {
    const FOREVER: Duration = Duration::from_secs(86_400 * 365 * 30);
    let now = Instant::now();
    now.checked_add(delay)
        .filter(|_| delay <= FOREVER)
        .unwrap_or(now + FOREVER)
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for RefreshTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTimer")
            .field("pending_id", &self.pending.as_ref().map(|p| p.id))
            .field("deadline", &self.deadline())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sink() -> (
        impl Fn() -> Box<dyn FnOnce(u64) + Send>,
        mpsc::UnboundedReceiver<u64>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let make = move || {
            let tx = tx.clone();
            Box::new(move |id| {
                let _ = tx.send(id);
            }) as Box<dyn FnOnce(u64) + Send>
        };
        (make, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let (make, mut rx) = sink();
        let mut timer = RefreshTimer::new();
        let id = timer.schedule(Duration::from_secs(10), make());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv().unwrap(), id);
        assert!(timer.take_fired(id));
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_leaves_exactly_one_pending() {
        let (make, mut rx) = sink();
        let mut timer = RefreshTimer::new();
        let mut last = 0;
        for secs in [5, 50, 500, 20] {
            last = timer.schedule(Duration::from_secs(secs), make());
        }
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_secs(1000)).await;
        assert_eq!(rx.try_recv().unwrap(), last);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_the_wake_up() {
        let (make, mut rx) = sink();
        let mut timer = RefreshTimer::new();
        timer.schedule(Duration::from_secs(5), make());
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert_eq!(timer.deadline(), None);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_id_is_not_claimed() {
        let (make, _rx) = sink();
        let mut timer = RefreshTimer::new();
        let old = timer.schedule(Duration::from_secs(5), make());
        let new = timer.schedule(Duration::from_secs(5), make());
        assert!(!timer.take_fired(old));
        assert!(timer.is_pending());
        assert!(timer.take_fired(new));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_delay_is_clamped_not_panicking() {
        let (make, mut rx) = sink();
        let mut timer = RefreshTimer::new();
        let before = Instant::now();
        timer.schedule(Duration::MAX, make());
        timer.schedule(Duration::from_secs(u64::MAX), make());

        let deadline = timer.deadline().unwrap();
        assert!(deadline > before + Duration::from_secs(86_400 * 365));

        tokio::time::sleep(Duration::from_secs(86_400)).await;
        assert!(rx.try_recv().is_err());
        assert!(timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_tracks_the_schedule() {
        let (make, _rx) = sink();
        let mut timer = RefreshTimer::new();
        let before = Instant::now();
        timer.schedule(Duration::from_secs(30), make());
        assert_eq!(timer.deadline(), Some(before + Duration::from_secs(30)));
    }
}
