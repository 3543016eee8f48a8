//! # One-shot restart timers.
//!
//! [`RestartScheduler`] holds at most one pending timer. When the timer
//! fires it posts a [`Notice`] carrying the ticket it was armed with back to
//! the actor's mailbox; it never touches supervisor state itself.
//!
//! ## Rules
//! - `arm` always replaces the previous timer (never two pending fires).
//! - `disarm` is a no-op when nothing is pending.
//! - Every arm gets a fresh ticket. A fire whose ticket is not the pending one
//!   (it raced with a disarm/rearm inside the mailbox) is rejected by [`RestartScheduler::fire`].
//!
//! ```text
//! arm(d, ScheduledRestart) ─► ticket=7, deadline=now+d
//!                                 │  sleep_until(deadline) (cancellable)
//!                                 ▼
//!                        mailbox ◄─ Notice::ScheduledRestart { ticket: 7 }
//!                                 │
//!              actor: fire(7) ─► true  (pending cleared, restart runs)
//!              actor: fire(6) ─► false (stale, ignored)
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::actor::Notice;

struct Pending {
    ticket: u64,
    deadline: Instant,
    cancel: CancellationToken,
}

/// A replaceable one-shot timer bound to the actor's notice channel.
pub(crate) struct RestartScheduler {
    notices: mpsc::UnboundedSender<Notice>,
    make: fn(u64) -> Notice,
    pending: Option<Pending>,
    last_ticket: u64,
}

impl RestartScheduler {
    /// Creates a scheduler whose fires are built by `make(ticket)`.
    pub(crate) fn new(notices: mpsc::UnboundedSender<Notice>, make: fn(u64) -> Notice) -> Self {
        Self {
            notices,
            make,
            pending: None,
            last_ticket: 0,
        }
    }

    /// Arms the timer to fire after `after`, replacing any pending one.
    ///
    /// Returns the deadline, or `None` (and leaves the scheduler disarmed) when
    /// the deadline is not representable.
    pub(crate) fn arm(&mut self, after: Duration) -> Option<Instant> {
        self.disarm();
        let deadline = Instant::now().checked_add(after)?;

        self.last_ticket += 1;
        let ticket = self.last_ticket;
        let cancel = CancellationToken::new();
        let notice = (self.make)(ticket);
        let notices = self.notices.clone();
        let token = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = time::sleep_until(deadline) => {
                    let _ = notices.send(notice);
                }
            }
        });

        self.pending = Some(Pending {
            ticket,
            deadline,
            cancel,
        });
        Some(deadline)
    }

    /// Cancels the pending timer. Returns `true` if one was pending.
    pub(crate) fn disarm(&mut self) -> bool {
        match self.pending.take() {
            Some(p) => {
                p.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Accepts a fire: `true` (and clears the pending timer) only if `ticket` is the pending one.
    pub(crate) fn fire(&mut self, ticket: u64) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Deadline of the pending timer.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

impl Drop for RestartScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> (RestartScheduler, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let make: fn(u64) -> Notice = |ticket| Notice::ScheduledRestart { ticket };
        (RestartScheduler::new(tx, make), rx)
    }

    fn ticket_of(n: Notice) -> u64 {
        match n {
            Notice::ScheduledRestart { ticket } => ticket,
            other => panic!("unexpected notice {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_interval() {
        let (mut s, mut rx) = scheduler();
        let deadline = s.arm(Duration::from_secs(3600)).unwrap();
        assert_eq!(s.deadline(), Some(deadline));

        time::advance(Duration::from_secs(3599)).await;
        assert!(rx.try_recv().is_err());

        time::advance(Duration::from_secs(2)).await;
        let ticket = ticket_of(rx.recv().await.unwrap());
        assert!(s.fire(ticket));
        assert_eq!(s.deadline(), None);
        assert!(!s.fire(ticket), "a ticket is accepted once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_timer() {
        let (mut s, mut rx) = scheduler();
        s.arm(Duration::from_secs(10)).unwrap();
        s.arm(Duration::from_secs(20)).unwrap();

        time::advance(Duration::from_secs(30)).await;
        let ticket = ticket_of(rx.recv().await.unwrap());
        assert!(s.fire(ticket));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err(), "only the latest timer fires");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_is_idempotent_and_rejects_late_fire() {
        let (mut s, mut rx) = scheduler();
        assert!(!s.disarm());

        s.arm(Duration::from_secs(1)).unwrap();
        time::advance(Duration::from_secs(2)).await;
        let ticket = ticket_of(rx.recv().await.unwrap());

        assert!(s.disarm());
        assert!(!s.fire(ticket), "fire queued before disarm is stale");
        assert!(!s.disarm());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_deadline_stays_disarmed() {
        let (mut s, _rx) = scheduler();
        assert_eq!(s.arm(Duration::MAX), None);
        assert_eq!(s.deadline(), None);
    }
}
