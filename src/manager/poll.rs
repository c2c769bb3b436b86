//! Polling state machine shared by the blocking wait and externally driven
//! polling.

use super::structure::SmsManager;
use crate::errors::Result;
use crate::observer::SmsEvent;
use crate::order::{Order, OrderStatus};
use crate::providers::traits::SmsProvider;
use std::time::Duration;
use tokio::time::Instant;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A code is on the order.
    Received,
    /// The vendor closed the rental before a code arrived.
    Ended(OrderStatus),
    /// The deadline passed; the order is marked [`OrderStatus::Timeout`].
    TimedOut,
    /// The caller cancelled the wait; the order is left as it was.
    Interrupted,
}

/// Result of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub outcome: PollOutcome,
    /// Time from the first check to the end of the wait.
    pub elapsed: Duration,
    /// Number of `check_sms` calls made.
    pub polls: u32,
}

impl PollReport {
    pub fn is_received(&self) -> bool {
        self.outcome == PollOutcome::Received
    }
}

/// What to do after one [`PollSession::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Check again after `next_in`. Never longer than the time left.
    Continue { next_in: Duration },
    /// The wait is over.
    Done(PollReport),
}

/// One wait for a code on one order.
///
/// [`SmsManager::wait_for_code`] drives a session in a loop. Callers with
/// their own timer (a UI tick, a scheduler) call [`step`](Self::step) on
/// each tick instead and stop once it returns [`PollStep::Done`].
///
/// ```rust,ignore
/// let mut session = PollSession::new(Duration::from_secs(120), Duration::from_secs(5));
/// loop {
///     match session.step(&manager, &mut order).await? {
///         PollStep::Continue { next_in } => schedule_next_tick(next_in),
///         PollStep::Done(report) => break report,
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PollSession {
    timeout: Duration,
    interval: Duration,
    started: Option<Instant>,
    polls: u32,
    report: Option<PollReport>,
}

impl PollSession {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            started: None,
            polls: 0,
            report: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Time since the first step, zero before it.
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    pub fn is_done(&self) -> bool {
        self.report.is_some()
    }

    /// The final report once the session is done.
    pub fn report(&self) -> Option<PollReport> {
        self.report
    }

    /// Check the order once and decide whether to keep waiting.
    ///
    /// A captured code ends the wait even when the vendor also reports a
    /// closing status. A provider error is returned as is and leaves the
    /// session where it was, so the caller may step again. Stepping a
    /// finished session returns the same report without another check.
    pub async fn step<P: SmsProvider>(
        &mut self,
        manager: &SmsManager<P>,
        order: &mut Order,
    ) -> Result<PollStep> {
        if let Some(report) = self.report {
            return Ok(PollStep::Done(report));
        }

        let started = match self.started {
            Some(started) => started,
            None => {
                #[cfg(feature = "tracing")]
                debug!(
                    timeout_secs = %self.timeout.as_secs_f64(),
                    "Starting SMS code polling"
                );

                manager.observer().emit(SmsEvent::PollStarted {
                    order_id: order.order_id().clone(),
                    timeout: self.timeout,
                });
                *self.started.insert(Instant::now())
            }
        };

        manager.check_sms(order).await?;
        self.polls += 1;

        let elapsed = started.elapsed();

        if order.status() == OrderStatus::Received || order.has_code() {
            #[cfg(feature = "tracing")]
            info!(
                elapsed_secs = %elapsed.as_secs_f64(),
                polls = self.polls,
                "SMS code received"
            );

            manager.observer().emit(SmsEvent::CodeReceived {
                order_id: order.order_id().clone(),
                elapsed,
            });
            return Ok(PollStep::Done(self.finish(PollOutcome::Received, elapsed)));
        }

        if order.status().is_closed() {
            #[cfg(feature = "tracing")]
            warn!(status = %order.status(), "Vendor closed the order without a code");

            manager.observer().emit(SmsEvent::PollEnded {
                order_id: order.order_id().clone(),
                status: order.status(),
            });
            let outcome = PollOutcome::Ended(order.status());
            return Ok(PollStep::Done(self.finish(outcome, elapsed)));
        }

        if elapsed >= self.timeout {
            #[cfg(feature = "tracing")]
            warn!(
                timeout_secs = %self.timeout.as_secs_f64(),
                polls = self.polls,
                "Timed out waiting for SMS code"
            );

            order.force_status(OrderStatus::Timeout);
            manager.observer().emit(SmsEvent::PollTimedOut {
                order_id: order.order_id().clone(),
                polls: self.polls,
            });
            return Ok(PollStep::Done(self.finish(PollOutcome::TimedOut, elapsed)));
        }

        let next_in = self.interval.min(self.timeout - elapsed);
        Ok(PollStep::Continue { next_in })
    }

    /// Stop the session on behalf of the caller without touching the order.
    pub fn interrupt<P: SmsProvider>(
        &mut self,
        manager: &SmsManager<P>,
        order: &Order,
    ) -> PollReport {
        if let Some(report) = self.report {
            return report;
        }

        #[cfg(feature = "tracing")]
        info!(polls = self.polls, "SMS code polling interrupted");

        manager.observer().emit(SmsEvent::PollInterrupted {
            order_id: order.order_id().clone(),
            polls: self.polls,
        });

        let elapsed = self.elapsed();
        self.finish(PollOutcome::Interrupted, elapsed)
    }

    fn finish(&mut self, outcome: PollOutcome, elapsed: Duration) -> PollReport {
        *self.report.insert(PollReport {
            outcome,
            elapsed,
            polls: self.polls,
        })
    }
}
