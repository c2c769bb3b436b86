//! Polling engine tests against a scripted provider on a paused clock.

use sms_rental::{
    CancellationToken, EventHook, ManagerConfig, Order, OrderId, OrderStatus, PollOutcome,
    PollSession, PollStep, ProviderKind, Result, SmsCode, SmsError, SmsEvent, SmsManager,
    SmsProvider,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Pending,
    Code(&'static str),
    Closed(OrderStatus),
    CodeThenClosed(&'static str, OrderStatus),
    Fail,
}

/// Answers `check_sms` from a script, then keeps answering `Pending`.
#[derive(Default)]
struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    checks: AtomicU32,
}

impl ScriptedProvider {
    fn new(script: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            checks: AtomicU32::new(0),
        }
    }

    fn push(&self, reply: Reply) {
        self.script.lock().unwrap().push_back(reply);
    }

    fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

impl SmsProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::FiveSim
    }

    async fn get_balance(&self) -> Result<f64> {
        Ok(0.0)
    }

    async fn rent_number(
        &self,
        country: &str,
        service: &str,
        _duration_hours: Option<u32>,
    ) -> Result<Order> {
        Ok(Order::new("1", "+10000000000", country, service, self.kind()))
    }

    async fn check_sms(&self, order: &mut Order) -> Result<()> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Pending);

        match reply {
            Reply::Pending => {}
            Reply::Code(code) => {
                order.record_sms(Some(SmsCode::new(code)), Some(format!("code {code}")));
            }
            Reply::Closed(status) => {
                order.advance_status(status);
            }
            Reply::CodeThenClosed(code, status) => {
                order.record_sms(Some(SmsCode::new(code)), None);
                order.advance_status(status);
            }
            Reply::Fail => return Err(SmsError::Other("scripted failure".into())),
        }
        Ok(())
    }

    async fn cancel_rent(&self, _order_id: &OrderId) -> Result<bool> {
        Ok(true)
    }
}

fn manager(script: impl IntoIterator<Item = Reply>) -> SmsManager<ScriptedProvider> {
    SmsManager::with_provider(
        ScriptedProvider::new(script),
        ManagerConfig::default(),
        None,
    )
}

fn idle_manager() -> SmsManager<ScriptedProvider> {
    manager(Vec::<Reply>::new())
}

fn order() -> Order {
    Order::new("1", "+10000000000", "russia", "telegram", ProviderKind::FiveSim)
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test(start_paused = true)]
async fn test_code_on_first_check_returns_without_sleeping() {
    let manager = manager([Reply::Code("1234")]);
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, secs(60), secs(5))
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Received);
    assert_eq!(report.polls, 1);
    assert_eq!(report.elapsed, Duration::ZERO);
    assert_eq!(order.status(), OrderStatus::Received);
    assert_eq!(order.sms_code().unwrap().as_str(), "1234");
}

#[tokio::test(start_paused = true)]
async fn test_code_after_a_few_polls() {
    let manager = manager([Reply::Pending, Reply::Pending, Reply::Code("777")]);
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, secs(60), secs(5))
        .await
        .unwrap();

    assert!(report.is_received());
    assert_eq!(report.polls, 3);
    assert_eq!(report.elapsed, secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_times_out_and_marks_order() {
    let manager = idle_manager();
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, secs(1), secs(1))
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(report.polls, 2);
    assert_eq!(report.elapsed, secs(1));
    assert_eq!(order.status(), OrderStatus::Timeout);
    assert!(order.sms_code().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_last_sleep_is_clamped_to_deadline() {
    let manager = idle_manager();
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, secs(10), secs(3))
        .await
        .unwrap();

    // Checks at 0, 3, 6, 9 and 10.
    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(report.polls, 5);
    assert_eq!(report.elapsed, secs(10));
    assert!(report.elapsed <= secs(10) + secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_checks_once() {
    let manager = idle_manager();
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, Duration::ZERO, secs(5))
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(manager.provider().checks(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_vendor_close_ends_polling() {
    let manager = manager([Reply::Pending, Reply::Closed(OrderStatus::Finished)]);
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, secs(60), secs(5))
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Ended(OrderStatus::Finished));
    assert_eq!(report.polls, 2);
    assert_eq!(order.status(), OrderStatus::Finished);
}

#[tokio::test(start_paused = true)]
async fn test_code_wins_over_closing_status() {
    let manager = manager([Reply::CodeThenClosed("4321", OrderStatus::Finished)]);
    let mut order = order();

    let report = manager
        .wait_for_code(&mut order, secs(60), secs(5))
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Received);
    assert_eq!(order.status(), OrderStatus::Finished);
    assert_eq!(order.sms_code().unwrap().as_str(), "4321");
}

#[tokio::test(start_paused = true)]
async fn test_provider_error_ends_wait() {
    let manager = manager([Reply::Pending, Reply::Fail]);
    let mut order = order();

    let err = manager
        .wait_for_code(&mut order, secs(60), secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, SmsError::Other(_)));
    assert_eq!(order.status(), OrderStatus::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_sleep() {
    let manager = idle_manager();
    let mut order = order();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(secs(7)).await;
        canceller.cancel();
    });

    let report = manager
        .wait_for_code_cancellable(&mut order, secs(60), secs(5), &token)
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Interrupted);
    assert_eq!(report.polls, 2);
    assert_eq!(report.elapsed, secs(7));
    assert_eq!(order.status(), OrderStatus::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_token_skips_checks() {
    let manager = manager([Reply::Code("1")]);
    let mut order = order();
    let token = CancellationToken::new();
    token.cancel();

    let report = manager
        .wait_for_code_cancellable(&mut order, secs(60), secs(5), &token)
        .await
        .unwrap();

    assert_eq!(report.outcome, PollOutcome::Interrupted);
    assert_eq!(report.polls, 0);
    assert_eq!(manager.provider().checks(), 0);
    assert!(order.sms_code().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_wait_with_defaults_uses_config() {
    let manager = SmsManager::with_provider(
        ScriptedProvider::default(),
        ManagerConfig::default()
            .with_timeout(secs(2))
            .with_poll_interval(secs(1)),
        None,
    );
    let mut order = order();

    let report = manager.wait_for_code_with_defaults(&mut order).await.unwrap();

    assert_eq!(report.outcome, PollOutcome::TimedOut);
    assert_eq!(report.polls, 3);
    assert_eq!(report.elapsed, secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_session_driven_by_external_timer() {
    let manager = idle_manager();
    let mut order = order();
    let mut session = PollSession::new(secs(4), secs(3));

    let step = session.step(&manager, &mut order).await.unwrap();
    assert_eq!(step, PollStep::Continue { next_in: secs(3) });

    tokio::time::advance(secs(3)).await;
    let step = session.step(&manager, &mut order).await.unwrap();
    assert_eq!(step, PollStep::Continue { next_in: secs(1) });

    manager.provider().push(Reply::Code("9999"));
    tokio::time::advance(secs(1)).await;
    let PollStep::Done(report) = session.step(&manager, &mut order).await.unwrap() else {
        panic!("expected the session to finish");
    };
    assert!(report.is_received());
    assert_eq!(report.polls, 3);
    assert!(session.is_done());

    // A finished session does not poll again.
    let again = session.step(&manager, &mut order).await.unwrap();
    assert_eq!(again, PollStep::Done(report));
    assert_eq!(manager.provider().checks(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_session_survives_provider_error() {
    let manager = manager([Reply::Fail, Reply::Code("55")]);
    let mut order = order();
    let mut session = PollSession::new(secs(30), secs(5));

    assert!(session.step(&manager, &mut order).await.is_err());
    assert_eq!(session.polls(), 0);
    assert!(!session.is_done());

    let step = session.step(&manager, &mut order).await.unwrap();
    assert!(matches!(step, PollStep::Done(report) if report.is_received()));
}

#[tokio::test(start_paused = true)]
async fn test_events_describe_the_wait() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let hook: EventHook = Arc::new(move |e: &SmsEvent| sink.lock().unwrap().push(e.clone()));

    let manager = SmsManager::with_provider(
        ScriptedProvider::default(),
        ManagerConfig::default(),
        Some(hook),
    );
    let mut order = order();

    manager
        .wait_for_code(&mut order, secs(2), secs(1))
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            SmsEvent::PollStarted {
                order_id: OrderId::from("1"),
                timeout: secs(2),
            },
            SmsEvent::PollTimedOut {
                order_id: OrderId::from("1"),
                polls: 3,
            },
        ]
    );
}
