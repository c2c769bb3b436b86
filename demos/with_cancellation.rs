//! Example demonstrating cancellation and retries.
//!
//! The wait can be interrupted with Ctrl+C or stops after 30 seconds.
//! Transient provider failures are retried with exponential backoff.
//!
//! # Running
//!
//! ```bash
//! SMS_PROVIDER=sms-man SMS_API_KEY=your_api_key cargo run --example with_cancellation
//! ```

use sms_rental::{
    AnyProvider, CancellationToken, ManagerConfig, PollOutcome, ProviderKind, RetryConfig,
    RetryableProvider, SmsManager,
};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let kind: ProviderKind = env::var("SMS_PROVIDER")
        .unwrap_or_else(|_| "sms-man".to_string())
        .parse()?;
    let api_key = env::var("SMS_API_KEY").expect("SMS_API_KEY environment variable must be set");
    let country = env::var("SMS_COUNTRY").unwrap_or_else(|_| "3".to_string());
    let service = env::var("SMS_SERVICE").unwrap_or_else(|_| "1".to_string());

    let provider = RetryableProvider::with_config(
        AnyProvider::new(kind, api_key)?,
        RetryConfig::default().with_max_retries(5).with_jitter(true),
    )
    .with_on_retry(|error, delay| {
        println!("  retrying in {:.1}s: {error}", delay.as_secs_f64());
    });

    let config = ManagerConfig::patient();
    config.validate()?;
    let manager = SmsManager::with_provider(provider, config, None);

    println!("Requesting phone number...");
    let mut order = manager.rent_number(&country, &service, None).await?;
    println!("Got phone number: {}", order.phone_number().with_plus_prefix());
    println!("Order ID: {}", order.order_id());

    let cancel_token = CancellationToken::new();
    let token_clone = cancel_token.clone();

    let cancel_handle = tokio::spawn(async move {
        println!("\nPress Ctrl+C or wait 30s to cancel...");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => println!("Ctrl+C received"),
            _ = tokio::time::sleep(Duration::from_secs(30)) => println!("30s passed"),
        }
        token_clone.cancel();
    });

    println!("\nWaiting for SMS code (cancellable)...");
    let config = manager.config().clone();
    let report = manager
        .wait_for_code_cancellable(
            &mut order,
            config.timeout,
            config.poll_interval,
            &cancel_token,
        )
        .await?;
    cancel_handle.abort();

    match report.outcome {
        PollOutcome::Received => {
            if let Some(code) = order.sms_code() {
                println!("Received SMS code: {code}");
            }
        }
        PollOutcome::Interrupted => {
            println!(
                "Operation was cancelled after {:.1}s ({} polls)",
                report.elapsed.as_secs_f64(),
                report.polls
            );
            let released = manager.cancel_order(&mut order).await?;
            println!("Released the number: {released}");
        }
        PollOutcome::TimedOut => println!("Timed out waiting for SMS code"),
        PollOutcome::Ended(status) => println!("Vendor closed the order: {status}"),
    }

    Ok(())
}
