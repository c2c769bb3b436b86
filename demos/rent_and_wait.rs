//! Rent a number and wait for a code.
//!
//! # Running
//!
//! ```bash
//! SMS_PROVIDER=5sim SMS_API_KEY=your_api_key \
//! SMS_COUNTRY=russia SMS_SERVICE=telegram \
//!     cargo run --example rent_and_wait
//! ```
//!
//! `SMS_PROVIDER` accepts `sms-man`, `5sim` or `vak-sms`.

use sms_rental::{EventHook, ManagerConfig, PollOutcome, ProviderKind, SmsEvent, SmsManager};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let kind: ProviderKind = env::var("SMS_PROVIDER")
        .unwrap_or_else(|_| "5sim".to_string())
        .parse()?;
    let api_key = env::var("SMS_API_KEY").expect("SMS_API_KEY environment variable must be set");
    let country = env::var("SMS_COUNTRY").unwrap_or_else(|_| "russia".to_string());
    let service = env::var("SMS_SERVICE").unwrap_or_else(|_| "telegram".to_string());

    // Print everything the manager and provider report
    let hook: EventHook = Arc::new(|event: &SmsEvent| println!("  > {event}"));

    let manager = SmsManager::builder(kind, api_key)
        .config(ManagerConfig::fast())
        .observer(hook)
        .build()?;

    println!("Balance on {kind}: {}", manager.get_balance().await?);

    println!("\nRenting a number ({country}/{service})...");
    let mut order = manager.rent_number(&country, &service, None).await?;
    println!("Got phone number: {}", order.phone_number().with_plus_prefix());
    println!("Order ID: {}", order.order_id());
    if let Some(expires) = order.expiration_time() {
        println!("Expires at: {expires}");
    }

    println!("\nWaiting for SMS code...");
    let report = manager.wait_for_code_with_defaults(&mut order).await?;

    match report.outcome {
        PollOutcome::Received => {
            if let Some(code) = order.sms_code() {
                println!("Received SMS code: {code}");
            }
            if let Some(text) = order.sms_text() {
                println!("Full message: {text}");
            }
        }
        PollOutcome::Ended(status) => println!("Vendor closed the order: {status}"),
        PollOutcome::TimedOut | PollOutcome::Interrupted => {
            println!(
                "No code after {:.1}s ({} polls), releasing the number",
                report.elapsed.as_secs_f64(),
                report.polls
            );
            let released = manager.cancel_order(&mut order).await?;
            println!("Released: {released}");
        }
    }

    Ok(())
}
