//! Aloha example: one inlet, two outlets, a rename and an unmount
//!
//! Run with: cargo run --example aloha
//!
//! Set `RUST_LOG=content_pipe=trace` to see every observer notification.
//!
//! ```text
//!   Inlet("aloha") ──publish──► registry ──► Outlet("aloha", default)
//!                                       └──► Outlet("aloha")
//! ```

use std::time::Duration;

use content_pipe::{Provider, RegistryEvent};

type Paragraphs = Vec<&'static str>;

fn show(label: &str, content: Option<Paragraphs>) {
    match content {
        Some(paragraphs) => println!("  {:<8} {}", label, paragraphs.join(" / ")),
        None => println!("  {:<8} <nothing>", label),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_pipe=debug".parse()?)
                .add_directive("aloha=debug".parse()?),
        )
        .init();

    let provider = Provider::<Paragraphs>::new();

    // Log everything the registry does from a background task
    let mut events = provider.events();
    let tap = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let RegistryEvent::Published { channel, observers } = &event {
                tracing::info!(channel = %channel, observers, "Tap saw publish");
            }
        }
    });

    let mut inlet = provider.inlet(Some("aloha"), Some(vec!["How are you?", "I am fine."]));
    let first = provider.outlet(Some("aloha"), Some(vec!["Default content"]));
    let second = provider.outlet(Some("aloha"), None);

    println!("mounted:");
    show("first", first.displayed());
    show("second", second.displayed());

    // An async consumer waiting for the next value
    let mut watcher = second.watch();
    let waiter = tokio::spawn(async move {
        watcher.changed().await.ok()?;
        let value = watcher.borrow().clone();
        value
    });

    inlet.set_content(Some(vec!["Hello, World!", "Aloha!"]));
    let awaited = tokio::time::timeout(Duration::from_secs(1), waiter).await??;

    println!("updated:");
    show("first", first.displayed());
    show("second", second.displayed());
    show("awaited", awaited);

    inlet.set_name(Some("elsewhere"));
    println!("inlet renamed:");
    show("first", first.displayed());
    show("second", second.displayed());

    inlet.detach();
    println!("inlet unmounted:");
    show("first", first.displayed());
    show("second", second.displayed());

    let stats = provider.stats();
    println!(
        "publishes={} withdrawals={} notifications={} active_channels={}",
        stats.publishes, stats.withdrawals, stats.notifications, stats.active_channels
    );

    drop(first);
    drop(second);
    drop(provider);
    tap.await?;

    Ok(())
}
