use anyhow::{Context, Result};
use clap::Parser;
use notification_poller::config::PollerConfig;
use notification_poller::{Delta, Worker};
use tokio::signal;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notification_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = PollerConfig::parse();
    config.validate()?;

    tracing::info!("Starting notification poller for {}", config.host);

    let mut client = config
        .build_client()
        .context("Invalid connection settings")?;
    client
        .login()
        .await
        .with_context(|| format!("Failed to log in to {}", config.host))?;
    tracing::info!("Logged in as {}", config.username);

    let (output_tx, mut output_rx) = mpsc::channel::<Delta>(1);
    let (done_tx, done_rx) = oneshot::channel();

    let worker = Worker::new(client, output_tx, done_tx)
        .await
        .context("Failed to fetch initial notifications")?;

    let interval = config.poll_interval_seconds;
    let worker_handle = tokio::spawn(async move { worker.start(interval).await });

    tracing::info!("Polling for notifications. Press Ctrl+C to stop.");

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            delta = output_rx.recv() => match delta {
                Some(delta) => report(&delta),
                None => break,
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                break;
            }
        }
    }

    // Hanging up the output channel is what stops the worker
    drop(output_rx);

    worker_handle
        .await
        .context("Notification worker panicked")?
        .context("Notification worker stopped")?;

    done_rx.await.ok();
    tracing::info!("Notification poller stopped");

    Ok(())
}

fn report(delta: &Delta) {
    for notification in delta {
        let received = notification
            .received_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| notification.timestamp.clone());

        tracing::info!(
            author = notification.author(),
            template = %notification.template,
            received = %received,
            "New notification: {}",
            notification.title
        );
    }
}
