//! Polling worker.
//!
//! Alternates between a cheap unseen-count probe and a full list fetch. The
//! list is only fetched after the count moved; every fetched list is diffed
//! against the previous snapshot and the new items are sent to the consumer.

use shared::Notification;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::client::NotificationSource;
use crate::diff::new_notifications;
use crate::error::{ClientError, WorkerError};

/// Notifications that appeared since the previous snapshot
pub type Delta = Vec<Notification>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Ask the service whether the unseen counter moved
    CountProbe,
    /// Fetch the full list and diff it against the snapshot
    ListFetch,
}

/// Outcome of a single state transition
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next: PollState,
    pub delta: Delta,
}

pub struct Worker<C> {
    client: C,
    state: PollState,
    unseen_count: i64,
    snapshot: Vec<Notification>,
    output: mpsc::Sender<Delta>,
    done: oneshot::Sender<()>,
}

impl<C: NotificationSource> Worker<C> {
    /// Seed the snapshot with one synchronous fetch. A failure here is
    /// returned and no worker is created.
    pub async fn new(
        mut client: C,
        output: mpsc::Sender<Delta>,
        done: oneshot::Sender<()>,
    ) -> Result<Self, ClientError> {
        let snapshot = client.fetch_notifications().await?;

        tracing::info!("Seeded snapshot with {} notifications", snapshot.len());

        Ok(Self {
            client,
            state: PollState::CountProbe,
            unseen_count: 0,
            snapshot,
            output,
            done,
        })
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn unseen_count(&self) -> i64 {
        self.unseen_count
    }

    pub fn snapshot(&self) -> &[Notification] {
        &self.snapshot
    }

    /// Run the current state function once and move to the state it returns.
    pub async fn step(&mut self) -> Result<Step, ClientError> {
        let step = match self.state {
            PollState::CountProbe => self.probe_count().await?,
            PollState::ListFetch => self.fetch_list().await?,
        };

        self.state = step.next;
        Ok(step)
    }

    async fn probe_count(&mut self) -> Result<Step, ClientError> {
        let count = self.client.fetch_unseen_count().await?;
        tracing::debug!("Unseen notification count: {}", count);

        if count == self.unseen_count {
            return Ok(Step {
                next: PollState::CountProbe,
                delta: Vec::new(),
            });
        }

        self.unseen_count = count;
        Ok(Step {
            next: PollState::ListFetch,
            delta: Vec::new(),
        })
    }

    async fn fetch_list(&mut self) -> Result<Step, ClientError> {
        let latest = self.client.fetch_notifications().await?;
        let delta = new_notifications(&self.snapshot, &latest);

        tracing::debug!("Fetched {} notifications, {} new", latest.len(), delta.len());

        self.snapshot = latest;
        Ok(Step {
            next: PollState::CountProbe,
            delta,
        })
    }

    /// Poll until the consumer goes away or a fetch fails.
    ///
    /// Sleeps `interval` after every step; a consumer hanging up cuts the
    /// sleep short. The output channel is closed on every exit path; the done
    /// channel only receives a value when the loop ends without an error.
    pub async fn run(mut self, interval: Duration) -> Result<(), WorkerError> {
        tracing::info!("Notification worker started (interval: {:?})", interval);

        loop {
            if self.output.is_closed() {
                tracing::info!("Notification consumer went away, stopping worker");
                break;
            }

            let step = match self.step().await {
                Ok(step) => step,
                Err(e) => {
                    tracing::error!("Notification polling failed: {}", e);
                    return Err(WorkerError::Fetch(e));
                }
            };

            if !step.delta.is_empty() {
                tracing::info!("Found {} new notifications", step.delta.len());

                if self.output.send(step.delta).await.is_err() {
                    tracing::info!("Notification consumer went away, stopping worker");
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.output.closed() => {
                    tracing::info!("Notification consumer went away, stopping worker");
                    break;
                }
            }
        }

        let Worker { output, done, .. } = self;
        drop(output);
        done.send(()).ok();

        Ok(())
    }

    /// Same as [`Worker::run`] with the interval given in whole seconds.
    pub async fn start(self, interval_seconds: u64) -> Result<(), WorkerError> {
        self.run(Duration::from_secs(interval_seconds)).await
    }
}
