//! Polls the Jira notification log and reports notifications that arrived
//! since the previous poll.

pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod worker;

pub use client::{NotificationSource, SessionClient};
pub use error::{ClientError, WorkerError};
pub use worker::{Delta, PollState, Step, Worker};
