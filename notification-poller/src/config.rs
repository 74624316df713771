use anyhow::{ensure, Result};
use clap::Parser;
use std::time::Duration;

use crate::client::{SessionClient, DEFAULT_IDENTITY_URL};
use crate::error::ClientError;

/// Settings for polling a single Jira Cloud account.
///
/// Every flag can also be supplied through the environment (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(name = "notification-poller")]
#[command(about = "Poll the Jira notification log and report new notifications")]
pub struct PollerConfig {
    /// Base URL of the Jira Cloud site, e.g. https://example.atlassian.net
    #[arg(long, env = "JIRA_HOST", value_name = "URL")]
    pub host: String,

    /// Atlassian account e-mail
    #[arg(short, long, env = "JIRA_USERNAME")]
    pub username: String,

    /// Atlassian account password
    #[arg(short, long, env = "JIRA_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Identity endpoint used to obtain a session
    #[arg(long, env = "JIRA_IDENTITY_URL", default_value = DEFAULT_IDENTITY_URL)]
    pub identity_url: String,

    /// Seconds to wait between poll steps
    #[arg(short = 'i', long, env = "POLL_INTERVAL_SECONDS", default_value_t = 10)]
    pub poll_interval_seconds: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 5)]
    pub request_timeout_seconds: u64,
}

impl PollerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.poll_interval_seconds > 0,
            "POLL_INTERVAL_SECONDS must be at least 1"
        );
        ensure!(
            self.request_timeout_seconds > 0,
            "REQUEST_TIMEOUT_SECONDS must be at least 1"
        );
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn build_client(&self) -> Result<SessionClient, ClientError> {
        SessionClient::connect(&self.host, &self.username, &self.password)?
            .with_identity_url(self.identity_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> PollerConfig {
        let mut argv = vec!["notification-poller"];
        argv.extend_from_slice(args);
        PollerConfig::try_parse_from(argv).expect("should parse arguments")
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[
            "--host",
            "https://example.atlassian.net/",
            "--username",
            "jane@example.com",
            "--password",
            "secret",
        ]);

        assert_eq!(config.identity_url, DEFAULT_IDENTITY_URL);
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.request_timeout_seconds, 5);
        assert!(config.validate().is_ok());

        let client = config.build_client().expect("should build client");
        assert_eq!(client.host(), "https://example.atlassian.net");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = parse(&[
            "--host",
            "https://example.atlassian.net",
            "-u",
            "jane@example.com",
            "-p",
            "secret",
            "-i",
            "0",
        ]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_host_rejected() {
        let config = parse(&["--host", "", "-u", "jane@example.com", "-p", "secret"]);

        assert!(matches!(config.build_client(), Err(ClientError::Config(_))));
    }
}
