use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Author of a notification, as reported by the notification log
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    #[serde(rename = "atlassianId")]
    pub atlassian_id: String,
    pub name: String,
}

/// Metadata attached to a notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub user: Author,
}

/// A single notification visible to the account.
///
/// Two notifications are the same notification when every field matches;
/// the service does not hand out a stable identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub title: String,
    /// User identifier -> display value
    pub users: BTreeMap<String, String>,
    pub template: String,
    pub timestamp: String,
    pub metadata: Metadata,
}

impl Notification {
    /// Display name of whoever triggered the notification
    pub fn author(&self) -> &str {
        &self.metadata.user.name
    }

    /// Parse the RFC 3339 timestamp, if the service sent a well-formed one
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_notification() {
        let json = r#"{
            "title": "PROJ-1 was updated",
            "users": {"557058:abc": "Jane Doe"},
            "template": "jira-issue-updated",
            "timestamp": "2021-03-04T10:15:30.000Z",
            "metadata": {"user": {"atlassianId": "557058:abc", "name": "Jane Doe"}}
        }"#;

        let notification: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(notification.title, "PROJ-1 was updated");
        assert_eq!(notification.users.get("557058:abc").unwrap(), "Jane Doe");
        assert_eq!(notification.metadata.user.atlassian_id, "557058:abc");
        assert_eq!(notification.author(), "Jane Doe");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let notification: Notification = serde_json::from_str(r#"{"title": "hello"}"#).unwrap();
        assert_eq!(notification.title, "hello");
        assert!(notification.users.is_empty());
        assert_eq!(notification.author(), "");
    }

    #[test]
    fn test_structural_equality() {
        let a = Notification {
            title: "a".to_string(),
            ..Default::default()
        };
        let mut b = a.clone();
        assert_eq!(a, b);

        b.metadata.user.name = "someone".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_received_at() {
        let mut notification = Notification {
            timestamp: "2021-03-04T10:15:30Z".to_string(),
            ..Default::default()
        };
        let parsed = notification.received_at().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2021-03-04T10:15:30+00:00");

        notification.timestamp = "yesterday".to_string();
        assert!(notification.received_at().is_none());
    }
}
