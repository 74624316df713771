use serde::{Deserialize, Serialize};

use crate::models::Notification;

// ============================================================================
// Identity API Types
// ============================================================================

/// Body submitted to the identity login endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Notification Log API Types
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotificationsResponse {
    #[serde(rename = "data")]
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UnseenCountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_shape() {
        let request = LoginRequest {
            username: "jane@example.com".to_string(),
            password: "secret".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"username":"jane@example.com","password":"secret"}"#);
    }

    #[test]
    fn test_parse_notifications_response() {
        let json = r#"{"data": [{"title": "one"}, {"title": "two"}]}"#;
        let response: NotificationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.notifications.len(), 2);
        assert_eq!(response.notifications[1].title, "two");
    }

    #[test]
    fn test_envelope_fields_are_required() {
        let body = r#"{"message": "rate limited"}"#;
        assert!(serde_json::from_str::<UnseenCountResponse>(body).is_err());
        assert!(serde_json::from_str::<NotificationsResponse>(body).is_err());
    }

    #[test]
    fn test_parse_count_response() {
        let response: UnseenCountResponse = serde_json::from_str(r#"{"count": 7}"#).unwrap();
        assert_eq!(response.count, 7);
    }
}
