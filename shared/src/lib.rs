//! Types shared between the notification poller and its consumers.

pub mod api;
pub mod models;

pub use api::{LoginRequest, NotificationsResponse, UnseenCountResponse};
pub use models::{Author, Metadata, Notification};
