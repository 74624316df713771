use shared::Notification;
use std::collections::HashSet;

/// Notifications in `latest` that do not appear anywhere in `previous`,
/// in the order `latest` lists them. Removals are not reported.
pub fn new_notifications(previous: &[Notification], latest: &[Notification]) -> Vec<Notification> {
    let seen: HashSet<&Notification> = previous.iter().collect();

    latest
        .iter()
        .filter(|notification| !seen.contains(notification))
        .cloned()
        .collect()
}
