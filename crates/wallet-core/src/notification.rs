use serde::Serialize;

/// Capacity of the notification broadcast channel. Slow readers skip the
/// oldest notifications.
pub const NOTIFICATION_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient, user-facing message (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_level() {
        assert_eq!(Notification::info("a").level, NotificationLevel::Info);
        assert_eq!(Notification::success("b").level, NotificationLevel::Success);
        assert_eq!(Notification::error("c").level, NotificationLevel::Error);
    }

    #[test]
    fn serializes_level_in_snake_case() {
        let json = serde_json::to_string(&Notification::error("Wrong network")).unwrap();
        assert_eq!(json, r#"{"level":"error","message":"Wrong network"}"#);
    }
}
