use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Degraded,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Ok => "ok",
            Severity::Degraded => "degraded",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

pub const OPERATIONAL_MESSAGE: &str = "Withdrawals are operating normally.";
pub const DEGRADED_MESSAGE: &str = "The payout provider is experiencing delays. \
     Pending withdrawals are retried automatically.";

/// The advisory shown to every user.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SystemNotice {
    pub message: String,
    pub severity: Severity,
}

impl SystemNotice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn operational() -> Self {
        Self::new(OPERATIONAL_MESSAGE, Severity::Ok)
    }

    pub fn degraded() -> Self {
        Self::new(DEGRADED_MESSAGE, Severity::Degraded)
    }
}

impl Default for SystemNotice {
    fn default() -> Self {
        Self::operational()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_serializes_lowercase_severity() {
        let json = serde_json::to_value(SystemNotice::degraded()).unwrap();
        assert_eq!(json["severity"], "degraded");
        assert_eq!(json["message"], DEGRADED_MESSAGE);
    }

    #[test]
    fn test_notice_deserializes_admin_override() {
        let notice: SystemNotice =
            serde_json::from_str(r#"{"message":"Maintenance at 22:00","severity":"info"}"#)
                .unwrap();
        assert_eq!(notice.severity, Severity::Info);
        assert_eq!(notice.message, "Maintenance at 22:00");
    }

    #[test]
    fn test_default_is_operational() {
        assert_eq!(SystemNotice::default().severity, Severity::Ok);
    }
}
