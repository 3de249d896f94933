//! User-visible notices.
//!
//! The synchronizer never formats UI itself; it hands a [`Notice`] to the
//! registered notifier, which decides how to show it.

use disaster_map_client::ClientError;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// An action succeeded.
    Success,
    /// An action failed; the app keeps working.
    Error,
    /// The app cannot work until the user acts (e.g. reloads).
    Blocking,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Prominence.
    pub level: NoticeLevel,
    /// Short heading.
    pub title: String,
    /// Body text. Plain text, not HTML.
    pub message: String,
}

impl Notice {
    /// Builds a notice.
    #[must_use]
    pub fn new(level: NoticeLevel, title: &str, message: &str) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    /// Notice for a failed record fetch.
    #[must_use]
    pub fn fetch_failed(error: &ClientError) -> Self {
        let message = match error {
            ClientError::MalformedResponse { .. } => {
                "The server sent data in an unexpected format. Please try again later."
            }
            _ => "Could not load disaster data. Please check your connection and try again.",
        };
        Self::new(NoticeLevel::Error, "Error loading disasters", message)
    }

    /// Notice for a map that failed to initialize.
    #[must_use]
    pub fn map_unavailable() -> Self {
        Self::new(
            NoticeLevel::Blocking,
            "Map unavailable",
            "The map could not be loaded. Please reload the page.",
        )
    }

    /// Notice for the outcome of a report or subscription.
    #[must_use]
    pub fn from_submission(result: &Result<Option<String>, ClientError>, success: &str) -> Self {
        match result {
            Ok(message) => Self::new(
                NoticeLevel::Success,
                "Success",
                message.as_deref().unwrap_or(success),
            ),
            Err(ClientError::Rejected { message }) => {
                Self::new(NoticeLevel::Error, "Error", message)
            }
            Err(ClientError::Invalid(e)) => Self::new(NoticeLevel::Error, "Error", &e.message),
            Err(e) => {
                log::debug!("Submission failed: {e}");
                Self::new(
                    NoticeLevel::Error,
                    "Error",
                    "The request could not be sent. Please try again.",
                )
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_gets_its_own_message() {
        let notice = Notice::fetch_failed(&ClientError::MalformedResponse {
            message: "expected an array".to_string(),
        });
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("unexpected format"));
    }

    #[test]
    fn rejection_message_is_passed_through() {
        let result = Err(ClientError::Rejected {
            message: "Invalid coordinates.".to_string(),
        });
        let notice = Notice::from_submission(&result, "Report submitted");
        assert_eq!(notice.message, "Invalid coordinates.");
    }

    #[test]
    fn success_falls_back_to_default_message() {
        let notice = Notice::from_submission(&Ok(None), "Report submitted");
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.to_string(), "[success] Success: Report submitted");
    }
}
