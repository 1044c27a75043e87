use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(3_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NoticePosition {
    TopCenter,
    TopRight,
    #[default]
    BottomCenter,
    BottomRight,
}

/// Presentation hints passed along with an operator warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeOptions {
    pub duration: Duration,
    pub position: NoticePosition,
}

impl Default for NoticeOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_NOTICE_DURATION,
            position: NoticePosition::default(),
        }
    }
}

/// Surfaces a non-fatal warning to the operator. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str, options: &NoticeOptions);
}

/// Notifier that routes warnings to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn warn(&self, message: &str, options: &NoticeOptions) {
        log::warn!(
            "{message} (shown for {}ms, {:?})",
            options.duration.as_millis(),
            options.position
        );
    }
}

/// Canned user-facing description for a non-2xx HTTP status.
#[must_use]
pub const fn status_message(status: u16) -> &'static str {
    match status {
        304 => "Your project analysis is already up to date",
        400 => "The request was invalid. Please check the input and try again",
        401 => "Your session has expired. Please sign in again",
        403 => "You do not have permission to perform this action",
        404 => "The requested resource could not be found",
        409 => "Analysis in progress",
        413 => "The uploaded payload is too large",
        429 => "Too many requests. Please wait a moment and try again",
        500 => "Something went wrong on our side. Please try again later",
        502 | 504 => "The analyzer service did not respond in time. Please try again",
        503 => "The analyzer service is temporarily unavailable",
        _ => "Something went wrong. Please try again",
    }
}
