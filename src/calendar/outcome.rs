//! Operation outcomes for the calendar tools.
//!
//! Every calendar operation returns a tagged [`OpOutcome`] instead of
//! pre-rendered prose, so callers can branch on what happened without
//! sniffing strings. The MCP layer is the only place outcomes are turned
//! into the text shown to the reasoning engine and the user.

use chrono::{DateTime, FixedOffset, NaiveDate};

use super::types::CalendarEvent;

/// Outcome of a single calendar operation.
#[derive(Debug, Clone)]
pub enum OpOutcome {
    /// Events for one calendar day, in start order (possibly none).
    DayEvents {
        date: NaiveDate,
        events: Vec<CalendarEvent>,
    },
    /// Whether an instant is free. A failed check reports `free: false`.
    Availability { free: bool },
    /// First gap that fits the requested duration.
    SlotFound {
        start: DateTime<FixedOffset>,
        duration_minutes: i64,
    },
    /// No gap of the requested duration before the end of the day.
    NoSlot,
    /// Event created.
    Created { link: String },
    /// Event updated.
    Updated { link: String },
    /// Event canceled.
    Canceled,
    /// The input could not be parsed; the backend was never contacted.
    InvalidInput { reason: String },
    /// The calendar backend is not configured.
    Unavailable { reason: String },
    /// The backend rejected or failed the operation.
    Failed { reason: String },
}

impl OpOutcome {
    /// Outcome for unparseable input.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Outcome for an unconfigured backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Outcome for a failed backend call.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Render the outcome as reply text.
    pub fn render(&self) -> String {
        match self {
            Self::DayEvents { date, events } => {
                if events.is_empty() {
                    format!("No events found on {}.", date)
                } else {
                    let mut lines = vec![format!("Events on {}:", date)];
                    for event in events {
                        lines.push(format!("- {}: {}", event.display_start(), event.summary));
                    }
                    lines.join("\n")
                }
            }
            Self::Availability { free } => free.to_string(),
            Self::SlotFound {
                start,
                duration_minutes,
            } => format!(
                "{} is available for {} minutes.",
                start.to_rfc3339(),
                duration_minutes
            ),
            Self::NoSlot => "No free slot available today for that duration.".to_string(),
            Self::Created { link } => format!("Event created: {}", link),
            Self::Updated { link } => format!("Event updated: {}", link),
            Self::Canceled => "Event canceled.".to_string(),
            Self::InvalidInput { reason } => reason.clone(),
            Self::Unavailable { reason } => format!("Calendar service unavailable: {}", reason),
            Self::Failed { reason } => reason.clone(),
        }
    }
}
