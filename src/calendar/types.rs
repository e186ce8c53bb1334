//! Calendar types for busy/free reasoning.
//!
//! This module defines the core types for calendar functionality:
//! normalized events, half-open day windows, and partial event updates.
//! All instants are normalized to `DateTime<FixedOffset>` so that events,
//! probe times, and day boundaries compare in one timeline.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// Calendar Event
// ============================================================================

/// A calendar event occupying the half-open interval `[start, end)`.
///
/// The backend's copy is authoritative; instances of this type are fetched
/// fresh for every operation and never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Backend-assigned identifier (None until the event is created).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Event summary.
    pub summary: String,
    /// Start of the event.
    pub start: DateTime<FixedOffset>,
    /// End of the event (exclusive).
    pub end: DateTime<FixedOffset>,
    /// Whether the backend stored this as an all-day entry.
    #[serde(default)]
    pub all_day: bool,
}

impl CalendarEvent {
    /// Create a new timed event.
    pub fn new(
        summary: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: None,
            summary: summary.into(),
            start,
            end,
            all_day: false,
        }
    }

    /// Set the backend identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark as an all-day event.
    pub fn all_day_event(mut self) -> Self {
        self.all_day = true;
        self
    }

    /// Duration of the event in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check whether the event covers an instant (half-open: the end
    /// boundary itself is free). A zero-length event covers nothing.
    pub fn covers(&self, instant: DateTime<FixedOffset>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Check if this event overlaps another (half-open on both sides).
    pub fn overlaps_with(&self, other: &CalendarEvent) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Start time as shown to the user: the bare date for all-day entries,
    /// RFC 3339 otherwise.
    pub fn display_start(&self) -> String {
        if self.all_day {
            self.start.format("%Y-%m-%d").to_string()
        } else {
            self.start.to_rfc3339()
        }
    }
}

// ============================================================================
// Day Window
// ============================================================================

/// A half-open day window `[midnight, next midnight)` in a fixed offset.
///
/// All busy/free decisions for a day happen inside one of these, so events
/// and probe instants always compare against the same boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// Start of the day (inclusive).
    pub start: DateTime<FixedOffset>,
    /// Start of the next day (exclusive).
    pub end: DateTime<FixedOffset>,
}

impl DayWindow {
    /// Window for a calendar date in the given offset.
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let start = at_offset(date.and_time(chrono::NaiveTime::MIN), offset);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Window of the day containing an instant, in that instant's offset.
    pub fn containing(instant: DateTime<FixedOffset>) -> Self {
        Self::for_date(instant.date_naive(), *instant.offset())
    }

    /// Check whether the window covers an instant (half-open).
    pub fn covers(&self, instant: DateTime<FixedOffset>) -> bool {
        instant >= self.start && instant < self.end
    }
}

// ============================================================================
// Event Updates
// ============================================================================

/// Partial update for a calendar event. Unset fields keep the backend's
/// current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventChange {
    /// New summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// New start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,
    /// New end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
}

impl EventChange {
    /// True when the change would not modify anything.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.start.is_none() && self.end.is_none()
    }

    /// Merge this change into an event fetched from the backend.
    pub fn apply_to(&self, event: &mut CalendarEvent) {
        if let Some(ref summary) = self.summary {
            event.summary = summary.clone();
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

/// Anchor a naive local timestamp in a fixed offset.
fn at_offset(naive: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_naive_utc_and_offset(naive - offset, offset)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_day(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 timestamps with an explicit offset, naive timestamps
/// (interpreted in `default_offset`), and bare dates (midnight in
/// `default_offset`).
pub fn parse_instant(
    input: &str,
    default_offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(input) {
        Ok(dt) => Ok(dt),
        Err(rfc_err) => {
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                    return Ok(at_offset(naive, default_offset));
                }
            }
            if let Ok(date) = parse_day(input) {
                return Ok(at_offset(
                    date.and_time(chrono::NaiveTime::MIN),
                    default_offset,
                ));
            }
            Err(rfc_err)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
