//! Calendar operations over a pluggable backend.
//!
//! Each operation takes the raw string arguments a caller supplies, validates
//! them locally, and returns an [`OpOutcome`] describing what happened. Input
//! problems never reach the backend; backend problems are folded into the
//! outcome rather than propagated, so callers always get something they can
//! show to a user.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::calendar::backend::{BackendHandle, CalendarBackend, GoogleCalendar};
use crate::calendar::outcome::OpOutcome;
use crate::calendar::types::{parse_day, parse_instant, CalendarEvent, DayWindow, EventChange};
use crate::config::Config;

// ============================================================================
// Calendar Service
// ============================================================================

/// The calendar operations exposed to tool callers.
pub struct CalendarService<B: CalendarBackend> {
    backend: BackendHandle<B>,
    default_offset: FixedOffset,
}

impl CalendarService<GoogleCalendar> {
    /// Build a service from configuration.
    ///
    /// A backend that cannot be constructed (no credentials, unreadable key,
    /// TLS failure) degrades to an unavailable handle instead of failing, so
    /// the server still starts and every operation reports the same reason.
    pub async fn from_config(config: &Config) -> crate::error::Result<Self> {
        let default_offset = config.default_offset()?;

        let backend = match config.credentials_path() {
            Some(path) => {
                match GoogleCalendar::connect(
                    &path,
                    config.calendar.calendar_id.clone(),
                    default_offset,
                )
                .await
                {
                    Ok(backend) => BackendHandle::Connected(backend),
                    Err(e) => {
                        warn!("Calendar backend unavailable: {}", e);
                        BackendHandle::Unavailable(e.to_string())
                    }
                }
            }
            None => {
                warn!("No Google API credentials configured, calendar operations will be unavailable");
                BackendHandle::Unavailable(
                    "no credentials configured (set GOOGLE_API_CREDENTIALS_PATH or calendar.credentials_path)"
                        .to_string(),
                )
            }
        };

        Ok(Self::new(backend, default_offset))
    }
}

impl<B: CalendarBackend> CalendarService<B> {
    /// Create a service over an already-constructed backend handle.
    pub fn new(backend: BackendHandle<B>, default_offset: FixedOffset) -> Self {
        Self {
            backend,
            default_offset,
        }
    }

    /// List all events on the given day (`YYYY-MM-DD`).
    pub async fn list_events_for_day(&self, date: &str) -> OpOutcome {
        let day = match parse_day(date) {
            Ok(day) => day,
            Err(e) => {
                return OpOutcome::invalid(format!(
                    "Invalid date format. Use YYYY-MM-DD. Error: {}",
                    e
                ))
            }
        };

        let backend = match self.backend.get() {
            Ok(backend) => backend,
            Err(reason) => return OpOutcome::unavailable(reason),
        };

        let window = DayWindow::for_date(day, self.default_offset);
        let mut events = match backend.events_between(window.start, window.end).await {
            Ok(events) => events,
            Err(e) => return OpOutcome::failed(format!("Error retrieving events: {}", e)),
        };
        events.sort_by_key(|event| event.start);

        debug!("Listed {} events on {}", events.len(), day);
        OpOutcome::DayEvents { date: day, events }
    }

    /// Report whether the calendar is free at the given instant.
    ///
    /// This check fails closed: any parse or backend failure is logged and
    /// reported as busy, so a caller never books over an interval it could
    /// not actually inspect.
    pub async fn is_free_at(&self, datetime: &str) -> OpOutcome {
        let instant = match parse_instant(datetime, self.default_offset) {
            Ok(instant) => instant,
            Err(e) => {
                warn!("Invalid datetime in availability check, reporting busy: {}", e);
                return OpOutcome::Availability { free: false };
            }
        };

        let backend = match self.backend.get() {
            Ok(backend) => backend,
            Err(reason) => {
                warn!("Backend unavailable during availability check, reporting busy: {}", reason);
                return OpOutcome::Availability { free: false };
            }
        };

        let window = DayWindow::containing(instant);
        let events = match backend.events_between(window.start, window.end).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Error checking events, reporting busy: {}", e);
                return OpOutcome::Availability { free: false };
            }
        };

        let free = !events.iter().any(|event| event.covers(instant));
        OpOutcome::Availability { free }
    }

    /// Find the first instant at or after `after` with `duration_minutes`
    /// of free time, searching no further than the end of that day.
    pub async fn find_next_free_slot(&self, after: &str, duration_minutes: i64) -> OpOutcome {
        if duration_minutes <= 0 {
            return OpOutcome::invalid("Duration must be a positive number of minutes.");
        }

        let after = match parse_instant(after, self.default_offset) {
            Ok(instant) => instant,
            Err(e) => {
                return OpOutcome::invalid(format!("Invalid datetime format. Error: {}", e))
            }
        };

        let backend = match self.backend.get() {
            Ok(backend) => backend,
            Err(reason) => return OpOutcome::unavailable(reason),
        };

        let window = DayWindow::containing(after);
        let mut events = match backend.events_between(after, window.end).await {
            Ok(events) => events,
            Err(e) => return OpOutcome::failed(format!("Error finding free slot: {}", e)),
        };
        events.sort_by_key(|event| event.start);

        match first_fit(after, window.end, duration_minutes, &events) {
            Some(start) => OpOutcome::SlotFound {
                start,
                duration_minutes,
            },
            None => OpOutcome::NoSlot,
        }
    }

    /// Create a new timed event.
    pub async fn schedule_event(&self, summary: &str, start: &str, end: &str) -> OpOutcome {
        let start = match parse_instant(start, self.default_offset) {
            Ok(instant) => instant,
            Err(e) => {
                return OpOutcome::invalid(format!("Invalid datetime format. Error: {}", e))
            }
        };
        let end = match parse_instant(end, self.default_offset) {
            Ok(instant) => instant,
            Err(e) => {
                return OpOutcome::invalid(format!("Invalid datetime format. Error: {}", e))
            }
        };

        let backend = match self.backend.get() {
            Ok(backend) => backend,
            Err(reason) => return OpOutcome::unavailable(reason),
        };

        let event = CalendarEvent::new(summary, start, end);
        match backend.insert_event(&event).await {
            Ok(link) => OpOutcome::Created { link },
            Err(e) => OpOutcome::failed(format!("Error creating event: {}", e)),
        }
    }

    /// Update an existing event, changing only the provided fields.
    ///
    /// Empty strings are treated as absent, so a caller that fills every
    /// argument with `""` performs a no-op update.
    pub async fn update_event(
        &self,
        event_id: &str,
        new_summary: Option<String>,
        new_start: Option<String>,
        new_end: Option<String>,
    ) -> OpOutcome {
        let mut change = EventChange {
            summary: new_summary.filter(|s| !s.is_empty()),
            ..Default::default()
        };
        if let Some(start) = new_start.filter(|s| !s.is_empty()) {
            match parse_instant(&start, self.default_offset) {
                Ok(instant) => change.start = Some(instant),
                Err(e) => {
                    return OpOutcome::invalid(format!("Invalid datetime format. Error: {}", e))
                }
            }
        }
        if let Some(end) = new_end.filter(|s| !s.is_empty()) {
            match parse_instant(&end, self.default_offset) {
                Ok(instant) => change.end = Some(instant),
                Err(e) => {
                    return OpOutcome::invalid(format!("Invalid datetime format. Error: {}", e))
                }
            }
        }

        let backend = match self.backend.get() {
            Ok(backend) => backend,
            Err(reason) => return OpOutcome::unavailable(reason),
        };

        match backend.update_event(event_id, &change).await {
            Ok(link) => OpOutcome::Updated { link },
            Err(e) => OpOutcome::failed(format!("Error updating event: {}", e)),
        }
    }

    /// Delete an event by id.
    pub async fn cancel_event(&self, event_id: &str) -> OpOutcome {
        let backend = match self.backend.get() {
            Ok(backend) => backend,
            Err(reason) => return OpOutcome::unavailable(reason),
        };

        match backend.delete_event(event_id).await {
            Ok(()) => OpOutcome::Canceled,
            Err(e) => OpOutcome::failed(format!("Error canceling event: {}", e)),
        }
    }
}

// ============================================================================
// Free Slot Search
// ============================================================================

/// First-fit scan over busy spans sorted by start.
///
/// The cursor starts at `after` and is pushed past each busy span that ends
/// beyond it. A zero-length sentinel at `horizon` closes the final gap, so a
/// slot is only reported when the full duration fits before the horizon.
fn first_fit(
    after: DateTime<FixedOffset>,
    horizon: DateTime<FixedOffset>,
    duration_minutes: i64,
    events: &[CalendarEvent],
) -> Option<DateTime<FixedOffset>> {
    let mut spans: Vec<(DateTime<FixedOffset>, DateTime<FixedOffset>)> =
        events.iter().map(|event| (event.start, event.end)).collect();
    spans.push((horizon, horizon));

    let mut cursor = after;
    for (start, end) in spans {
        if (start - cursor).num_minutes() >= duration_minutes {
            return Some(cursor);
        }
        if end > cursor {
            cursor = end;
        }
    }
    None
}
