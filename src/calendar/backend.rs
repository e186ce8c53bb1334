//! Calendar backend abstraction and the Google Calendar implementation.
//!
//! Operations talk to a [`CalendarBackend`] rather than to the Google API
//! directly, so tests can substitute an in-memory store. The production
//! implementation, [`GoogleCalendar`], authenticates with a service account
//! key and normalizes API events into [`CalendarEvent`] values.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use google_calendar3::api::{Event, EventDateTime};
use google_calendar3::hyper_rustls::HttpsConnector;
use google_calendar3::yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};
use google_calendar3::CalendarHub;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::path::Path;
use tracing::debug;

use crate::calendar::types::{CalendarEvent, EventChange};
use crate::error::BackendError;

// ============================================================================
// Backend Trait
// ============================================================================

/// Storage-agnostic calendar access used by the operation layer.
///
/// All instants are fixed-offset so comparisons happen on one timeline
/// regardless of where an event was created.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Returns events intersecting the half-open window `[start, end)`,
    /// in start order.
    async fn events_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, BackendError>;

    /// Inserts a new event and returns a link to it (empty when the
    /// backend provides none).
    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, BackendError>;

    /// Fetches the stored event, merges only the fields present in
    /// `change`, and re-submits the whole event. Returns a link to the
    /// updated event.
    async fn update_event(&self, event_id: &str, change: &EventChange)
        -> Result<String, BackendError>;

    /// Deletes the event with the given id.
    async fn delete_event(&self, event_id: &str) -> Result<(), BackendError>;
}

// ============================================================================
// Backend Handle
// ============================================================================

/// A backend that may have failed to connect at startup.
///
/// Connection failures (missing key file, TLS setup) are recorded instead of
/// aborting, so the server still starts and every operation can report the
/// same reason.
pub enum BackendHandle<B> {
    /// Backend connected and ready.
    Connected(B),
    /// Backend could not be constructed; holds the reason.
    Unavailable(String),
}

impl<B> BackendHandle<B> {
    /// Returns the backend, or the reason it is unavailable.
    pub fn get(&self) -> Result<&B, &str> {
        match self {
            BackendHandle::Connected(backend) => Ok(backend),
            BackendHandle::Unavailable(reason) => Err(reason),
        }
    }
}

// ============================================================================
// Google Calendar Backend
// ============================================================================

/// Google Calendar API backend authenticated via a service account.
pub struct GoogleCalendar {
    hub: CalendarHub<HttpsConnector<HttpConnector>>,
    calendar_id: String,
    default_offset: FixedOffset,
}

impl GoogleCalendar {
    /// Connect to the Google Calendar API using a service account key file.
    pub async fn connect(
        key_path: &Path,
        calendar_id: String,
        default_offset: FixedOffset,
    ) -> Result<Self, BackendError> {
        let key = read_service_account_key(key_path).await.map_err(|e| {
            BackendError::Credentials(format!("{}: {}", key_path.display(), e))
        })?;
        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| BackendError::Credentials(e.to_string()))?;

        let connector = google_calendar3::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(BackendError::Tls)?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = CalendarHub::new(client, auth);

        debug!("Connected to Google Calendar (calendar_id: {})", calendar_id);

        Ok(Self {
            hub,
            calendar_id,
            default_offset,
        })
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendar {
    async fn events_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, BackendError> {
        let (_, listing) = self
            .hub
            .events()
            .list(&self.calendar_id)
            .time_min(start.with_timezone(&Utc))
            .time_max(end.with_timezone(&Utc))
            .single_events(true)
            .order_by("startTime")
            .doit()
            .await?;

        let items = listing.items.unwrap_or_default();
        debug!("Fetched {} events in [{}, {})", items.len(), start, end);

        items
            .into_iter()
            .map(|event| normalize_event(event, self.default_offset))
            .collect()
    }

    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, BackendError> {
        let payload = Event {
            summary: Some(event.summary.clone()),
            start: Some(timed_edge(event.start)),
            end: Some(timed_edge(event.end)),
            ..Default::default()
        };

        let (_, created) = self
            .hub
            .events()
            .insert(payload, &self.calendar_id)
            .doit()
            .await?;

        debug!(
            "Created calendar event: {} ({})",
            event.summary,
            created.id.as_deref().unwrap_or("?")
        );

        Ok(created.html_link.unwrap_or_default())
    }

    async fn update_event(
        &self,
        event_id: &str,
        change: &EventChange,
    ) -> Result<String, BackendError> {
        // Fetch the full resource so untouched fields survive the update.
        let (_, mut current) = self
            .hub
            .events()
            .get(&self.calendar_id, event_id)
            .doit()
            .await?;

        if let Some(ref summary) = change.summary {
            current.summary = Some(summary.clone());
        }
        if let Some(start) = change.start {
            current.start = Some(timed_edge(start));
        }
        if let Some(end) = change.end {
            current.end = Some(timed_edge(end));
        }

        let (_, updated) = self
            .hub
            .events()
            .update(current, &self.calendar_id, event_id)
            .doit()
            .await?;

        debug!("Updated calendar event: {}", event_id);

        Ok(updated.html_link.unwrap_or_default())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), BackendError> {
        self.hub
            .events()
            .delete(&self.calendar_id, event_id)
            .doit()
            .await?;

        debug!("Deleted calendar event: {}", event_id);

        Ok(())
    }
}

// ============================================================================
// Event Conversion
// ============================================================================

/// Builds a timed API edge from a fixed-offset instant.
fn timed_edge(instant: DateTime<FixedOffset>) -> EventDateTime {
    EventDateTime {
        date_time: Some(instant.with_timezone(&Utc)),
        ..Default::default()
    }
}

/// Converts an API event into a [`CalendarEvent`] on the configured offset.
///
/// Timed events carry a UTC instant and are rebased onto `offset`. All-day
/// events carry bare dates; the start date becomes midnight and the end date
/// (already exclusive in the API) becomes the following midnight, so an
/// all-day event occupies the half-open span of its calendar days.
fn normalize_event(event: Event, offset: FixedOffset) -> Result<CalendarEvent, BackendError> {
    let label = || {
        event
            .id
            .clone()
            .or_else(|| event.summary.clone())
            .unwrap_or_else(|| "unknown".to_string())
    };

    let (start, start_is_date) =
        edge_instant(event.start.as_ref(), offset).ok_or_else(|| BackendError::MalformedEvent(label()))?;
    let (end, _) =
        edge_instant(event.end.as_ref(), offset).ok_or_else(|| BackendError::MalformedEvent(label()))?;

    let mut converted = CalendarEvent::new(
        event.summary.clone().unwrap_or_else(|| "No Title".to_string()),
        start,
        end,
    );
    converted.id = event.id;
    converted.all_day = start_is_date;

    Ok(converted)
}

/// Resolves one API edge to an instant. Returns the instant and whether it
/// came from a bare date.
fn edge_instant(
    edge: Option<&EventDateTime>,
    offset: FixedOffset,
) -> Option<(DateTime<FixedOffset>, bool)> {
    let edge = edge?;
    if let Some(instant) = edge.date_time {
        return Some((instant.with_timezone(&offset), false));
    }
    if let Some(date) = edge.date {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        let anchored = DateTime::from_naive_utc_and_offset(midnight - offset, offset);
        return Some((anchored, true));
    }
    None
}
