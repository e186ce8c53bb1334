//! End-to-end calendar flows against an in-memory backend.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sundial::error::BackendError;
use sundial::{
    BackendHandle, CalendarBackend, CalendarEvent, CalendarService, EventChange, OpOutcome,
};

/// In-memory calendar honoring the backend contract: half-open window
/// queries, merge-style updates, ids assigned on insert.
#[derive(Default)]
struct MemoryCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    counter: Mutex<u32>,
}

#[async_trait]
impl CalendarBackend for MemoryCalendar {
    async fn events_between(
        &self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, BackendError> {
        let mut events: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.end > start && e.start < end)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, BackendError> {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        let id = format!("ev{}", counter);
        self.events
            .lock()
            .unwrap()
            .push(event.clone().with_id(id.clone()));
        Ok(format!("https://calendar.example/{}", id))
    }

    async fn update_event(
        &self,
        event_id: &str,
        change: &EventChange,
    ) -> Result<String, BackendError> {
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(event_id))
            .ok_or_else(|| BackendError::NotFound(event_id.to_string()))?;
        change.apply_to(event);
        Ok(format!("https://calendar.example/{}", event_id))
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), BackendError> {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id.as_deref() != Some(event_id));
        if events.len() == before {
            return Err(BackendError::NotFound(event_id.to_string()));
        }
        Ok(())
    }
}

fn service() -> CalendarService<MemoryCalendar> {
    CalendarService::new(
        BackendHandle::Connected(MemoryCalendar::default()),
        FixedOffset::east_opt(0).unwrap(),
    )
}

#[tokio::test]
async fn test_booking_flow_finds_slot_and_schedules() {
    let service = service();

    // Morning is busy until 10:30.
    service
        .schedule_event("Standup", "2025-06-12T09:00:00", "2025-06-12T09:30:00")
        .await;
    service
        .schedule_event("Review", "2025-06-12T09:30:00", "2025-06-12T10:30:00")
        .await;

    let outcome = service.find_next_free_slot("2025-06-12T09:00:00", 60).await;
    match outcome {
        OpOutcome::SlotFound {
            start,
            duration_minutes,
        } => {
            assert_eq!(start.to_rfc3339(), "2025-06-12T10:30:00+00:00");
            assert_eq!(duration_minutes, 60);
        }
        other => panic!("expected a slot, got {:?}", other),
    }

    let created = service
        .schedule_event("Focus block", "2025-06-12T10:30:00", "2025-06-12T11:30:00")
        .await;
    assert!(matches!(created, OpOutcome::Created { .. }));

    // The listing shows all three, in start order.
    let listing = service.list_events_for_day("2025-06-12").await.render();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[0], "Events on 2025-06-12:");
    assert!(lines[1].contains("Standup"));
    assert!(lines[2].contains("Review"));
    assert!(lines[3].contains("Focus block"));

    // And the booked slot is no longer free.
    assert_eq!(service.is_free_at("2025-06-12T10:45:00").await.render(), "false");
}

#[tokio::test]
async fn test_reschedule_keeps_unchanged_fields() {
    let service = service();
    service
        .schedule_event("Dentist", "2025-06-12T14:00:00", "2025-06-12T15:00:00")
        .await;

    // Rename only; the times must survive.
    let updated = service
        .update_event("ev1", Some("Dentist (moved)".to_string()), None, None)
        .await;
    assert!(matches!(updated, OpOutcome::Updated { .. }));

    let listing = service.list_events_for_day("2025-06-12").await.render();
    assert!(listing.contains("Dentist (moved)"));
    assert!(listing.contains("2025-06-12T14:00:00"));

    // Move it; the old span frees up.
    service
        .update_event(
            "ev1",
            None,
            Some("2025-06-12T16:00:00".to_string()),
            Some("2025-06-12T17:00:00".to_string()),
        )
        .await;
    assert_eq!(service.is_free_at("2025-06-12T14:30:00").await.render(), "true");
    assert_eq!(service.is_free_at("2025-06-12T16:30:00").await.render(), "false");
}

#[tokio::test]
async fn test_cancel_removes_the_event() {
    let service = service();
    service
        .schedule_event("One-off", "2025-06-12T09:00:00", "2025-06-12T10:00:00")
        .await;

    let outcome = service.cancel_event("ev1").await;
    assert_eq!(outcome.render(), "Event canceled.");

    let listing = service.list_events_for_day("2025-06-12").await.render();
    assert_eq!(listing, "No events found on 2025-06-12.");

    // Canceling again reports the failure.
    let again = service.cancel_event("ev1").await.render();
    assert!(again.starts_with("Error canceling event:"));
}

#[tokio::test]
async fn test_unavailable_backend_degrades_every_operation() {
    let service: CalendarService<MemoryCalendar> = CalendarService::new(
        BackendHandle::Unavailable("no credentials configured".to_string()),
        FixedOffset::east_opt(0).unwrap(),
    );

    let listing = service.list_events_for_day("2025-06-12").await.render();
    assert_eq!(
        listing,
        "Calendar service unavailable: no credentials configured"
    );

    let scheduled = service
        .schedule_event("Anything", "2025-06-12T09:00:00", "2025-06-12T10:00:00")
        .await
        .render();
    assert!(scheduled.starts_with("Calendar service unavailable:"));

    // Availability checks fail closed instead of explaining.
    assert_eq!(service.is_free_at("2025-06-12T09:00:00").await.render(), "false");
}
