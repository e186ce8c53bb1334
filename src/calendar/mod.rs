//! Calendar operations for a conversational assistant.
//!
//! This module provides busy/free reasoning over a Google Calendar:
//!
//! - **Day listings**: all events on a `YYYY-MM-DD` date
//! - **Availability checks**: point-in-time busy/free answers that fail closed
//! - **Slot search**: first-fit free interval search bounded to the end of day
//! - **Mutations**: create, partially update, and cancel events
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ CalendarService  │  validation, operations, rendered outcomes
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ CalendarBackend  │  trait over event storage
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ GoogleCalendar   │  service-account Google API client
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use sundial::calendar::CalendarService;
//!
//! let service = CalendarService::from_config(&config).await?;
//! let outcome = service.list_events_for_day("2025-06-12").await;
//! println!("{}", outcome.render());
//! ```

mod backend;
mod outcome;
mod service;
pub mod types;

pub use backend::{BackendHandle, CalendarBackend, GoogleCalendar};
pub use outcome::OpOutcome;
pub use service::CalendarService;
pub use types::{parse_day, parse_instant, CalendarEvent, DayWindow, EventChange};
