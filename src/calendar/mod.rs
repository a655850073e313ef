//! The calendar as the practitioner sees it: one week of half-hour
//! slots, the editor for a single slot and the present-session summary.
//! Everything here works on an `AppointmentMap` passed in explicitly;
//! only `CalendarSession::open` and `flush` talk to storage.

pub mod editor;
pub mod grid;
pub mod render;
pub mod session;
pub mod summary;
pub mod week;

pub use editor::{Draft, EditMode, EditorError, SlotEditor, SlotState};
pub use grid::{GridCell, GridRow, WeekGrid};
pub use session::{CalendarSession, Persistence};
pub use summary::{SessionCount, sessions_summary};
pub use week::{monday_of, slot_key, week_dates};
