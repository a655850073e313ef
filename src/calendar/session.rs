use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use super::editor::{EditorError, SlotEditor, SlotState};
use super::grid::WeekGrid;
use super::summary::{SessionCount, sessions_summary};
use super::week::{monday_of, next_week, previous_week, slot_key};
use crate::appointments::{Appointment, AppointmentMap, SlotKey};

/// Where a session loads its document from and writes it back to.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn load(&self) -> Result<AppointmentMap>;

    async fn save(&self, appointments: &AppointmentMap) -> Result<()>;
}

/// Everything one calendar window holds: the whole document, the week
/// on screen and the slot editor.
///
/// Saves are coalesced by revision. Every committed change (a submit or
/// a delete) bumps `revision`; `flush` writes the current document once
/// if anything changed since the last successful save, however many
/// changes that covers. Drafts, cancels and navigation never trigger a
/// save. A revision whose save failed is not written again; the next
/// committed change is.
#[derive(Debug)]
pub struct CalendarSession {
    week_start: NaiveDate,
    appointments: AppointmentMap,
    editor: SlotEditor,
    revision: u64,
    saved_revision: u64,
    failed_revision: Option<u64>,
}

impl CalendarSession {
    pub fn new(today: NaiveDate, appointments: AppointmentMap) -> Self {
        Self {
            week_start: monday_of(today),
            appointments,
            editor: SlotEditor::default(),
            revision: 0,
            saved_revision: 0,
            failed_revision: None,
        }
    }

    /// Start a session from whatever the store holds. A failed load is
    /// logged and the session starts empty.
    pub async fn open(today: NaiveDate, persistence: &dyn Persistence) -> Self {
        let appointments = match persistence.load().await {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::error!("Failed to load appointments: {:#}", e);
                AppointmentMap::new()
            }
        };
        Self::new(today, appointments)
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn appointments(&self) -> &AppointmentMap {
        &self.appointments
    }

    pub fn editor(&self) -> &SlotEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SlotEditor {
        &mut self.editor
    }

    pub fn grid(&self) -> WeekGrid<'_> {
        WeekGrid::build(&self.appointments, self.week_start, self.editor.editing())
    }

    pub fn summary(&self) -> Vec<SessionCount> {
        sessions_summary(&self.appointments)
    }

    pub fn show_week_of(&mut self, date: NaiveDate) {
        self.week_start = monday_of(date);
    }

    pub fn next_week(&mut self) {
        self.week_start = next_week(self.week_start);
    }

    pub fn previous_week(&mut self) {
        self.week_start = previous_week(self.week_start);
    }

    /// Key of a slot in the visible week.
    pub fn slot(&self, day_index: usize, hour: NaiveTime) -> Option<SlotKey> {
        slot_key(self.week_start, day_index, hour)
    }

    pub fn state_of(&self, key: &SlotKey) -> SlotState {
        self.editor.state_of(&self.appointments, key)
    }

    pub fn begin_add(&mut self, key: SlotKey) -> Result<(), EditorError> {
        self.editor.begin_add(&self.appointments, key)
    }

    pub fn begin_edit(&mut self, key: SlotKey) -> Result<(), EditorError> {
        self.editor.begin_edit(&self.appointments, key)
    }

    pub fn submit(&mut self) -> Result<SlotKey, EditorError> {
        let key = self.editor.submit(&mut self.appointments)?;
        self.revision += 1;
        Ok(key)
    }

    pub fn cancel(&mut self) -> Option<SlotKey> {
        self.editor.cancel()
    }

    pub fn delete(&mut self, key: &SlotKey) -> Result<Appointment, EditorError> {
        let removed = self.editor.delete(&mut self.appointments, key)?;
        self.revision += 1;
        Ok(removed)
    }

    pub fn is_dirty(&self) -> bool {
        self.revision > self.saved_revision
    }

    /// Save the document if it changed since the last save attempt.
    /// Returns whether a save was made. On failure the local state is
    /// kept as is and the session stays dirty, but the same revision is
    /// not sent again.
    pub async fn flush(&mut self, persistence: &dyn Persistence) -> Result<bool> {
        if !self.is_dirty() || self.failed_revision == Some(self.revision) {
            return Ok(false);
        }
        let revision = self.revision;
        if let Err(e) = persistence.save(&self.appointments).await {
            self.failed_revision = Some(revision);
            return Err(e);
        }
        self.saved_revision = revision;
        self.failed_revision = None;
        tracing::debug!("Saved revision {}", revision);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;

    use super::*;
    use crate::appointments::Status;

    #[derive(Default)]
    struct Recorder {
        stored: Mutex<AppointmentMap>,
        saves: Mutex<Vec<AppointmentMap>>,
        fail: bool,
    }

    #[async_trait]
    impl Persistence for Recorder {
        async fn load(&self) -> Result<AppointmentMap> {
            if self.fail {
                return Err(anyhow!("store unreachable"));
            }
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, appointments: &AppointmentMap) -> Result<()> {
            if self.fail {
                return Err(anyhow!("store unreachable"));
            }
            *self.stored.lock().unwrap() = appointments.clone();
            self.saves.lock().unwrap().push(appointments.clone());
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    fn add(session: &mut CalendarSession, day: usize, first: &str, last: &str) -> SlotKey {
        let key = session.slot(day, nine()).unwrap();
        session.begin_add(key.clone()).unwrap();
        let draft = session.editor_mut().draft_mut().unwrap();
        draft.first_name = first.to_string();
        draft.last_name = last.to_string();
        session.submit().unwrap()
    }

    #[test]
    fn it_starts_on_the_current_week() {
        let session = CalendarSession::new(today(), AppointmentMap::new());
        assert_eq!(
            session.week_start(),
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
    }

    #[test]
    fn it_navigates_between_weeks() {
        let mut session = CalendarSession::new(today(), AppointmentMap::new());
        let key = add(&mut session, 0, "Jean", "Dupont");

        session.next_week();
        assert_eq!(session.slot(0, nine()).unwrap().as_str(), "2025-01-13_09:00");
        assert_eq!(session.grid().booked(), 0);

        session.previous_week();
        assert_eq!(session.slot(0, nine()), Some(key));
        assert_eq!(session.grid().booked(), 1);

        session.show_week_of(NaiveDate::from_ymd_opt(2025, 2, 2).unwrap());
        assert_eq!(
            session.week_start(),
            NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()
        );
    }

    #[tokio::test]
    async fn it_coalesces_changes_into_one_save() {
        let store = Recorder::default();
        let mut session = CalendarSession::open(today(), &store).await;

        add(&mut session, 0, "Jean", "Dupont");
        add(&mut session, 1, "Ana", "Lee");
        let ana = session.slot(1, nine()).unwrap();
        session.delete(&ana).unwrap();
        assert!(session.is_dirty());

        assert!(session.flush(&store).await.unwrap());
        assert!(!session.flush(&store).await.unwrap());

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].len(), 1);
    }

    #[tokio::test]
    async fn it_does_not_save_drafts_or_navigation() {
        let store = Recorder::default();
        let mut session = CalendarSession::open(today(), &store).await;

        let key = session.slot(2, nine()).unwrap();
        session.begin_add(key).unwrap();
        session.editor_mut().draft_mut().unwrap().first_name = "Jean".to_string();
        session.cancel();
        session.next_week();

        assert!(!session.is_dirty());
        assert!(!session.flush(&store).await.unwrap());
        assert!(store.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_keeps_local_changes_when_a_save_fails() {
        let store = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut session = CalendarSession::open(today(), &store).await;
        assert!(session.appointments().is_empty());

        let key = add(&mut session, 0, "Jean", "Dupont");
        assert!(session.flush(&store).await.is_err());

        assert!(session.is_dirty());
        assert_eq!(session.state_of(&key), SlotState::Filled);
        assert_eq!(session.appointments()[&key].status, Status::Present);
    }

    /// Fails its first save, then stores normally.
    #[derive(Default)]
    struct FailsOnce {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Persistence for FailsOnce {
        async fn load(&self) -> Result<AppointmentMap> {
            Ok(AppointmentMap::new())
        }

        async fn save(&self, _appointments: &AppointmentMap) -> Result<()> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(anyhow!("store unreachable"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn it_does_not_resend_a_failed_save() {
        let store = FailsOnce::default();
        let mut session = CalendarSession::open(today(), &store).await;

        add(&mut session, 0, "Jean", "Dupont");
        assert!(session.flush(&store).await.is_err());

        session.next_week();
        assert!(!session.flush(&store).await.unwrap());
        assert!(!session.flush(&store).await.unwrap());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        assert!(session.is_dirty());

        // The next committed change writes everything, including the
        // appointment the failed save carried
        session.previous_week();
        add(&mut session, 1, "Ana", "Lee");
        assert!(session.flush(&store).await.unwrap());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn it_reloads_what_it_saved() {
        let store = Recorder::default();
        let mut session = CalendarSession::open(today(), &store).await;
        add(&mut session, 3, "Jean", "Dupont");
        session.flush(&store).await.unwrap();

        let reopened = CalendarSession::open(today(), &store).await;
        assert_eq!(reopened.appointments(), session.appointments());
        assert_eq!(reopened.summary().len(), 1);
    }
}
