//! Per-slot editing state.
//!
//! A slot is `Empty` or `Filled` depending on the appointment map, and
//! `Editing` while the editor holds a draft for it. Only one slot can be
//! open at a time: opening a second one is refused until the first is
//! submitted or cancelled.

use thiserror::Error;

use crate::appointments::{Appointment, AppointmentMap, InvalidAppointment, SlotKey, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Editing,
    Filled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("no slot is being edited")]
    NotEditing,
    #[error("slot {0} is already being edited, submit or cancel it first")]
    Busy(SlotKey),
    #[error("slot {0} already has an appointment")]
    SlotTaken(SlotKey),
    #[error("slot {0} has no appointment")]
    SlotEmpty(SlotKey),
    #[error(transparent)]
    Invalid(#[from] InvalidAppointment),
}

/// Form contents while a slot is open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub first_name: String,
    pub last_name: String,
    pub status: Status,
}

impl From<&Appointment> for Draft {
    fn from(appt: &Appointment) -> Self {
        Self {
            first_name: appt.first_name.clone(),
            last_name: appt.last_name.clone(),
            status: appt.status,
        }
    }
}

impl TryFrom<Draft> for Appointment {
    type Error = InvalidAppointment;

    fn try_from(draft: Draft) -> Result<Self, Self::Error> {
        let appt = Appointment {
            first_name: draft.first_name,
            last_name: draft.last_name,
            status: draft.status,
        };
        appt.validate()?;
        Ok(appt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditMode {
    Add,
    Edit,
}

#[derive(Debug)]
struct OpenSlot {
    key: SlotKey,
    mode: EditMode,
    draft: Draft,
}

#[derive(Debug, Default)]
pub struct SlotEditor {
    open: Option<OpenSlot>,
}

impl SlotEditor {
    pub fn editing(&self) -> Option<&SlotKey> {
        self.open.as_ref().map(|open| &open.key)
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.open.as_ref().map(|open| open.mode)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.open.as_ref().map(|open| &open.draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.open.as_mut().map(|open| &mut open.draft)
    }

    pub fn state_of(&self, appointments: &AppointmentMap, key: &SlotKey) -> SlotState {
        if self.editing() == Some(key) {
            SlotState::Editing
        } else if appointments.contains_key(key) {
            SlotState::Filled
        } else {
            SlotState::Empty
        }
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        match self.editing() {
            Some(key) => Err(EditorError::Busy(key.clone())),
            None => Ok(()),
        }
    }

    /// Open an empty slot with a blank draft.
    pub fn begin_add(
        &mut self,
        appointments: &AppointmentMap,
        key: SlotKey,
    ) -> Result<(), EditorError> {
        self.ensure_idle()?;
        if appointments.contains_key(&key) {
            return Err(EditorError::SlotTaken(key));
        }
        self.open = Some(OpenSlot {
            key,
            mode: EditMode::Add,
            draft: Draft::default(),
        });
        Ok(())
    }

    /// Open a filled slot with its current appointment as the draft.
    pub fn begin_edit(
        &mut self,
        appointments: &AppointmentMap,
        key: SlotKey,
    ) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let Some(appt) = appointments.get(&key) else {
            return Err(EditorError::SlotEmpty(key));
        };
        self.open = Some(OpenSlot {
            draft: Draft::from(appt),
            key,
            mode: EditMode::Edit,
        });
        Ok(())
    }

    /// Write the draft into `appointments` and close the slot. An
    /// invalid draft leaves the slot open so it can be corrected.
    pub fn submit(&mut self, appointments: &mut AppointmentMap) -> Result<SlotKey, EditorError> {
        let open = self.open.as_ref().ok_or(EditorError::NotEditing)?;
        let appt = Appointment::try_from(open.draft.clone())?;
        let key = open.key.clone();
        appointments.insert(key.clone(), appt);
        self.open = None;
        Ok(key)
    }

    /// Drop the draft. The slot goes back to whatever the map says.
    pub fn cancel(&mut self) -> Option<SlotKey> {
        self.open.take().map(|open| open.key)
    }

    /// Remove a filled slot. A slot that is open in the editor has to be
    /// closed first.
    pub fn delete(
        &self,
        appointments: &mut AppointmentMap,
        key: &SlotKey,
    ) -> Result<Appointment, EditorError> {
        if self.editing() == Some(key) {
            return Err(EditorError::Busy(key.clone()));
        }
        appointments
            .remove(key)
            .ok_or_else(|| EditorError::SlotEmpty(key.clone()))
    }
}
