use chrono::{NaiveDate, NaiveTime};

use super::editor::SlotState;
use super::week::{hours, slot_key, week_dates};
use crate::appointments::{Appointment, AppointmentMap, SlotKey};

#[derive(Debug)]
pub struct GridCell<'a> {
    pub key: SlotKey,
    pub appointment: Option<&'a Appointment>,
    pub state: SlotState,
}

#[derive(Debug)]
pub struct GridRow<'a> {
    pub hour: NaiveTime,
    pub cells: Vec<GridCell<'a>>,
}

/// One week of the calendar laid out as hour rows × weekday columns.
#[derive(Debug)]
pub struct WeekGrid<'a> {
    pub week_start: NaiveDate,
    pub dates: [NaiveDate; 5],
    pub rows: Vec<GridRow<'a>>,
}

impl<'a> WeekGrid<'a> {
    /// Build the grid for the week starting `week_start`. `editing` is
    /// the slot currently open in the editor, if any.
    pub fn build(
        appointments: &'a AppointmentMap,
        week_start: NaiveDate,
        editing: Option<&SlotKey>,
    ) -> Self {
        let dates = week_dates(week_start);
        let rows = hours()
            .into_iter()
            .map(|hour| {
                let cells = (0..dates.len())
                    .filter_map(|day| slot_key(week_start, day, hour))
                    .map(|key| {
                        let appointment = appointments.get(&key);
                        let state = if editing == Some(&key) {
                            SlotState::Editing
                        } else if appointment.is_some() {
                            SlotState::Filled
                        } else {
                            SlotState::Empty
                        };
                        GridCell {
                            key,
                            appointment,
                            state,
                        }
                    })
                    .collect();
                GridRow { hour, cells }
            })
            .collect();

        Self {
            week_start,
            dates,
            rows,
        }
    }

    /// Number of booked slots in this week, whatever their status.
    pub fn booked(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| cell.appointment.is_some())
            .count()
    }
}
