//! The appointment document: slots, appointments and their status.

mod models;

pub use models::{
    Appointment, AppointmentMap, InvalidAppointment, SlotKey, Status, UnknownStatus,
};
