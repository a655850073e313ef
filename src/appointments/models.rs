use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Every appointment in the calendar, keyed by the slot it occupies.
///
/// A `BTreeMap` keeps the serialized document in chronological key
/// order so two saves of the same map produce the same bytes.
pub type AppointmentMap = BTreeMap<SlotKey, Appointment>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Address of one cell of the weekly grid: `"<YYYY-MM-DD>_<HH:MM>"`.
///
/// Keys read from the store are kept verbatim, even if they don't
/// parse, so a save never drops data the calendar doesn't understand.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self(format!(
            "{}_{}",
            date.format(DATE_FORMAT),
            time.format(TIME_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the key back into its date and time, if it is well formed.
    pub fn parts(&self) -> Option<(NaiveDate, NaiveTime)> {
        let (date, time) = self.0.split_once('_')?;
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(time, TIME_FORMAT).ok()?;
        Some((date, time))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Attendance status of an appointment.
///
/// Documents written by the first version of the calendar used French
/// values; they are still accepted when reading. A value nobody knows is
/// read as `Pending` so one bad record can't make the whole document
/// unreadable, and it is never counted as a present session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Present,
    Absent,
    Pending,
    Cancelled,
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(value.parse().unwrap_or_else(|e: UnknownStatus| {
            tracing::warn!("{}, reading it as pending", e);
            Status::Pending
        }))
    }
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Present,
        Status::Absent,
        Status::Pending,
        Status::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::Absent => "Absent",
            Status::Pending => "Pending",
            Status::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status '{0}', expected one of present, absent, pending, cancelled")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "présent" => Ok(Status::Present),
            "absent" => Ok(Status::Absent),
            "pending" | "en_attente" => Ok(Status::Pending),
            "cancelled" | "canceled" | "annulé" => Ok(Status::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidAppointment {
    #[error("first name is required")]
    MissingFirstName,
    #[error("last name is required")]
    MissingLastName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub first_name: String,
    pub last_name: String,
    pub status: Status,
}

impl Appointment {
    pub fn new(first_name: &str, last_name: &str, status: Status) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            status,
        }
    }

    /// Names are the only validated fields: both must contain something
    /// other than whitespace.
    pub fn validate(&self) -> Result<(), InvalidAppointment> {
        if self.first_name.trim().is_empty() {
            return Err(InvalidAppointment::MissingFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(InvalidAppointment::MissingLastName);
        }
        Ok(())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_formats_slot_keys() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let time = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        let key = SlotKey::new(date, time);
        assert_eq!(key.as_str(), "2025-01-06_08:30");
        assert_eq!(key.parts(), Some((date, time)));
    }

    #[test]
    fn it_keeps_unparseable_keys() {
        let key = SlotKey::from("not-a-slot");
        assert_eq!(key.parts(), None);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"not-a-slot\"");
    }

    #[test]
    fn it_reads_the_stored_document_format() {
        let doc = r#"{
            "2025-01-06_09:00": {"firstName": "Jean", "lastName": "Dupont", "status": "present"},
            "2025-01-07_10:30": {"firstName": "Ana", "lastName": "Lee", "status": "annulé"},
            "2025-01-08_11:00": {"firstName": "Eva", "lastName": "Moreau", "status": "en_attente"}
        }"#;
        let map: AppointmentMap = serde_json::from_str(doc).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(
            map[&SlotKey::from("2025-01-06_09:00")],
            Appointment::new("Jean", "Dupont", Status::Present)
        );
        assert_eq!(map[&SlotKey::from("2025-01-07_10:30")].status, Status::Cancelled);
        assert_eq!(map[&SlotKey::from("2025-01-08_11:00")].status, Status::Pending);
    }

    #[test]
    fn it_reads_unknown_statuses_as_pending() {
        let doc = r#"{
            "2025-01-06_09:00": {"firstName": "Jean", "lastName": "Dupont", "status": "late"},
            "2025-01-07_10:30": {"firstName": "Ana", "lastName": "Lee", "status": "absent"}
        }"#;
        let map: AppointmentMap = serde_json::from_str(doc).unwrap();
        assert_eq!(map[&SlotKey::from("2025-01-06_09:00")].status, Status::Pending);
        assert_eq!(map[&SlotKey::from("2025-01-07_10:30")].status, Status::Absent);
    }

    #[test]
    fn it_writes_canonical_status_values() {
        let appt = Appointment::new("Jean", "Dupont", Status::Cancelled);
        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"firstName": "Jean", "lastName": "Dupont", "status": "cancelled"})
        );
    }

    #[test]
    fn it_parses_status_from_user_input() {
        assert_eq!("Present".parse::<Status>(), Ok(Status::Present));
        assert_eq!(" canceled ".parse::<Status>(), Ok(Status::Cancelled));
        assert!("late".parse::<Status>().is_err());
    }

    #[test]
    fn it_rejects_blank_names() {
        let appt = Appointment::new("  ", "Dupont", Status::Present);
        assert_eq!(appt.validate(), Err(InvalidAppointment::MissingFirstName));
        let appt = Appointment::new("Jean", "", Status::Present);
        assert_eq!(appt.validate(), Err(InvalidAppointment::MissingLastName));
        let appt = Appointment::new(" Jean ", "Dupont", Status::Absent);
        assert_eq!(appt.validate(), Ok(()));
        assert_eq!(appt.display_name(), "Jean Dupont");
    }
}
