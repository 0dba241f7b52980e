use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::division::Division;
use super::faculty::Faculty;
use super::subject::Subject;
use super::workload::AssignmentKind;

/// Day of the week for a timetable slot. Serialized as a lowercase day name
/// and stored as 0-6 (Monday-Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
    pub id: i64,
    pub division_id: i64,
    pub faculty_id: i64,
    pub subject_id: i64,
    pub day_of_week: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub classroom: String,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlotDetails {
    #[serde(flatten)]
    pub slot: TimetableSlot,
    pub faculty: Faculty,
    pub subject: Subject,
    pub division: Division,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTimetableSlotRequest {
    pub division_id: i64,
    pub faculty_id: i64,
    pub subject_id: i64,
    pub day_of_week: Weekday,
    #[validate(custom(function = "validate_clock_time", message = "startTime must be HH:MM"))]
    pub start_time: String,
    #[validate(custom(function = "validate_clock_time", message = "endTime must be HH:MM"))]
    pub end_time: String,
    #[validate(length(min = 1, message = "classroom must not be empty"))]
    pub classroom: String,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimetableSlotRequest {
    pub division_id: Option<i64>,
    pub faculty_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub day_of_week: Option<Weekday>,
    #[validate(custom(function = "validate_clock_time", message = "startTime must be HH:MM"))]
    pub start_time: Option<String>,
    #[validate(custom(function = "validate_clock_time", message = "endTime must be HH:MM"))]
    pub end_time: Option<String>,
    pub classroom: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AssignmentKind>,
}

/// Accepts "HH:MM" on a 24-hour clock, nothing else.
fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    let well_formed = value.is_ascii()
        && value.len() == 5
        && value.as_bytes()[2] == b':'
        && value[..2].parse::<u32>().map(|h| h < 24).unwrap_or(false)
        && value[3..].parse::<u32>().map(|m| m < 60).unwrap_or(false);
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("clock_time"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_accepts_24h_values() {
        assert!(validate_clock_time("00:00").is_ok());
        assert!(validate_clock_time("09:30").is_ok());
        assert!(validate_clock_time("23:59").is_ok());
    }

    #[test]
    fn clock_time_rejects_malformed_values() {
        assert!(validate_clock_time("24:00").is_err());
        assert!(validate_clock_time("09:60").is_err());
        assert!(validate_clock_time("9:00").is_err());
        assert!(validate_clock_time("0900").is_err());
        assert!(validate_clock_time("ab:cd").is_err());
    }

    #[test]
    fn weekday_uses_day_names_on_the_wire() {
        let day: Weekday = serde_json::from_str("\"wednesday\"").unwrap();
        assert_eq!(day, Weekday::Wednesday);
        assert_eq!(serde_json::to_string(&Weekday::Sunday).unwrap(), "\"sunday\"");
    }
}
