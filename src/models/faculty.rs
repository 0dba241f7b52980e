use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::workload::WorkloadAssignmentDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Position {
    Professor,
    AssociateProfessor,
    AssistantProfessor,
}

impl Position {
    /// Weekly teaching cap attached to the academic position.
    pub fn max_hours(self) -> i64 {
        match self {
            Position::Professor => 14,
            Position::AssociateProfessor => 16,
            Position::AssistantProfessor => 18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub position: Position,
    pub department: String,
    pub max_hours: i64,
    pub current_hours: i64,
}

/// Faculty record enriched with its workload assignments, as returned by
/// the item endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyWithWorkload {
    #[serde(flatten)]
    pub faculty: Faculty,
    pub assignments: Vec<WorkloadAssignmentDetails>,
}

/// `maxHours` and `currentHours` are server-assigned; the payload cannot
/// set them.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFacultyRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub position: Position,
    #[validate(length(min = 1, message = "department must not be empty"))]
    pub department: String,
}

/// `currentHours` here is an explicit overwrite; routine hour bookkeeping
/// happens inside assignment create/delete instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacultyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<Position>,
    pub department: Option<String>,
    pub current_hours: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_hours_follows_position() {
        assert_eq!(Position::Professor.max_hours(), 14);
        assert_eq!(Position::AssociateProfessor.max_hours(), 16);
        assert_eq!(Position::AssistantProfessor.max_hours(), 18);
    }

    #[test]
    fn position_uses_snake_case_on_the_wire() {
        let position: Position = serde_json::from_str("\"associate_professor\"").unwrap();
        assert_eq!(position, Position::AssociateProfessor);
        assert_eq!(
            serde_json::to_string(&Position::AssistantProfessor).unwrap(),
            "\"assistant_professor\""
        );
    }

    #[test]
    fn faculty_serializes_camel_case() {
        let faculty = Faculty {
            id: 1,
            name: "Dr. Rajesh Kumar".to_string(),
            email: "rajesh.kumar@college.edu".to_string(),
            position: Position::Professor,
            department: "Computer Science".to_string(),
            max_hours: 14,
            current_hours: 0,
        };
        let json = serde_json::to_value(&faculty).unwrap();
        assert_eq!(json["maxHours"], 14);
        assert_eq!(json["currentHours"], 0);
    }
}
