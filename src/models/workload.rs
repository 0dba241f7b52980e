use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::division::Division;
use super::faculty::Faculty;
use super::subject::Subject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssignmentKind {
    Lecture,
    Tutorial,
    Practical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Pending,
    Completed,
}

/// A recurring weekly teaching duty linking one faculty member, one subject
/// and one division. Creating or deleting one also moves the owning faculty
/// member's `currentHours`, so those writes go through the storage layer as
/// a single unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadAssignment {
    pub id: i64,
    pub faculty_id: i64,
    pub subject_id: i64,
    pub division_id: i64,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
    pub hours_per_week: i64,
    pub classroom: Option<String>,
    pub status: AssignmentStatus,
}

/// Assignment with the referenced records embedded, as served by the list
/// endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadAssignmentDetails {
    #[serde(flatten)]
    pub assignment: WorkloadAssignment,
    pub faculty: Faculty,
    pub subject: Subject,
    pub division: Division,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkloadAssignmentRequest {
    pub faculty_id: i64,
    pub subject_id: i64,
    pub division_id: i64,
    #[serde(rename = "type")]
    pub kind: AssignmentKind,
    #[validate(range(min = 1, max = 20, message = "hoursPerWeek must be between 1 and 20"))]
    pub hours_per_week: i64,
    pub classroom: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssignmentStatusRequest {
    pub status: AssignmentStatus,
}
