use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub department: String,
    pub semester: i64,
    pub academic_year: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDivisionRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "department must not be empty"))]
    pub department: String,
    #[validate(range(min = 1, message = "semester must be at least 1"))]
    pub semester: i64,
    #[validate(length(min = 1, message = "academicYear must not be empty"))]
    pub academic_year: String,
    #[validate(range(min = 0, message = "studentCount must not be negative"))]
    pub student_count: i64,
}
