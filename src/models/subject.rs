use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub department: String,
    pub credits: i64,
    pub semester: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSubjectRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "department must not be empty"))]
    pub department: String,
    #[validate(range(min = 1, message = "credits must be at least 1"))]
    pub credits: i64,
    pub semester: Option<i64>,
}
