pub mod memory;
pub mod sqlite;

pub use memory::MemStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{
    AssignmentStatus, Division, ExcelUpload, Faculty, FacultyWithWorkload, NewDivisionRequest,
    NewExcelUploadRequest, NewFacultyRequest, NewSubjectRequest, NewTimetableSlotRequest,
    NewWorkloadAssignmentRequest, Subject, TimetableSlot, TimetableSlotDetails,
    UpdateFacultyRequest, UpdateTimetableSlotRequest, UpdateUploadStatusRequest, WorkloadAssignment,
    WorkloadAssignmentDetails,
};

/// Summary counters for the dashboard, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_faculty: i64,
    pub active_courses: i64,
    pub pending_tasks: i64,
    pub avg_workload: f64,
}

/// Single source of truth for all entities. Two adapters exist: a sqlite
/// one for production and an in-memory one for tests and demos, selected
/// by configuration.
///
/// Creating or deleting a workload assignment adjusts the owning faculty
/// member's `current_hours` within the same call, atomically; callers never
/// do that bookkeeping themselves. Missing-id lookups resolve to `Ok(None)`
/// (or `Ok(false)` for deletes) so the HTTP layer can map them to 404s.
#[async_trait]
pub trait Storage: Send + Sync {
    // Faculty
    async fn fetch_faculty(&self) -> Result<Vec<Faculty>, AppError>;
    async fn find_faculty(&self, id: i64) -> Result<Option<Faculty>, AppError>;
    async fn faculty_with_workload(&self, id: i64)
        -> Result<Option<FacultyWithWorkload>, AppError>;
    async fn insert_faculty(&self, req: NewFacultyRequest) -> Result<Faculty, AppError>;
    async fn update_faculty(
        &self,
        id: i64,
        req: UpdateFacultyRequest,
    ) -> Result<Option<Faculty>, AppError>;
    /// Unconditional overwrite of `current_hours`; used by seeding and the
    /// workload PATCH surface, not by assignment bookkeeping.
    async fn set_faculty_hours(&self, id: i64, hours: i64) -> Result<Option<Faculty>, AppError>;

    // Subjects
    async fn fetch_subjects(&self) -> Result<Vec<Subject>, AppError>;
    async fn subjects_by_department(&self, department: &str) -> Result<Vec<Subject>, AppError>;
    async fn find_subject(&self, id: i64) -> Result<Option<Subject>, AppError>;
    async fn insert_subject(&self, req: NewSubjectRequest) -> Result<Subject, AppError>;

    // Divisions
    async fn fetch_divisions(&self) -> Result<Vec<Division>, AppError>;
    async fn divisions_by_department(&self, department: &str) -> Result<Vec<Division>, AppError>;
    async fn find_division(&self, id: i64) -> Result<Option<Division>, AppError>;
    async fn insert_division(&self, req: NewDivisionRequest) -> Result<Division, AppError>;

    // Workload assignments
    async fn fetch_assignments(&self) -> Result<Vec<WorkloadAssignmentDetails>, AppError>;
    async fn find_assignment(&self, id: i64)
        -> Result<Option<WorkloadAssignmentDetails>, AppError>;
    async fn assignments_by_faculty(
        &self,
        faculty_id: i64,
    ) -> Result<Vec<WorkloadAssignmentDetails>, AppError>;
    async fn insert_assignment(
        &self,
        req: NewWorkloadAssignmentRequest,
    ) -> Result<WorkloadAssignment, AppError>;
    async fn set_assignment_status(
        &self,
        id: i64,
        status: AssignmentStatus,
    ) -> Result<Option<WorkloadAssignment>, AppError>;
    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError>;

    // Timetable slots
    async fn fetch_slots(&self) -> Result<Vec<TimetableSlotDetails>, AppError>;
    async fn slots_by_division(
        &self,
        division_id: i64,
    ) -> Result<Vec<TimetableSlotDetails>, AppError>;
    async fn slots_by_faculty(&self, faculty_id: i64)
        -> Result<Vec<TimetableSlotDetails>, AppError>;
    async fn insert_slot(&self, req: NewTimetableSlotRequest)
        -> Result<TimetableSlot, AppError>;
    async fn update_slot(
        &self,
        id: i64,
        req: UpdateTimetableSlotRequest,
    ) -> Result<Option<TimetableSlot>, AppError>;
    async fn delete_slot(&self, id: i64) -> Result<bool, AppError>;

    // Excel uploads
    async fn fetch_uploads(&self) -> Result<Vec<ExcelUpload>, AppError>;
    async fn insert_upload(&self, req: NewExcelUploadRequest) -> Result<ExcelUpload, AppError>;
    async fn set_upload_status(
        &self,
        id: i64,
        req: UpdateUploadStatusRequest,
    ) -> Result<Option<ExcelUpload>, AppError>;

    // Dashboard
    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError>;
}

/// Average workload is reported with one decimal place by both adapters.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Stored filename for an upload when the caller does not supply one.
pub(crate) fn generated_filename() -> String {
    format!("{}.xlsx", uuid::Uuid::new_v4())
}
