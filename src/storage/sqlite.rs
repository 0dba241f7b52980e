use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::models::{
    AssignmentStatus, Division, ExcelUpload, Faculty, FacultyWithWorkload, NewDivisionRequest,
    NewExcelUploadRequest, NewFacultyRequest, NewSubjectRequest, NewTimetableSlotRequest,
    NewWorkloadAssignmentRequest, Subject, TimetableSlot, TimetableSlotDetails,
    UpdateFacultyRequest, UpdateTimetableSlotRequest, UpdateUploadStatusRequest, UploadStatus,
    WorkloadAssignment, WorkloadAssignmentDetails,
};

use super::{DashboardStats, Storage, generated_filename, round_one_decimal};

const FACULTY_COLUMNS: &str = "id, name, email, position, department, max_hours, current_hours";
const SUBJECT_COLUMNS: &str = "id, name, code, department, credits, semester";
const DIVISION_COLUMNS: &str =
    "id, name, code, department, semester, academic_year, student_count";
const ASSIGNMENT_COLUMNS: &str =
    "id, faculty_id, subject_id, division_id, kind, hours_per_week, classroom, status";
const SLOT_COLUMNS: &str =
    "id, division_id, faculty_id, subject_id, day_of_week, start_time, end_time, classroom, kind";
const UPLOAD_COLUMNS: &str =
    "id, filename, original_name, file_size, status, uploaded_at, processed_rows, total_rows";

/// Relational adapter over sqlite. Assignment bookkeeping runs inside a
/// transaction so the row mutation and the faculty hour adjustment commit
/// together.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn faculty_map(&self) -> Result<HashMap<i64, Faculty>, AppError> {
        Ok(self
            .fetch_faculty()
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect())
    }

    async fn subject_map(&self) -> Result<HashMap<i64, Subject>, AppError> {
        Ok(self
            .fetch_subjects()
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect())
    }

    async fn division_map(&self) -> Result<HashMap<i64, Division>, AppError> {
        Ok(self
            .fetch_divisions()
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect())
    }

    /// Resolves the referenced rows for each assignment. Rows whose
    /// references no longer exist are skipped rather than failing the read.
    async fn join_assignments(
        &self,
        assignments: Vec<WorkloadAssignment>,
    ) -> Result<Vec<WorkloadAssignmentDetails>, AppError> {
        let faculty = self.faculty_map().await?;
        let subjects = self.subject_map().await?;
        let divisions = self.division_map().await?;

        Ok(assignments
            .into_iter()
            .filter_map(|assignment| {
                match (
                    faculty.get(&assignment.faculty_id),
                    subjects.get(&assignment.subject_id),
                    divisions.get(&assignment.division_id),
                ) {
                    (Some(f), Some(s), Some(d)) => Some(WorkloadAssignmentDetails {
                        assignment,
                        faculty: f.clone(),
                        subject: s.clone(),
                        division: d.clone(),
                    }),
                    _ => {
                        warn!("skipping assignment {} with dangling reference", assignment.id);
                        None
                    }
                }
            })
            .collect())
    }

    async fn join_slots(
        &self,
        slots: Vec<TimetableSlot>,
    ) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let faculty = self.faculty_map().await?;
        let subjects = self.subject_map().await?;
        let divisions = self.division_map().await?;

        Ok(slots
            .into_iter()
            .filter_map(|slot| {
                match (
                    faculty.get(&slot.faculty_id),
                    subjects.get(&slot.subject_id),
                    divisions.get(&slot.division_id),
                ) {
                    (Some(f), Some(s), Some(d)) => Some(TimetableSlotDetails {
                        slot,
                        faculty: f.clone(),
                        subject: s.clone(),
                        division: d.clone(),
                    }),
                    _ => {
                        warn!("skipping timetable slot {} with dangling reference", slot.id);
                        None
                    }
                }
            })
            .collect())
    }

    async fn find_assignment_row(
        &self,
        id: i64,
    ) -> Result<Option<WorkloadAssignment>, AppError> {
        let row = sqlx::query_as::<_, WorkloadAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM workload_assignments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_slot_row(&self, id: i64) -> Result<Option<TimetableSlot>, AppError> {
        let row = sqlx::query_as::<_, TimetableSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM timetable_slots WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ensure_references(
        &self,
        faculty_id: i64,
        subject_id: i64,
        division_id: i64,
    ) -> Result<(), AppError> {
        if self.find_faculty(faculty_id).await?.is_none() {
            return Err(AppError::NotFound("Faculty"));
        }
        if self.find_subject(subject_id).await?.is_none() {
            return Err(AppError::NotFound("Subject"));
        }
        if self.find_division(division_id).await?.is_none() {
            return Err(AppError::NotFound("Division"));
        }
        Ok(())
    }
}

/// Maps a unique-constraint violation on insert/update to a conflict.
fn unique_conflict(err: sqlx::Error, what: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn fetch_faculty(&self) -> Result<Vec<Faculty>, AppError> {
        let rows = sqlx::query_as::<_, Faculty>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_faculty(&self, id: i64) -> Result<Option<Faculty>, AppError> {
        let row = sqlx::query_as::<_, Faculty>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn faculty_with_workload(
        &self,
        id: i64,
    ) -> Result<Option<FacultyWithWorkload>, AppError> {
        let Some(faculty) = self.find_faculty(id).await? else {
            return Ok(None);
        };
        let assignments = self.assignments_by_faculty(id).await?;
        Ok(Some(FacultyWithWorkload {
            faculty,
            assignments,
        }))
    }

    async fn insert_faculty(&self, req: NewFacultyRequest) -> Result<Faculty, AppError> {
        let max_hours = req.position.max_hours();
        let result = sqlx::query(
            "INSERT INTO faculty (name, email, position, department, max_hours, current_hours) \
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(req.position)
        .bind(&req.department)
        .bind(max_hours)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_conflict(e, "faculty email"))?;

        Ok(Faculty {
            id: result.last_insert_rowid(),
            name: req.name,
            email: req.email,
            position: req.position,
            department: req.department,
            max_hours,
            current_hours: 0,
        })
    }

    async fn update_faculty(
        &self,
        id: i64,
        req: UpdateFacultyRequest,
    ) -> Result<Option<Faculty>, AppError> {
        let Some(mut current) = self.find_faculty(id).await? else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            current.name = name;
        }
        if let Some(email) = req.email {
            current.email = email;
        }
        if let Some(position) = req.position {
            current.position = position;
            current.max_hours = position.max_hours();
        }
        if let Some(department) = req.department {
            current.department = department;
        }

        sqlx::query(
            "UPDATE faculty SET name = ?, email = ?, position = ?, department = ?, max_hours = ? \
             WHERE id = ?",
        )
        .bind(&current.name)
        .bind(&current.email)
        .bind(current.position)
        .bind(&current.department)
        .bind(current.max_hours)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_conflict(e, "faculty email"))?;

        Ok(Some(current))
    }

    async fn set_faculty_hours(&self, id: i64, hours: i64) -> Result<Option<Faculty>, AppError> {
        let result = sqlx::query("UPDATE faculty SET current_hours = ? WHERE id = ?")
            .bind(hours)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_faculty(id).await
    }

    async fn fetch_subjects(&self) -> Result<Vec<Subject>, AppError> {
        let rows = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn subjects_by_department(&self, department: &str) -> Result<Vec<Subject>, AppError> {
        let rows = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE department = ? ORDER BY id"
        ))
        .bind(department)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_subject(&self, id: i64) -> Result<Option<Subject>, AppError> {
        let row = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_subject(&self, req: NewSubjectRequest) -> Result<Subject, AppError> {
        let result = sqlx::query(
            "INSERT INTO subjects (name, code, department, credits, semester) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&req.name)
        .bind(&req.code)
        .bind(&req.department)
        .bind(req.credits)
        .bind(req.semester)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_conflict(e, "subject code"))?;

        Ok(Subject {
            id: result.last_insert_rowid(),
            name: req.name,
            code: req.code,
            department: req.department,
            credits: req.credits,
            semester: req.semester,
        })
    }

    async fn fetch_divisions(&self) -> Result<Vec<Division>, AppError> {
        let rows = sqlx::query_as::<_, Division>(&format!(
            "SELECT {DIVISION_COLUMNS} FROM divisions ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn divisions_by_department(&self, department: &str) -> Result<Vec<Division>, AppError> {
        let rows = sqlx::query_as::<_, Division>(&format!(
            "SELECT {DIVISION_COLUMNS} FROM divisions WHERE department = ? ORDER BY id"
        ))
        .bind(department)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_division(&self, id: i64) -> Result<Option<Division>, AppError> {
        let row = sqlx::query_as::<_, Division>(&format!(
            "SELECT {DIVISION_COLUMNS} FROM divisions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_division(&self, req: NewDivisionRequest) -> Result<Division, AppError> {
        let result = sqlx::query(
            "INSERT INTO divisions (name, code, department, semester, academic_year, student_count) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&req.name)
        .bind(&req.code)
        .bind(&req.department)
        .bind(req.semester)
        .bind(&req.academic_year)
        .bind(req.student_count)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_conflict(e, "division code"))?;

        Ok(Division {
            id: result.last_insert_rowid(),
            name: req.name,
            code: req.code,
            department: req.department,
            semester: req.semester,
            academic_year: req.academic_year,
            student_count: req.student_count,
        })
    }

    async fn fetch_assignments(&self) -> Result<Vec<WorkloadAssignmentDetails>, AppError> {
        let rows = sqlx::query_as::<_, WorkloadAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM workload_assignments ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        self.join_assignments(rows).await
    }

    async fn find_assignment(
        &self,
        id: i64,
    ) -> Result<Option<WorkloadAssignmentDetails>, AppError> {
        let Some(row) = self.find_assignment_row(id).await? else {
            return Ok(None);
        };
        Ok(self.join_assignments(vec![row]).await?.into_iter().next())
    }

    async fn assignments_by_faculty(
        &self,
        faculty_id: i64,
    ) -> Result<Vec<WorkloadAssignmentDetails>, AppError> {
        let rows = sqlx::query_as::<_, WorkloadAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM workload_assignments WHERE faculty_id = ? ORDER BY id"
        ))
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;
        self.join_assignments(rows).await
    }

    async fn insert_assignment(
        &self,
        req: NewWorkloadAssignmentRequest,
    ) -> Result<WorkloadAssignment, AppError> {
        let mut tx = self.pool.begin().await?;

        let faculty_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM faculty WHERE id = ?")
                .bind(req.faculty_id)
                .fetch_optional(&mut *tx)
                .await?;
        if faculty_id.is_none() {
            return Err(AppError::NotFound("Faculty"));
        }
        let subject_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM subjects WHERE id = ?")
                .bind(req.subject_id)
                .fetch_optional(&mut *tx)
                .await?;
        if subject_id.is_none() {
            return Err(AppError::NotFound("Subject"));
        }
        let division_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM divisions WHERE id = ?")
                .bind(req.division_id)
                .fetch_optional(&mut *tx)
                .await?;
        if division_id.is_none() {
            return Err(AppError::NotFound("Division"));
        }

        let result = sqlx::query(
            "INSERT INTO workload_assignments \
             (faculty_id, subject_id, division_id, kind, hours_per_week, classroom, status) \
             VALUES (?, ?, ?, ?, ?, ?, 'assigned')",
        )
        .bind(req.faculty_id)
        .bind(req.subject_id)
        .bind(req.division_id)
        .bind(req.kind)
        .bind(req.hours_per_week)
        .bind(&req.classroom)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE faculty SET current_hours = current_hours + ? WHERE id = ?")
            .bind(req.hours_per_week)
            .bind(req.faculty_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(WorkloadAssignment {
            id: result.last_insert_rowid(),
            faculty_id: req.faculty_id,
            subject_id: req.subject_id,
            division_id: req.division_id,
            kind: req.kind,
            hours_per_week: req.hours_per_week,
            classroom: req.classroom,
            status: AssignmentStatus::Assigned,
        })
    }

    async fn set_assignment_status(
        &self,
        id: i64,
        status: AssignmentStatus,
    ) -> Result<Option<WorkloadAssignment>, AppError> {
        let result = sqlx::query("UPDATE workload_assignments SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_assignment_row(id).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, WorkloadAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM workload_assignments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(assignment) = existing else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM workload_assignments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE faculty SET current_hours = MAX(0, current_hours - ?) WHERE id = ?")
            .bind(assignment.hours_per_week)
            .bind(assignment.faculty_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn fetch_slots(&self) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let rows = sqlx::query_as::<_, TimetableSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM timetable_slots ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        self.join_slots(rows).await
    }

    async fn slots_by_division(
        &self,
        division_id: i64,
    ) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let rows = sqlx::query_as::<_, TimetableSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM timetable_slots WHERE division_id = ? ORDER BY id"
        ))
        .bind(division_id)
        .fetch_all(&self.pool)
        .await?;
        self.join_slots(rows).await
    }

    async fn slots_by_faculty(
        &self,
        faculty_id: i64,
    ) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let rows = sqlx::query_as::<_, TimetableSlot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM timetable_slots WHERE faculty_id = ? ORDER BY id"
        ))
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;
        self.join_slots(rows).await
    }

    async fn insert_slot(&self, req: NewTimetableSlotRequest) -> Result<TimetableSlot, AppError> {
        self.ensure_references(req.faculty_id, req.subject_id, req.division_id)
            .await?;

        let result = sqlx::query(
            "INSERT INTO timetable_slots \
             (division_id, faculty_id, subject_id, day_of_week, start_time, end_time, classroom, kind) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(req.division_id)
        .bind(req.faculty_id)
        .bind(req.subject_id)
        .bind(req.day_of_week)
        .bind(&req.start_time)
        .bind(&req.end_time)
        .bind(&req.classroom)
        .bind(req.kind)
        .execute(&self.pool)
        .await?;

        Ok(TimetableSlot {
            id: result.last_insert_rowid(),
            division_id: req.division_id,
            faculty_id: req.faculty_id,
            subject_id: req.subject_id,
            day_of_week: req.day_of_week,
            start_time: req.start_time,
            end_time: req.end_time,
            classroom: req.classroom,
            kind: req.kind,
        })
    }

    async fn update_slot(
        &self,
        id: i64,
        req: UpdateTimetableSlotRequest,
    ) -> Result<Option<TimetableSlot>, AppError> {
        let Some(mut current) = self.find_slot_row(id).await? else {
            return Ok(None);
        };
        if let Some(division_id) = req.division_id {
            current.division_id = division_id;
        }
        if let Some(faculty_id) = req.faculty_id {
            current.faculty_id = faculty_id;
        }
        if let Some(subject_id) = req.subject_id {
            current.subject_id = subject_id;
        }
        if let Some(day_of_week) = req.day_of_week {
            current.day_of_week = day_of_week;
        }
        if let Some(start_time) = req.start_time {
            current.start_time = start_time;
        }
        if let Some(end_time) = req.end_time {
            current.end_time = end_time;
        }
        if let Some(classroom) = req.classroom {
            current.classroom = classroom;
        }
        if let Some(kind) = req.kind {
            current.kind = kind;
        }

        sqlx::query(
            "UPDATE timetable_slots SET division_id = ?, faculty_id = ?, subject_id = ?, \
             day_of_week = ?, start_time = ?, end_time = ?, classroom = ?, kind = ? WHERE id = ?",
        )
        .bind(current.division_id)
        .bind(current.faculty_id)
        .bind(current.subject_id)
        .bind(current.day_of_week)
        .bind(&current.start_time)
        .bind(&current.end_time)
        .bind(&current.classroom)
        .bind(current.kind)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(current))
    }

    async fn delete_slot(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM timetable_slots WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_uploads(&self) -> Result<Vec<ExcelUpload>, AppError> {
        let rows = sqlx::query_as::<_, ExcelUpload>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM excel_uploads ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_upload(&self, req: NewExcelUploadRequest) -> Result<ExcelUpload, AppError> {
        let filename = req.filename.unwrap_or_else(generated_filename);
        let uploaded_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO excel_uploads \
             (filename, original_name, file_size, status, uploaded_at, processed_rows, total_rows) \
             VALUES (?, ?, ?, 'processing', ?, 0, 0)",
        )
        .bind(&filename)
        .bind(&req.original_name)
        .bind(req.file_size)
        .bind(&uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(ExcelUpload {
            id: result.last_insert_rowid(),
            filename,
            original_name: req.original_name,
            file_size: req.file_size,
            status: UploadStatus::Processing,
            uploaded_at,
            processed_rows: 0,
            total_rows: 0,
        })
    }

    async fn set_upload_status(
        &self,
        id: i64,
        req: UpdateUploadStatusRequest,
    ) -> Result<Option<ExcelUpload>, AppError> {
        let existing = sqlx::query_as::<_, ExcelUpload>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM excel_uploads WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(mut current) = existing else {
            return Ok(None);
        };

        current.status = req.status;
        if let Some(processed_rows) = req.processed_rows {
            current.processed_rows = processed_rows;
        }
        if let Some(total_rows) = req.total_rows {
            current.total_rows = total_rows;
        }

        sqlx::query(
            "UPDATE excel_uploads SET status = ?, processed_rows = ?, total_rows = ? WHERE id = ?",
        )
        .bind(current.status)
        .bind(current.processed_rows)
        .bind(current.total_rows)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(current))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let total_faculty: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM faculty")
            .fetch_one(&self.pool)
            .await?;
        let active_courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
            .fetch_one(&self.pool)
            .await?;
        let pending_tasks: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workload_assignments WHERE status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await?;
        let avg_workload: Option<f64> =
            sqlx::query_scalar("SELECT AVG(current_hours) FROM faculty")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardStats {
            total_faculty,
            active_courses,
            pending_tasks,
            avg_workload: round_one_decimal(avg_workload.unwrap_or(0.0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::models::{AssignmentKind, Position, Weekday};

    async fn setup() -> SqliteStorage {
        // In-memory sqlite gives each connection its own database, so the
        // test pool is pinned to a single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        SqliteStorage::new(pool)
    }

    async fn seed_references(storage: &SqliteStorage) -> (Faculty, Subject, Division) {
        let faculty = storage
            .insert_faculty(NewFacultyRequest {
                name: "Dr. Rajesh Kumar".to_string(),
                email: "rajesh.kumar@college.edu".to_string(),
                position: Position::Professor,
                department: "Computer Science".to_string(),
            })
            .await
            .expect("Failed to insert faculty");
        let subject = storage
            .insert_subject(NewSubjectRequest {
                name: "Advanced Algorithms".to_string(),
                code: "CS401".to_string(),
                department: "Computer Science".to_string(),
                credits: 4,
                semester: Some(6),
            })
            .await
            .expect("Failed to insert subject");
        let division = storage
            .insert_division(NewDivisionRequest {
                name: "Computer Engineering - Division A".to_string(),
                code: "CE-A".to_string(),
                department: "Computer Science".to_string(),
                semester: 6,
                academic_year: "2024-25".to_string(),
                student_count: 72,
            })
            .await
            .expect("Failed to insert division");
        (faculty, subject, division)
    }

    #[tokio::test]
    async fn insert_and_fetch_faculty() {
        let storage = setup().await;
        let (faculty, _, _) = seed_references(&storage).await;

        assert_eq!(faculty.max_hours, 14);
        assert_eq!(faculty.current_hours, 0);

        let all = storage.fetch_faculty().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "rajesh.kumar@college.edu");

        let found = storage.find_faculty(faculty.id).await.unwrap().unwrap();
        assert_eq!(found.position, Position::Professor);
        assert!(storage.find_faculty(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let storage = setup().await;
        seed_references(&storage).await;

        let err = storage
            .insert_faculty(NewFacultyRequest {
                name: "Dr. Sarah Wilson".to_string(),
                email: "rajesh.kumar@college.edu".to_string(),
                position: Position::Professor,
                department: "Computer Science".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn assignment_bookkeeping_is_transactional() {
        let storage = setup().await;
        let (faculty, subject, division) = seed_references(&storage).await;

        let assignment = storage
            .insert_assignment(NewWorkloadAssignmentRequest {
                faculty_id: faculty.id,
                subject_id: subject.id,
                division_id: division.id,
                kind: AssignmentKind::Lecture,
                hours_per_week: 4,
                classroom: Some("CS-101".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Assigned);

        let updated = storage.find_faculty(faculty.id).await.unwrap().unwrap();
        assert_eq!(updated.current_hours, 4);

        let details = storage.fetch_assignments().await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].subject.code, "CS401");
        assert_eq!(details[0].division.code, "CE-A");

        assert!(storage.delete_assignment(assignment.id).await.unwrap());
        let updated = storage.find_faculty(faculty.id).await.unwrap().unwrap();
        assert_eq!(updated.current_hours, 0);

        assert!(!storage.delete_assignment(assignment.id).await.unwrap());
    }

    #[tokio::test]
    async fn assignment_with_unknown_faculty_is_rejected() {
        let storage = setup().await;
        let (_, subject, division) = seed_references(&storage).await;

        let err = storage
            .insert_assignment(NewWorkloadAssignmentRequest {
                faculty_id: 99,
                subject_id: subject.id,
                division_id: division.id,
                kind: AssignmentKind::Lecture,
                hours_per_week: 4,
                classroom: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Faculty")));
        assert!(storage.fetch_assignments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_clamps_hours_at_zero() {
        let storage = setup().await;
        let (faculty, subject, division) = seed_references(&storage).await;

        let assignment = storage
            .insert_assignment(NewWorkloadAssignmentRequest {
                faculty_id: faculty.id,
                subject_id: subject.id,
                division_id: division.id,
                kind: AssignmentKind::Practical,
                hours_per_week: 6,
                classroom: None,
            })
            .await
            .unwrap();

        storage.set_faculty_hours(faculty.id, 2).await.unwrap();
        assert!(storage.delete_assignment(assignment.id).await.unwrap());

        let updated = storage.find_faculty(faculty.id).await.unwrap().unwrap();
        assert_eq!(updated.current_hours, 0);
    }

    #[tokio::test]
    async fn status_patch_and_pending_count() {
        let storage = setup().await;
        let (faculty, subject, division) = seed_references(&storage).await;

        let assignment = storage
            .insert_assignment(NewWorkloadAssignmentRequest {
                faculty_id: faculty.id,
                subject_id: subject.id,
                division_id: division.id,
                kind: AssignmentKind::Tutorial,
                hours_per_week: 2,
                classroom: None,
            })
            .await
            .unwrap();

        let updated = storage
            .set_assignment_status(assignment.id, AssignmentStatus::Pending)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Pending);

        let stats = storage.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_faculty, 1);
        assert_eq!(stats.active_courses, 1);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.avg_workload, 2.0);

        assert!(
            storage
                .set_assignment_status(99, AssignmentStatus::Completed)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn dashboard_stats_empty_database() {
        let storage = setup().await;
        let stats = storage.dashboard_stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_faculty: 0,
                active_courses: 0,
                pending_tasks: 0,
                avg_workload: 0.0,
            }
        );
    }

    #[tokio::test]
    async fn department_filters() {
        let storage = setup().await;
        seed_references(&storage).await;
        storage
            .insert_subject(NewSubjectRequest {
                name: "Linear Algebra".to_string(),
                code: "MATH201".to_string(),
                department: "Mathematics".to_string(),
                credits: 3,
                semester: None,
            })
            .await
            .unwrap();

        let cs = storage.subjects_by_department("Computer Science").await.unwrap();
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].code, "CS401");
        assert!(storage.subjects_by_department("History").await.unwrap().is_empty());

        let divisions = storage
            .divisions_by_department("Computer Science")
            .await
            .unwrap();
        assert_eq!(divisions.len(), 1);
    }

    #[tokio::test]
    async fn slot_round_trip_and_update() {
        let storage = setup().await;
        let (faculty, subject, division) = seed_references(&storage).await;

        let slot = storage
            .insert_slot(NewTimetableSlotRequest {
                division_id: division.id,
                faculty_id: faculty.id,
                subject_id: subject.id,
                day_of_week: Weekday::Monday,
                start_time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                classroom: "CS-101".to_string(),
                kind: AssignmentKind::Lecture,
            })
            .await
            .unwrap();

        let by_division = storage.slots_by_division(division.id).await.unwrap();
        assert_eq!(by_division.len(), 1);
        assert_eq!(by_division[0].slot.day_of_week, Weekday::Monday);
        assert_eq!(by_division[0].faculty.id, faculty.id);

        let updated = storage
            .update_slot(
                slot.id,
                UpdateTimetableSlotRequest {
                    classroom: Some("CS-202".to_string()),
                    day_of_week: Some(Weekday::Friday),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.classroom, "CS-202");
        assert_eq!(updated.day_of_week, Weekday::Friday);
        assert_eq!(updated.start_time, "09:00");

        assert!(storage.delete_slot(slot.id).await.unwrap());
        assert!(!storage.delete_slot(slot.id).await.unwrap());
    }

    #[tokio::test]
    async fn upload_status_round_trip() {
        let storage = setup().await;

        let upload = storage
            .insert_upload(NewExcelUploadRequest {
                filename: Some("workloads-2024.xlsx".to_string()),
                original_name: "workloads.xlsx".to_string(),
                file_size: 8192,
            })
            .await
            .unwrap();
        assert_eq!(upload.status, UploadStatus::Processing);
        assert_eq!(upload.filename, "workloads-2024.xlsx");

        let updated = storage
            .set_upload_status(
                upload.id,
                UpdateUploadStatusRequest {
                    status: UploadStatus::Completed,
                    processed_rows: Some(128),
                    total_rows: Some(128),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, UploadStatus::Completed);
        assert_eq!(updated.processed_rows, 128);

        let uploads = storage.fetch_uploads().await.unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].status, UploadStatus::Completed);
    }
}
