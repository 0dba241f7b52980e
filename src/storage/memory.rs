use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
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

#[derive(Default)]
struct NextIds {
    faculty: i64,
    subjects: i64,
    divisions: i64,
    assignments: i64,
    slots: i64,
    uploads: i64,
}

#[derive(Default)]
struct Inner {
    faculty: HashMap<i64, Faculty>,
    subjects: HashMap<i64, Subject>,
    divisions: HashMap<i64, Division>,
    assignments: HashMap<i64, WorkloadAssignment>,
    slots: HashMap<i64, TimetableSlot>,
    uploads: HashMap<i64, ExcelUpload>,
    next: NextIds,
}

impl Inner {
    fn assignment_details(&self, assignment: &WorkloadAssignment) -> Option<WorkloadAssignmentDetails> {
        let faculty = self.faculty.get(&assignment.faculty_id)?;
        let subject = self.subjects.get(&assignment.subject_id)?;
        let division = self.divisions.get(&assignment.division_id)?;
        Some(WorkloadAssignmentDetails {
            assignment: assignment.clone(),
            faculty: faculty.clone(),
            subject: subject.clone(),
            division: division.clone(),
        })
    }

    fn slot_details(&self, slot: &TimetableSlot) -> Option<TimetableSlotDetails> {
        let faculty = self.faculty.get(&slot.faculty_id)?;
        let subject = self.subjects.get(&slot.subject_id)?;
        let division = self.divisions.get(&slot.division_id)?;
        Some(TimetableSlotDetails {
            slot: slot.clone(),
            faculty: faculty.clone(),
            subject: subject.clone(),
            division: division.clone(),
        })
    }

    fn assignments_sorted(&self) -> Vec<&WorkloadAssignment> {
        let mut assignments: Vec<_> = self.assignments.values().collect();
        assignments.sort_by_key(|a| a.id);
        assignments
    }

    fn slots_sorted(&self) -> Vec<&TimetableSlot> {
        let mut slots: Vec<_> = self.slots.values().collect();
        slots.sort_by_key(|s| s.id);
        slots
    }
}

/// In-memory adapter backed by per-entity maps and id counters. Every
/// operation takes the single lock once, so assignment bookkeeping is
/// naturally atomic.
pub struct MemStorage {
    inner: RwLock<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn fetch_faculty(&self) -> Result<Vec<Faculty>, AppError> {
        let inner = self.inner.read().await;
        let mut faculty: Vec<_> = inner.faculty.values().cloned().collect();
        faculty.sort_by_key(|f| f.id);
        Ok(faculty)
    }

    async fn find_faculty(&self, id: i64) -> Result<Option<Faculty>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.faculty.get(&id).cloned())
    }

    async fn faculty_with_workload(
        &self,
        id: i64,
    ) -> Result<Option<FacultyWithWorkload>, AppError> {
        let inner = self.inner.read().await;
        let Some(faculty) = inner.faculty.get(&id) else {
            return Ok(None);
        };
        let assignments = inner
            .assignments_sorted()
            .into_iter()
            .filter(|a| a.faculty_id == id)
            .filter_map(|a| inner.assignment_details(a))
            .collect();
        Ok(Some(FacultyWithWorkload {
            faculty: faculty.clone(),
            assignments,
        }))
    }

    async fn insert_faculty(&self, req: NewFacultyRequest) -> Result<Faculty, AppError> {
        let mut inner = self.inner.write().await;
        if inner.faculty.values().any(|f| f.email == req.email) {
            return Err(AppError::Conflict(format!(
                "faculty email '{}' already exists",
                req.email
            )));
        }
        inner.next.faculty += 1;
        let faculty = Faculty {
            id: inner.next.faculty,
            name: req.name,
            email: req.email,
            position: req.position,
            department: req.department,
            max_hours: req.position.max_hours(),
            current_hours: 0,
        };
        inner.faculty.insert(faculty.id, faculty.clone());
        Ok(faculty)
    }

    async fn update_faculty(
        &self,
        id: i64,
        req: UpdateFacultyRequest,
    ) -> Result<Option<Faculty>, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.faculty.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &req.email {
            if inner.faculty.values().any(|f| f.id != id && &f.email == email) {
                return Err(AppError::Conflict(format!(
                    "faculty email '{email}' already exists"
                )));
            }
        }
        let Some(faculty) = inner.faculty.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            faculty.name = name;
        }
        if let Some(email) = req.email {
            faculty.email = email;
        }
        if let Some(position) = req.position {
            faculty.position = position;
            faculty.max_hours = position.max_hours();
        }
        if let Some(department) = req.department {
            faculty.department = department;
        }
        Ok(Some(faculty.clone()))
    }

    async fn set_faculty_hours(&self, id: i64, hours: i64) -> Result<Option<Faculty>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(faculty) = inner.faculty.get_mut(&id) else {
            return Ok(None);
        };
        faculty.current_hours = hours;
        Ok(Some(faculty.clone()))
    }

    async fn fetch_subjects(&self) -> Result<Vec<Subject>, AppError> {
        let inner = self.inner.read().await;
        let mut subjects: Vec<_> = inner.subjects.values().cloned().collect();
        subjects.sort_by_key(|s| s.id);
        Ok(subjects)
    }

    async fn subjects_by_department(&self, department: &str) -> Result<Vec<Subject>, AppError> {
        let mut subjects = self.fetch_subjects().await?;
        subjects.retain(|s| s.department == department);
        Ok(subjects)
    }

    async fn find_subject(&self, id: i64) -> Result<Option<Subject>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.subjects.get(&id).cloned())
    }

    async fn insert_subject(&self, req: NewSubjectRequest) -> Result<Subject, AppError> {
        let mut inner = self.inner.write().await;
        if inner.subjects.values().any(|s| s.code == req.code) {
            return Err(AppError::Conflict(format!(
                "subject code '{}' already exists",
                req.code
            )));
        }
        inner.next.subjects += 1;
        let subject = Subject {
            id: inner.next.subjects,
            name: req.name,
            code: req.code,
            department: req.department,
            credits: req.credits,
            semester: req.semester,
        };
        inner.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    async fn fetch_divisions(&self) -> Result<Vec<Division>, AppError> {
        let inner = self.inner.read().await;
        let mut divisions: Vec<_> = inner.divisions.values().cloned().collect();
        divisions.sort_by_key(|d| d.id);
        Ok(divisions)
    }

    async fn divisions_by_department(&self, department: &str) -> Result<Vec<Division>, AppError> {
        let mut divisions = self.fetch_divisions().await?;
        divisions.retain(|d| d.department == department);
        Ok(divisions)
    }

    async fn find_division(&self, id: i64) -> Result<Option<Division>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.divisions.get(&id).cloned())
    }

    async fn insert_division(&self, req: NewDivisionRequest) -> Result<Division, AppError> {
        let mut inner = self.inner.write().await;
        if inner.divisions.values().any(|d| d.code == req.code) {
            return Err(AppError::Conflict(format!(
                "division code '{}' already exists",
                req.code
            )));
        }
        inner.next.divisions += 1;
        let division = Division {
            id: inner.next.divisions,
            name: req.name,
            code: req.code,
            department: req.department,
            semester: req.semester,
            academic_year: req.academic_year,
            student_count: req.student_count,
        };
        inner.divisions.insert(division.id, division.clone());
        Ok(division)
    }

    async fn fetch_assignments(&self) -> Result<Vec<WorkloadAssignmentDetails>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .assignments_sorted()
            .into_iter()
            .filter_map(|a| match inner.assignment_details(a) {
                Some(details) => Some(details),
                None => {
                    warn!("skipping assignment {} with dangling reference", a.id);
                    None
                }
            })
            .collect())
    }

    async fn find_assignment(
        &self,
        id: i64,
    ) -> Result<Option<WorkloadAssignmentDetails>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .assignments
            .get(&id)
            .and_then(|a| inner.assignment_details(a)))
    }

    async fn assignments_by_faculty(
        &self,
        faculty_id: i64,
    ) -> Result<Vec<WorkloadAssignmentDetails>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .assignments_sorted()
            .into_iter()
            .filter(|a| a.faculty_id == faculty_id)
            .filter_map(|a| inner.assignment_details(a))
            .collect())
    }

    async fn insert_assignment(
        &self,
        req: NewWorkloadAssignmentRequest,
    ) -> Result<WorkloadAssignment, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.faculty.contains_key(&req.faculty_id) {
            return Err(AppError::NotFound("Faculty"));
        }
        if !inner.subjects.contains_key(&req.subject_id) {
            return Err(AppError::NotFound("Subject"));
        }
        if !inner.divisions.contains_key(&req.division_id) {
            return Err(AppError::NotFound("Division"));
        }
        inner.next.assignments += 1;
        let assignment = WorkloadAssignment {
            id: inner.next.assignments,
            faculty_id: req.faculty_id,
            subject_id: req.subject_id,
            division_id: req.division_id,
            kind: req.kind,
            hours_per_week: req.hours_per_week,
            classroom: req.classroom,
            status: AssignmentStatus::Assigned,
        };
        inner.assignments.insert(assignment.id, assignment.clone());
        if let Some(faculty) = inner.faculty.get_mut(&req.faculty_id) {
            faculty.current_hours += req.hours_per_week;
        }
        Ok(assignment)
    }

    async fn set_assignment_status(
        &self,
        id: i64,
        status: AssignmentStatus,
    ) -> Result<Option<WorkloadAssignment>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(assignment) = inner.assignments.get_mut(&id) else {
            return Ok(None);
        };
        assignment.status = status;
        Ok(Some(assignment.clone()))
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let Some(assignment) = inner.assignments.remove(&id) else {
            return Ok(false);
        };
        if let Some(faculty) = inner.faculty.get_mut(&assignment.faculty_id) {
            faculty.current_hours = (faculty.current_hours - assignment.hours_per_week).max(0);
        }
        Ok(true)
    }

    async fn fetch_slots(&self) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .slots_sorted()
            .into_iter()
            .filter_map(|s| match inner.slot_details(s) {
                Some(details) => Some(details),
                None => {
                    warn!("skipping timetable slot {} with dangling reference", s.id);
                    None
                }
            })
            .collect())
    }

    async fn slots_by_division(
        &self,
        division_id: i64,
    ) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .slots_sorted()
            .into_iter()
            .filter(|s| s.division_id == division_id)
            .filter_map(|s| inner.slot_details(s))
            .collect())
    }

    async fn slots_by_faculty(
        &self,
        faculty_id: i64,
    ) -> Result<Vec<TimetableSlotDetails>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .slots_sorted()
            .into_iter()
            .filter(|s| s.faculty_id == faculty_id)
            .filter_map(|s| inner.slot_details(s))
            .collect())
    }

    async fn insert_slot(&self, req: NewTimetableSlotRequest) -> Result<TimetableSlot, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.faculty.contains_key(&req.faculty_id) {
            return Err(AppError::NotFound("Faculty"));
        }
        if !inner.subjects.contains_key(&req.subject_id) {
            return Err(AppError::NotFound("Subject"));
        }
        if !inner.divisions.contains_key(&req.division_id) {
            return Err(AppError::NotFound("Division"));
        }
        inner.next.slots += 1;
        let slot = TimetableSlot {
            id: inner.next.slots,
            division_id: req.division_id,
            faculty_id: req.faculty_id,
            subject_id: req.subject_id,
            day_of_week: req.day_of_week,
            start_time: req.start_time,
            end_time: req.end_time,
            classroom: req.classroom,
            kind: req.kind,
        };
        inner.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn update_slot(
        &self,
        id: i64,
        req: UpdateTimetableSlotRequest,
    ) -> Result<Option<TimetableSlot>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(slot) = inner.slots.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(division_id) = req.division_id {
            slot.division_id = division_id;
        }
        if let Some(faculty_id) = req.faculty_id {
            slot.faculty_id = faculty_id;
        }
        if let Some(subject_id) = req.subject_id {
            slot.subject_id = subject_id;
        }
        if let Some(day_of_week) = req.day_of_week {
            slot.day_of_week = day_of_week;
        }
        if let Some(start_time) = req.start_time {
            slot.start_time = start_time;
        }
        if let Some(end_time) = req.end_time {
            slot.end_time = end_time;
        }
        if let Some(classroom) = req.classroom {
            slot.classroom = classroom;
        }
        if let Some(kind) = req.kind {
            slot.kind = kind;
        }
        Ok(Some(slot.clone()))
    }

    async fn delete_slot(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.slots.remove(&id).is_some())
    }

    async fn fetch_uploads(&self) -> Result<Vec<ExcelUpload>, AppError> {
        let inner = self.inner.read().await;
        let mut uploads: Vec<_> = inner.uploads.values().cloned().collect();
        uploads.sort_by_key(|u| std::cmp::Reverse(u.id));
        Ok(uploads)
    }

    async fn insert_upload(&self, req: NewExcelUploadRequest) -> Result<ExcelUpload, AppError> {
        let mut inner = self.inner.write().await;
        inner.next.uploads += 1;
        let upload = ExcelUpload {
            id: inner.next.uploads,
            filename: req.filename.unwrap_or_else(generated_filename),
            original_name: req.original_name,
            file_size: req.file_size,
            status: UploadStatus::Processing,
            uploaded_at: Utc::now().to_rfc3339(),
            processed_rows: 0,
            total_rows: 0,
        };
        inner.uploads.insert(upload.id, upload.clone());
        Ok(upload)
    }

    async fn set_upload_status(
        &self,
        id: i64,
        req: UpdateUploadStatusRequest,
    ) -> Result<Option<ExcelUpload>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(upload) = inner.uploads.get_mut(&id) else {
            return Ok(None);
        };
        upload.status = req.status;
        if let Some(processed_rows) = req.processed_rows {
            upload.processed_rows = processed_rows;
        }
        if let Some(total_rows) = req.total_rows {
            upload.total_rows = total_rows;
        }
        Ok(Some(upload.clone()))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let inner = self.inner.read().await;
        let total_faculty = inner.faculty.len() as i64;
        let active_courses = inner.subjects.len() as i64;
        let pending_tasks = inner
            .assignments
            .values()
            .filter(|a| a.status == AssignmentStatus::Pending)
            .count() as i64;
        let avg_workload = if inner.faculty.is_empty() {
            0.0
        } else {
            let total_hours: i64 = inner.faculty.values().map(|f| f.current_hours).sum();
            round_one_decimal(total_hours as f64 / inner.faculty.len() as f64)
        };
        Ok(DashboardStats {
            total_faculty,
            active_courses,
            pending_tasks,
            avg_workload,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{AssignmentKind, Position, Weekday};

    fn faculty_req(email: &str) -> NewFacultyRequest {
        NewFacultyRequest {
            name: "Dr. Rajesh Kumar".to_string(),
            email: email.to_string(),
            position: Position::Professor,
            department: "Computer Science".to_string(),
        }
    }

    fn subject_req(code: &str) -> NewSubjectRequest {
        NewSubjectRequest {
            name: "Advanced Algorithms".to_string(),
            code: code.to_string(),
            department: "Computer Science".to_string(),
            credits: 4,
            semester: Some(6),
        }
    }

    fn division_req(code: &str) -> NewDivisionRequest {
        NewDivisionRequest {
            name: "Computer Engineering - Division A".to_string(),
            code: code.to_string(),
            department: "Computer Science".to_string(),
            semester: 6,
            academic_year: "2024-25".to_string(),
            student_count: 72,
        }
    }

    fn assignment_req(faculty_id: i64, hours: i64) -> NewWorkloadAssignmentRequest {
        NewWorkloadAssignmentRequest {
            faculty_id,
            subject_id: 1,
            division_id: 1,
            kind: AssignmentKind::Lecture,
            hours_per_week: hours,
            classroom: Some("CS-101".to_string()),
        }
    }

    async fn seeded() -> MemStorage {
        let storage = MemStorage::new();
        storage.insert_faculty(faculty_req("rajesh.kumar@college.edu")).await.unwrap();
        storage.insert_subject(subject_req("CS401")).await.unwrap();
        storage.insert_division(division_req("CE-A")).await.unwrap();
        storage
    }

    #[tokio::test]
    async fn create_assignment_moves_faculty_hours() {
        let storage = seeded().await;

        let assignment = storage.insert_assignment(assignment_req(1, 4)).await.unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Assigned);

        let faculty = storage.find_faculty(1).await.unwrap().unwrap();
        assert_eq!(faculty.current_hours, 4);

        assert!(storage.delete_assignment(assignment.id).await.unwrap());
        let faculty = storage.find_faculty(1).await.unwrap().unwrap();
        assert_eq!(faculty.current_hours, 0);
    }

    #[tokio::test]
    async fn delete_assignment_clamps_hours_at_zero() {
        let storage = seeded().await;
        let assignment = storage.insert_assignment(assignment_req(1, 4)).await.unwrap();

        // Hours were overwritten below the assignment total in the meantime.
        storage.set_faculty_hours(1, 2).await.unwrap();

        assert!(storage.delete_assignment(assignment.id).await.unwrap());
        let faculty = storage.find_faculty(1).await.unwrap().unwrap();
        assert_eq!(faculty.current_hours, 0);
    }

    #[tokio::test]
    async fn assignment_requires_existing_references() {
        let storage = seeded().await;

        let err = storage.insert_assignment(assignment_req(99, 4)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Faculty")));

        let mut req = assignment_req(1, 4);
        req.subject_id = 99;
        let err = storage.insert_assignment(req).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Subject")));

        // Nothing was booked against the faculty member.
        let faculty = storage.find_faculty(1).await.unwrap().unwrap();
        assert_eq!(faculty.current_hours, 0);
    }

    #[tokio::test]
    async fn concurrent_assignment_creates_do_not_lose_hours() {
        let storage = Arc::new(seeded().await);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage.insert_assignment(assignment_req(1, 1)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let faculty = storage.find_faculty(1).await.unwrap().unwrap();
        assert_eq!(faculty.current_hours, 10);
        assert_eq!(storage.assignments_by_faculty(1).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn lookups_by_id() {
        let storage = seeded().await;
        assert_eq!(storage.find_subject(1).await.unwrap().unwrap().code, "CS401");
        assert_eq!(storage.find_division(1).await.unwrap().unwrap().code, "CE-A");
        assert!(storage.find_subject(99).await.unwrap().is_none());
        assert!(storage.find_division(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_and_code_are_conflicts() {
        let storage = seeded().await;

        let err = storage
            .insert_faculty(faculty_req("rajesh.kumar@college.edu"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = storage.insert_subject(subject_req("CS401")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = storage.insert_division(division_req("CE-A")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn position_change_rederives_max_hours() {
        let storage = seeded().await;
        let update = UpdateFacultyRequest {
            position: Some(Position::AssistantProfessor),
            ..Default::default()
        };
        let faculty = storage.update_faculty(1, update).await.unwrap().unwrap();
        assert_eq!(faculty.max_hours, 18);
    }

    #[tokio::test]
    async fn dashboard_stats_zero_state_and_average() {
        let storage = MemStorage::new();
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

        let storage = seeded().await;
        let mut second = faculty_req("priya.sharma@college.edu");
        second.position = Position::AssociateProfessor;
        storage.insert_faculty(second).await.unwrap();

        let assignment = storage.insert_assignment(assignment_req(1, 5)).await.unwrap();
        storage
            .set_assignment_status(assignment.id, AssignmentStatus::Pending)
            .await
            .unwrap();

        let stats = storage.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_faculty, 2);
        assert_eq!(stats.active_courses, 1);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.avg_workload, 2.5);
    }

    #[tokio::test]
    async fn pending_count_ignores_other_statuses() {
        let storage = seeded().await;
        let first = storage.insert_assignment(assignment_req(1, 2)).await.unwrap();
        storage.insert_assignment(assignment_req(1, 3)).await.unwrap();
        storage
            .set_assignment_status(first.id, AssignmentStatus::Completed)
            .await
            .unwrap();

        let stats = storage.dashboard_stats().await.unwrap();
        assert_eq!(stats.pending_tasks, 0);
    }

    #[tokio::test]
    async fn slots_filter_by_division_and_faculty() {
        let storage = seeded().await;
        storage.insert_division(division_req("CE-B")).await.unwrap();

        let slot = NewTimetableSlotRequest {
            division_id: 1,
            faculty_id: 1,
            subject_id: 1,
            day_of_week: Weekday::Monday,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            classroom: "CS-101".to_string(),
            kind: AssignmentKind::Lecture,
        };
        storage.insert_slot(slot.clone()).await.unwrap();
        let mut other = slot.clone();
        other.division_id = 2;
        other.day_of_week = Weekday::Tuesday;
        storage.insert_slot(other).await.unwrap();

        assert_eq!(storage.fetch_slots().await.unwrap().len(), 2);
        assert_eq!(storage.slots_by_division(1).await.unwrap().len(), 1);
        assert_eq!(storage.slots_by_faculty(1).await.unwrap().len(), 2);
        assert_eq!(storage.slots_by_division(99).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn upload_lifecycle() {
        let storage = MemStorage::new();
        let upload = storage
            .insert_upload(NewExcelUploadRequest {
                filename: None,
                original_name: "faculty.xlsx".to_string(),
                file_size: 4096,
            })
            .await
            .unwrap();
        assert_eq!(upload.status, UploadStatus::Processing);
        assert_eq!(upload.processed_rows, 0);
        assert!(upload.filename.ends_with(".xlsx"));

        let updated = storage
            .set_upload_status(
                upload.id,
                UpdateUploadStatusRequest {
                    status: UploadStatus::Completed,
                    processed_rows: Some(64),
                    total_rows: Some(64),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, UploadStatus::Completed);
        assert_eq!(updated.total_rows, 64);

        assert!(
            storage
                .set_upload_status(
                    99,
                    UpdateUploadStatusRequest {
                        status: UploadStatus::Error,
                        processed_rows: None,
                        total_rows: None,
                    },
                )
                .await
                .unwrap()
                .is_none()
        );
    }
}
