pub mod extract;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::*;
use crate::services::UploadProcessor;
use crate::state::AppState;
use crate::storage::DashboardStats;
use extract::ValidatedJson;

#[derive(Deserialize)]
struct DepartmentQuery {
    department: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentQuery {
    faculty_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimetableQuery {
    division_id: Option<i64>,
    faculty_id: Option<i64>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/faculty", get(list_faculty).post(create_faculty))
        .route("/api/faculty/{id}", get(get_faculty).patch(update_faculty))
        .route("/api/subjects", get(list_subjects).post(create_subject))
        .route("/api/divisions", get(list_divisions).post(create_division))
        .route(
            "/api/workload-assignments",
            get(list_assignments).post(create_assignment),
        )
        .route(
            "/api/workload-assignments/{id}",
            get(get_assignment).delete(delete_assignment),
        )
        .route(
            "/api/workload-assignments/{id}/status",
            patch(update_assignment_status),
        )
        .route("/api/timetable", get(list_slots).post(create_slot))
        .route("/api/timetable/{id}", patch(update_slot).delete(delete_slot))
        .route("/api/excel-uploads", get(list_uploads).post(create_upload))
        .route("/api/excel-uploads/{id}/status", patch(update_upload_status))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.storage.dashboard_stats().await?;
    Ok(StatusCode::OK)
}

async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = state.storage.dashboard_stats().await?;
    Ok(Json(stats))
}

async fn list_faculty(State(state): State<AppState>) -> Result<Json<Vec<Faculty>>, AppError> {
    let faculty = state.storage.fetch_faculty().await?;
    Ok(Json(faculty))
}

async fn get_faculty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FacultyWithWorkload>, AppError> {
    let faculty = state
        .storage
        .faculty_with_workload(id)
        .await?
        .ok_or(AppError::NotFound("Faculty"))?;
    Ok(Json(faculty))
}

async fn create_faculty(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewFacultyRequest>,
) -> Result<(StatusCode, Json<Faculty>), AppError> {
    let faculty = state.storage.insert_faculty(req).await?;
    Ok((StatusCode::CREATED, Json(faculty)))
}

async fn update_faculty(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFacultyRequest>,
) -> Result<Json<Faculty>, AppError> {
    if let Some(hours) = req.current_hours {
        state
            .storage
            .set_faculty_hours(id, hours)
            .await?
            .ok_or(AppError::NotFound("Faculty"))?;
    }
    let faculty = state
        .storage
        .update_faculty(id, req)
        .await?
        .ok_or(AppError::NotFound("Faculty"))?;
    Ok(Json(faculty))
}

async fn list_subjects(
    State(state): State<AppState>,
    Query(params): Query<DepartmentQuery>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let subjects = match params.department {
        Some(department) => state.storage.subjects_by_department(&department).await?,
        None => state.storage.fetch_subjects().await?,
    };
    Ok(Json(subjects))
}

async fn create_subject(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let subject = state.storage.insert_subject(req).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn list_divisions(
    State(state): State<AppState>,
    Query(params): Query<DepartmentQuery>,
) -> Result<Json<Vec<Division>>, AppError> {
    let divisions = match params.department {
        Some(department) => state.storage.divisions_by_department(&department).await?,
        None => state.storage.fetch_divisions().await?,
    };
    Ok(Json(divisions))
}

async fn create_division(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewDivisionRequest>,
) -> Result<(StatusCode, Json<Division>), AppError> {
    let division = state.storage.insert_division(req).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

async fn list_assignments(
    State(state): State<AppState>,
    Query(params): Query<AssignmentQuery>,
) -> Result<Json<Vec<WorkloadAssignmentDetails>>, AppError> {
    let assignments = match params.faculty_id {
        Some(faculty_id) => state.storage.assignments_by_faculty(faculty_id).await?,
        None => state.storage.fetch_assignments().await?,
    };
    Ok(Json(assignments))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkloadAssignmentDetails>, AppError> {
    let assignment = state
        .storage
        .find_assignment(id)
        .await?
        .ok_or(AppError::NotFound("Assignment"))?;
    Ok(Json(assignment))
}

async fn create_assignment(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewWorkloadAssignmentRequest>,
) -> Result<(StatusCode, Json<WorkloadAssignment>), AppError> {
    let assignment = state.storage.insert_assignment(req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAssignmentStatusRequest>,
) -> Result<Json<WorkloadAssignment>, AppError> {
    let assignment = state
        .storage
        .set_assignment_status(id, req.status)
        .await?
        .ok_or(AppError::NotFound("Assignment"))?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.storage.delete_assignment(id).await? {
        Ok(Json(MessageResponse {
            message: "Assignment deleted successfully",
        }))
    } else {
        Err(AppError::NotFound("Assignment"))
    }
}

async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<TimetableQuery>,
) -> Result<Json<Vec<TimetableSlotDetails>>, AppError> {
    let slots = if let Some(division_id) = params.division_id {
        state.storage.slots_by_division(division_id).await?
    } else if let Some(faculty_id) = params.faculty_id {
        state.storage.slots_by_faculty(faculty_id).await?
    } else {
        state.storage.fetch_slots().await?
    };
    Ok(Json(slots))
}

async fn create_slot(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewTimetableSlotRequest>,
) -> Result<(StatusCode, Json<TimetableSlot>), AppError> {
    let slot = state.storage.insert_slot(req).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

async fn update_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateTimetableSlotRequest>,
) -> Result<Json<TimetableSlot>, AppError> {
    let slot = state
        .storage
        .update_slot(id, req)
        .await?
        .ok_or(AppError::NotFound("Timetable slot"))?;
    Ok(Json(slot))
}

async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.storage.delete_slot(id).await? {
        Ok(Json(MessageResponse {
            message: "Timetable slot deleted successfully",
        }))
    } else {
        Err(AppError::NotFound("Timetable slot"))
    }
}

async fn list_uploads(State(state): State<AppState>) -> Result<Json<Vec<ExcelUpload>>, AppError> {
    let uploads = state.storage.fetch_uploads().await?;
    Ok(Json(uploads))
}

async fn create_upload(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewExcelUploadRequest>,
) -> Result<(StatusCode, Json<ExcelUpload>), AppError> {
    let upload = state.storage.insert_upload(req).await?;

    // Processing is simulated; the request does not wait for it.
    UploadProcessor::new(state.storage.clone(), state.upload_delay)
        .spawn(upload.id, upload.file_size);

    Ok((StatusCode::CREATED, Json(upload)))
}

async fn update_upload_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUploadStatusRequest>,
) -> Result<Json<ExcelUpload>, AppError> {
    let upload = state
        .storage
        .set_upload_status(id, req)
        .await?
        .ok_or(AppError::NotFound("Excel upload"))?;
    Ok(Json(upload))
}
