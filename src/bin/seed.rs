//! Loads the sample dataset into the configured sqlite database.
//!
//! ```bash
//! cargo run --bin seed
//! ```

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_backend::config::AppConfig;
use campus_backend::models::{
    AssignmentKind, NewDivisionRequest, NewFacultyRequest, NewSubjectRequest,
    NewWorkloadAssignmentRequest, Position,
};
use campus_backend::storage::{SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "seed=info,campus_backend=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let storage = SqliteStorage::new(pool);

    let faculty = [
        ("Dr. Rajesh Kumar", "rajesh.kumar@college.edu", Position::Professor, "Computer Science"),
        ("Prof. Priya Sharma", "priya.sharma@college.edu", Position::AssociateProfessor, "Mathematics"),
        ("Dr. Amit Mehta", "amit.mehta@college.edu", Position::AssistantProfessor, "Physics"),
        ("Dr. Sarah Wilson", "sarah.wilson@college.edu", Position::Professor, "Computer Science"),
        ("Prof. Neha Patel", "neha.patel@college.edu", Position::AssociateProfessor, "Computer Science"),
    ];
    let mut faculty_ids = Vec::new();
    for (name, email, position, department) in faculty {
        let created = storage
            .insert_faculty(NewFacultyRequest {
                name: name.to_string(),
                email: email.to_string(),
                position,
                department: department.to_string(),
            })
            .await?;
        faculty_ids.push(created.id);
    }
    info!("inserted {} faculty members", faculty_ids.len());

    let subjects = [
        ("Advanced Algorithms", "CS401", "Computer Science", 4, Some(6)),
        ("Database Systems", "CS402", "Computer Science", 4, Some(6)),
        ("Software Engineering", "CS403", "Computer Science", 3, Some(6)),
        ("Machine Learning", "CS404", "Computer Science", 4, Some(6)),
        ("Computer Networks", "CS405", "Computer Science", 3, Some(6)),
        ("Linear Algebra", "MATH201", "Mathematics", 3, None),
        ("Quantum Physics", "PHY301", "Physics", 4, None),
    ];
    let mut subject_ids = Vec::new();
    for (name, code, department, credits, semester) in subjects {
        let created = storage
            .insert_subject(NewSubjectRequest {
                name: name.to_string(),
                code: code.to_string(),
                department: department.to_string(),
                credits,
                semester,
            })
            .await?;
        subject_ids.push(created.id);
    }
    info!("inserted {} subjects", subject_ids.len());

    let divisions = [
        ("Computer Engineering - Division A", "CE-A", "Computer Science", 72),
        ("Computer Engineering - Division B", "CE-B", "Computer Science", 68),
        ("Information Technology - Division A", "IT-A", "Computer Science", 70),
        ("Electronics & Communication - Division A", "EC-A", "Electronics", 66),
    ];
    let mut division_ids = Vec::new();
    for (name, code, department, student_count) in divisions {
        let created = storage
            .insert_division(NewDivisionRequest {
                name: name.to_string(),
                code: code.to_string(),
                department: department.to_string(),
                semester: 6,
                academic_year: "2024-25".to_string(),
                student_count,
            })
            .await?;
        division_ids.push(created.id);
    }
    info!("inserted {} divisions", division_ids.len());

    // (faculty, subject, hours, classroom) against the first division;
    // current_hours bookkeeping flows through insert_assignment.
    let assignments = [
        (faculty_ids[0], subject_ids[0], 4, "CS-101"),
        (faculty_ids[1], subject_ids[5], 6, "MATH-201"),
        (faculty_ids[2], subject_ids[6], 4, "PHY-301"),
    ];
    for (faculty_id, subject_id, hours_per_week, classroom) in assignments {
        storage
            .insert_assignment(NewWorkloadAssignmentRequest {
                faculty_id,
                subject_id,
                division_id: division_ids[0],
                kind: AssignmentKind::Lecture,
                hours_per_week,
                classroom: Some(classroom.to_string()),
            })
            .await?;
    }
    info!("inserted {} workload assignments", assignments.len());

    Ok(())
}
