pub mod division;
pub mod faculty;
pub mod subject;
pub mod timetable;
pub mod upload;
pub mod workload;

pub use division::{Division, NewDivisionRequest};
pub use faculty::{Faculty, FacultyWithWorkload, NewFacultyRequest, Position, UpdateFacultyRequest};
pub use subject::{NewSubjectRequest, Subject};
pub use timetable::{
    NewTimetableSlotRequest, TimetableSlot, TimetableSlotDetails, UpdateTimetableSlotRequest,
    Weekday,
};
pub use upload::{ExcelUpload, NewExcelUploadRequest, UpdateUploadStatusRequest, UploadStatus};
pub use workload::{
    AssignmentKind, AssignmentStatus, NewWorkloadAssignmentRequest, UpdateAssignmentStatusRequest,
    WorkloadAssignment, WorkloadAssignmentDetails,
};
