use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(CourseId);
id_newtype!(EnrollmentId);
id_newtype!(StudentId);

/// A course record as the backend returns it. `enrollment_count` is derived
/// server-side; the client never computes or edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: CourseId,
    pub name: String,
    pub teacher: String,
    pub class_duration: String,
    pub number_classes: u32,
    #[serde(default)]
    pub enrollment_count: u32,
}

/// What the course form produces. Doubles as the create/update request body;
/// the id is server-assigned and never part of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    pub teacher: String,
    pub class_duration: String,
    pub number_classes: u32,
}

/// One student's enrollment in one course. Only existence per course matters
/// to the delete guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub student_id: StudentId,
}
