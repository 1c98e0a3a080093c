use async_trait::async_trait;
use shared::{
    domain::{Course, CourseDraft, CourseId, Enrollment},
    error::BackendError,
};

/// Remote course collection: full list plus the three mutations. Every call
/// is asynchronous and fails with a classed [`BackendError`].
#[async_trait]
pub trait CourseBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Course>, BackendError>;
    async fn create(&self, draft: &CourseDraft) -> Result<Course, BackendError>;
    async fn update(&self, course_id: CourseId, draft: &CourseDraft)
        -> Result<Course, BackendError>;
    async fn delete(&self, course_id: CourseId) -> Result<(), BackendError>;
}

/// Enrollment lookup used by the delete guard. An empty result means the
/// course has no dependents.
#[async_trait]
pub trait EnrollmentBackend: Send + Sync {
    async fn list_for_course(&self, course_id: CourseId) -> Result<Vec<Enrollment>, BackendError>;
}

pub struct MissingCourseBackend;

#[async_trait]
impl CourseBackend for MissingCourseBackend {
    async fn list(&self) -> Result<Vec<Course>, BackendError> {
        Err(BackendError::internal("course backend unavailable"))
    }

    async fn create(&self, _draft: &CourseDraft) -> Result<Course, BackendError> {
        Err(BackendError::internal("course backend unavailable"))
    }

    async fn update(
        &self,
        course_id: CourseId,
        _draft: &CourseDraft,
    ) -> Result<Course, BackendError> {
        Err(BackendError::internal(format!(
            "course backend unavailable for course {}",
            course_id.0
        )))
    }

    async fn delete(&self, course_id: CourseId) -> Result<(), BackendError> {
        Err(BackendError::internal(format!(
            "course backend unavailable for course {}",
            course_id.0
        )))
    }
}

pub struct MissingEnrollmentBackend;

#[async_trait]
impl EnrollmentBackend for MissingEnrollmentBackend {
    async fn list_for_course(&self, course_id: CourseId) -> Result<Vec<Enrollment>, BackendError> {
        Err(BackendError::internal(format!(
            "enrollment backend unavailable for course {}",
            course_id.0
        )))
    }
}
