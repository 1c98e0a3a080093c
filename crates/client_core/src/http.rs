use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Course, CourseDraft, CourseId, Enrollment},
    error::{ApiError, BackendError, ErrorCode},
};

use crate::backend::{CourseBackend, EnrollmentBackend};

/// reqwest-backed [`CourseBackend`] speaking JSON to `{base_url}/courses`.
pub struct HttpCourseBackend {
    http: Client,
    base_url: String,
}

impl HttpCourseBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CourseBackend for HttpCourseBackend {
    async fn list(&self) -> Result<Vec<Course>, BackendError> {
        let response = self
            .http
            .get(format!("{}/courses", self.base_url))
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }

    async fn create(&self, draft: &CourseDraft) -> Result<Course, BackendError> {
        let response = self
            .http
            .post(format!("{}/courses", self.base_url))
            .json(draft)
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }

    async fn update(
        &self,
        course_id: CourseId,
        draft: &CourseDraft,
    ) -> Result<Course, BackendError> {
        let response = self
            .http
            .put(format!("{}/courses/{}", self.base_url, course_id.0))
            .json(draft)
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }

    async fn delete(&self, course_id: CourseId) -> Result<(), BackendError> {
        let response = self
            .http
            .delete(format!("{}/courses/{}", self.base_url, course_id.0))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(response).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct EnrollmentQuery {
    course_id: i64,
}

/// reqwest-backed [`EnrollmentBackend`] querying `{base_url}/enrollments`.
pub struct HttpEnrollmentBackend {
    http: Client,
    base_url: String,
}

impl HttpEnrollmentBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EnrollmentBackend for HttpEnrollmentBackend {
    async fn list_for_course(&self, course_id: CourseId) -> Result<Vec<Enrollment>, BackendError> {
        let response = self
            .http
            .get(format!("{}/enrollments", self.base_url))
            .query(&EnrollmentQuery {
                course_id: course_id.0,
            })
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(response).await
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    BackendError::network(err.to_string())
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::Validation,
        _ => ErrorCode::Internal,
    }
}

/// Turn a non-2xx response into a classed error, preferring the [`ApiError`]
/// body when the backend sent one.
async fn error_from_response(response: Response) -> BackendError {
    let status = response.status();
    let fallback_code = code_for_status(status);
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => api_error.into(),
        Err(_) if body.is_empty() => {
            BackendError::new(fallback_code, format!("backend returned {status}"))
        }
        Err(_) => BackendError::new(fallback_code, body),
    }
}

async fn expect_success(response: Response) -> Result<Response, BackendError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let response = expect_success(response).await?;
    response
        .json()
        .await
        .map_err(|err| BackendError::internal(format!("invalid backend payload: {err}")))
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
