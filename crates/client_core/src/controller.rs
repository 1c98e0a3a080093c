use std::sync::Arc;

use anyhow::Result;
use shared::domain::{Course, CourseId};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    backend::{CourseBackend, EnrollmentBackend},
    dialog::{DialogSurface, FormIntent},
    search::{filter_courses, SearchFilter},
    store::CourseStore,
};

/// Message shown when a delete is blocked by existing enrollments.
pub const DELETE_BLOCKED_MESSAGE: &str =
    "This course cannot be deleted: students are already enrolled in it.";

/// Terminal state of one create/edit dialog workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The user cancelled; nothing was sent to the backend.
    Cancelled,
    /// The mutation committed and the store was reloaded.
    Saved(Course),
}

/// Terminal state of one delete workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Existing enrollments blocked the delete; the backend was never asked.
    Blocked,
    Deleted,
}

/// Orchestrates the course list view: store output into display rows, raw
/// search input into the [`SearchFilter`], and the create/update/delete
/// workflows against the backend collaborators.
///
/// Mutation failures are logged here and propagated to the caller; no reload
/// follows a failed mutation, so the store keeps its last known-good list
/// and never implies an unconfirmed write.
pub struct CourseListController {
    store: Arc<CourseStore>,
    courses: Arc<dyn CourseBackend>,
    enrollments: Arc<dyn EnrollmentBackend>,
    dialog: Arc<dyn DialogSurface>,
    search: SearchFilter,
}

impl CourseListController {
    pub fn new(
        store: Arc<CourseStore>,
        courses: Arc<dyn CourseBackend>,
        enrollments: Arc<dyn EnrollmentBackend>,
        dialog: Arc<dyn DialogSurface>,
    ) -> Self {
        Self::new_with_search_filter(store, courses, enrollments, dialog, SearchFilter::new())
    }

    /// Same controller with a caller-supplied filter (tests shrink the
    /// debounce window through this).
    pub fn new_with_search_filter(
        store: Arc<CourseStore>,
        courses: Arc<dyn CourseBackend>,
        enrollments: Arc<dyn EnrollmentBackend>,
        dialog: Arc<dyn DialogSurface>,
        search: SearchFilter,
    ) -> Self {
        Self {
            store,
            courses,
            enrollments,
            dialog,
            search,
        }
    }

    /// Forward one raw search-box value. Normalizing and debouncing are the
    /// filter's job, not the controller's.
    pub fn search_input(&self, raw: &str) {
        self.search.push(raw);
    }

    /// Currently applied (normalized, debounced) query.
    pub fn applied_query(&self) -> String {
        self.search.applied()
    }

    /// Subscribe the display to the store and the applied query. The render
    /// task recomputes `filter_courses(data, query)` on every emission from
    /// either side; both subscriptions live exactly as long as the returned
    /// binding.
    pub fn bind_display(&self) -> DisplayBinding {
        let mut state_rx = self.store.observe();
        let mut query_rx = self.search.observe();
        let initial = filter_courses(&self.store.snapshot().data, &self.search.applied());
        let (rows_tx, rows_rx) = watch::channel(initial);

        let render_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = query_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let rows = {
                    let state = state_rx.borrow();
                    let query = query_rx.borrow();
                    filter_courses(&state.data, &query)
                };
                if rows_tx.send(rows).is_err() {
                    break;
                }
            }
        });

        DisplayBinding {
            rows_rx,
            render_task,
        }
    }

    /// Run one create/edit dialog workflow to completion. At most one backend
    /// mutation per close-with-data; the reload happens strictly after that
    /// mutation succeeds, never before.
    pub async fn open_course_form(&self, intent: FormIntent) -> Result<FormOutcome> {
        let Some(draft) = self.dialog.course_form(intent).await? else {
            info!(title = intent.title(), "course form cancelled");
            return Ok(FormOutcome::Cancelled);
        };

        let saved = match intent {
            FormIntent::Edit { course_id } => self.courses.update(course_id, &draft).await,
            FormIntent::Create => self.courses.create(&draft).await,
        };

        match saved {
            Ok(course) => {
                self.store.reload().await;
                Ok(FormOutcome::Saved(course))
            }
            Err(err) => {
                warn!(
                    title = intent.title(),
                    error = %err,
                    "course mutation rejected; keeping last known list"
                );
                Err(err.into())
            }
        }
    }

    /// Run one delete workflow to completion. The enrollment check always
    /// precedes the delete call; a course with dependents is never deleted.
    /// A failed enrollment check also stops the workflow, since the
    /// invariant cannot be verified.
    pub async fn delete_course(&self, course_id: CourseId) -> Result<DeleteOutcome> {
        let enrollments = match self.enrollments.list_for_course(course_id).await {
            Ok(enrollments) => enrollments,
            Err(err) => {
                warn!(
                    course_id = course_id.0,
                    error = %err,
                    "enrollment check failed; delete not attempted"
                );
                return Err(err.into());
            }
        };

        if !enrollments.is_empty() {
            info!(
                course_id = course_id.0,
                enrollments = enrollments.len(),
                "delete blocked by existing enrollments"
            );
            self.dialog.alert(DELETE_BLOCKED_MESSAGE).await?;
            return Ok(DeleteOutcome::Blocked);
        }

        if let Err(err) = self.courses.delete(course_id).await {
            warn!(
                course_id = course_id.0,
                error = %err,
                "course delete failed; keeping last known list"
            );
            return Err(err.into());
        }

        self.store.reload().await;
        Ok(DeleteOutcome::Deleted)
    }
}

/// Live display rows plus the render task keeping them fresh. Dropping the
/// binding aborts the task and releases the store and search subscriptions,
/// whatever path tears the view down.
pub struct DisplayBinding {
    rows_rx: watch::Receiver<Vec<Course>>,
    render_task: JoinHandle<()>,
}

impl DisplayBinding {
    /// Row stream for the display to observe.
    pub fn rows(&self) -> watch::Receiver<Vec<Course>> {
        self.rows_rx.clone()
    }

    /// Rows as of the latest recompute.
    pub fn current_rows(&self) -> Vec<Course> {
        self.rows_rx.borrow().clone()
    }
}

impl Drop for DisplayBinding {
    fn drop(&mut self) {
        self.render_task.abort();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
