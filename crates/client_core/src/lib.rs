//! Client-side core of the course administration module: the authoritative
//! course store, the debounced search filter, and the list controller that
//! sequences create/update/delete workflows against the backend.
//!
//! Rendering, form layout, and routing live elsewhere; this crate only talks
//! to them through the [`DialogSurface`] contract and the display rows
//! channel handed out by [`CourseListController::bind_display`].

pub mod backend;
pub mod controller;
pub mod dialog;
pub mod http;
pub mod search;
pub mod store;

pub use backend::{
    CourseBackend, EnrollmentBackend, MissingCourseBackend, MissingEnrollmentBackend,
};
pub use controller::{
    CourseListController, DeleteOutcome, DisplayBinding, FormOutcome, DELETE_BLOCKED_MESSAGE,
};
pub use dialog::{DialogSurface, FormIntent, MissingDialogSurface};
pub use http::{HttpCourseBackend, HttpEnrollmentBackend};
pub use search::{course_matches, filter_courses, normalize_query, SearchFilter, SEARCH_DEBOUNCE};
pub use store::{CollectionStatus, CourseCollectionState, CourseStore};
