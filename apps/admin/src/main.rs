use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    filter_courses, normalize_query, CollectionStatus, CourseListController, CourseStore,
    DeleteOutcome, DialogSurface, FormIntent, HttpCourseBackend, HttpEnrollmentBackend,
};
use shared::domain::{CourseDraft, CourseId};

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the course backend, e.g. http://127.0.0.1:4000
    #[arg(long)]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the course list, optionally filtered.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete a course unless it still has enrollments.
    Delete {
        #[arg(long)]
        course_id: i64,
    },
}

/// Console stand-in for the modal dialog surface: alerts print to stdout and
/// the course form always reports cancellation, since this binary has no
/// interactive form.
struct ConsoleDialog;

#[async_trait]
impl DialogSurface for ConsoleDialog {
    async fn course_form(&self, _intent: FormIntent) -> Result<Option<CourseDraft>> {
        Ok(None)
    }

    async fn alert(&self, message: &str) -> Result<()> {
        println!("{message}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let courses = Arc::new(HttpCourseBackend::new(args.server_url.clone()));
    let enrollments = Arc::new(HttpEnrollmentBackend::new(args.server_url));
    let store = CourseStore::new(courses.clone());
    let controller = CourseListController::new(
        store.clone(),
        courses,
        enrollments,
        Arc::new(ConsoleDialog),
    );

    match args.command {
        Command::List { search } => {
            store.reload().await;
            let state = store.snapshot();
            if state.status == CollectionStatus::Error {
                bail!(
                    "course list failed: {}",
                    state.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            let query = normalize_query(search.as_deref().unwrap_or(""));
            for course in filter_courses(&state.data, &query) {
                println!(
                    "{:>4}  {:<24} {:<18} {:<6} {:>3} classes  {:>3} enrolled",
                    course.course_id.0,
                    course.name,
                    course.teacher,
                    course.class_duration,
                    course.number_classes,
                    course.enrollment_count,
                );
            }
        }
        Command::Delete { course_id } => {
            match controller.delete_course(CourseId(course_id)).await? {
                // The blocking alert already printed the reason.
                DeleteOutcome::Blocked => {}
                DeleteOutcome::Deleted => println!("course {course_id} deleted"),
            }
        }
    }

    Ok(())
}
