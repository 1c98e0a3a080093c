use std::time::Duration;

use shared::domain::Course;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::timeout,
};
use tracing::debug;

/// Quiescence window applied to raw search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Lower-cased, trimmed form of a raw query.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Case-insensitive substring match over every visible column. An empty
/// query matches every course.
pub fn course_matches(course: &Course, normalized: &str) -> bool {
    if normalized.is_empty() {
        return true;
    }
    course.course_id.0.to_string().contains(normalized)
        || course.name.to_lowercase().contains(normalized)
        || course.teacher.to_lowercase().contains(normalized)
        || course.class_duration.to_lowercase().contains(normalized)
        || course.number_classes.to_string().contains(normalized)
        || course.enrollment_count.to_string().contains(normalized)
}

/// Rows that survive the query. Pure: the input list is never touched and a
/// fresh vector comes back.
pub fn filter_courses(courses: &[Course], normalized: &str) -> Vec<Course> {
    courses
        .iter()
        .filter(|course| course_matches(course, normalized))
        .cloned()
        .collect()
}

/// Debounced search pipeline. Raw keystrokes go in through
/// [`SearchFilter::push`]; the normalized query comes out on a watch channel
/// once input has been quiescent for the debounce window, skipping values
/// equal to the one already applied. Filtering never touches the network.
pub struct SearchFilter {
    input_tx: mpsc::UnboundedSender<String>,
    applied_rx: watch::Receiver<String>,
    worker: JoinHandle<()>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::with_debounce(SEARCH_DEBOUNCE)
    }

    /// Same pipeline with a custom window. Tests shrink it.
    pub fn with_debounce(window: Duration) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (applied_tx, applied_rx) = watch::channel(String::new());
        let worker = tokio::spawn(run_debounce(input_rx, applied_tx, window));
        Self {
            input_tx,
            applied_rx,
            worker,
        }
    }

    /// Forward one raw input value (one keystroke's worth of text).
    pub fn push(&self, raw: impl Into<String>) {
        // A closed channel means the worker is gone and the view with it.
        let _ = self.input_tx.send(raw.into());
    }

    /// The applied (normalized, debounced) query stream.
    pub fn observe(&self) -> watch::Receiver<String> {
        self.applied_rx.clone()
    }

    /// Currently applied query.
    pub fn applied(&self) -> String {
        self.applied_rx.borrow().clone()
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SearchFilter {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_debounce(
    mut input_rx: mpsc::UnboundedReceiver<String>,
    applied_tx: watch::Sender<String>,
    window: Duration,
) {
    let mut last_applied = String::new();
    while let Some(first) = input_rx.recv().await {
        let mut pending = first;
        let mut input_closed = false;
        loop {
            match timeout(window, input_rx.recv()).await {
                // A newer value restarts the window.
                Ok(Some(next)) => pending = next,
                Ok(None) => {
                    input_closed = true;
                    break;
                }
                Err(_elapsed) => break,
            }
        }
        let normalized = normalize_query(&pending);
        if normalized != last_applied {
            debug!(query = %normalized, "applying search filter");
            last_applied.clone_from(&normalized);
            let _ = applied_tx.send(normalized);
        }
        if input_closed {
            break;
        }
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
