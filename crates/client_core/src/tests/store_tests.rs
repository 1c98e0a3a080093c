use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{Course, CourseDraft, CourseId},
    error::BackendError,
};
use tokio::sync::{oneshot, Mutex};

use super::*;
use crate::backend::CourseBackend;

fn course(id: i64, name: &str) -> Course {
    Course {
        course_id: CourseId(id),
        name: name.to_string(),
        teacher: "Hopper".to_string(),
        class_duration: "2h".to_string(),
        number_classes: 12,
        enrollment_count: 0,
    }
}

struct ScriptedList {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<Vec<Course>, BackendError>,
}

/// Serves one scripted response per `list` call, optionally holding the
/// response until the test releases it.
struct ScriptedCourseBackend {
    lists: Mutex<VecDeque<ScriptedList>>,
    list_calls: Mutex<u32>,
}

impl ScriptedCourseBackend {
    fn new(lists: Vec<ScriptedList>) -> Arc<Self> {
        Arc::new(Self {
            lists: Mutex::new(lists.into_iter().collect()),
            list_calls: Mutex::new(0),
        })
    }

    fn immediate(result: Result<Vec<Course>, BackendError>) -> ScriptedList {
        ScriptedList { gate: None, result }
    }

    fn gated(result: Result<Vec<Course>, BackendError>) -> (ScriptedList, oneshot::Sender<()>) {
        let (release_tx, release_rx) = oneshot::channel();
        (
            ScriptedList {
                gate: Some(release_rx),
                result,
            },
            release_tx,
        )
    }
}

#[async_trait]
impl CourseBackend for ScriptedCourseBackend {
    async fn list(&self) -> Result<Vec<Course>, BackendError> {
        *self.list_calls.lock().await += 1;
        let script = self
            .lists
            .lock()
            .await
            .pop_front()
            .expect("unexpected list call");
        if let Some(gate) = script.gate {
            let _ = gate.await;
        }
        script.result
    }

    async fn create(&self, _draft: &CourseDraft) -> Result<Course, BackendError> {
        unimplemented!("not exercised by store tests")
    }

    async fn update(
        &self,
        _course_id: CourseId,
        _draft: &CourseDraft,
    ) -> Result<Course, BackendError> {
        unimplemented!("not exercised by store tests")
    }

    async fn delete(&self, _course_id: CourseId) -> Result<(), BackendError> {
        unimplemented!("not exercised by store tests")
    }
}

#[tokio::test]
async fn reload_transitions_idle_loading_loaded() {
    let (gated, release) = ScriptedCourseBackend::gated(Ok(vec![course(1, "Algebra")]));
    let backend = ScriptedCourseBackend::new(vec![gated]);
    let store = CourseStore::new(backend);

    let mut state_rx = store.observe();
    assert_eq!(state_rx.borrow().status, CollectionStatus::Idle);
    assert!(state_rx.borrow().data.is_empty());

    let reload_store = Arc::clone(&store);
    let reload = tokio::spawn(async move { reload_store.reload().await });

    state_rx.changed().await.expect("loading emission");
    assert_eq!(state_rx.borrow().status, CollectionStatus::Loading);

    release.send(()).expect("release backend");
    reload.await.expect("reload task");

    let state = store.snapshot();
    assert_eq!(state.status, CollectionStatus::Loaded);
    assert_eq!(state.data, vec![course(1, "Algebra")]);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn late_subscriber_reads_the_committed_snapshot_immediately() {
    let backend = ScriptedCourseBackend::new(vec![ScriptedCourseBackend::immediate(Ok(vec![
        course(1, "Algebra"),
        course(2, "Biology"),
    ]))]);
    let store = CourseStore::new(backend);
    store.reload().await;

    // Subscribed only after the reload finished.
    let state_rx = store.observe();
    let state = state_rx.borrow().clone();
    assert_eq!(state.status, CollectionStatus::Loaded);
    assert_eq!(state.data.len(), 2);
}

#[tokio::test]
async fn failed_reload_records_the_error_and_keeps_last_good_data() {
    let backend = ScriptedCourseBackend::new(vec![
        ScriptedCourseBackend::immediate(Ok(vec![course(1, "Algebra")])),
        ScriptedCourseBackend::immediate(Err(BackendError::network("connection refused"))),
    ]);
    let store = CourseStore::new(backend);
    store.reload().await;
    store.reload().await;

    let state = store.snapshot();
    assert_eq!(state.status, CollectionStatus::Error);
    assert_eq!(state.data, vec![course(1, "Algebra")]);
    let error = state.error.expect("captured error detail");
    assert!(error.contains("connection refused"));
}

#[tokio::test]
async fn error_state_recovers_on_the_next_successful_reload() {
    let backend = ScriptedCourseBackend::new(vec![
        ScriptedCourseBackend::immediate(Err(BackendError::network("connection refused"))),
        ScriptedCourseBackend::immediate(Ok(vec![course(3, "Chemistry")])),
    ]);
    let store = CourseStore::new(backend);
    store.reload().await;
    assert_eq!(store.snapshot().status, CollectionStatus::Error);

    store.reload().await;
    let state = store.snapshot();
    assert_eq!(state.status, CollectionStatus::Loaded);
    assert_eq!(state.data, vec![course(3, "Chemistry")]);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn overlapping_reloads_commit_only_the_latest() {
    let (slow, release_slow) = ScriptedCourseBackend::gated(Ok(vec![course(1, "Stale")]));
    let backend = ScriptedCourseBackend::new(vec![
        slow,
        ScriptedCourseBackend::immediate(Ok(vec![course(2, "Fresh")])),
    ]);
    let store = CourseStore::new(Arc::clone(&backend) as Arc<dyn CourseBackend>);

    let first_store = Arc::clone(&store);
    let first = tokio::spawn(async move { first_store.reload().await });
    while *backend.list_calls.lock().await < 1 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // Second reload starts later and finishes first.
    store.reload().await;
    assert_eq!(store.snapshot().data, vec![course(2, "Fresh")]);

    // The first response arrives afterwards and must be discarded as stale.
    release_slow.send(()).expect("release first reload");
    first.await.expect("first reload task");

    let state = store.snapshot();
    assert_eq!(state.status, CollectionStatus::Loaded);
    assert_eq!(state.data, vec![course(2, "Fresh")]);
    assert_eq!(*backend.list_calls.lock().await, 2);
}

#[tokio::test]
async fn dispatch_reload_commits_in_the_background() {
    let backend = ScriptedCourseBackend::new(vec![ScriptedCourseBackend::immediate(Ok(vec![
        course(1, "Algebra"),
    ]))]);
    let store = CourseStore::new(backend);
    let mut state_rx = store.observe();

    store.dispatch_reload();

    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            state_rx.changed().await.expect("state change");
            if state_rx.borrow().status == CollectionStatus::Loaded {
                break;
            }
        }
    })
    .await
    .expect("background reload completion");
    assert_eq!(store.snapshot().data, vec![course(1, "Algebra")]);
}
