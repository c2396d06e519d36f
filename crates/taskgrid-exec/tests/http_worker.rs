//! HTTP worker integration tests.
//!
//! Runs an axum worker double on a loopback port and dispatches real
//! requests through `HttpWorker` and the execution engine.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;

use taskgrid_core::{Assignment, Task, TaskBatch, Vm, VmPool};
use taskgrid_exec::{DispatchFailure, ExecutionEngine, HttpWorker, Worker};

/// Indices the double has seen, in arrival order.
type Seen = Arc<Mutex<Vec<u64>>>;

async fn task_handler(State(seen): State<Seen>, Path(index): Path<u64>) -> StatusCode {
    seen.lock().unwrap().push(index);
    tokio::time::sleep(Duration::from_millis(5)).await;
    if index == 13 {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

/// Start the worker double and return its port.
async fn spawn_worker_double(seen: Seen) -> u16 {
    let app = Router::new()
        .route("/task/{index}", get(task_handler))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

#[tokio::test]
async fn success_on_2xx() {
    let seen = Seen::default();
    let port = spawn_worker_double(seen.clone()).await;

    let worker = HttpWorker::new(port);
    let vm = Vm::new("vm1", "127.0.0.1", 1, 1);
    let result = worker.run(&vm, &Task::new(99, "task-4-99", 4)).await;

    assert_eq!(result, Ok(()));
    assert_eq!(*seen.lock().unwrap(), vec![4]);
}

#[tokio::test]
async fn non_2xx_is_a_failure() {
    let port = spawn_worker_double(Seen::default()).await;

    let worker = HttpWorker::new(port);
    let vm = Vm::new("vm1", "127.0.0.1", 1, 1);
    let result = worker.run(&vm, &Task::new(0, "task-13-0", 13)).await;

    assert_eq!(result, Err(DispatchFailure::Status(500)));
}

#[tokio::test]
async fn engine_dispatches_every_task_over_http() {
    let seen = Seen::default();
    let port = spawn_worker_double(seen.clone()).await;

    let vms = VmPool::new(vec![
        Vm::new("vm1", "127.0.0.1", 1, 1),
        Vm::new("vm2", "127.0.0.1", 2, 2),
    ])
    .unwrap();
    let tasks = TaskBatch::new(vec![
        Task::new(0, "task-1-0", 1),
        Task::new(1, "task-13-1", 13),
        Task::new(2, "task-2-2", 2),
        Task::new(3, "task-3-3", 3),
    ])
    .unwrap();
    let assignment: Assignment = [
        (0, "vm1".to_string()),
        (1, "vm2".to_string()),
        (2, "vm1".to_string()),
        (3, "vm2".to_string()),
    ]
    .into_iter()
    .collect();

    let engine = ExecutionEngine::new(HttpWorker::new(port)).with_timeout(Duration::from_secs(10));
    let outcome = engine.execute(&assignment, &tasks, &vms).await.unwrap();

    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.failed(), 1);
    let failed = outcome.records.iter().find(|r| !r.is_success()).unwrap();
    assert_eq!(failed.task_id, 1);
    assert_eq!(failed.vm, "vm2");

    let mut indices = seen.lock().unwrap().clone();
    indices.sort_unstable();
    assert_eq!(indices, vec![1, 2, 3, 13]);
}
