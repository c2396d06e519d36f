//! The remote call that executes one task on one VM.

use std::future::Future;

use http_body_util::BodyExt;
use tracing::debug;

use taskgrid_core::{Task, Vm};

use crate::record::DispatchFailure;

/// Executes a task on a VM. `Ok(())` means the worker reported success.
///
/// The engine applies the per-call timeout, so implementations do not
/// need their own.
pub trait Worker: Send + Sync + 'static {
    fn run(&self, vm: &Vm, task: &Task) -> impl Future<Output = Result<(), DispatchFailure>> + Send;
}

/// Issues `GET http://<vm address>:<port>/task/<task index>`.
///
/// A 2xx response is success; connection errors and any other status are
/// failures. One connection per request.
#[derive(Debug, Clone)]
pub struct HttpWorker {
    port: u16,
}

impl HttpWorker {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Request URI for a task on a VM.
    pub fn task_uri(&self, vm: &Vm, task: &Task) -> String {
        format!("http://{}:{}/task/{}", vm.address, self.port, task.index)
    }
}

impl Worker for HttpWorker {
    async fn run(&self, vm: &Vm, task: &Task) -> Result<(), DispatchFailure> {
        let authority = format!("{}:{}", vm.address, self.port);
        let uri = self.task_uri(vm, task);

        let stream = tokio::net::TcpStream::connect(&authority).await.map_err(|e| {
            debug!(error = %e, %uri, "task connection failed");
            DispatchFailure::Connect(e.to_string())
        })?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await.map_err(|e| {
            debug!(error = %e, %uri, "task handshake failed");
            DispatchFailure::Connect(e.to_string())
        })?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("host", &authority)
            .header("user-agent", "taskgrid-exec/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| DispatchFailure::Request(e.to_string()))?;

        let resp = sender.send_request(req).await.map_err(|e| {
            debug!(error = %e, %uri, "task request failed");
            DispatchFailure::Request(e.to_string())
        })?;

        let status = resp.status();
        // Drain the body so the call ends when the worker is done writing.
        resp.into_body()
            .collect()
            .await
            .map_err(|e| DispatchFailure::Request(e.to_string()))?;

        if status.is_success() {
            Ok(())
        } else {
            debug!(%status, %uri, "task non-2xx");
            Err(DispatchFailure::Status(status.as_u16()))
        }
    }
}
