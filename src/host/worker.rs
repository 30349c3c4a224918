//! Host worker thread
//!
//! Owns the `HostDataSource` off the UI thread. Client messages arrive JSON
//! encoded and host pushes go back the same way, so the UI loop sees exactly
//! the wire traffic a remote host would produce.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use super::{DataSet, HostDataSource};
use crate::error::{GridError, Result};
use crate::protocol::{ClientMessage, HostMessage};
use crate::transport::ChannelTransport;

/// Requests that can be sent to the worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Load a file (CSV or Parquet) and replace the current table
    LoadFile { path: PathBuf },
    /// JSON-encoded `ClientMessage`
    Client(String),
    Shutdown,
}

/// Results returned from the worker
#[derive(Debug)]
pub enum WorkerResult {
    Loaded { path: PathBuf, rows: usize },
    /// JSON-encoded `HostMessage`
    Push(String),
    Error { msg: String },
}

impl WorkerResult {
    /// Decode a push into a `HostMessage`
    pub fn into_host_message(self) -> Option<Result<HostMessage>> {
        match self {
            WorkerResult::Push(json) => Some(serde_json::from_str(&json).map_err(GridError::from)),
            _ => None,
        }
    }
}

pub struct HostWorker {
    tx: Sender<WorkerRequest>,
    rx: Receiver<WorkerResult>,
    handle: Option<JoinHandle<()>>,
}

impl HostWorker {
    /// Spawn a worker with no table loaded
    pub fn spawn() -> Self {
        Self::start(None)
    }

    /// Spawn a worker serving an in-memory table; the initial pushes are queued
    pub fn with_dataset(data: DataSet) -> Self {
        Self::start(Some(data))
    }

    fn start(data: Option<DataSet>) -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (res_tx, res_rx) = channel::<WorkerResult>();

        let handle = thread::spawn(move || {
            Self::worker_loop(data, req_rx, res_tx);
        });

        Self {
            tx: req_tx,
            rx: res_rx,
            handle: Some(handle),
        }
    }

    fn worker_loop(data: Option<DataSet>, rx: Receiver<WorkerRequest>, tx: Sender<WorkerResult>) {
        let mut host = data.map(HostDataSource::new);
        if let Some(host) = &host {
            if Self::send_pushes(&tx, host.initial_messages()).is_err() {
                return;
            }
        }

        while let Ok(request) = rx.recv() {
            let results = match request {
                WorkerRequest::LoadFile { path } => match DataSet::load(&path) {
                    Ok(data) => {
                        let rows = data.len();
                        let loaded = HostDataSource::new(data);
                        let pushes = loaded.initial_messages();
                        host = Some(loaded);
                        let mut results = vec![WorkerResult::Loaded { path, rows }];
                        results.extend(Self::encode(pushes));
                        results
                    }
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "load failed");
                        vec![WorkerResult::Error {
                            msg: e.user_message(),
                        }]
                    }
                },
                WorkerRequest::Client(json) => match (&mut host, serde_json::from_str::<ClientMessage>(&json)) {
                    (Some(host), Ok(msg)) => Self::encode(host.handle(msg)),
                    (None, _) => vec![WorkerResult::Error {
                        msg: "No data loaded".to_string(),
                    }],
                    (_, Err(e)) => vec![WorkerResult::Error {
                        msg: GridError::from(e).user_message(),
                    }],
                },
                WorkerRequest::Shutdown => break,
            };

            if results.into_iter().try_for_each(|r| tx.send(r)).is_err() {
                break;
            }
        }
        debug!("host worker stopped");
    }

    fn encode(pushes: Vec<HostMessage>) -> Vec<WorkerResult> {
        pushes
            .into_iter()
            .map(|push| match serde_json::to_string(&push) {
                Ok(json) => WorkerResult::Push(json),
                Err(e) => WorkerResult::Error { msg: e.to_string() },
            })
            .collect()
    }

    fn send_pushes(
        tx: &Sender<WorkerResult>,
        pushes: Vec<HostMessage>,
    ) -> std::result::Result<(), std::sync::mpsc::SendError<WorkerResult>> {
        Self::encode(pushes).into_iter().try_for_each(|r| tx.send(r))
    }

    /// Send a request to the worker (non-blocking)
    pub fn request(&self, req: WorkerRequest) {
        if self.tx.send(req).is_err() {
            error!("host worker is gone");
        }
    }

    pub fn load_file(&self, path: PathBuf) {
        info!(path = %path.display(), "loading");
        self.request(WorkerRequest::LoadFile { path });
    }

    /// Transport handing controller messages to this worker
    pub fn transport(&self) -> ChannelTransport<WorkerRequest> {
        ChannelTransport::new(self.tx.clone(), WorkerRequest::Client)
    }

    /// Poll for completed work (non-blocking)
    pub fn poll(&self) -> Option<WorkerResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next result
    pub fn wait(&self, timeout: Duration) -> Option<WorkerResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for HostWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
