//! The lint worker: one thread, one linter process at a time.
//!
//! Lifecycle events are handed to the worker through a zero-capacity
//! channel. `LintQueue::submit` therefore blocks until the worker has
//! finished its current cycle and is waiting for the next request, which
//! keeps linter invocations from ever overlapping and applies backpressure
//! to the event thread. Requests are processed strictly in arrival order;
//! stale requests are not skipped.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use lsp_types::{Diagnostic, Uri};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::command::build_invocation;
use crate::diagnostics::{failure_diagnostic, DiagnosticMapper};
use crate::error::{PublishError, QueueError};
use crate::publish::Publisher;
use crate::runner::{interpret, LintRunner};
use crate::session::{uri_to_path, Session};

/// A document waiting to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRequest {
    pub uri: Uri,
    pub path: PathBuf,
}

impl LintRequest {
    /// `None` unless `uri` names a file on disk; the linter only reads the
    /// file system.
    pub fn from_uri(uri: Uri) -> Option<Self> {
        let path = uri_to_path(&uri)?;
        Some(Self { uri, path })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for a request.
    Idle,
    /// A lint cycle is in flight.
    Running,
    /// The queue was closed or publishing failed. Terminal.
    Stopped,
}

/// Producer side of the worker's queue.
///
/// Closing consumes the queue, so it can only happen once.
#[derive(Debug)]
pub struct LintQueue {
    sender: Sender<LintRequest>,
}

impl LintQueue {
    /// Hand `request` to the worker, blocking until it accepts.
    pub fn submit(&self, request: LintRequest) -> Result<(), QueueError> {
        self.sender.send(request).map_err(|_| QueueError::Closed)
    }

    /// Hand `request` to the worker only if it is idle right now.
    pub fn try_submit(&self, request: LintRequest) -> Result<(), QueueError> {
        self.sender.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Busy,
            TrySendError::Disconnected(_) => QueueError::Closed,
        })
    }

    /// Stop accepting requests. The worker finishes any in-flight cycle and
    /// then stops.
    pub fn close(self) {
        drop(self.sender);
    }
}

/// Owner's view of a running worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    thread: JoinHandle<Result<(), PublishError>>,
    state: Arc<Mutex<WorkerState>>,
    failure: Receiver<PublishError>,
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Yields the publish error that killed the worker, if one did.
    pub fn failure(&self) -> &Receiver<PublishError> {
        &self.failure
    }

    /// Wait for the worker to stop and return how it ended.
    pub fn join(self) -> Result<(), PublishError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Runs lint cycles: build command, run the linter, decode, map, publish.
pub struct LintWorker<R> {
    session: Session,
    runner: R,
    mapper: DiagnosticMapper,
    publisher: Publisher,
    state: Arc<Mutex<WorkerState>>,
}

impl<R: LintRunner> LintWorker<R> {
    pub fn new(
        session: Session,
        runner: R,
        mapper: DiagnosticMapper,
        publisher: Publisher,
    ) -> Self {
        Self {
            session,
            runner,
            mapper,
            publisher,
            state: Arc::new(Mutex::new(WorkerState::Idle)),
        }
    }

    /// Lint one document and return its complete diagnostic set.
    ///
    /// Never fails: a linter that cannot run or produces garbage yields a
    /// single Error diagnostic so the problem is visible in the editor.
    pub fn lint(&self, request: &LintRequest) -> Vec<Diagnostic> {
        let invocation =
            match build_invocation(&self.session.command, &self.session.root_dir, &request.path) {
                Ok(invocation) => invocation,
                Err(e) => return vec![failure_diagnostic(&e)],
            };
        tracing::debug!(
            program = %invocation.program,
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "running linter"
        );

        let result = self
            .runner
            .run(&invocation)
            .and_then(|raw| interpret(&invocation.program, &raw));
        match result {
            Ok(result) => {
                result.report.log();
                tracing::debug!(issues = result.issues.len(), "decoded linter output");
                self.mapper
                    .map_issues(&result.issues, &invocation.relative_filename)
            }
            Err(e) => {
                tracing::warn!(uri = request.uri.as_str(), "lint failed: {e}");
                vec![failure_diagnostic(&e)]
            }
        }
    }

    /// Process requests until the queue closes or publishing fails.
    pub fn run(self, requests: Receiver<LintRequest>) -> Result<(), PublishError> {
        let outcome = self.drain(&requests);
        self.set_state(WorkerState::Stopped);
        outcome
    }

    fn drain(&self, requests: &Receiver<LintRequest>) -> Result<(), PublishError> {
        for request in requests {
            self.set_state(WorkerState::Running);
            let diagnostics = self.lint(&request);
            tracing::info!(
                uri = request.uri.as_str(),
                count = diagnostics.len(),
                "publishing diagnostics"
            );
            self.publisher.publish(request.uri, diagnostics)?;
            self.set_state(WorkerState::Idle);
        }
        Ok(())
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

impl<R: LintRunner + Send + 'static> LintWorker<R> {
    /// Start the worker on its own thread.
    pub fn spawn(self) -> std::io::Result<(LintQueue, WorkerHandle)> {
        let (sender, receiver) = crossbeam_channel::bounded(0);
        let (failure_tx, failure) = crossbeam_channel::bounded(1);
        let state = Arc::clone(&self.state);

        let thread = std::thread::Builder::new()
            .name("lint-worker".into())
            .spawn(move || {
                let result = self.run(receiver);
                if let Err(e) = &result {
                    tracing::error!("{e}");
                    let _ = failure_tx.send(e.clone());
                }
                result
            })?;

        Ok((
            LintQueue { sender },
            WorkerHandle {
                thread,
                state,
                failure,
            },
        ))
    }
}
