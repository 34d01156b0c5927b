//! LSP server main loop with request/notification dispatch.
//!
//! Uses `lsp-server` (synchronous, crossbeam-based) for the transport.
//! This thread handles protocol traffic; linting happens on the worker
//! thread, and handing a document to it blocks while a lint is running.

use crossbeam_channel::{select, Receiver};
use lsp_server::{Connection, ErrorCode, Message, Notification, Request, RequestId, Response};
use lsp_types::notification::{
    DidOpenTextDocument, DidSaveTextDocument, Exit, Notification as _, WillSaveTextDocument,
};
use lsp_types::request::{Request as _, Shutdown};
use lsp_types::{
    InitializeParams, SaveOptions, ServerCapabilities, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Uri,
};
use std::error::Error;

use crate::config::ServerConfig;
use crate::diagnostics::DiagnosticMapper;
use crate::error::PublishError;
use crate::publish::Publisher;
use crate::runner::{LintRunner, ProcessRunner};
use crate::session::Session;
use crate::worker::{LintQueue, LintRequest, LintWorker, WorkerHandle};

pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Run the LSP server over stdio until shutdown.
pub fn run(config: ServerConfig) -> Result<(), Box<dyn Error>> {
    let (connection, io_threads) = Connection::stdio();
    serve(&connection, config, ProcessRunner)?;
    // Drop our end of the channels so the writer thread can finish.
    drop(connection);
    io_threads.join()?;
    Ok(())
}

/// Drive one client connection from the initialize handshake to exit.
pub fn serve<R>(
    connection: &Connection,
    config: ServerConfig,
    runner: R,
) -> Result<(), Box<dyn Error>>
where
    R: LintRunner + Send + 'static,
{
    // ── Initialize handshake ──────────────────────────────────────────
    let (init_id, init_value) = connection.initialize_start()?;
    let session = match negotiate_session(init_value) {
        Ok(session) => session,
        Err(e) => {
            reject_initialize(connection, init_id, &e.to_string())?;
            return Err(e);
        }
    };
    tracing::info!(
        root = %session.root_dir.display(),
        command = ?session.command,
        "session initialized"
    );
    connection.initialize_finish(init_id, initialize_result()?)?;

    // ── Worker ────────────────────────────────────────────────────────
    let mapper = DiagnosticMapper::new(config.include_linter_name);
    let publisher = Publisher::new(connection.sender.clone());
    let (queue, worker) = LintWorker::new(session, runner, mapper, publisher).spawn()?;
    let failure = worker.failure().clone();

    // ── Main loop ─────────────────────────────────────────────────────
    loop {
        select! {
            recv(connection.receiver) -> msg => {
                let Ok(msg) = msg else {
                    tracing::warn!("client disconnected without shutdown");
                    return stop_worker(queue, worker);
                };
                match msg {
                    Message::Request(req) => {
                        if req.method == Shutdown::METHOD {
                            stop_worker(queue, worker)?;
                            connection.handle_shutdown(&req)?;
                            return Ok(());
                        }
                        reply_unsupported(connection, req)?;
                    }
                    Message::Notification(not) => {
                        if not.method == Exit::METHOD {
                            tracing::warn!("exit received without shutdown");
                            return stop_worker(queue, worker);
                        }
                        handle_notification(&queue, &failure, not)?;
                    }
                    Message::Response(_) => {
                        // Ignore responses (we don't send requests to the client)
                    }
                }
            }
            recv(failure) -> fatal => {
                return match fatal {
                    Ok(e) => Err(e.into()),
                    Err(_) => Err("lint worker exited unexpectedly".into()),
                };
            }
        }
    }
}

fn negotiate_session(init_value: serde_json::Value) -> Result<Session, Box<dyn Error>> {
    let params: InitializeParams = serde_json::from_value(init_value)?;
    Ok(Session::from_initialize(&params)?)
}

fn reject_initialize(
    connection: &Connection,
    id: RequestId,
    message: &str,
) -> Result<(), Box<dyn Error>> {
    let resp = Response::new_err(id, ErrorCode::InvalidParams as i32, message.to_string());
    connection.sender.send(Message::Response(resp))?;
    Ok(())
}

fn build_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::NONE),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(false),
                })),
                ..Default::default()
            },
        )),
        ..Default::default()
    }
}

fn initialize_result() -> Result<serde_json::Value, Box<dyn Error>> {
    Ok(serde_json::json!({
        "capabilities": serde_json::to_value(build_capabilities())?,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    }))
}

/// Every request besides initialize/shutdown gets the same answer.
fn reply_unsupported(connection: &Connection, req: Request) -> Result<(), Box<dyn Error>> {
    tracing::debug!(method = %req.method, "unsupported request");
    let resp = Response::new_err(
        req.id,
        ErrorCode::MethodNotFound as i32,
        format!("unsupported: {}", req.method),
    );
    connection.sender.send(Message::Response(resp))?;
    Ok(())
}

fn handle_notification(
    queue: &LintQueue,
    failure: &Receiver<PublishError>,
    not: Notification,
) -> Result<(), Box<dyn Error>> {
    let uri = match not.method.as_str() {
        m if m == DidOpenTextDocument::METHOD => {
            serde_json::from_value::<lsp_types::DidOpenTextDocumentParams>(not.params)
                .map(|p| p.text_document.uri)
        }
        m if m == DidSaveTextDocument::METHOD => {
            serde_json::from_value::<lsp_types::DidSaveTextDocumentParams>(not.params)
                .map(|p| p.text_document.uri)
        }
        m if m == WillSaveTextDocument::METHOD => {
            serde_json::from_value::<lsp_types::WillSaveTextDocumentParams>(not.params)
                .map(|p| p.text_document.uri)
        }
        _ => {
            // didChange, didClose and the rest: the linter reads from disk,
            // so only open and save matter.
            tracing::trace!(method = %not.method, "ignoring notification");
            return Ok(());
        }
    };
    match uri {
        Ok(uri) => enqueue(queue, failure, uri),
        Err(e) => {
            tracing::warn!(method = %not.method, "malformed notification params: {e}");
            Ok(())
        }
    }
}

/// Hand a document to the worker, blocking while a lint cycle is running.
fn enqueue(
    queue: &LintQueue,
    failure: &Receiver<PublishError>,
    uri: Uri,
) -> Result<(), Box<dyn Error>> {
    let Some(request) = LintRequest::from_uri(uri.clone()) else {
        tracing::warn!(uri = uri.as_str(), "not a file URI, skipping lint");
        return Ok(());
    };
    if let Err(e) = queue.submit(request) {
        // The worker only goes away on its own when publishing failed.
        if let Ok(fatal) = failure.try_recv() {
            return Err(fatal.into());
        }
        tracing::warn!(uri = uri.as_str(), "{e}");
    }
    Ok(())
}

/// Close the queue and wait for any in-flight lint to finish.
fn stop_worker(queue: LintQueue, worker: WorkerHandle) -> Result<(), Box<dyn Error>> {
    queue.close();
    worker.join()?;
    Ok(())
}
