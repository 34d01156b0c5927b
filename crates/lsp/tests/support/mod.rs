//! Scripted stand-in for the linter process, shared by the integration tests.

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use lintbridge_lsp::command::Invocation;
use lintbridge_lsp::error::LintError;
use lintbridge_lsp::runner::{LintRunner, RawOutput};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type Respond = dyn Fn(&Invocation) -> Result<RawOutput, LintError> + Send + Sync;

/// Records every invocation, tracks how many runs overlap, and optionally
/// waits on a gate before answering.
#[derive(Clone)]
pub struct ScriptedRunner {
    pub calls: Arc<Mutex<Vec<Invocation>>>,
    pub active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
    gate: Option<Receiver<()>>,
    respond: Arc<Respond>,
}

impl ScriptedRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&Invocation) -> Result<RawOutput, LintError> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::default(),
            active: Arc::default(),
            max_active: Arc::default(),
            gate: None,
            respond: Arc::new(respond),
        }
    }

    /// Always print `stdout` and exit with status 1, like a linter that
    /// found something.
    pub fn printing(stdout: &str) -> Self {
        let stdout = stdout.as_bytes().to_vec();
        Self::new(move |_| {
            Ok(RawOutput {
                success: false,
                code: Some(1),
                stdout: stdout.clone(),
                stderr: Vec::new(),
            })
        })
    }

    /// Block each run until a `()` arrives on `gate`.
    pub fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl LintRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<RawOutput, LintError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(invocation.clone());
        if let Some(gate) = &self.gate {
            gate.recv_timeout(Duration::from_secs(10)).expect("gate released");
        } else {
            // Long enough for an overlapping run to show up in max_active.
            std::thread::sleep(Duration::from_millis(5));
        }
        let out = (self.respond)(invocation);
        self.active.fetch_sub(1, Ordering::SeqCst);
        out
    }
}

/// Poll `cond` until it holds or a few seconds pass.
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

pub const ONE_ISSUE: &str = r#"{"Issues":[{"FromLinter":"x","Text":"unused var","Severity":"warning","Pos":{"Filename":"pkg/a.go","Line":10,"Column":3}}]}"#;

pub const SIBLING_ONLY: &str = r#"{"Issues":[{"FromLinter":"x","Text":"unused var","Severity":"warning","Pos":{"Filename":"pkg/b.go","Line":10,"Column":3}},{"FromLinter":"y","Text":"shadow","Severity":"error","Pos":{"Filename":"pkg/b.go","Line":2,"Column":1}}]}"#;

pub fn lint_command() -> Vec<String> {
    vec!["lint".into(), "--format".into(), "json".into()]
}
