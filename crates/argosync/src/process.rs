//! External process execution.
//!
//! Every program this crate drives (`git`, `helm`, `tar`) goes through the
//! [`CommandRunner`] seam so the orchestration can be exercised against
//! scripted results in tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::Command;

/// A single program invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program and arguments joined for diagnostics. Callers must not
    /// pass requests that carry credentials in their arguments.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code for messages, `-1` when killed by a signal.
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }
}

/// Runs external programs to completion, capturing both output streams.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, request: CommandRequest) -> std::io::Result<CommandOutput>;
}

/// Spawns real processes with `tokio::process`.
#[derive(Debug, Default, Clone)]
pub struct TokioCommandRunner;

#[async_trait::async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, request: CommandRequest) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }

        let output = cmd.output().await?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A recorded invocation, with the (tokio) instant it was made.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: CommandRequest,
    pub at: tokio::time::Instant,
}

type Responder = Box<dyn Fn(&CommandRequest) -> std::io::Result<CommandOutput> + Send + Sync>;

/// Scripted runner used by tests.
///
/// Responses are matched on program name plus the first argument
/// (e.g. `git push`, `helm template`); queued responses are consumed in
/// order and the last one repeats. Unmatched invocations succeed with
/// empty output, or are delegated to a fallback runner if one is set.
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<Vec<(String, VecDeque<CommandOutput>)>>,
    responders: Mutex<Vec<(String, Responder)>>,
    calls: Mutex<Vec<RecordedCall>>,
    fallback: Option<Box<dyn CommandRunner>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delegates unscripted invocations to `runner` instead of
    /// returning empty success.
    pub fn with_fallback(runner: impl CommandRunner + 'static) -> Self {
        Self {
            fallback: Some(Box::new(runner)),
            ..Default::default()
        }
    }

    fn key(program: &str, first_arg: Option<&str>) -> String {
        match first_arg {
            Some(arg) => format!("{program} {arg}"),
            None => program.to_string(),
        }
    }

    /// Queues responses for `<program> <subcommand>`.
    pub fn script(&self, command: &str, outputs: Vec<CommandOutput>) {
        let mut scripts = self.scripts.lock().unwrap_or_else(|e| e.into_inner());
        match scripts.iter_mut().find(|(key, _)| key == command) {
            Some((_, queue)) => queue.extend(outputs),
            None => scripts.push((command.to_string(), outputs.into())),
        }
    }

    /// Answers `<program> <subcommand>` with a closure over the request.
    pub fn respond_with<F>(&self, command: &str, responder: F)
    where
        F: Fn(&CommandRequest) -> std::io::Result<CommandOutput> + Send + Sync + 'static,
    {
        self.responders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((command.to_string(), Box::new(responder)));
    }

    /// All invocations so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Invocations of `<program> <subcommand>`.
    pub fn calls_for(&self, command: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| {
                Self::key(
                    &call.request.program,
                    call.request.args.first().map(String::as_str),
                ) == command
            })
            .collect()
    }

    fn scripted(&self, key: &str) -> Option<CommandOutput> {
        let mut scripts = self.scripts.lock().unwrap_or_else(|e| e.into_inner());
        let (_, queue) = scripts.iter_mut().find(|(k, _)| k == key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// Successful output with the given stdout.
pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Failed output with the given exit code and stderr.
pub fn failed_output(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

#[async_trait::async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, request: CommandRequest) -> std::io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                request: request.clone(),
                at: tokio::time::Instant::now(),
            });

        let key = Self::key(&request.program, request.args.first().map(String::as_str));

        {
            let responders = self.responders.lock().unwrap_or_else(|e| e.into_inner());
            if let Some((_, responder)) = responders.iter().find(|(k, _)| *k == key) {
                return responder(&request);
            }
        }

        if let Some(output) = self.scripted(&key) {
            return Ok(output);
        }

        match &self.fallback {
            Some(runner) => runner.run(request).await,
            None => Ok(ok_output("")),
        }
    }
}
