//! Child processes of a session: the debugger itself and a local debuggee.
use crate::debugger::error::Error;
use crate::{cs_debug, cs_warn};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use strum_macros::Display;

/// Output of a child process delivered to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Stdout chunk, arbitrary sized.
    Output(String),
    /// Stderr chunk, arbitrary sized.
    Error(String),
    /// Process exited with a code.
    Exited(i32),
}

/// Receiver of child process output. Called from reader threads.
pub type OutputSink = Arc<dyn Fn(TransportEvent) + Send + Sync>;

/// Running child process.
pub trait ChildProcess: Send {
    fn pid(&self) -> Option<u32>;

    /// Write a command line to the process stdin.
    fn write_line(&mut self, line: &str) -> Result<(), Error>;

    /// Force process termination. Exit is still reported through the output sink.
    fn kill(&mut self) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProcessRole {
    #[strum(serialize = "debugger")]
    Debugger,
    #[strum(serialize = "debugee")]
    Debugee,
}

/// What and how to spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnSpec {
    pub role: ProcessRole,
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl SpawnSpec {
    pub fn new(role: ProcessRole, program: impl Into<String>) -> Self {
        Self {
            role,
            program: program.into(),
            args: vec![],
            env: vec![],
            cwd: None,
        }
    }
}

/// Capability to create child processes.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, spec: &SpawnSpec, sink: OutputSink) -> Result<Box<dyn ChildProcess>, Error>;
}

/// Spawner of operating system processes.
#[derive(Default)]
pub struct OsSpawner;

impl ProcessSpawner for OsSpawner {
    fn spawn(&self, spec: &SpawnSpec, sink: OutputSink) -> Result<Box<dyn ChildProcess>, Error> {
        let tpl = Child::new(
            spec.role,
            &spec.program,
            spec.args.iter().cloned(),
            spec.env.iter().cloned(),
            spec.cwd.clone(),
        );
        Ok(Box::new(tpl.install(sink)?))
    }
}

/// Process state.
pub trait State {}

/// Process running, its output is pumped into a sink.
pub struct Installed;

impl State for Installed {}

/// Process prepared for spawning.
pub struct Template;

impl State for Template {}

pub struct Child<S: State> {
    role: ProcessRole,
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
    pid: Option<Pid>,
    stdin: Option<ChildStdin>,
    _p: PhantomData<S>,
}

impl Child<Template> {
    /// Create new process, but dont start it.
    ///
    /// # Arguments
    ///
    /// * `role`: process role in a session, used for logging
    /// * `program`: program name or path
    /// * `args`: program arguments
    /// * `env`: additional environment variables
    /// * `cwd`: working directory
    pub fn new<ARGS, ENV, I>(
        role: ProcessRole,
        program: impl Into<String>,
        args: ARGS,
        env: ENV,
        cwd: Option<impl Into<PathBuf>>,
    ) -> Child<Template>
    where
        ARGS: IntoIterator<Item = I>,
        I: Into<String>,
        ENV: IntoIterator<Item = (String, String)>,
    {
        Self {
            role,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: env.into_iter().collect(),
            cwd: cwd.map(Into::into),
            pid: None,
            stdin: None,
            _p: PhantomData,
        }
    }

    /// Resolve program name in `PATH` if it is not an existing file.
    fn resolve_program(&self) -> Result<String, Error> {
        if Path::new(&self.program).exists() {
            return Ok(self.program.clone());
        }
        which::which(&self.program)
            .map(|p| p.to_string_lossy().to_string())
            .map_err(|e| Error::ProgramNotFound(self.program.clone(), e))
    }

    /// Spawn the process, start threads that pump stdout and stderr into `sink`.
    /// Process exit is reported after both streams are drained.
    pub fn install(self, sink: OutputSink) -> Result<Child<Installed>, Error> {
        let program = self.resolve_program()?;

        let mut cmd = Command::new(&program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = self.cwd.as_deref() {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Spawn(program.clone(), e))?;
        let pid = Pid::from_raw(child.id() as i32);
        cs_debug!("{} `{program}` spawned, pid {pid}", self.role);

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stderr not captured"))?;

        let stderr_pump = {
            let sink = sink.clone();
            thread::Builder::new()
                .name(format!("{}-stderr", self.role))
                .spawn(move || pump(stderr, &sink, TransportEvent::Error))?
        };
        {
            let role = self.role;
            thread::Builder::new()
                .name(format!("{}-stdout", self.role))
                .spawn(move || {
                    pump(stdout, &sink, TransportEvent::Output);
                    // banners printed right before exit must reach the sink first
                    if stderr_pump.join().is_err() {
                        cs_warn!("{role} stderr reader panicked");
                    }
                    let code = match child.wait() {
                        Ok(status) => exit_code(status),
                        Err(e) => {
                            cs_warn!("wait {role} process: {e}");
                            -1
                        }
                    };
                    cs_debug!("{role} process exit with code {code}");
                    sink(TransportEvent::Exited(code));
                })?;
        }

        Ok(Child {
            role: self.role,
            program,
            args: self.args,
            env: self.env,
            cwd: self.cwd,
            pid: Some(pid),
            stdin,
            _p: PhantomData,
        })
    }
}

impl ChildProcess for Child<Installed> {
    fn pid(&self) -> Option<u32> {
        self.pid.map(|pid| pid.as_raw() as u32)
    }

    fn write_line(&mut self, line: &str) -> Result<(), Error> {
        let stdin = self.stdin.as_mut().ok_or(Error::StdinClosed)?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }

    fn kill(&mut self) -> Result<(), Error> {
        self.stdin = None;
        let Some(pid) = self.pid else {
            return Ok(());
        };
        cs_debug!("kill {} process, pid {pid}", self.role);
        match signal::kill(pid, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(Error::Syscall("kill", e)),
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

/// Read a stream until EOF, forward text chunks into a sink.
/// Multibyte characters split between reads are kept until completed.
fn pump(mut stream: impl Read, sink: &OutputSink, wrap: fn(String) -> TransportEvent) {
    let mut buf = [0u8; 4096];
    let mut pending: Vec<u8> = Vec::with_capacity(buf.len());
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                cs_warn!("read child output: {e}");
                break;
            }
        };
        pending.extend_from_slice(&buf[..n]);

        let text = match std::str::from_utf8(&pending) {
            Ok(text) => {
                let text = text.to_string();
                pending.clear();
                text
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&pending[..valid]).into_owned();
                pending.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&pending).into_owned();
                pending.clear();
                text
            }
        };

        if !text.is_empty() {
            sink(wrap(text));
        }
    }

    if !pending.is_empty() {
        sink(wrap(String::from_utf8_lossy(&pending).into_owned()));
    }
}
