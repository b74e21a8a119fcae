use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Mutex, MutexGuard};

use sluice_stream::{Error, NativeInput, NativeOutput, Result};

use crate::{Provider, Registry};

/// A running child process whose stdout (read) and stdin (write) can each be
/// opened once.
pub struct Process {
    program: String,
    pid:     u32,
    child:   Mutex<Child>,
}

impl Process {
    /// Spawn `program` with piped stdin and stdout.
    pub fn spawn<I, S>(program: impl Into<String>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.into();
        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ResourceUnavailable {
                resource: program.clone(),
                source:   e,
            })?;
        Ok(Self::from_child(program, child))
    }

    /// Adopt a child spawned elsewhere. Pipes it was not spawned with cannot
    /// be opened.
    pub fn from_child(program: impl Into<String>, child: Child) -> Self {
        Self {
            program: program.into(),
            pid: child.id(),
            child: Mutex::new(child),
        }
    }

    pub fn program(&self) -> &str { &self.program }

    pub fn id(&self) -> u32 { self.pid }

    /// Wait for exit. Closes stdin first if it was never opened.
    pub fn wait(&self) -> io::Result<ExitStatus> { self.lock()?.wait() }

    pub fn kill(&self) -> io::Result<()> { self.lock()?.kill() }

    fn lock(&self) -> io::Result<MutexGuard<'_, Child>> {
        self.child
            .lock()
            .map_err(|_| io::Error::other(format!("process '{}' state poisoned", self.program)))
    }

    fn take_stdout(&self) -> io::Result<NativeInput> {
        self.lock()?
            .stdout
            .take()
            .map(NativeInput::new)
            .ok_or_else(|| self.pipe_gone("stdout"))
    }

    fn take_stdin(&self) -> io::Result<NativeOutput> {
        self.lock()?
            .stdin
            .take()
            .map(NativeOutput::new)
            .ok_or_else(|| self.pipe_gone("stdin"))
    }

    fn pipe_gone(&self, pipe: &str) -> io::Error {
        io::Error::new(
            io::ErrorKind::BrokenPipe,
            format!("{pipe} of '{}' is not piped or already taken", self.program),
        )
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Process({} pid={})", self.program, self.pid)
    }
}

pub(super) fn install(registry: &mut Registry) {
    registry.install_builtin(Provider::reader("process", |process: &Process| process.take_stdout()));
    registry.install_builtin(Provider::writer("process", |process: &Process| process.take_stdin()));
}
