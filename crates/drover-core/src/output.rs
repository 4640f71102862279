//! Output sinks
//!
//! Every helm invocation and every diagnostic line goes to a caller-supplied sink.
//! A [`Sink`] is a cheaply cloneable handle around a shared writer so the resolver,
//! the plan and each step can hold the same stream.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, cloneable writer
#[derive(Clone)]
pub struct Sink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    /// Wrap any writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// The process's standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// The process's standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Discard everything
    pub fn null() -> Self {
        Self::new(io::sink())
    }

    /// Write one line, ignoring write failures
    ///
    /// Diagnostics must never abort a deployment.
    pub fn line(&self, message: impl fmt::Display) {
        let mut writer = self.lock();
        let _ = writeln!(writer, "{message}");
        let _ = writer.flush();
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink::null()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sink")
    }
}

/// In-memory writer whose contents can be read back
///
/// Clones share the same buffer, so one clone can be handed to a [`Sink`]
/// while the other is inspected.
#[derive(Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink writing into this buffer
    pub fn sink(&self) -> Sink {
        Sink::new(self.clone())
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Non-empty lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
