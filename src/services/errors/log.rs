use std::sync::Mutex;

/// Sink for the single diagnostic line written per handled error.
pub trait ErrorLog: Send + Sync {
    fn error(&self, line: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLog;

impl ErrorLog for TracingErrorLog {
    fn error(&self, line: &str) {
        tracing::error!(target: "apikey_gate::errors", "{line}");
    }
}

/// Keeps lines in memory. Used by tests and anything that wants to inspect output.
#[derive(Debug, Default)]
pub struct MemoryErrorLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ErrorLog for MemoryErrorLog {
    fn error(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_owned()),
            Err(poisoned) => poisoned.into_inner().push(line.to_owned()),
        }
    }
}
