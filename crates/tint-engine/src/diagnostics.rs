//! Where configuration problems and lifecycle notes are reported.
//!
//! The engine never fails initialization because of bad settings. Instead
//! every recovered problem goes to a [`DiagnosticsSink`] as a user-visible
//! error, and lifecycle events go there as informational lines.

/// Receiver for engine diagnostics.
pub trait DiagnosticsSink {
    /// An informational line (log output, never shown as a popup).
    fn info(&mut self, message: &str);

    /// A problem the user should see and fix.
    fn error(&mut self, message: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn error(&mut self, message: &str) {
        log::error!("{message}");
    }
}

/// Keeps every message in memory, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectingSink {
    pub infos: Vec<String>,
    pub errors: Vec<String>,
}

impl CollectingSink {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            infos: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl DiagnosticsSink for CollectingSink {
    fn info(&mut self, message: &str) {
        self.infos.push(message.to_owned());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_owned());
    }
}
