//! User-facing feedback channel.
//!
//! Generators never print; they hand `(severity, message)` pairs to a
//! [`Reporter`]. Hosts decide where those go: [`LogReporter`] forwards them to
//! Bevy's log, a `Vec<(Severity, String)>` collects them for inspection.

use bevy::prelude::*;

/// Severity of a generator report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Receives user feedback from a generator run.
pub trait Reporter {
    fn report(&mut self, severity: Severity, message: &str);
}

impl Reporter for Vec<(Severity, String)> {
    fn report(&mut self, severity: Severity, message: &str) {
        self.push((severity, message.to_string()));
    }
}

/// Routes reports to the `bevy::log` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }
    }
}
