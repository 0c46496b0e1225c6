//! Diagnostic reporting for the Lucite C front end.
//!
//! The core reports every problem through a [`DiagnosticEngine`] and keeps
//! going; nothing here aborts compilation. The engine owns the process's
//! error/warning counters as explicit state (no globals) and a sink that
//! either prints one line per diagnostic or buffers them for tests.
//!
//! Counters use `Cell` so that every component can hold a shared `&`
//! reference; the front end is single-threaded by contract.

use lucite_ir::SourceLocation;
use std::cell::{Cell, RefCell};
use std::fmt;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_MAGENTA: &str = "\x1b[95m";
const ANSI_RESET: &str = "\x1b[0m";

/// Diagnostic severity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported diagnostic.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: SourceLocation,
    pub message: String,
}

/// Where reported diagnostics go.
enum Sink {
    /// Print to stderr as `file:line:col: severity: message`.
    Stderr { color: bool },
    /// Keep them in memory; tests inspect the buffer.
    Buffer(RefCell<Vec<Diagnostic>>),
}

/// Collects diagnostics and counts errors and warnings.
///
/// The front end calls [`error`](Self::error) / [`warning`](Self::warning)
/// synchronously and continues; the driver reads the counts at shutdown
/// and prints the tally.
pub struct DiagnosticEngine {
    sink: Sink,
    /// File name printed before `line:col` on stderr; locations carry
    /// only an interned handle, so the driver supplies the text once.
    file_name: RefCell<String>,
    errors: Cell<u32>,
    warnings: Cell<u32>,
}

impl DiagnosticEngine {
    fn with_sink(sink: Sink) -> Self {
        DiagnosticEngine {
            sink,
            file_name: RefCell::new(String::new()),
            errors: Cell::new(0),
            warnings: Cell::new(0),
        }
    }

    /// Engine that prints to stderr with ANSI colors.
    pub fn to_stderr() -> Self {
        Self::with_sink(Sink::Stderr { color: true })
    }

    /// Engine that prints to stderr without colors.
    pub fn to_stderr_plain() -> Self {
        Self::with_sink(Sink::Stderr { color: false })
    }

    /// Engine that buffers diagnostics in memory (for tests).
    pub fn buffered() -> Self {
        Self::with_sink(Sink::Buffer(RefCell::new(Vec::new())))
    }

    /// Set the file name prefixed to printed locations.
    pub fn set_file_name(&self, name: impl Into<String>) {
        *self.file_name.borrow_mut() = name.into();
    }

    /// Report a diagnostic and bump the matching counter.
    pub fn report(&self, severity: Severity, loc: SourceLocation, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => self.errors.set(self.errors.get() + 1),
            Severity::Warning => self.warnings.set(self.warnings.get() + 1),
        }
        match &self.sink {
            Sink::Stderr { color } => {
                let (tint, reset) = if *color {
                    let tint = match severity {
                        Severity::Error => ANSI_RED,
                        Severity::Warning => ANSI_MAGENTA,
                    };
                    (tint, ANSI_RESET)
                } else {
                    ("", "")
                };
                let file = self.file_name.borrow();
                if file.is_empty() {
                    eprintln!("{loc}: {tint}{severity}: {reset}{message}");
                } else {
                    eprintln!("{file}:{loc}: {tint}{severity}: {reset}{message}");
                }
            }
            Sink::Buffer(buf) => buf.borrow_mut().push(Diagnostic {
                severity,
                loc,
                message,
            }),
        }
    }

    pub fn error(&self, loc: SourceLocation, message: impl Into<String>) {
        self.report(Severity::Error, loc, message);
    }

    pub fn warning(&self, loc: SourceLocation, message: impl Into<String>) {
        self.report(Severity::Warning, loc, message);
    }

    #[inline]
    pub fn error_count(&self) -> u32 {
        self.errors.get()
    }

    #[inline]
    pub fn warning_count(&self) -> u32 {
        self.warnings.get()
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.errors.get() != 0
    }

    /// Buffered diagnostics, cloned out. Empty for stderr engines.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        match &self.sink {
            Sink::Stderr { .. } => Vec::new(),
            Sink::Buffer(buf) => std::mem::take(&mut *buf.borrow_mut()),
        }
    }

    /// Final tally, e.g. `2 warnings and 1 error generated.`, or `None`
    /// when nothing was reported.
    pub fn summary(&self) -> Option<String> {
        let errors = self.errors.get();
        let warnings = self.warnings.get();
        if errors == 0 && warnings == 0 {
            return None;
        }
        let mut out = String::new();
        if warnings != 0 {
            out.push_str(&format!(
                "{warnings} warning{}",
                if warnings == 1 { "" } else { "s" }
            ));
        }
        if errors != 0 {
            if warnings != 0 {
                out.push_str(" and ");
            }
            out.push_str(&format!(
                "{errors} error{}",
                if errors == 1 { "" } else { "s" }
            ));
        }
        out.push_str(" generated.");
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucite_ir::Name;
    use pretty_assertions::assert_eq;

    fn loc(line: u32, col: u32) -> SourceLocation {
        SourceLocation::new(Name::EMPTY, line, col)
    }

    #[test]
    fn counters_track_reports() {
        let diag = DiagnosticEngine::buffered();
        assert_eq!(diag.error_count(), 0);
        diag.error(loc(1, 1), "bad");
        diag.warning(loc(1, 2), "iffy");
        diag.warning(loc(2, 1), "iffy again");
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.warning_count(), 2);
        assert!(diag.has_errors());
    }

    #[test]
    fn buffered_diagnostics_are_recorded_in_order() {
        let diag = DiagnosticEngine::buffered();
        diag.error(loc(3, 4), "first");
        diag.warning(loc(5, 6), "second");
        let all = diag.take_diagnostics();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].severity, Severity::Error);
        assert_eq!(all[0].message, "first");
        assert_eq!(all[1].severity, Severity::Warning);
        assert_eq!(all[1].loc, loc(5, 6));
    }

    #[test]
    fn summary_pluralizes() {
        let diag = DiagnosticEngine::buffered();
        assert_eq!(diag.summary(), None);

        diag.warning(loc(1, 1), "w");
        assert_eq!(diag.summary().as_deref(), Some("1 warning generated."));

        diag.error(loc(1, 1), "e");
        assert_eq!(
            diag.summary().as_deref(),
            Some("1 warning and 1 error generated.")
        );

        diag.error(loc(1, 2), "e2");
        diag.warning(loc(1, 3), "w2");
        assert_eq!(
            diag.summary().as_deref(),
            Some("2 warnings and 2 errors generated.")
        );
    }
}
