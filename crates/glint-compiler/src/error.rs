//! Diagnostic accumulation and rendering.
//!
//! The compiler never unwinds on user-facing problems: every error and
//! warning is recorded into a [`Diagnostics`] value and the walk continues
//! with best effort. Callers check [`Diagnostics::has_errors`] before
//! trusting the produced effect.
//!
//! # Design
//!
//! - `Diagnostic` — single message with kind, severity, and optional span
//! - `DiagnosticKind` — categorizes by the check that produced it
//! - `Diagnostics` — ordered accumulator owning the error-present flag
//! - `DiagnosticFormatter` — renders messages with source snippets
//!
//! A diagnostic's span is optional by design: the resource-array gap check
//! runs over detached reflection data after parsing, so no real location
//! exists and none is fabricated.

use glint_ast::{SourceMap, Span};
use std::fmt;

/// A single compilation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Source location, when the originating check has one.
    pub span: Option<Span>,
    pub message: String,
}

/// Category of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Unsupported expression shape (e.g. default arguments on an
    /// entry-point call).
    Syntax,
    /// Attribute value cannot be coerced to its declared type.
    Type,
    /// Technique or pass name collision.
    DuplicateName,
    /// Shader assignment before `Profile` was set.
    MissingProfile,
    /// The external shader compiler failed; message carries its raw text.
    BackendCompile,
    /// Broken contiguous-array resource reassembly.
    SparseIndex,
    /// Null geometry shader with stream output but no usable vertex shader.
    Consistency,
    /// Missing include file, unreadable dependency file, etc.
    Io,
    /// Internal compiler invariant; indicates a bug.
    Internal,
}

impl DiagnosticKind {
    /// Human-readable name used in rendered diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::Type => "type error",
            DiagnosticKind::DuplicateName => "duplicate name",
            DiagnosticKind::MissingProfile => "missing profile",
            DiagnosticKind::BackendCompile => "shader compilation failed",
            DiagnosticKind::SparseIndex => "sparse resource array",
            DiagnosticKind::Consistency => "pass consistency",
            DiagnosticKind::Io => "i/o error",
            DiagnosticKind::Internal => "internal compiler error",
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity,
            self.kind.name(),
            self.message
        )
    }
}

/// Ordered accumulator of diagnostics for one compile invocation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, kind: DiagnosticKind, span: Option<Span>, message: impl Into<String>) {
        self.push(kind, Severity::Error, span, message.into());
    }

    /// Record a warning.
    pub fn warning(
        &mut self,
        kind: DiagnosticKind,
        span: Option<Span>,
        message: impl Into<String>,
    ) {
        self.push(kind, Severity::Warning, span, message.into());
    }

    /// Record an informational note.
    pub fn info(&mut self, kind: DiagnosticKind, span: Option<Span>, message: impl Into<String>) {
        self.push(kind, Severity::Note, span, message.into());
    }

    fn push(&mut self, kind: DiagnosticKind, severity: Severity, span: Option<Span>, message: String) {
        if severity == Severity::Error {
            self.has_errors = true;
        }
        self.messages.push(Diagnostic {
            kind,
            severity,
            span,
            message,
        });
    }

    /// True if any error-severity diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// All recorded diagnostics, in logging order.
    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }
}

/// Renders diagnostics with source context.
///
/// Produces the usual compiler shape: header, `--> file:line:col` locator,
/// the offending source line, and a caret underline. Diagnostics without a
/// span render the header alone.
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Format one diagnostic.
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut output = format!("{}\n", diagnostic);

        let Some(span) = diagnostic.span else {
            return output;
        };

        let file_path = self.sources.file_path(&span);
        let (line, col) = self.sources.line_col(&span);
        output.push_str(&format!("  --> {}:{}:{}\n", file_path.display(), line, col));

        let file = self.sources.file(&span);
        if let Some(source_line) = file.line_text(line) {
            let source_line = source_line.trim_end_matches('\n');
            output.push_str("   |\n");
            output.push_str(&format!("{:3} | {}\n", line, source_line));

            let start_col = col as usize;
            let end_col = (start_col + span.len() as usize).min(source_line.len() + 1);
            let underline = " ".repeat(start_col.saturating_sub(1))
                + &"^".repeat(end_col.saturating_sub(start_col).max(1));
            output.push_str(&format!("   | {}\n", underline));
        }

        output
    }

    /// Format all diagnostics, separated by blank lines.
    pub fn format_all(&self, diagnostics: &Diagnostics) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
