//! Diagnostic rendering for compile errors
//!
//! Turns a [`CompileError`] into a `codespan-reporting` diagnostic pointing
//! into the method source, or into JSON for editor tooling.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use termcolor::WriteColor;

use crate::ast::Span;
use crate::error::CompileError;

/// A compile error with its source context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: &'static str,
}

impl Diagnostic {
    /// Build the diagnostic for `error` raised while compiling file `file_id`.
    ///
    /// The primary label is dropped when the error has no span or the span
    /// lies outside `source`, so rendering never fails on stale positions.
    pub fn from_compile_error(error: &CompileError, file_id: usize, source: &str) -> Self {
        let mut inner = CsDiagnostic::new(Severity::Error)
            .with_message(error.to_string())
            .with_code(error.code());

        if let Some(span) = error.span().filter(|span| fits(span, source)) {
            inner = inner.with_labels(vec![Label::primary(file_id, span.start..span.end)
                .with_message(label_message(error))]);
        }
        if let Some(help) = help_message(error) {
            inner.notes.push(format!("help: {}", help));
        }

        Diagnostic {
            inner,
            code: error.code(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    pub fn to_json(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

/// JSON form of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: String,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// 1-indexed
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;
                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: label.message.clone(),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.to_string(),
            severity: "error".to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

fn fits(span: &Span, source: &str) -> bool {
    !span.is_empty()
        && span.end <= source.len()
        && source.is_char_boundary(span.start)
        && source.is_char_boundary(span.end)
}

fn label_message(error: &CompileError) -> String {
    match error {
        CompileError::ShadowingVariable { .. } => "already declared in an enclosing scope".into(),
        CompileError::UnknownVariable { .. } => "not found in this scope".into(),
        CompileError::InvalidAssignment { .. } => "cannot be assigned".into(),
        CompileError::Inlining { .. } => "expected a literal block without arguments".into(),
        CompileError::Internal { .. } => String::new(),
    }
}

fn help_message(error: &CompileError) -> Option<&'static str> {
    match error {
        CompileError::ShadowingVariable { .. } => Some("rename the temporary or parameter"),
        CompileError::UnknownVariable { .. } => {
            Some("declare it as a temporary, or add it to `host-globals` in kestrel.toml")
        }
        CompileError::InvalidAssignment { .. } => {
            Some("arguments and pseudo-variables are read-only; copy the value into a temporary")
        }
        CompileError::Inlining { .. } => Some("pass a literal block such as `[ ... ]`"),
        CompileError::Internal { .. } => None,
    }
}

/// A `SimpleFiles` holding one source
pub fn create_files(
    name: impl Into<String>,
    source: impl Into<String>,
) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(name.into(), source.into());
    files
}
